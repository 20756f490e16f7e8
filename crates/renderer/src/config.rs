//! Configuration for a rendering run.

use heatmap_common::WorldGeometry;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::hue::HueRamp;
use crate::stripes::StripeLayout;

/// Settings that shape the rendered overlay.
///
/// Defaults reproduce the images of the reference deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// How far a painted pixel's brightness is lifted towards white (0-1).
    pub transparency: f32,

    /// Contrast boost for low counts; the ramp's nth root is derived from it.
    pub sensitivity: f64,

    /// Base of the logarithmic count compression.
    pub log_base: f64,

    /// Hue of the least visited tiles.
    pub min_hue: f64,

    /// Hue of the most visited tiles.
    pub max_hue: f64,

    /// Rows per stripe. Must divide the image height.
    pub stripe_height: u32,

    /// Number of equal stripes; takes precedence over `stripe_height`.
    pub stripe_count: Option<u32>,

    /// World extent and tile scale the heat data was recorded against.
    pub world: WorldGeometry,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            transparency: 0.65,
            sensitivity: HueRamp::SENSITIVITY,
            log_base: HueRamp::LOG_BASE,
            min_hue: HueRamp::MIN_HUE,
            max_hue: HueRamp::MAX_HUE,
            stripe_height: 192,
            stripe_count: None,
            world: WorldGeometry::reference(),
        }
    }
}

impl RenderConfig {
    /// Load configuration from environment variables over the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `HEATMAP_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    /// Override fields from a variable lookup. Unparseable values are ignored.
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("HEATMAP_TRANSPARENCY") {
            if let Ok(transparency) = val.parse() {
                self.transparency = transparency;
            }
        }

        if let Some(val) = lookup("HEATMAP_SENSITIVITY") {
            if let Ok(sensitivity) = val.parse() {
                self.sensitivity = sensitivity;
            }
        }

        if let Some(val) = lookup("HEATMAP_STRIPE_HEIGHT") {
            if let Ok(rows) = val.parse() {
                self.stripe_height = rows;
                if let Some(count) = self.stripe_count {
                    warn!(
                        stripe_height = rows,
                        stripe_count = count,
                        "HEATMAP_STRIPE_HEIGHT has no effect while stripe_count is set"
                    );
                }
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.transparency) {
            return Err("transparency must be within 0-1".to_string());
        }

        if !(self.sensitivity >= 1.0) {
            return Err("sensitivity must be >= 1".to_string());
        }

        if !(self.log_base > 1.0) {
            return Err("log_base must be > 1".to_string());
        }

        if !self.min_hue.is_finite() || !self.max_hue.is_finite() {
            return Err("min_hue and max_hue must be finite".to_string());
        }

        if self.stripe_height == 0 {
            return Err("stripe_height must be > 0".to_string());
        }

        if self.stripe_count == Some(0) {
            return Err("stripe_count must be > 0".to_string());
        }

        if self.world.tile_scale == 0 {
            return Err("world.tile_scale must be > 0".to_string());
        }

        if self.world.width == 0 || self.world.height == 0 {
            return Err("world.width and world.height must be > 0".to_string());
        }

        Ok(())
    }

    /// Stripe layout, preferring an explicit stripe count.
    pub fn stripe_layout(&self) -> StripeLayout {
        match self.stripe_count {
            Some(count) => StripeLayout::Count(count),
            None => StripeLayout::Rows(self.stripe_height),
        }
    }

    /// The hue ramp described by this configuration.
    pub fn ramp(&self) -> HueRamp {
        HueRamp {
            sensitivity: self.sensitivity,
            log_base: self.log_base,
            min_hue: self.min_hue,
            max_hue: self.max_hue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = RenderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ramp(), HueRamp::reference());
        assert_eq!(config.world, WorldGeometry::reference());
    }

    #[test]
    fn test_vars_override_defaults() {
        let vars: HashMap<&str, &str> = [
            ("HEATMAP_TRANSPARENCY", "0.5"),
            ("HEATMAP_SENSITIVITY", "not a number"),
            ("HEATMAP_STRIPE_HEIGHT", "96"),
        ]
        .into_iter()
        .collect();

        let mut config = RenderConfig::default();
        config.apply_vars(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.transparency, 0.5);
        assert_eq!(config.sensitivity, HueRamp::SENSITIVITY);
        assert_eq!(config.stripe_height, 96);
        assert_eq!(config.stripe_layout(), StripeLayout::Rows(96));
    }

    #[test]
    fn test_stripe_count_takes_precedence() {
        let config = RenderConfig {
            stripe_count: Some(26),
            ..Default::default()
        };
        assert_eq!(config.stripe_layout(), StripeLayout::Count(26));
    }

    #[test]
    fn test_stripe_height_var_does_not_override_count() {
        let mut config = RenderConfig {
            stripe_count: Some(26),
            ..Default::default()
        };
        config.apply_vars(|name| (name == "HEATMAP_STRIPE_HEIGHT").then(|| "96".to_string()));
        assert_eq!(config.stripe_height, 96);
        assert_eq!(config.stripe_layout(), StripeLayout::Count(26));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let bad = [
            RenderConfig {
                transparency: 1.5,
                ..Default::default()
            },
            RenderConfig {
                sensitivity: 0.5,
                ..Default::default()
            },
            RenderConfig {
                log_base: 1.0,
                ..Default::default()
            },
            RenderConfig {
                stripe_height: 0,
                ..Default::default()
            },
            RenderConfig {
                stripe_count: Some(0),
                ..Default::default()
            },
            RenderConfig {
                transparency: f32::NAN,
                ..Default::default()
            },
            RenderConfig {
                min_hue: f64::NAN,
                ..Default::default()
            },
            RenderConfig {
                max_hue: f64::INFINITY,
                ..Default::default()
            },
            RenderConfig {
                world: WorldGeometry {
                    width: 0,
                    ..WorldGeometry::reference()
                },
                ..Default::default()
            },
            RenderConfig {
                world: WorldGeometry {
                    height: 0,
                    ..WorldGeometry::reference()
                },
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{:?} should be invalid", config);
        }
    }
}

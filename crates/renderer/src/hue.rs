//! Hue ramp and colour synthesis for heat tiles.
//!
//! Counts are compressed logarithmically and then through an nth root so the
//! long tail of rarely visited tiles still spreads across the ramp:
//!
//! ```text
//! nth_root   = 1 + (sensitivity - 1) / 2
//! normalized = log_b(count) / log_b(max + 1 - min)
//! normalized = normalized ^ (1 / nth_root)
//! hue        = min_hue + normalized * (max_hue - min_hue)
//! ```
//!
//! With the reference constants the ramp runs from green (1/3) for the
//! least visited tiles to red (0) for the most visited.
//!
//! A painted pixel keeps the base image's brightness, lifted towards white
//! by the transparency constant, under a fully saturated heat hue.

use serde::{Deserialize, Serialize};

/// Parameters of the count → hue mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HueRamp {
    /// Larger values boost the contrast between low counts.
    pub sensitivity: f64,
    pub log_base: f64,
    /// Hue of the least visited tiles.
    pub min_hue: f64,
    /// Hue of the most visited tiles.
    pub max_hue: f64,
}

impl HueRamp {
    pub const SENSITIVITY: f64 = 4.0;
    pub const LOG_BASE: f64 = 4.0;
    pub const MIN_HUE: f64 = 1.0 / 3.0;
    pub const MAX_HUE: f64 = 0.0;

    /// The green → red ramp of the reference deployment.
    pub const fn reference() -> Self {
        Self {
            sensitivity: Self::SENSITIVITY,
            log_base: Self::LOG_BASE,
            min_hue: Self::MIN_HUE,
            max_hue: Self::MAX_HUE,
        }
    }

    pub fn nth_root(&self) -> f64 {
        1.0 + (self.sensitivity - 1.0) / 2.0
    }

    /// Position of `count` on the ramp in `[0, 1]`.
    ///
    /// When `max <= min` the range is degenerate (`log(1) = 0`), so `max + 1`
    /// stands in for `max`, as callers of the original ramp did by hand.
    /// Counts beyond the range clamp to the ends.
    pub fn normalized(&self, count: u32, min: u32, max: u32) -> f64 {
        let max = if max <= min { min as f64 + 1.0 } else { max as f64 };
        let span = max + 1.0 - min as f64;

        let log_base = self.log_base.ln();
        let ratio = (f64::from(count).ln() / log_base) / (span.ln() / log_base);
        // Single precision between steps, matching files rendered before
        let ratio = (ratio as f32) as f64;
        if ratio.is_nan() {
            return 0.0;
        }
        ratio.clamp(0.0, 1.0).powf(1.0 / self.nth_root())
    }

    /// Hue for `count` given the store's global minimum and maximum.
    pub fn hue(&self, count: u32, min: u32, max: u32) -> f32 {
        let normalized = self.normalized(count, min, max);
        (self.min_hue + normalized * (self.max_hue - self.min_hue)) as f32
    }
}

impl Default for HueRamp {
    fn default() -> Self {
        Self::reference()
    }
}

/// Brightness component of an RGB pixel in HSB space.
#[inline]
pub fn brightness(rgb: [u8; 3]) -> f32 {
    rgb.iter().copied().max().unwrap_or(0) as f32 / 255.0
}

/// Convert HSB to 8-bit RGB.
///
/// Hue wraps around the unit interval. Rounding follows the AWT conversion
/// the existing renders were produced with, so colours match byte for byte.
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> [u8; 3] {
    let to_byte = |v: f32| (v * 255.0 + 0.5) as u8;

    if saturation == 0.0 {
        let v = to_byte(brightness);
        return [v, v, v];
    }

    let h = (hue - hue.floor()) * 6.0;
    let f = h - h.floor();
    let p = brightness * (1.0 - saturation);
    let q = brightness * (1.0 - saturation * f);
    let t = brightness * (1.0 - saturation * (1.0 - f));

    let (r, g, b) = match h as u32 {
        0 => (brightness, t, p),
        1 => (q, brightness, p),
        2 => (p, brightness, t),
        3 => (p, q, brightness),
        4 => (t, p, brightness),
        _ => (brightness, p, q),
    };
    [to_byte(r), to_byte(g), to_byte(b)]
}

/// Heat colour for a base pixel: saturated `hue`, brightness of the base
/// pixel blended towards 1 by `transparency`.
#[inline]
pub fn blend_heat(base: [u8; 3], hue: f32, transparency: f32) -> [u8; 3] {
    let lifted = brightness(base) * (1.0 - transparency) + transparency;
    hsb_to_rgb(hue, 1.0, lifted)
}

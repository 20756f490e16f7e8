//! Configuration loading for the renderer service.
//!
//! Precedence, lowest first: built-in defaults, the YAML file, `HEATMAP_*`
//! environment variables, then command-line flags (applied in `main`).

use anyhow::{Context, Result};
use renderer::RenderConfig;
use std::fs;
use std::path::Path;

/// Parse a YAML document. Missing fields keep their defaults.
pub fn parse_render_config(content: &str) -> Result<RenderConfig> {
    serde_yaml::from_str(content).context("Failed to parse render config YAML")
}

/// Load the render configuration from an optional YAML file and the
/// environment.
pub fn load_render_config(path: Option<&Path>) -> Result<RenderConfig> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read render config from {:?}", path))?;
            parse_render_config(&content)
                .with_context(|| format!("Invalid render config in {:?}", path))?
        }
        None => RenderConfig::default(),
    };
    config.apply_env();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatmap_common::WorldGeometry;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = parse_render_config("transparency: 0.4\nstripe_height: 96\n").unwrap();
        assert_eq!(config.transparency, 0.4);
        assert_eq!(config.stripe_height, 96);
        assert_eq!(config.sensitivity, 4.0);
        assert_eq!(config.world, WorldGeometry::reference());
    }

    #[test]
    fn test_yaml_world_and_stripe_count() {
        let yaml = "\
stripe_count: 10
world:
  offset_x: 0
  offset_y: 0
  width: 100
  height: 50
  tile_scale: 2
";
        let config = parse_render_config(yaml).unwrap();
        assert_eq!(config.stripe_count, Some(10));
        assert_eq!(config.world.pixel_height(), 100);
    }

    #[test]
    fn test_bad_yaml_is_error() {
        assert!(parse_render_config("transparency: [1, 2]").is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_render_config(Some(&dir.path().join("absent.yaml"))).is_err());
    }
}

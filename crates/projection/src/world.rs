//! Affine world projection with an axis flip.
//!
//! Forward transform for a coordinate `(x, y)` with offset `(ox, oy)`,
//! world height `H` and tile scale `N`:
//!
//! ```text
//! px = N * (x - ox)
//! py = N * (H - (y - oy) - 1)
//! ```
//!
//! `(px, py)` is the upper-left pixel of the N x N block the coordinate is
//! drawn as. Coordinates outside `[ox, ox + W) x [oy, oy + H)` have no block
//! on the image and map to [`PixelPosition::OUT_OF_BOUNDS`].

use heatmap_common::{Coordinate, PixelPosition, WorldGeometry};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("tile scale must be at least 1")]
    ZeroTileScale,

    #[error("world extent must be non-empty, got {width}x{height}")]
    EmptyWorld { width: u32, height: u32 },
}

/// Maps dataset coordinates onto the base image and back.
///
/// Stateless apart from the geometry it was built with; every method is a
/// pure function of its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldProjection {
    geometry: WorldGeometry,
}

impl WorldProjection {
    /// Create a projection for the given world geometry.
    pub fn new(geometry: WorldGeometry) -> Result<Self, ProjectionError> {
        if geometry.tile_scale == 0 {
            return Err(ProjectionError::ZeroTileScale);
        }
        if geometry.width == 0 || geometry.height == 0 {
            return Err(ProjectionError::EmptyWorld {
                width: geometry.width,
                height: geometry.height,
            });
        }
        Ok(Self { geometry })
    }

    /// Projection for the reference world map.
    pub fn reference() -> Self {
        Self {
            geometry: WorldGeometry::reference(),
        }
    }

    pub fn geometry(&self) -> &WorldGeometry {
        &self.geometry
    }

    /// Pixel block side length.
    pub fn tile_scale(&self) -> u32 {
        self.geometry.tile_scale
    }

    /// Image dimensions (width, height) in pixels.
    pub fn image_dimensions(&self) -> (u64, u64) {
        (self.geometry.pixel_width(), self.geometry.pixel_height())
    }

    /// Upper-left pixel of the block for `coord`, or `None` if the coordinate
    /// is outside the world.
    pub fn to_image(&self, coord: Coordinate) -> Option<PixelPosition> {
        let g = &self.geometry;
        let rel_x = coord.x as i64 - g.offset_x as i64;
        let rel_y = coord.y as i64 - g.offset_y as i64;
        if rel_x < 0 || rel_y < 0 || rel_x >= g.width as i64 || rel_y >= g.height as i64 {
            return None;
        }

        let scale = g.tile_scale as i64;
        Some(PixelPosition::new(
            scale * rel_x,
            scale * (g.height as i64 - rel_y - 1),
        ))
    }

    /// Like [`to_image`](Self::to_image) but returns the (-1, -1) sentinel
    /// instead of `None`.
    pub fn to_image_or_sentinel(&self, coord: Coordinate) -> PixelPosition {
        self.to_image(coord).unwrap_or(PixelPosition::OUT_OF_BOUNDS)
    }

    /// Dataset coordinate whose block contains `pixel`, or `None` if the pixel
    /// is outside the image.
    ///
    /// Consumers that walk pixels first and look heat values up directly use
    /// this instead of the sorted tile index.
    pub fn to_dataset(&self, pixel: PixelPosition) -> Option<Coordinate> {
        let g = &self.geometry;
        let (width, height) = self.image_dimensions();
        if pixel.x < 0 || pixel.y < 0 || pixel.x >= width as i64 || pixel.y >= height as i64 {
            return None;
        }

        let scale = g.tile_scale as i64;
        let rel_x = pixel.x / scale;
        let rel_y = g.height as i64 - 1 - pixel.y / scale;
        Some(Coordinate::new(
            (rel_x + g.offset_x as i64) as i32,
            (rel_y + g.offset_y as i64) as i32,
        ))
    }
}

impl Default for WorldProjection {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_corners() {
        let proj = WorldProjection::reference();

        // Bottom-left of the world is the first block of the last block row
        let p = proj.to_image(Coordinate::new(-1152, -2496)).unwrap();
        assert_eq!(p, PixelPosition::new(0, 3 * 1663));

        // Top-left of the world is the image origin
        let p = proj.to_image(Coordinate::new(-1152, -2496 + 1663)).unwrap();
        assert_eq!(p, PixelPosition::new(0, 0));

        // Top-right
        let p = proj.to_image(Coordinate::new(-1152 + 2751, -2496 + 1663)).unwrap();
        assert_eq!(p, PixelPosition::new(3 * 2751, 0));
    }

    #[test]
    fn test_scenario_tiles() {
        let proj = WorldProjection::reference();
        assert_eq!(
            proj.to_image(Coordinate::new(-1142, -2486)),
            Some(PixelPosition::new(30, 4959))
        );
        assert_eq!(
            proj.to_image(Coordinate::new(-1140, -2486)),
            Some(PixelPosition::new(36, 4959))
        );
    }

    #[test]
    fn test_out_of_bounds_sentinel() {
        let proj = WorldProjection::reference();
        for coord in [
            Coordinate::new(-1153, -2000),
            Coordinate::new(-1152 + 2752, -2000),
            Coordinate::new(0, -2497),
            Coordinate::new(0, -2496 + 1664),
            Coordinate::new(3200, 3200),
            Coordinate::new(i32::MIN, i32::MAX),
            Coordinate::new(i32::MAX, i32::MIN),
        ] {
            assert_eq!(proj.to_image(coord), None, "{} should be out of bounds", coord);
            assert_eq!(proj.to_image_or_sentinel(coord), PixelPosition::OUT_OF_BOUNDS);
        }
    }

    #[test]
    fn test_roundtrip_every_block_origin() {
        let proj = WorldProjection::reference();
        for x in (-1152..-1152 + 2752).step_by(97) {
            for y in (-2496..-2496 + 1664).step_by(53) {
                let c = Coordinate::new(x, y);
                let p = proj.to_image(c).unwrap();
                assert_eq!(proj.to_dataset(p), Some(c));
            }
        }
    }

    #[test]
    fn test_to_dataset_whole_block() {
        let proj = WorldProjection::reference();
        let c = Coordinate::new(-1142, -2486);
        let origin = proj.to_image(c).unwrap();
        for dy in 0..3 {
            for dx in 0..3 {
                let p = PixelPosition::new(origin.x + dx, origin.y + dy);
                assert_eq!(proj.to_dataset(p), Some(c));
            }
        }
    }

    #[test]
    fn test_to_dataset_outside_image() {
        let proj = WorldProjection::reference();
        assert_eq!(proj.to_dataset(PixelPosition::new(-1, 0)), None);
        assert_eq!(proj.to_dataset(PixelPosition::new(8256, 0)), None);
        assert_eq!(proj.to_dataset(PixelPosition::new(0, 4992)), None);
    }

    #[test]
    fn test_invalid_geometry() {
        let mut g = WorldGeometry::reference();
        g.tile_scale = 0;
        assert_eq!(WorldProjection::new(g), Err(ProjectionError::ZeroTileScale));

        let mut g = WorldGeometry::reference();
        g.height = 0;
        assert!(matches!(
            WorldProjection::new(g),
            Err(ProjectionError::EmptyWorld { .. })
        ));
    }
}

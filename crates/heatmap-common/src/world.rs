//! World extent and tile scale of the reference deployment.
//!
//! These values are part of the persisted-data contract: heatmap files in
//! the wild were written against them, so they must not drift.

use serde::{Deserialize, Serialize};

use crate::Coordinate;

/// Rectangular dataset extent and the pixel block each unit expands to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldGeometry {
    /// Dataset coordinate of the world's first column.
    pub offset_x: i32,
    /// Dataset coordinate of the world's bottom row.
    pub offset_y: i32,
    /// World width in dataset units.
    pub width: u32,
    /// World height in dataset units.
    pub height: u32,
    /// Side of the square pixel block one dataset unit is drawn as.
    pub tile_scale: u32,
}

impl WorldGeometry {
    pub const WIDTH: u32 = 2752;
    pub const HEIGHT: u32 = 1664;
    pub const OFFSET_X: i32 = -1152;
    pub const OFFSET_Y: i32 = -2496;
    pub const TILE_SCALE: u32 = 3;

    /// Geometry of the reference world map (8256 x 4992 pixels).
    pub const fn reference() -> Self {
        Self {
            offset_x: Self::OFFSET_X,
            offset_y: Self::OFFSET_Y,
            width: Self::WIDTH,
            height: Self::HEIGHT,
            tile_scale: Self::TILE_SCALE,
        }
    }

    /// Image width in pixels.
    pub fn pixel_width(&self) -> u64 {
        self.width as u64 * self.tile_scale as u64
    }

    /// Image height in pixels.
    pub fn pixel_height(&self) -> u64 {
        self.height as u64 * self.tile_scale as u64
    }

    /// Whether a dataset coordinate lies inside the world extent.
    pub fn contains(&self, coord: Coordinate) -> bool {
        let dx = coord.x as i64 - self.offset_x as i64;
        let dy = coord.y as i64 - self.offset_y as i64;
        dx >= 0 && dy >= 0 && dx < self.width as i64 && dy < self.height as i64
    }

    /// Dataset coordinate of a world-relative grid cell, as used by dense
    /// grids that index from the world's corner.
    pub fn grid_to_dataset(&self, column: u32, row: u32) -> Coordinate {
        Coordinate::new(
            (self.offset_x as i64 + column as i64) as i32,
            (self.offset_y as i64 + row as i64) as i32,
        )
    }
}

impl Default for WorldGeometry {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_pixel_size() {
        let world = WorldGeometry::reference();
        assert_eq!(world.pixel_width(), 8256);
        assert_eq!(world.pixel_height(), 4992);
    }

    #[test]
    fn test_contains_is_half_open() {
        let world = WorldGeometry::reference();
        assert!(world.contains(Coordinate::new(-1152, -2496)));
        assert!(world.contains(Coordinate::new(-1152 + 2751, -2496 + 1663)));
        assert!(!world.contains(Coordinate::new(-1152 + 2752, -2496)));
        assert!(!world.contains(Coordinate::new(-1152, -2497)));
    }

    #[test]
    fn test_grid_to_dataset() {
        let world = WorldGeometry::reference();
        assert_eq!(world.grid_to_dataset(0, 0), Coordinate::new(-1152, -2496));
        assert_eq!(world.grid_to_dataset(10, 10), Coordinate::new(-1142, -2486));
    }
}

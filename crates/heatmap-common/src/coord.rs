//! Dataset coordinates, pixel positions and raster ordering.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A tile coordinate in dataset (world) space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Upper-left pixel of a tile's footprint in image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPosition {
    pub x: i64,
    pub y: i64,
}

impl PixelPosition {
    /// Sentinel returned for coordinates that fall outside the image.
    pub const OUT_OF_BOUNDS: PixelPosition = PixelPosition { x: -1, y: -1 };

    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn is_out_of_bounds(&self) -> bool {
        *self == Self::OUT_OF_BOUNDS
    }

    /// Ordering of two positions in raster (reading) order.
    pub fn raster_cmp(&self, other: &PixelPosition) -> Ordering {
        compare_raster_order(self.x, self.y, other.x, other.y)
    }
}

/// Compare two pixel positions in raster order: row first, then column.
///
/// This total order is what both the tile index sort and the chunk merge
/// rely on. Keeping them on the same function keeps them consistent.
#[inline]
pub fn compare_raster_order(x1: i64, y1: i64, x2: i64, y2: i64) -> Ordering {
    y1.cmp(&y2).then(x1.cmp(&x2))
}

/// A rectangular region of the target image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// First pixel of the region in raster order.
    pub fn top_left(&self) -> PixelPosition {
        PixelPosition::new(self.x as i64, self.y as i64)
    }

    /// Last pixel of the region in raster order (inclusive).
    pub fn bottom_right(&self) -> PixelPosition {
        PixelPosition::new(
            self.x as i64 + self.width as i64 - 1,
            self.y as i64 + self.height as i64 - 1,
        )
    }

    /// Whether the pixel lies inside the rectangle.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x as i64
            && y >= self.y as i64
            && x < self.x as i64 + self.width as i64
            && y < self.y as i64 + self.height as i64
    }

    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_order_rows_dominate() {
        assert_eq!(compare_raster_order(100, 0, 0, 1), Ordering::Less);
        assert_eq!(compare_raster_order(0, 2, 100, 1), Ordering::Greater);
        assert_eq!(compare_raster_order(3, 5, 7, 5), Ordering::Less);
        assert_eq!(compare_raster_order(7, 5, 7, 5), Ordering::Equal);
    }

    #[test]
    fn test_rect_corners() {
        let rect = PixelRect::new(24, 4959, 20, 3);
        assert_eq!(rect.top_left(), PixelPosition::new(24, 4959));
        assert_eq!(rect.bottom_right(), PixelPosition::new(43, 4961));
        assert!(rect.contains(43, 4961));
        assert!(!rect.contains(44, 4961));
        assert!(!rect.contains(24, 4962));
        assert_eq!(rect.area(), 60);
    }

    #[test]
    fn test_sentinel() {
        assert!(PixelPosition::OUT_OF_BOUNDS.is_out_of_bounds());
        assert!(!PixelPosition::new(0, 0).is_out_of_bounds());
    }
}

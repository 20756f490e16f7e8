//! Common test fixtures.

use heat_store::{Extremum, HeatStore};
use heatmap_common::{Coordinate, PixelRect, WorldGeometry};

/// Tile A of the two-tile scenario: world cell (10, 10), 10 visits.
pub const TILE_A: Coordinate = Coordinate::new(-1142, -2486);
pub const TILE_A_COUNT: i32 = 10;

/// Tile B of the two-tile scenario: world cell (12, 10), 100 visits.
pub const TILE_B: Coordinate = Coordinate::new(-1140, -2486);
pub const TILE_B_COUNT: i32 = 100;

/// A 20x3 chunk covering both scenario tiles' pixel blocks.
pub const SCENARIO_CHUNK: PixelRect = PixelRect::new(24, 4959, 20, 3);

/// Store holding tiles A and B with min 10 and max 100.
pub fn two_tile_store() -> HeatStore {
    let mut store = HeatStore::new();
    store.set(TILE_A, TILE_A_COUNT);
    store.set(TILE_B, TILE_B_COUNT);
    store.restore_aggregates(
        (TILE_A_COUNT + TILE_B_COUNT) as u64,
        Extremum::new(TILE_B_COUNT as u32, TILE_B),
        Extremum::new(TILE_A_COUNT as u32, TILE_A),
    );
    store
}

/// A small world for tests that render whole images.
///
/// 16 x 10 cells at scale 3 gives a 48 x 30 pixel image.
pub fn small_world() -> WorldGeometry {
    WorldGeometry {
        offset_x: -1152,
        offset_y: -2496,
        width: 16,
        height: 10,
        tile_scale: 3,
    }
}

//! Tests for the heat overlay pass over image chunks.

use heat_store::HeatStore;
use heatmap_common::{Coordinate, PixelPosition, PixelRect};
use projection::WorldProjection;
use renderer::hue::blend_heat;
use renderer::{
    render_in_memory, render_in_memory_parallel, HueRamp, ImageChunk, RenderConfig, RenderRun,
    StripePlan, TileOrderIndex,
};
use test_utils::{
    gradient_image, random_sparse_store, small_world, solid_image, two_tile_store,
    SCENARIO_CHUNK, TILE_A, TILE_A_COUNT, TILE_B, TILE_B_COUNT,
};

fn small_config() -> RenderConfig {
    RenderConfig {
        world: small_world(),
        ..RenderConfig::default()
    }
}

fn small_projection() -> WorldProjection {
    WorldProjection::new(small_world()).unwrap()
}

/// Render `store` over `base` with full-width stripes of `stripe_height`.
fn render_small(store: &HeatStore, base: &[u8], stripe_height: u32) -> (Vec<u8>, usize) {
    let config = small_config();
    let plan = StripePlan::from_stripe_height(48, 30, stripe_height).unwrap();
    let index = TileOrderIndex::build(store, &small_projection());
    let mut pixels = base.to_vec();
    let summary = render_in_memory(&mut pixels, &plan, index, &config).unwrap();
    assert_eq!(summary.unvisited, 0);
    (pixels, summary.tiles.painted)
}

// ============================================================================
// Hue ramp
// ============================================================================

#[test]
fn test_hue_decreases_with_count() {
    let ramp = HueRamp::reference();
    let hues: Vec<f32> = (1..=1000).map(|c| ramp.hue(c, 1, 1000)).collect();
    for (i, pair) in hues.windows(2).enumerate() {
        assert!(
            pair[0] > pair[1],
            "hue({}) = {} not above hue({}) = {}",
            i + 1,
            pair[0],
            i + 2,
            pair[1]
        );
    }
    assert!(hues.iter().all(|h| (0.0..=1.0 / 3.0 + 1e-6).contains(h)));
}

#[test]
fn test_scenario_hues() {
    let ramp = HueRamp::reference();
    let hue_a = ramp.hue(TILE_A_COUNT as u32, 10, 100);
    let hue_b = ramp.hue(TILE_B_COUNT as u32, 10, 100);
    assert_eq!(hue_b, 0.0);
    assert!(hue_a > hue_b);
    assert!(hue_a < 1.0 / 3.0);
}

// ============================================================================
// Two-tile scenario on the reference world
// ============================================================================

#[test]
fn test_scenario_tiles_map_into_chunk() {
    let proj = WorldProjection::reference();
    assert_eq!(proj.to_image(TILE_A), Some(PixelPosition::new(30, 4959)));
    assert_eq!(proj.to_image(TILE_B), Some(PixelPosition::new(36, 4959)));
}

#[test]
fn test_two_tile_scenario_paints_two_blocks() {
    let store = two_tile_store();
    let index = TileOrderIndex::build(&store, &WorldProjection::reference());
    let mut run = RenderRun::new(index, &RenderConfig::default());

    let rect = SCENARIO_CHUNK;
    let mut buf = solid_image(rect.width as usize, rect.height as usize, [0, 0, 0]);
    let mut chunk = ImageChunk::new(rect, &mut buf).unwrap();
    let stats = run.process_chunk(&mut chunk);
    assert_eq!(stats.painted, 2);
    assert_eq!(stats.pixels_written, 18);

    let ramp = HueRamp::reference();
    let color_a = blend_heat([0, 0, 0], ramp.hue(10, 10, 100), 0.65);
    let color_b = blend_heat([0, 0, 0], ramp.hue(100, 10, 100), 0.65);
    assert_ne!(color_a, color_b);
    assert_eq!(color_b, [166, 0, 0]);

    for row in 0..rect.height as usize {
        for col in 0..rect.width as usize {
            let x = rect.x as usize + col;
            let offset = (row * rect.width as usize + col) * 3;
            let pixel = [buf[offset], buf[offset + 1], buf[offset + 2]];
            let expected = match x {
                30..=32 => color_a,
                36..=38 => color_b,
                _ => [0, 0, 0],
            };
            assert_eq!(pixel, expected, "pixel ({}, {})", x, rect.y as usize + row);
        }
    }
    assert!(run.cursor().is_exhausted());
}

#[test]
fn test_scenario_chunk_keeps_base_brightness() {
    let store = two_tile_store();
    let index = TileOrderIndex::build(&store, &WorldProjection::reference());
    let mut run = RenderRun::new(index, &RenderConfig::default());

    let rect = SCENARIO_CHUNK;
    let mut buf = solid_image(rect.width as usize, rect.height as usize, [255, 255, 255]);
    let mut chunk = ImageChunk::new(rect, &mut buf).unwrap();
    run.process_chunk(&mut chunk);

    // Tile B block on a white base: full brightness red
    let offset = (36 - 24) * 3;
    assert_eq!(&buf[offset..offset + 3], &[255, 0, 0]);
    // Pixel between the blocks untouched
    let offset = (34 - 24) * 3;
    assert_eq!(&buf[offset..offset + 3], &[255, 255, 255]);
}

// ============================================================================
// Whole-image passes
// ============================================================================

#[test]
fn test_every_tile_painted_once_for_any_stripe_height() {
    let world = small_world();
    let store = random_sparse_store(42, 60, 500, &world);
    let base = gradient_image(48, 30);

    for stripe_height in [1, 2, 3, 5, 6, 10, 15, 30] {
        let (_, painted) = render_small(&store, &base, stripe_height);
        assert_eq!(painted, store.size(), "stripe height {}", stripe_height);
    }
}

#[test]
fn test_output_independent_of_stripe_height() {
    let world = small_world();
    let store = random_sparse_store(7, 80, 1000, &world);
    let base = gradient_image(48, 30);

    let (whole, _) = render_small(&store, &base, 30);
    for stripe_height in [3, 6, 15] {
        let (striped, _) = render_small(&store, &base, stripe_height);
        assert_eq!(striped, whole, "stripe height {}", stripe_height);
    }
    assert_ne!(whole, base);
}

#[test]
fn test_parallel_pass_matches_sequential() {
    let world = small_world();
    let mut store = random_sparse_store(31, 90, 800, &world);
    store.set(Coordinate::new(5000, 5000), 3);
    let base = gradient_image(48, 30);
    let config = small_config();

    for stripe_height in [1, 5, 6] {
        let plan = StripePlan::from_stripe_height(48, 30, stripe_height).unwrap();

        let mut sequential = base.clone();
        let index = TileOrderIndex::build(&store, &small_projection());
        let expected = render_in_memory(&mut sequential, &plan, index, &config).unwrap();

        let mut parallel = base.clone();
        let index = TileOrderIndex::build(&store, &small_projection());
        let summary = render_in_memory_parallel(&mut parallel, &plan, index, &config).unwrap();

        assert_eq!(parallel, sequential, "stripe height {}", stripe_height);
        assert_eq!(summary.tiles, expected.tiles);
        assert_eq!(summary.unvisited, 0);
    }
}

#[test]
fn test_empty_store_leaves_image_unchanged() {
    let base = gradient_image(48, 30);
    let (out, painted) = render_small(&HeatStore::new(), &base, 6);
    assert_eq!(painted, 0);
    assert_eq!(out, base);
}

#[test]
fn test_chunk_without_tiles_is_unchanged() {
    let world = small_world();
    let mut store = HeatStore::new();
    // Bottom world row only: pixel rows 27..30
    for column in 0..world.width {
        store.set(world.grid_to_dataset(column, 0), 1 + column as i32);
    }

    let base = gradient_image(48, 30);
    let (out, painted) = render_small(&store, &base, 3);
    assert_eq!(painted, world.width as usize);
    assert_eq!(&out[..48 * 27 * 3], &base[..48 * 27 * 3]);
    assert_ne!(&out[48 * 27 * 3..], &base[48 * 27 * 3..]);
}

#[test]
fn test_out_of_world_tiles_are_never_painted() {
    let world = small_world();
    let mut store = HeatStore::new();
    store.set(Coordinate::new(world.offset_x - 1, world.offset_y), 50);
    store.set(Coordinate::new(world.offset_x, world.offset_y + world.height as i32), 50);
    store.set(Coordinate::new(i32::MAX, i32::MIN), 50);

    let base = gradient_image(48, 30);
    let config = small_config();
    let plan = StripePlan::from_stripe_height(48, 30, 6).unwrap();
    let index = TileOrderIndex::build(&store, &small_projection());
    let mut pixels = base.clone();
    let summary = render_in_memory(&mut pixels, &plan, index, &config).unwrap();

    assert_eq!(summary.tiles.painted, 0);
    assert_eq!(summary.tiles.discarded, 3);
    assert_eq!(pixels, base);
}

#[test]
fn test_partial_chunk_sequence_leaves_rest_for_later() {
    let world = small_world();
    let store = random_sparse_store(99, 40, 20, &world);
    let index = TileOrderIndex::build(&store, &small_projection());
    let mut run = RenderRun::new(index, &small_config());

    let mut top = gradient_image(48, 15);
    let mut chunk = ImageChunk::new(PixelRect::new(0, 0, 48, 15), &mut top).unwrap();
    let first = run.process_chunk(&mut chunk);

    let mut bottom = gradient_image(48, 15);
    let mut chunk = ImageChunk::new(PixelRect::new(0, 15, 48, 15), &mut bottom).unwrap();
    let second = run.process_chunk(&mut chunk);

    assert_eq!(first.painted + second.painted, store.size());
    let summary = run.finish();
    assert_eq!(summary.chunks, 2);
    assert_eq!(summary.unvisited, 0);
}

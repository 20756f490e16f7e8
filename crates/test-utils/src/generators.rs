//! Test data generators for heat stores and base images.
//!
//! Generators are seeded so failures reproduce.

use std::path::Path;

use heat_store::HeatStore;
use heatmap_common::{Coordinate, WorldGeometry};
use image::{ImageBuffer, ImageResult, Rgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Builds a store from `steps` random single increments inside `world`.
///
/// # Example
///
/// ```
/// use heatmap_common::WorldGeometry;
/// use test_utils::random_store;
///
/// let store = random_store(7, 1000, &WorldGeometry::reference());
/// assert_eq!(store.total_steps(), 1000);
/// ```
pub fn random_store(seed: u64, steps: usize, world: &WorldGeometry) -> HeatStore {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut store = HeatStore::new();
    for _ in 0..steps {
        store.increment_one(random_coordinate(&mut rng, world));
    }
    store
}

/// Builds a store with `tiles` distinct in-world coordinates and random
/// counts in `1..=max_count`, using `set`.
pub fn random_sparse_store(
    seed: u64,
    tiles: usize,
    max_count: i32,
    world: &WorldGeometry,
) -> HeatStore {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut store = HeatStore::new();
    let capacity = world.width as usize * world.height as usize;
    let target = tiles.min(capacity);
    while store.size() < target {
        let coord = random_coordinate(&mut rng, world);
        if store.get(coord) == 0 {
            store.set(coord, rng.gen_range(1..=max_count.max(1)));
        }
    }
    store
}

/// Uniformly random coordinate inside the world extent.
pub fn random_coordinate<R: Rng>(rng: &mut R, world: &WorldGeometry) -> Coordinate {
    world.grid_to_dataset(rng.gen_range(0..world.width), rng.gen_range(0..world.height))
}

/// RGB base image with a diagonal gradient, row-major.
pub fn gradient_image(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 3);
    for row in 0..height {
        for col in 0..width {
            pixels.push((col * 255 / width.max(1)) as u8);
            pixels.push((row * 255 / height.max(1)) as u8);
            pixels.push(((col + row) % 256) as u8);
        }
    }
    pixels
}

/// RGB base image of a single color.
pub fn solid_image(width: usize, height: usize, rgb: [u8; 3]) -> Vec<u8> {
    rgb.iter()
        .copied()
        .cycle()
        .take(width * height * 3)
        .collect()
}

/// Writes an RGB buffer to `path` as a PNG.
pub fn write_rgb_png(path: &Path, width: u32, height: u32, pixels: Vec<u8>) -> ImageResult<()> {
    let img: ImageBuffer<Rgb<u8>, _> = ImageBuffer::from_raw(width, height, pixels)
        .expect("pixel buffer size must match dimensions");
    img.save(path)
}

/// Reads a PNG back as RGB8 `(width, height, pixels)`.
pub fn read_rgb_png(path: &Path) -> ImageResult<(u32, u32, Vec<u8>)> {
    let img = image::open(path)?.to_rgb8();
    let (width, height) = img.dimensions();
    Ok((width, height, img.into_raw()))
}

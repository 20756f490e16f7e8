//! Common types shared by the heat store, projection and renderer crates.

pub mod coord;
pub mod error;
pub mod world;

pub use coord::{compare_raster_order, Coordinate, PixelPosition, PixelRect};
pub use error::HeatmapError;
pub use world::WorldGeometry;

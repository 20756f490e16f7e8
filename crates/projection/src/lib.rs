//! Dataset-to-image coordinate transforms.
//!
//! The heat data lives in a world coordinate system whose y axis points up.
//! The base image is scanned top to bottom, so the transform translates by
//! the world offset, flips the vertical axis and scales every unit to a
//! square block of pixels.

pub mod world;

pub use world::{ProjectionError, WorldProjection};

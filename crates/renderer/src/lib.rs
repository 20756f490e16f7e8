//! Heat overlay rendering for large base images.
//!
//! Colours visit counts from a heat store onto an RGB image that is processed
//! in horizontal stripes, so memory use is bounded by one stripe:
//! - Hue ramp and HSB colour synthesis
//! - Raster-ordered tile index and read-once cursor
//! - Chunk colorizer
//! - Stripe planning and streaming PNG input/output

pub mod colorizer;
pub mod config;
pub mod error;
pub mod hue;
pub mod png;
pub mod run;
pub mod stripes;
pub mod tile_order;

pub use colorizer::{ImageChunk, RegionColorizer, RegionStats};
pub use config::RenderConfig;
pub use error::{RenderError, Result};
pub use hue::HueRamp;
pub use run::{
    render_in_memory, render_in_memory_parallel, render_png, RenderRun, RenderSummary,
};
pub use stripes::{StripeLayout, StripePlan};
pub use tile_order::{CountRange, TileCursor, TileEntry, TileOrderIndex};

//! Heat data storage.
//!
//! [`HeatStore`] is the sparse coordinate → visit-count map with its
//! incrementally maintained aggregates. The [`format`] module reads and
//! writes the persisted heatmap files.

pub mod error;
pub mod format;
pub mod store;

pub use error::{Result, StoreError};
pub use format::{
    load_heatmap, load_heatmap_bytes, write_heatmap, write_heatmap_to, FormatKind,
    HeatmapFormat, LoadedHeatmap, ParseOutcome,
};
pub use store::{Count, Extremum, HeatStore, MAX_COUNT};

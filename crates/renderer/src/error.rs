//! Error types for rendering.

use heatmap_common::{Coordinate, HeatmapError};
use projection::ProjectionError;
use thiserror::Error;

/// Result type alias using RenderError.
pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    /// Setup contract violated; raised before any chunk is processed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A chunk buffer could not be allocated. Aborts the current run.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("failed to decode base image: {0}")]
    Decode(String),

    #[error("failed to encode output image: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A single tile could not be painted. The colorizer logs and skips it.
    #[error("tile {coord} could not be painted: {reason}")]
    TileFault { coord: Coordinate, reason: String },
}

impl RenderError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<png::DecodingError> for RenderError {
    fn from(err: png::DecodingError) -> Self {
        match err {
            png::DecodingError::IoError(io) => RenderError::Io(io),
            other => RenderError::Decode(other.to_string()),
        }
    }
}

impl From<ProjectionError> for RenderError {
    fn from(err: ProjectionError) -> Self {
        RenderError::Configuration(err.to_string())
    }
}

impl From<RenderError> for HeatmapError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Configuration(msg) => HeatmapError::Configuration(msg),
            RenderError::ResourceExhausted(msg) => HeatmapError::ResourceExhausted(msg),
            RenderError::Decode(msg) | RenderError::Encode(msg) => HeatmapError::Image(msg),
            RenderError::Io(err) => HeatmapError::Io(err.to_string()),
            fault @ RenderError::TileFault { .. } => HeatmapError::Tile(fault.to_string()),
        }
    }
}

//! Error types for heat data persistence.

use heatmap_common::HeatmapError;
use thiserror::Error;

/// Errors that can occur while loading or saving heatmap files.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip container could not be written.
    #[error("zip archive error: {0}")]
    Zip(String),

    /// A parser recognised the file but its contents are damaged.
    #[error("{format} heatmap file is corrupt: {reason}")]
    Corrupt { format: &'static str, reason: String },

    /// No parser recognised the file.
    #[error("not a heatmap file (tried: {tried})")]
    UnrecognizedFormat { tried: String },
}

impl StoreError {
    /// Create a Corrupt error.
    pub fn corrupt(format: &'static str, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            format,
            reason: reason.into(),
        }
    }
}

impl From<zip::result::ZipError> for StoreError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Self::Io(e),
            other => Self::Zip(other.to_string()),
        }
    }
}

impl From<StoreError> for HeatmapError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io(e) => HeatmapError::Io(e.to_string()),
            StoreError::Zip(msg) => HeatmapError::Io(msg),
            other @ (StoreError::Corrupt { .. } | StoreError::UnrecognizedFormat { .. }) => {
                HeatmapError::DataParse(other.to_string())
            }
        }
    }
}

/// Result type for heat store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

//! Error taxonomy shared by the heatmap crates.

use thiserror::Error;

/// Top-level error categories.
///
/// Library crates keep their own detailed error enums and convert into this
/// one at crate boundaries where the category is all the caller needs.
#[derive(Debug, Error)]
pub enum HeatmapError {
    /// A setup-time contract was violated (e.g. image height not divisible by
    /// the stripe count). Fatal, raised before any rendering begins.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Memory could not be obtained for a chunk. Aborts the current run only.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Persisted heat data could not be parsed.
    #[error("data parse error: {0}")]
    DataParse(String),

    /// The base image could not be decoded or the output encoded.
    #[error("image error: {0}")]
    Image(String),

    /// A single tile could not be painted.
    #[error("tile fault: {0}")]
    Tile(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl HeatmapError {
    /// Create a Configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether the error only ends the current run rather than the process.
    ///
    /// Run-local errors leave the inputs intact; the same job may succeed
    /// when retried.
    pub fn is_run_local(&self) -> bool {
        matches!(self, Self::ResourceExhausted(_) | Self::Tile(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_local_categories() {
        assert!(HeatmapError::ResourceExhausted("stripe".into()).is_run_local());
        assert!(HeatmapError::Tile("(1, 2)".into()).is_run_local());
        assert!(!HeatmapError::configuration("height 7").is_run_local());
        assert!(!HeatmapError::DataParse("line 3".into()).is_run_local());
        assert!(!HeatmapError::Image("truncated".into()).is_run_local());
        assert!(!HeatmapError::Io("missing".into()).is_run_local());
    }

    #[test]
    fn test_display_names_category() {
        let err = HeatmapError::configuration("height 7 not divisible by 3");
        assert_eq!(
            err.to_string(),
            "configuration error: height 7 not divisible by 3"
        );
    }
}

//! Persisted heatmap formats.
//!
//! Two on-disk formats exist:
//! - **csv** (current): a zip archive holding one CSV file with a header
//!   line, a metadata row and one `x,y,count` line per visited tile.
//! - **legacy**: a zlib-compressed Java object stream holding a dense
//!   `int[width][height]` grid. Only read, for one-time migration.
//!
//! Loading tries each format in order. A format answers with a
//! [`ParseOutcome`]: the data, a mismatch (not this format, try the next) or
//! corruption (this format, but damaged). Mismatch is routine and only logged
//! at debug level. Corruption is reported.

pub mod csv;
pub mod legacy;

use std::fs;
use std::path::Path;
use std::time::Instant;

use heatmap_common::WorldGeometry;
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::store::HeatStore;

pub use self::csv::{write_heatmap, write_heatmap_to, CsvZipFormat};
pub use self::legacy::LegacyFormat;

/// Which on-disk format a heatmap was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Csv,
    Legacy,
}

impl FormatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Legacy => "legacy",
        }
    }
}

/// A heat store together with how it was read.
#[derive(Debug)]
pub struct LoadedHeatmap {
    pub store: HeatStore,
    pub format: FormatKind,
    /// Tile lines that could not be parsed and were skipped.
    pub parse_errors: usize,
}

/// Result of one format's attempt at parsing a file.
#[derive(Debug)]
pub enum ParseOutcome {
    Parsed(LoadedHeatmap),
    /// The bytes are not in this format.
    Mismatch,
    /// The bytes are in this format but cannot be read.
    Corrupt(String),
}

/// A persisted heatmap format that can recognise and parse raw file bytes.
pub trait HeatmapFormat {
    fn kind(&self) -> FormatKind;

    fn parse(&self, bytes: &[u8], world: &WorldGeometry) -> ParseOutcome;
}

/// Formats in the order they are attempted.
fn formats() -> [&'static dyn HeatmapFormat; 2] {
    [&LegacyFormat, &CsvZipFormat]
}

/// Load a heatmap file, trying every known format.
pub fn load_heatmap(path: impl AsRef<Path>, world: &WorldGeometry) -> Result<LoadedHeatmap> {
    let path = path.as_ref();
    info!(path = %path.display(), "Loading heatmap file");
    let bytes = fs::read(path)?;
    load_heatmap_bytes(&bytes, world)
}

/// Parse heatmap bytes, trying every known format.
pub fn load_heatmap_bytes(bytes: &[u8], world: &WorldGeometry) -> Result<LoadedHeatmap> {
    let mut corrupt: Option<StoreError> = None;

    for format in formats() {
        let name = format.kind().as_str();
        let start = Instant::now();

        match format.parse(bytes, world) {
            ParseOutcome::Parsed(loaded) => {
                if loaded.parse_errors > 0 {
                    warn!(
                        format = name,
                        errors = loaded.parse_errors,
                        "Skipped malformed tile lines during heatmap read"
                    );
                }
                info!(
                    format = name,
                    tiles = loaded.store.size(),
                    total_steps = loaded.store.total_steps(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Heatmap loaded"
                );
                return Ok(loaded);
            }
            ParseOutcome::Mismatch => {
                debug!(format = name, "Not this heatmap format, trying next");
            }
            ParseOutcome::Corrupt(reason) => {
                warn!(format = name, reason = %reason, "Heatmap file is corrupt");
                corrupt.get_or_insert(StoreError::corrupt(name, reason));
            }
        }
    }

    Err(corrupt.unwrap_or_else(|| StoreError::UnrecognizedFormat {
        tried: formats()
            .iter()
            .map(|f| f.kind().as_str())
            .collect::<Vec<_>>()
            .join(", "),
    }))
}

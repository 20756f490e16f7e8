//! Current heatmap format: a zip archive containing one CSV file.
//!
//! ```text
//! userID,heatmapVersion,stepCount,maxVal,maxValX,maxValY,minVal,minValX,minValY
//! 123456,100,110,100,-1140,-2486,10,-1142,-2486
//! -1142,-2486,10
//! -1140,-2486,100
//! ...
//! ```
//!
//! A blank first metadata field means no metadata was written; the
//! aggregates are then rebuilt from the tile lines.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, Seek, Write};
use std::path::Path;

use heatmap_common::{Coordinate, WorldGeometry};
use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::{FormatKind, HeatmapFormat, LoadedHeatmap, ParseOutcome};
use crate::error::Result;
use crate::store::{Count, Extremum, HeatStore};

/// Column names of the metadata row.
pub const HEADER: &str =
    "userID,heatmapVersion,stepCount,maxVal,maxValX,maxValY,minVal,minValX,minValY";

/// Value written to the `heatmapVersion` column.
pub const HEATMAP_VERSION: i64 = 100;

/// Name of the CSV entry inside the archive.
pub const ENTRY_NAME: &str = "heatmap.csv";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Reader for the zip-compressed CSV format.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvZipFormat;

impl HeatmapFormat for CsvZipFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Csv
    }

    fn parse(&self, bytes: &[u8], _world: &WorldGeometry) -> ParseOutcome {
        if !bytes.starts_with(ZIP_MAGIC) {
            return ParseOutcome::Mismatch;
        }

        let mut archive = match ZipArchive::new(Cursor::new(bytes)) {
            Ok(archive) => archive,
            Err(e) => return ParseOutcome::Corrupt(format!("unreadable zip archive: {e}")),
        };
        if archive.len() == 0 {
            return ParseOutcome::Corrupt("zip archive has no entries".to_string());
        }
        let entry = match archive.by_index(0) {
            Ok(entry) => entry,
            Err(e) => return ParseOutcome::Corrupt(format!("unreadable zip entry: {e}")),
        };

        match read_csv(BufReader::new(entry)) {
            Ok(loaded) => ParseOutcome::Parsed(loaded),
            Err(reason) => ParseOutcome::Corrupt(reason),
        }
    }
}

/// Metadata row contents.
#[derive(Debug, PartialEq, Eq)]
struct Metadata {
    player_id: Option<i64>,
    aggregates: Option<(u64, Extremum, Extremum)>,
}

fn parse_metadata(line: &str) -> std::result::Result<Metadata, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.first().map_or(true, |f| f.is_empty()) {
        return Ok(Metadata {
            player_id: None,
            aggregates: None,
        });
    }
    if fields.len() < 9 {
        return Err(format!("metadata row has {} fields, expected 9", fields.len()));
    }

    let int = |idx: usize| -> std::result::Result<i64, String> {
        fields[idx]
            .parse::<i64>()
            .map_err(|_| format!("metadata field {} is not a number: '{}'", idx, fields[idx]))
    };

    let player = int(0)?;
    let step_count = int(2)?;
    let (max_val, max_x, max_y) = (int(3)?, int(4)?, int(5)?);
    let (min_val, min_x, min_y) = (int(6)?, int(7)?, int(8)?);

    let extremum = |value: i64, x: i64, y: i64| -> Option<Extremum> {
        let value = Count::try_from(value).ok()?;
        let x = i32::try_from(x).ok()?;
        let y = i32::try_from(y).ok()?;
        Some(Extremum::new(value, Coordinate::new(x, y)))
    };

    // Negative aggregates were written by stores that never had metadata
    let aggregates = match (
        u64::try_from(step_count).ok(),
        extremum(max_val, max_x, max_y),
        extremum(min_val, min_x, min_y),
    ) {
        (Some(total), Some(max), Some(min)) => Some((total, max, min)),
        _ => None,
    };

    Ok(Metadata {
        player_id: (player != -1).then_some(player),
        aggregates,
    })
}

/// Parse one `x,y,count` line. Coordinates are 16-bit in the file format.
fn parse_tile_line(line: &str) -> Option<(Coordinate, Count)> {
    let mut fields = line.split(',').map(str::trim);
    let x: i16 = fields.next()?.parse().ok()?;
    let y: i16 = fields.next()?.parse().ok()?;
    let count: i32 = fields.next()?.parse().ok()?;
    let count = Count::try_from(count).ok()?;
    Some((Coordinate::new(x as i32, y as i32), count))
}

fn read_csv<R: BufRead>(reader: R) -> std::result::Result<LoadedHeatmap, String> {
    let mut lines = reader.lines();
    let mut next_line = |what: &str| -> std::result::Result<String, String> {
        match lines.next() {
            Some(Ok(line)) => Ok(line),
            Some(Err(e)) => Err(format!("failed to read {what}: {e}")),
            None => Err(format!("missing {what}")),
        }
    };

    next_line("header line")?;
    let metadata = parse_metadata(&next_line("metadata row")?)?;

    let mut store = HeatStore::new();
    let mut parse_errors = 0usize;

    for line in lines {
        let line = line.map_err(|e| format!("failed to read tile line: {e}"))?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_tile_line(&line) {
            Some((coord, count)) => store.set_fast(coord, count),
            None => parse_errors += 1,
        }
    }

    store.set_player_id(metadata.player_id);
    match metadata.aggregates {
        Some((total, max, min)) => store.restore_aggregates(total, max, min),
        None => store.recompute_aggregates(),
    }

    Ok(LoadedHeatmap {
        store,
        format: FormatKind::Csv,
        parse_errors,
    })
}

/// Write `store` in the current format to any seekable writer.
pub fn write_heatmap_to<W: Write + Seek>(store: &HeatStore, writer: W) -> Result<W> {
    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(ENTRY_NAME, options)?;

    let max = store.max();
    let min = store.min();
    writeln!(zip, "{HEADER}")?;
    writeln!(
        zip,
        "{},{},{},{},{},{},{},{},{}",
        store.player_id().unwrap_or(-1),
        HEATMAP_VERSION,
        store.total_steps(),
        max.value,
        max.coord.x,
        max.coord.y,
        min.value,
        min.coord.x,
        min.coord.y,
    )?;

    // Sorted so identical stores produce identical files
    let mut tiles: Vec<_> = store.iter().filter(|(_, count)| *count > 0).collect();
    tiles.sort_unstable_by_key(|(coord, _)| *coord);
    for (coord, count) in &tiles {
        writeln!(zip, "{},{},{}", coord.x, coord.y, count)?;
    }

    Ok(zip.finish()?)
}

/// Write `store` in the current format to `path`.
pub fn write_heatmap(store: &HeatStore, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = write_heatmap_to(store, BufWriter::new(file))?;
    writer.flush()?;
    info!(path = %path.display(), tiles = store.size(), "Heatmap written");
    Ok(())
}

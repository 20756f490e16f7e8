//! Legacy heatmap format, read only for migration.
//!
//! Old heatmap files are a zlib stream wrapping a Java object stream whose
//! payload is a dense `int[width][height]` grid indexed from the world's
//! corner. The reader does not interpret the object graph. It locates the
//! first `int[]` array record and then reads consecutive `int[]` records
//! (one per grid column) that reference the same class descriptor.

use std::io::Read;
use std::time::Instant;

use flate2::read::ZlibDecoder;
use heatmap_common::WorldGeometry;
use tracing::info;

use super::{FormatKind, HeatmapFormat, LoadedHeatmap, ParseOutcome};
use crate::store::HeatStore;

/// Object stream magic and version.
pub const STREAM_MAGIC: [u8; 4] = [0xAC, 0xED, 0x00, 0x05];

pub const TC_NULL: u8 = 0x70;
pub const TC_REFERENCE: u8 = 0x71;
pub const TC_CLASSDESC: u8 = 0x72;
pub const TC_ENDBLOCKDATA: u8 = 0x78;
pub const TC_ARRAY: u8 = 0x75;

/// Class descriptor record that opens the first `int[]` array.
const INT_ARRAY_DESC: [u8; 6] = [TC_ARRAY, TC_CLASSDESC, 0x00, 0x02, b'[', b'I'];

/// Reader for the legacy serialized grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyFormat;

impl HeatmapFormat for LegacyFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Legacy
    }

    fn parse(&self, bytes: &[u8], world: &WorldGeometry) -> ParseOutcome {
        let mut stream = Vec::new();
        if ZlibDecoder::new(bytes).read_to_end(&mut stream).is_err() {
            return ParseOutcome::Mismatch;
        }
        if !stream.starts_with(&STREAM_MAGIC) {
            return ParseOutcome::Mismatch;
        }

        info!("Converting legacy heatmap file to the current format");
        let start = Instant::now();
        let columns = match read_grid(&stream, world.width as usize, world.height as usize) {
            Ok(columns) => columns,
            Err(reason) => return ParseOutcome::Corrupt(reason),
        };

        let mut store = HeatStore::new();
        for (column, values) in columns.iter().enumerate() {
            for (row, value) in values.iter().enumerate() {
                if *value != 0 {
                    store.set(world.grid_to_dataset(column as u32, row as u32), *value);
                }
            }
        }
        info!(
            tiles = store.size(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Finished converting legacy heatmap"
        );

        ParseOutcome::Parsed(LoadedHeatmap {
            store,
            format: FormatKind::Legacy,
            parse_errors: 0,
        })
    }
}

/// Big-endian reader over the object stream.
struct StreamReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> StreamReader<'a> {
    fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], String> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| format!("stream truncated at byte {}", self.pos))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, String> {
        Ok(self.take(1)?[0])
    }

    fn expect(&mut self, tag: u8, what: &str) -> Result<(), String> {
        let found = self.u8()?;
        if found != tag {
            return Err(format!(
                "expected {what} (0x{tag:02x}) at byte {}, found 0x{found:02x}",
                self.pos - 1
            ));
        }
        Ok(())
    }

    fn u16(&mut self) -> Result<u16, String> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn i32(&mut self) -> Result<i32, String> {
        let b = self.take(4)?;
        Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Length-prefixed `int` array body.
    fn int_array(&mut self, expected_len: usize) -> Result<Vec<i32>, String> {
        let len = self.i32()?;
        if len < 0 || len as usize != expected_len {
            return Err(format!("grid column has {len} rows, expected {expected_len}"));
        }
        (0..expected_len).map(|_| self.i32()).collect()
    }
}

/// Extract the `width` columns of `height` values each.
fn read_grid(stream: &[u8], width: usize, height: usize) -> Result<Vec<Vec<i32>>, String> {
    let start = stream
        .windows(INT_ARRAY_DESC.len())
        .position(|w| w == INT_ARRAY_DESC)
        .ok_or_else(|| "object stream contains no int[] grid".to_string())?;

    let mut reader = StreamReader::new(stream, start + INT_ARRAY_DESC.len());
    reader.take(8)?; // serialVersionUID
    reader.u8()?; // class flags
    let fields = reader.u16()?;
    if fields != 0 {
        return Err(format!("int[] descriptor declares {fields} fields"));
    }
    reader.expect(TC_ENDBLOCKDATA, "end of class annotations")?;
    reader.expect(TC_NULL, "null superclass")?;

    let mut columns = Vec::with_capacity(width);
    columns.push(reader.int_array(height)?);

    while columns.len() < width {
        reader.expect(TC_ARRAY, "next grid column")?;
        reader.expect(TC_REFERENCE, "int[] class reference")?;
        reader.take(4)?; // handle
        columns.push(reader.int_array(height)?);
    }

    Ok(columns)
}

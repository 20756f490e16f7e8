//! Encoders producing legacy heatmap files for migration tests.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

const MAGIC: [u8; 4] = [0xAC, 0xED, 0x00, 0x05];

/// Zlib-wrapped object stream with an arbitrary payload after the magic.
pub fn legacy_object_stream(payload: &[u8]) -> Vec<u8> {
    let mut raw = MAGIC.to_vec();
    raw.extend_from_slice(payload);
    deflate(&raw)
}

/// Encodes `grid[column][row]` the way the old heatmap class serialized its
/// dense `int[][]` field.
pub fn encode_legacy_grid(grid: &[Vec<i32>]) -> Vec<u8> {
    let mut raw = MAGIC.to_vec();

    // Enclosing object and the outer int[][] array descriptor
    raw.extend_from_slice(&[0x73, 0x72, 0x00, 0x07]);
    raw.extend_from_slice(b"Heatmap");
    raw.extend_from_slice(&[0; 8]);
    raw.extend_from_slice(&[0x02, 0x00, 0x00, 0x78, 0x70]);
    raw.extend_from_slice(&[0x75, 0x72, 0x00, 0x03]);
    raw.extend_from_slice(b"[[I");
    raw.extend_from_slice(&[0x17, 0xF7, 0xE4, 0x4F, 0x19, 0x8F, 0x89, 0x3C]);
    raw.extend_from_slice(&[0x02, 0x00, 0x00, 0x78, 0x70]);
    raw.extend_from_slice(&(grid.len() as i32).to_be_bytes());

    for (i, column) in grid.iter().enumerate() {
        raw.push(0x75);
        if i == 0 {
            raw.extend_from_slice(&[0x72, 0x00, 0x02]);
            raw.extend_from_slice(b"[I");
            raw.extend_from_slice(&[0x4D, 0xBA, 0x60, 0x26, 0x76, 0xEA, 0xB2, 0xA5]);
            raw.extend_from_slice(&[0x02, 0x00, 0x00, 0x78, 0x70]);
        } else {
            raw.extend_from_slice(&[0x71, 0x00, 0x7E, 0x00, 0x03]);
        }
        raw.extend_from_slice(&(column.len() as i32).to_be_bytes());
        for value in column {
            raw.extend_from_slice(&value.to_be_bytes());
        }
    }

    deflate(&raw)
}

fn deflate(raw: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(raw).expect("writing to a Vec cannot fail");
    encoder.finish().expect("writing to a Vec cannot fail")
}

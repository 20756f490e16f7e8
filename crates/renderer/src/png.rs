//! Streaming PNG input and output, a stripe of rows at a time.
//!
//! The reference base image is 8256 x 4992 RGB, about 120 MB decoded, so
//! neither side ever holds the whole image:
//! - [`PngStripeReader`] decodes rows on demand and normalizes every PNG
//!   colour type to 8-bit RGB.
//! - [`PngStripeWriter`] filters and deflates rows as they arrive and emits
//!   IDAT chunks whenever enough compressed data has accumulated.

use std::io::{Read, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;
use png::{ColorType, Transformations};

use crate::colorizer::CHANNELS;
use crate::error::{RenderError, Result};

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Compressed bytes buffered before an IDAT chunk is flushed.
const IDAT_CHUNK_SIZE: usize = 256 * 1024;

/// Row-at-a-time RGB decoder for a base image.
pub struct PngStripeReader<R: Read> {
    reader: png::Reader<R>,
    color_type: ColorType,
    width: u32,
    height: u32,
    rows_read: u32,
}

impl<R: Read> PngStripeReader<R> {
    /// Read the PNG header from `source`.
    ///
    /// Interlaced images are rejected since their rows do not arrive in
    /// raster order.
    pub fn new(source: R) -> Result<Self> {
        let mut decoder = png::Decoder::new(source);
        decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
        let reader = decoder.read_info()?;

        let info = reader.info();
        if info.interlaced {
            return Err(RenderError::Decode(
                "interlaced base images are not supported".to_string(),
            ));
        }
        let (width, height) = (info.width, info.height);
        let (color_type, _) = reader.output_color_type();

        Ok(Self {
            reader,
            color_type,
            width,
            height,
            rows_read: 0,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn rows_read(&self) -> u32 {
        self.rows_read
    }

    /// Decode the next `out.len() / (width * 3)` rows into `out` as RGB.
    pub fn read_rows(&mut self, out: &mut [u8]) -> Result<()> {
        let row_bytes = self.width as usize * CHANNELS;
        if row_bytes == 0 || out.len() % row_bytes != 0 {
            return Err(RenderError::configuration(format!(
                "buffer of {} bytes is not a whole number of {}-byte rows",
                out.len(),
                row_bytes
            )));
        }

        for dest in out.chunks_exact_mut(row_bytes) {
            let row = self.reader.next_row()?.ok_or_else(|| {
                RenderError::Decode(format!(
                    "image ended after {} of {} rows",
                    self.rows_read, self.height
                ))
            })?;
            to_rgb(self.color_type, row.data(), dest)?;
            self.rows_read += 1;
        }
        Ok(())
    }
}

/// Convert one decoded 8-bit row to RGB.
fn to_rgb(color_type: ColorType, src: &[u8], dest: &mut [u8]) -> Result<()> {
    let stride = match color_type {
        ColorType::Rgb => 3,
        ColorType::Rgba => 4,
        ColorType::Grayscale => 1,
        ColorType::GrayscaleAlpha => 2,
        ColorType::Indexed => {
            return Err(RenderError::Decode(
                "palette was not expanded to RGB".to_string(),
            ))
        }
    };
    let pixels = dest.len() / CHANNELS;
    if src.len() < pixels * stride {
        return Err(RenderError::Decode(format!(
            "row has {} bytes, expected {}",
            src.len(),
            pixels * stride
        )));
    }

    for (rgb, px) in dest.chunks_exact_mut(CHANNELS).zip(src.chunks_exact(stride)) {
        if stride >= 3 {
            rgb.copy_from_slice(&px[..3]);
        } else {
            rgb.fill(px[0]);
        }
    }
    Ok(())
}

/// Incremental RGB PNG encoder.
///
/// Rows are written unfiltered. [`finish`](Self::finish) must be called once
/// all `height` rows are in; it writes the trailing IDAT and IEND chunks.
pub struct PngStripeWriter<W: Write> {
    out: W,
    encoder: ZlibEncoder<Vec<u8>>,
    width: u32,
    height: u32,
    rows_written: u32,
}

impl<W: Write> PngStripeWriter<W> {
    /// Write the signature and IHDR chunk for an 8-bit RGB image.
    pub fn new(mut out: W, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::Encode(format!(
                "image must be non-empty, got {}x{}",
                width, height
            )));
        }

        out.write_all(&PNG_SIGNATURE)?;

        let mut ihdr = Vec::with_capacity(13);
        ihdr.extend_from_slice(&width.to_be_bytes());
        ihdr.extend_from_slice(&height.to_be_bytes());
        ihdr.push(8); // bit depth
        ihdr.push(2); // color type (RGB)
        ihdr.push(0); // compression method
        ihdr.push(0); // filter method
        ihdr.push(0); // interlace method
        write_chunk(&mut out, b"IHDR", &ihdr)?;

        Ok(Self {
            out,
            encoder: ZlibEncoder::new(Vec::with_capacity(IDAT_CHUNK_SIZE), Compression::fast()),
            width,
            height,
            rows_written: 0,
        })
    }

    pub fn rows_written(&self) -> u32 {
        self.rows_written
    }

    /// Append whole RGB rows.
    pub fn write_rows(&mut self, pixels: &[u8]) -> Result<()> {
        let row_bytes = self.width as usize * CHANNELS;
        if pixels.len() % row_bytes != 0 {
            return Err(RenderError::Encode(format!(
                "buffer of {} bytes is not a whole number of {}-byte rows",
                pixels.len(),
                row_bytes
            )));
        }
        let rows = (pixels.len() / row_bytes) as u32;
        if self.rows_written + rows > self.height {
            return Err(RenderError::Encode(format!(
                "{} rows would exceed image height {}",
                self.rows_written + rows,
                self.height
            )));
        }

        for row in pixels.chunks_exact(row_bytes) {
            self.encoder.write_all(&[0])?; // filter type: none
            self.encoder.write_all(row)?;
        }
        self.rows_written += rows;

        if self.encoder.get_ref().len() >= IDAT_CHUNK_SIZE {
            self.flush_idat()?;
        }
        Ok(())
    }

    fn flush_idat(&mut self) -> Result<()> {
        let compressed = self.encoder.get_mut();
        if !compressed.is_empty() {
            write_chunk(&mut self.out, b"IDAT", compressed)?;
            compressed.clear();
        }
        Ok(())
    }

    /// Finish the zlib stream, write IEND and return the sink.
    pub fn finish(mut self) -> Result<W> {
        if self.rows_written != self.height {
            return Err(RenderError::Encode(format!(
                "only {} of {} rows were written",
                self.rows_written, self.height
            )));
        }

        self.encoder.try_finish()?;
        self.flush_idat()?;
        write_chunk(&mut self.out, b"IEND", &[])?;
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Write a PNG chunk
fn write_chunk<W: Write>(out: &mut W, chunk_type: &[u8; 4], data: &[u8]) -> Result<()> {
    out.write_all(&(data.len() as u32).to_be_bytes())?;
    out.write_all(chunk_type)?;
    out.write_all(data)?;

    let mut crc = crc32fast::Hasher::new();
    crc.update(chunk_type);
    crc.update(data);
    out.write_all(&crc.finalize().to_be_bytes())?;
    Ok(())
}

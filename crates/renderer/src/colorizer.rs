//! Paints heat tiles onto one image chunk at a time.
//!
//! A chunk is a rectangle of the target image with its RGB pixels in a
//! caller-owned buffer. [`RegionColorizer::colorize`] merges the chunk with a
//! [`TileCursor`]: tiles are consumed in raster order until the next one lies
//! past the chunk's last pixel, which stays in the cursor for the following
//! chunk.
//!
//! A tile's N x N block may straddle a chunk boundary. The chunk that sees
//! the block's upper-left pixel paints whatever part of the block it holds
//! and clips the rest.

use std::cmp::Ordering;
use std::ops::{Add, AddAssign};

use heatmap_common::PixelRect;
use tracing::{debug, warn};

use crate::error::{RenderError, Result};
use crate::hue::{blend_heat, HueRamp};
use crate::tile_order::{CountRange, TileCursor, TileEntry};

/// Bytes per RGB pixel.
pub const CHANNELS: usize = 3;

/// Mutable view of one rectangular region of the target image.
#[derive(Debug)]
pub struct ImageChunk<'a> {
    rect: PixelRect,
    pixels: &'a mut [u8],
}

impl<'a> ImageChunk<'a> {
    /// Wrap a row-major RGB buffer covering `rect`.
    pub fn new(rect: PixelRect, pixels: &'a mut [u8]) -> Result<Self> {
        let expected = rect.area() * CHANNELS;
        if pixels.len() != expected {
            return Err(RenderError::configuration(format!(
                "chunk {} needs {} bytes, buffer has {}",
                rect,
                expected,
                pixels.len()
            )));
        }
        Ok(Self { rect, pixels })
    }

    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    pub fn pixels(&self) -> &[u8] {
        &*self.pixels
    }

    /// RGB bytes of the pixel at absolute image position `(x, y)`.
    pub fn pixel_mut(&mut self, x: i64, y: i64) -> Option<&mut [u8]> {
        if !self.rect.contains(x, y) {
            return None;
        }
        let col = (x - self.rect.x as i64) as usize;
        let row = (y - self.rect.y as i64) as usize;
        let start = (row * self.rect.width as usize + col) * CHANNELS;
        self.pixels.get_mut(start..start + CHANNELS)
    }
}

/// Per-chunk tally of what happened to the tiles the chunk examined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionStats {
    pub examined: usize,
    pub painted: usize,
    pub discarded: usize,
    pub faults: usize,
    pub pixels_written: usize,
}

impl Add for RegionStats {
    type Output = RegionStats;

    fn add(self, other: RegionStats) -> RegionStats {
        RegionStats {
            examined: self.examined + other.examined,
            painted: self.painted + other.painted,
            discarded: self.discarded + other.discarded,
            faults: self.faults + other.faults,
            pixels_written: self.pixels_written + other.pixels_written,
        }
    }
}

impl AddAssign for RegionStats {
    fn add_assign(&mut self, other: RegionStats) {
        *self = *self + other;
    }
}

/// Overlays heat colours on image chunks.
#[derive(Debug, Clone, Copy)]
pub struct RegionColorizer {
    ramp: HueRamp,
    transparency: f32,
    tile_scale: u32,
    range: CountRange,
}

impl RegionColorizer {
    pub fn new(ramp: HueRamp, transparency: f32, tile_scale: u32, range: CountRange) -> Self {
        Self {
            ramp,
            transparency,
            tile_scale,
            range,
        }
    }

    /// Paint every tile from `cursor` whose block starts inside `chunk`.
    ///
    /// Chunks must be passed in raster order of their top-left corners and
    /// must span the full image width for every tile to be seen. Tiles sorted
    /// before the chunk, out of bounds, or with a zero count are consumed
    /// without painting.
    pub fn colorize(&self, cursor: &mut TileCursor, chunk: &mut ImageChunk<'_>) -> RegionStats {
        let mut stats = RegionStats::default();
        let rect = chunk.rect();
        if rect.is_empty() {
            return stats;
        }
        let top_left = rect.top_left();
        let bottom_right = rect.bottom_right();

        while let Some(entry) = cursor.peek().copied() {
            if entry.pixel.raster_cmp(&bottom_right) == Ordering::Greater {
                break;
            }
            stats.examined += 1;

            if entry.pixel.is_out_of_bounds()
                || entry.pixel.raster_cmp(&top_left) == Ordering::Less
                || entry.count == 0
            {
                stats.discarded += 1;
                cursor.advance();
                continue;
            }

            match self.paint_tile(&entry, chunk) {
                Ok(written) => {
                    stats.painted += 1;
                    stats.pixels_written += written;
                }
                Err(e) => {
                    warn!(coord = %entry.coord, error = %e, "Skipping tile");
                    stats.faults += 1;
                }
            }
            cursor.advance();
        }

        debug!(
            chunk = %rect,
            examined = stats.examined,
            painted = stats.painted,
            discarded = stats.discarded,
            "Colorized chunk"
        );
        stats
    }

    /// Paint the part of the tile's block that falls inside `chunk`.
    fn paint_tile(&self, entry: &TileEntry, chunk: &mut ImageChunk<'_>) -> Result<usize> {
        let hue = self.ramp.hue(entry.count, self.range.min, self.range.max);
        if !hue.is_finite() {
            return Err(RenderError::TileFault {
                coord: entry.coord,
                reason: format!("hue for count {} is not finite", entry.count),
            });
        }

        let scale = self.tile_scale as i64;
        let mut written = 0;
        for dy in 0..scale {
            for dx in 0..scale {
                let Some(rgb) = chunk.pixel_mut(entry.pixel.x + dx, entry.pixel.y + dy) else {
                    continue;
                };
                let heat = blend_heat([rgb[0], rgb[1], rgb[2]], hue, self.transparency);
                rgb.copy_from_slice(&heat);
                written += 1;
            }
        }
        Ok(written)
    }
}

//! Drives one rendering pass over a sequence of chunks.
//!
//! A [`RenderRun`] owns the tile cursor for the pass and feeds chunks to the
//! colorizer in the order they arrive. [`render_png`] wires it to the
//! streaming PNG reader and writer; [`render_in_memory`] does the same for a
//! buffer that already holds the whole image.
//!
//! [`render_in_memory_parallel`] splits the tile index at stripe boundaries
//! up front and colorizes stripes concurrently, each with its own cursor.

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{error, info, warn};

use crate::colorizer::{ImageChunk, RegionColorizer, RegionStats};
use crate::config::RenderConfig;
use crate::error::{RenderError, Result};
use crate::png::{PngStripeReader, PngStripeWriter};
use crate::stripes::StripePlan;
use crate::tile_order::{TileCursor, TileOrderIndex};

/// Totals for a finished pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub chunks: usize,
    pub tiles: RegionStats,
    /// Tiles still in the cursor when the pass ended. Non-zero when the
    /// chunks did not cover the whole image.
    pub unvisited: usize,
    pub elapsed: Duration,
}

/// State of one pass: the colorizer and the cursor it consumes.
#[derive(Debug)]
pub struct RenderRun {
    colorizer: RegionColorizer,
    cursor: TileCursor,
    summary: RenderSummary,
    started: Instant,
}

impl RenderRun {
    pub fn new(index: TileOrderIndex, config: &RenderConfig) -> Self {
        let colorizer = RegionColorizer::new(
            config.ramp(),
            config.transparency,
            index.tile_scale(),
            index.range(),
        );
        Self {
            colorizer,
            cursor: index.into_cursor(),
            summary: RenderSummary::default(),
            started: Instant::now(),
        }
    }

    pub fn cursor(&self) -> &TileCursor {
        &self.cursor
    }

    /// Colorize the next chunk in raster order.
    pub fn process_chunk(&mut self, chunk: &mut ImageChunk<'_>) -> RegionStats {
        let start = Instant::now();
        let stats = self.colorizer.colorize(&mut self.cursor, chunk);
        self.summary.chunks += 1;
        self.summary.tiles += stats;

        info!(
            chunk = %chunk.rect(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            examined = stats.examined,
            painted = stats.painted,
            "Finished chunk"
        );
        stats
    }

    pub fn finish(self) -> RenderSummary {
        let summary = RenderSummary {
            unvisited: self.cursor.remaining(),
            elapsed: self.started.elapsed(),
            ..self.summary
        };
        info!(
            chunks = summary.chunks,
            painted = summary.tiles.painted,
            discarded = summary.tiles.discarded,
            faults = summary.tiles.faults,
            unvisited = summary.unvisited,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Render pass complete"
        );
        if summary.unvisited > 0 {
            warn!(unvisited = summary.unvisited, "Tiles left unpainted");
        }
        summary
    }
}

/// Zeroed buffer for one stripe, or `ResourceExhausted` if it cannot be had.
pub fn allocate_stripe(bytes: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(bytes).map_err(|e| {
        error!(bytes = bytes, "Stripe allocation failed, aborting run");
        RenderError::ResourceExhausted(format!("stripe buffer of {} bytes: {}", bytes, e))
    })?;
    buf.resize(bytes, 0);
    Ok(buf)
}

/// Overlay `index` on the PNG read from `source` and stream the result to
/// `sink`, one stripe at a time.
pub fn render_png<R: Read, W: Write>(
    source: R,
    sink: W,
    index: TileOrderIndex,
    config: &RenderConfig,
) -> Result<(W, RenderSummary)> {
    let mut reader = PngStripeReader::new(source)?;
    let (width, height) = reader.dimensions();
    let plan = config.stripe_layout().plan(width, height)?;
    if plan.stripe_height() % index.tile_scale() != 0 {
        warn!(
            stripe_height = plan.stripe_height(),
            tile_scale = index.tile_scale(),
            "Stripe height is not a multiple of the tile scale, blocks crossing stripes are clipped"
        );
    }

    let expected = (config.world.pixel_width(), config.world.pixel_height());
    if expected != (width as u64, height as u64) {
        warn!(
            width = width,
            height = height,
            expected_width = expected.0,
            expected_height = expected.1,
            "Base image does not match world extent"
        );
    }
    info!(
        width = width,
        height = height,
        stripes = plan.stripe_count(),
        tiles = index.len(),
        "Starting render"
    );

    let mut buf = allocate_stripe(plan.stripe_bytes())?;
    let mut writer = PngStripeWriter::new(sink, width, height)?;
    let mut run = RenderRun::new(index, config);

    for rect in plan.stripes() {
        reader.read_rows(&mut buf)?;
        let mut chunk = ImageChunk::new(rect, &mut buf)?;
        run.process_chunk(&mut chunk);
        writer.write_rows(&buf)?;
    }

    let sink = writer.finish()?;
    Ok((sink, run.finish()))
}

/// Overlay `index` on an RGB image already in memory, stripe by stripe.
pub fn render_in_memory(
    pixels: &mut [u8],
    plan: &StripePlan,
    index: TileOrderIndex,
    config: &RenderConfig,
) -> Result<RenderSummary> {
    let expected = plan.stripe_bytes() * plan.stripe_count() as usize;
    if pixels.len() != expected {
        return Err(RenderError::configuration(format!(
            "image buffer has {} bytes, plan needs {}",
            pixels.len(),
            expected
        )));
    }

    let mut run = RenderRun::new(index, config);
    for (rect, stripe) in plan.stripes().zip(pixels.chunks_mut(plan.stripe_bytes())) {
        let mut chunk = ImageChunk::new(rect, stripe)?;
        run.process_chunk(&mut chunk);
    }
    Ok(run.finish())
}

/// Like [`render_in_memory`] but colorizes stripes on the rayon pool.
pub fn render_in_memory_parallel(
    pixels: &mut [u8],
    plan: &StripePlan,
    index: TileOrderIndex,
    config: &RenderConfig,
) -> Result<RenderSummary> {
    let expected = plan.stripe_bytes() * plan.stripe_count() as usize;
    if pixels.len() != expected {
        return Err(RenderError::configuration(format!(
            "image buffer has {} bytes, plan needs {}",
            pixels.len(),
            expected
        )));
    }

    let started = Instant::now();
    let colorizer = RegionColorizer::new(
        config.ramp(),
        config.transparency,
        index.tile_scale(),
        index.range(),
    );
    let total = index.len();
    let rects: Vec<_> = plan.stripes().collect();
    let cursors = index.partition(plan);

    let per_stripe: Vec<(RegionStats, usize)> = pixels
        .par_chunks_mut(plan.stripe_bytes())
        .zip(rects.into_par_iter())
        .zip(cursors.into_par_iter())
        .map(|((stripe, rect), mut cursor)| -> Result<(RegionStats, usize)> {
            let mut chunk = ImageChunk::new(rect, stripe)?;
            let stats = colorizer.colorize(&mut cursor, &mut chunk);
            Ok((stats, cursor.consumed()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut summary = RenderSummary {
        chunks: per_stripe.len(),
        ..RenderSummary::default()
    };
    let mut consumed = 0;
    for (stats, used) in per_stripe {
        summary.tiles += stats;
        consumed += used;
    }
    summary.unvisited = total - consumed;
    summary.elapsed = started.elapsed();

    info!(
        chunks = summary.chunks,
        painted = summary.tiles.painted,
        unvisited = summary.unvisited,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "Parallel render pass complete"
    );
    Ok(summary)
}

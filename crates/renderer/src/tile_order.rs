//! Raster-ordered snapshot of a heat store.
//!
//! The colorizer walks image chunks top to bottom and needs the tiles in the
//! same order. [`TileOrderIndex::build`] maps every stored coordinate once,
//! sorts by pixel position, and hands out a [`TileCursor`] that the caller
//! threads through every chunk of a run.
//!
//! The index copies counts and aggregates out of the store, so the store can
//! be written again as soon as the index is built.

use std::cmp::Ordering;

use heat_store::{Count, HeatStore};
use heatmap_common::{Coordinate, PixelPosition};
use projection::WorldProjection;
use rayon::prelude::*;
use tracing::debug;

use crate::stripes::StripePlan;

/// Minimum number of tiles before the sort goes parallel.
const PARALLEL_THRESHOLD: usize = 16_384;

/// One stored tile with its mapped pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileEntry {
    pub coord: Coordinate,
    pub count: Count,
    /// Upper-left pixel of the tile's block, or the out-of-bounds sentinel.
    pub pixel: PixelPosition,
}

/// Global count range the hue ramp is normalized against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountRange {
    pub min: Count,
    pub max: Count,
}

impl CountRange {
    pub fn new(min: Count, max: Count) -> Self {
        Self { min, max }
    }

    /// The range recorded by a store's aggregates.
    pub fn of_store(store: &HeatStore) -> Self {
        Self::new(store.min().value, store.max().value)
    }
}

/// Store entries sorted in raster order of their pixel positions.
#[derive(Debug, Clone)]
pub struct TileOrderIndex {
    entries: Vec<TileEntry>,
    range: CountRange,
    tile_scale: u32,
}

impl TileOrderIndex {
    /// Snapshot `store` and sort it for a single rendering pass.
    ///
    /// Out-of-bounds coordinates are kept with the (-1, -1) sentinel so they
    /// sort first and are discarded by the first chunk.
    pub fn build(store: &HeatStore, projection: &WorldProjection) -> Self {
        let mut entries: Vec<TileEntry> = store
            .iter()
            .map(|(coord, count)| TileEntry {
                coord,
                count,
                pixel: projection.to_image_or_sentinel(coord),
            })
            .collect();

        if entries.len() >= PARALLEL_THRESHOLD {
            entries.par_sort_unstable_by(|a, b| a.pixel.raster_cmp(&b.pixel));
        } else {
            entries.sort_unstable_by(|a, b| a.pixel.raster_cmp(&b.pixel));
        }

        let out_of_bounds = entries
            .iter()
            .take_while(|e| e.pixel.is_out_of_bounds())
            .count();
        debug!(
            tiles = entries.len(),
            out_of_bounds = out_of_bounds,
            "Built tile order index"
        );

        Self {
            entries,
            range: CountRange::of_store(store),
            tile_scale: projection.tile_scale(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn range(&self) -> CountRange {
        self.range
    }

    pub fn tile_scale(&self) -> u32 {
        self.tile_scale
    }

    pub fn entries(&self) -> &[TileEntry] {
        &self.entries
    }

    /// Start a pass over the sorted tiles.
    pub fn into_cursor(self) -> TileCursor {
        TileCursor::new(self.entries)
    }

    /// Split the sorted tiles at stripe boundaries, one cursor per stripe.
    ///
    /// Each cursor holds exactly the tiles a sequential pass would consume
    /// for its stripe, so stripes can be colorized independently. Tiles
    /// sorted after the last stripe are dropped.
    pub fn partition(self, plan: &StripePlan) -> Vec<TileCursor> {
        let mut entries = self.entries;
        let bounds: Vec<usize> = plan
            .stripes()
            .map(|rect| {
                let last = rect.bottom_right();
                entries.partition_point(|e| e.pixel.raster_cmp(&last) != Ordering::Greater)
            })
            .collect();

        entries.truncate(bounds.last().copied().unwrap_or(0));
        let mut cursors = Vec::with_capacity(bounds.len());
        for i in (0..bounds.len()).rev() {
            let start = if i == 0 { 0 } else { bounds[i - 1] };
            cursors.push(TileCursor::new(entries.split_off(start)));
        }
        cursors.reverse();
        cursors
    }
}

/// Read-once position in a [`TileOrderIndex`].
///
/// Only moves forward. The caller owns it and passes it to each chunk in
/// raster order; a tile consumed by one chunk is never seen by the next.
#[derive(Debug)]
pub struct TileCursor {
    entries: Vec<TileEntry>,
    position: usize,
}

impl TileCursor {
    fn new(entries: Vec<TileEntry>) -> Self {
        Self {
            entries,
            position: 0,
        }
    }

    /// The next unconsumed tile, without consuming it.
    pub fn peek(&self) -> Option<&TileEntry> {
        self.entries.get(self.position)
    }

    pub fn advance(&mut self) {
        if self.position < self.entries.len() {
            self.position += 1;
        }
    }

    pub fn consumed(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.entries.len() - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.entries.len()
    }
}

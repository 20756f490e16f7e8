//! Sparse visit-count map with incrementally maintained aggregates.

use std::collections::HashMap;

use heatmap_common::Coordinate;

/// Visit count of a single tile.
pub type Count = u32;

/// Highest count a tile can hold. Tile lines persist counts as `i32`.
pub const MAX_COUNT: Count = i32::MAX as Count;

/// A tracked extreme value and where it was seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extremum {
    pub value: Count,
    pub coord: Coordinate,
}

impl Extremum {
    /// Starting value for both the maximum and the minimum of a new store.
    ///
    /// Counts are never below 1, so a floor of 1 at the origin is what a
    /// store with no data reports for either aggregate.
    pub const FLOOR: Extremum = Extremum {
        value: 1,
        coord: Coordinate::new(0, 0),
    };

    pub const fn new(value: Count, coord: Coordinate) -> Self {
        Self { value, coord }
    }
}

impl Default for Extremum {
    fn default() -> Self {
        Self::FLOOR
    }
}

/// Sparse mapping from tile coordinate to visit count.
///
/// Invariants kept by [`increment`](Self::increment) and [`set`](Self::set):
/// - a zero count is never stored; absence means zero
/// - `total_steps` is the sum of all stored counts
/// - `max` is the highest stored count. Removing or lowering the entry that
///   holds it triggers a full rescan.
/// - `min` follows the last value written that was `<=` the previous
///   minimum. It is *not* rescanned when its entry goes away.
///
/// [`set_fast`](Self::set_fast) skips all of the above for bulk loads; the
/// loader restores the aggregates afterwards.
#[derive(Debug, Clone, Default)]
pub struct HeatStore {
    entries: HashMap<Coordinate, Count>,
    total_steps: u64,
    max: Extremum,
    min: Extremum,
    player_id: Option<i64>,
}

impl HeatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store tagged with the id of the player it belongs to.
    pub fn with_player(player_id: i64) -> Self {
        Self {
            player_id: Some(player_id),
            ..Self::default()
        }
    }

    /// Add `amount` visits to `coord`, saturating at [`MAX_COUNT`].
    pub fn increment(&mut self, coord: Coordinate, amount: Count) {
        if amount == 0 {
            return;
        }
        let slot = self.entries.entry(coord).or_insert(0);
        let old_value = *slot;
        // Never lowers a count that `set_fast` left above the cap
        let new_value = old_value.saturating_add(amount).min(MAX_COUNT).max(old_value);
        *slot = new_value;

        self.total_steps += (new_value - old_value) as u64;
        if new_value >= self.max.value {
            self.max = Extremum::new(new_value, coord);
        }
    }

    /// Add a single visit to `coord`.
    pub fn increment_one(&mut self, coord: Coordinate) {
        self.increment(coord, 1);
    }

    /// Overwrite the count at `coord`.
    ///
    /// Negative values are ignored. Zero removes the entry.
    pub fn set(&mut self, coord: Coordinate, new_value: i32) {
        if new_value < 0 {
            return;
        }
        let new_value = new_value as Count;

        let old_value = if new_value == 0 {
            self.entries.remove(&coord)
        } else {
            self.entries.insert(coord, new_value)
        }
        .unwrap_or(0);

        self.total_steps = (self.total_steps + new_value as u64).saturating_sub(old_value as u64);

        if new_value == 0 {
            if old_value != 0 && self.max.coord == coord {
                self.recompute_max();
            }
            return;
        }

        if self.max.coord == coord && new_value < self.max.value {
            self.recompute_max();
        } else if new_value > self.max.value {
            self.max = Extremum::new(new_value, coord);
        }
        if new_value <= self.min.value {
            self.min = Extremum::new(new_value, coord);
        }
    }

    /// Raw overwrite without touching `total_steps`, `max` or `min`.
    ///
    /// Stores zero counts as-is. Callers must restore or recompute the
    /// aggregates once the bulk write is done.
    pub fn set_fast(&mut self, coord: Coordinate, new_value: Count) {
        self.entries.insert(coord, new_value);
    }

    /// Stored count at `coord`, or 0.
    pub fn get(&self, coord: Coordinate) -> Count {
        self.entries.get(&coord).copied().unwrap_or(0)
    }

    /// Number of stored entries.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn max(&self) -> Extremum {
        self.max
    }

    pub fn min(&self) -> Extremum {
        self.min
    }

    pub fn player_id(&self) -> Option<i64> {
        self.player_id
    }

    pub fn set_player_id(&mut self, player_id: Option<i64>) {
        self.player_id = player_id;
    }

    /// Iterate over stored `(coordinate, count)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, Count)> + '_ {
        self.entries.iter().map(|(c, v)| (*c, *v))
    }

    /// Replace the aggregates with values persisted alongside the entries.
    pub fn restore_aggregates(&mut self, total_steps: u64, max: Extremum, min: Extremum) {
        self.total_steps = total_steps;
        self.max = max;
        self.min = min;
    }

    /// Rebuild every aggregate from the stored entries.
    ///
    /// Unlike the incremental rules this yields the true minimum. Zero
    /// entries left behind by `set_fast` are ignored.
    pub fn recompute_aggregates(&mut self) {
        self.total_steps = self.entries.values().map(|v| *v as u64).sum();
        self.recompute_max();
        self.min = self
            .entries
            .iter()
            .filter(|(_, v)| **v > 0)
            .min_by_key(|(c, v)| (**v, **c))
            .map(|(c, v)| Extremum::new(*v, *c))
            .unwrap_or(Extremum::FLOOR);
    }

    // O(size). Only runs when the entry holding the maximum shrinks or goes.
    fn recompute_max(&mut self) {
        self.max = self
            .entries
            .iter()
            .filter(|(_, v)| **v > 0)
            .max_by_key(|(c, v)| (**v, std::cmp::Reverse(**c)))
            .map(|(c, v)| Extremum::new(*v, *c))
            .unwrap_or(Extremum::FLOOR);
    }
}

//! Rep-Max Records
//!
//! Estimates the heaviest weight liftable for each rep count from 1 to 15:
//! - real observations: best weight per rep count, earliest date on ties
//! - cascade inference: lifting W for N reps implies W for any fewer reps
//!
//! The result is a curve whose weight never increases as reps increase.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::index::ExerciseHistory;

pub const MIN_RECORD_REPS: i64 = 1;
pub const MAX_RECORD_REPS: i64 = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepMaxEntry {
    pub reps: u8,
    pub weight: f64,
    /// Earliest date this weight was reached
    pub date: NaiveDate,
    /// True when propagated down from a higher rep count
    pub is_implied: bool,
}

/// Best observation for a single rep count
#[derive(Debug, Clone, Copy, PartialEq)]
struct Best {
    weight: f64,
    date: NaiveDate,
}

impl Best {
    /// Heavier wins; equal weight keeps the earlier date
    fn absorb(&mut self, weight: f64, date: NaiveDate) {
        if weight > self.weight {
            self.weight = weight;
            self.date = date;
        } else if weight == self.weight && date < self.date {
            self.date = date;
        }
    }
}

/// Best real observation per rep count within [1, 15]
fn best_per_rep_count(history: &ExerciseHistory) -> BTreeMap<i64, Best> {
    let mut buckets: BTreeMap<i64, Best> = BTreeMap::new();

    for (date, set) in history.all_sets() {
        if !(MIN_RECORD_REPS..=MAX_RECORD_REPS).contains(&set.reps) {
            continue;
        }
        buckets
            .entry(set.reps)
            .and_modify(|best| best.absorb(set.weight, date))
            .or_insert(Best {
                weight: set.weight,
                date,
            });
    }

    buckets
}

/// Rep-max curve for one exercise, ascending by reps.
///
/// Walks from the highest observed rep count down to 1 carrying the running
/// best, so every lower rep count inherits at least the weight of any higher one.
pub fn compute_rep_maxes(history: &ExerciseHistory) -> Vec<RepMaxEntry> {
    let buckets = best_per_rep_count(history);

    let Some((&max_rep, &seed)) = buckets.iter().next_back() else {
        return Vec::new();
    };

    let mut running = seed;
    let mut entries = Vec::with_capacity(max_rep as usize);

    for reps in (MIN_RECORD_REPS..=max_rep).rev() {
        let real = buckets.get(&reps);
        if let Some(real) = real {
            running.absorb(real.weight, real.date);
        }

        entries.push(RepMaxEntry {
            reps: reps as u8,
            weight: running.weight,
            date: running.date,
            is_implied: real.is_none_or(|r| r.weight < running.weight),
        });
    }

    entries.reverse();
    entries
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

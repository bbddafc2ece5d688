//! Date and exercise indexes over the flat training log
//!
//! Both indexes are built in one pass over sets already ordered by
//! `(date, sequence)`, so first-seen order is chronological order and the set
//! lists need no secondary sort.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::models::{SetEntry, TrainingSet};

// ---------------------------------------------------------------------------
/// Date Index: what was done on each day
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayLog {
    /// Exercise ids in order of their first set that day
    pub exercise_ordering: Vec<i64>,
    pub exercise_details: BTreeMap<i64, Vec<SetEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateIndex {
    days: BTreeMap<NaiveDate, DayLog>,
}

impl DateIndex {
    pub fn day(&self, date: NaiveDate) -> Option<&DayLog> {
        self.days.get(&date)
    }

    /// Exercises performed on `date` in first-performed order; empty when no data
    pub fn exercises_on(&self, date: NaiveDate) -> &[i64] {
        self.days
            .get(&date)
            .map(|day| day.exercise_ordering.as_slice())
            .unwrap_or(&[])
    }

    pub fn sets_for(&self, date: NaiveDate, exercise_id: i64) -> &[SetEntry] {
        self.days
            .get(&date)
            .and_then(|day| day.exercise_details.get(&exercise_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every date with at least one set, ascending
    pub fn workout_days(&self) -> Vec<NaiveDate> {
        self.days.keys().copied().collect()
    }

    /// Workout days falling in the given calendar month, ascending
    pub fn days_in_month(&self, year: i32, month: u32) -> Vec<NaiveDate> {
        self.days
            .keys()
            .filter(|d| d.year() == year && d.month() == month)
            .copied()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &DayLog)> {
        self.days.iter()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Group sets by date, keeping first-seen exercise order per date
pub fn build_date_index(sets: &[TrainingSet]) -> DateIndex {
    let mut days: BTreeMap<NaiveDate, DayLog> = BTreeMap::new();

    for set in sets {
        let day = days.entry(set.date).or_default();
        match day.exercise_details.entry(set.exercise_id) {
            Entry::Vacant(slot) => {
                day.exercise_ordering.push(set.exercise_id);
                slot.insert(vec![SetEntry::from(set)]);
            }
            Entry::Occupied(mut slot) => slot.get_mut().push(SetEntry::from(set)),
        }
    }

    DateIndex { days }
}

// ---------------------------------------------------------------------------
/// Exercise Index: the history of each exercise
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseHistory {
    /// Most recent first, no duplicates
    pub dates: Vec<NaiveDate>,
    pub exercise_data: BTreeMap<NaiveDate, Vec<SetEntry>>,
}

impl ExerciseHistory {
    pub fn sets_on(&self, date: NaiveDate) -> &[SetEntry] {
        self.exercise_data
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every set paired with its date, most recent date first
    pub fn all_sets(&self) -> impl Iterator<Item = (NaiveDate, &SetEntry)> + '_ {
        self.dates
            .iter()
            .flat_map(move |date| self.sets_on(*date).iter().map(move |set| (*date, set)))
    }

    pub fn most_recent(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseIndex {
    exercises: BTreeMap<i64, ExerciseHistory>,
}

impl ExerciseIndex {
    pub fn history(&self, exercise_id: i64) -> Option<&ExerciseHistory> {
        self.exercises.get(&exercise_id)
    }

    /// Ids of every exercise with at least one set, ascending
    pub fn exercise_ids(&self) -> Vec<i64> {
        self.exercises.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&i64, &ExerciseHistory)> {
        self.exercises.iter()
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

/// Group sets by exercise; each history's dates end up newest first
pub fn build_exercise_index(sets: &[TrainingSet]) -> ExerciseIndex {
    let mut exercises: BTreeMap<i64, ExerciseHistory> = BTreeMap::new();

    for set in sets {
        let history = exercises.entry(set.exercise_id).or_default();
        match history.exercise_data.entry(set.date) {
            Entry::Vacant(slot) => {
                history.dates.push(set.date);
                slot.insert(vec![SetEntry::from(set)]);
            }
            Entry::Occupied(mut slot) => slot.get_mut().push(SetEntry::from(set)),
        }
    }

    for history in exercises.values_mut() {
        history.dates.sort_unstable_by(|a, b| b.cmp(a));
    }

    ExerciseIndex { exercises }
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

// Per-period totals, muscle breakdowns and personal records
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::catalog::{ExerciseCatalogEntry, UNKNOWN_MUSCLE, muscle_index};
use crate::periods::Period;
use crate::{ExerciseEntry, SetEntry, WorkoutRecord};

/// A lift whose best weight in a period beat everything logged before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalRecord {
    pub exercise: String,
    /// Heaviest set in the period, kilograms.
    pub new_best: f64,
    /// Heaviest set before the period started, kilograms.
    pub prev_best: f64,
    /// Day of the workout that set `new_best`.
    pub date: NaiveDate,
}

/// Aggregates for one [`Period`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodMetrics {
    pub frequency: usize,
    pub total_reps: u64,
    pub total_sets: usize,
    pub reps_by_muscle: BTreeMap<String, u64>,
    pub sets_by_muscle: BTreeMap<String, usize>,
    /// Sorted by `new_best`, heaviest first.
    pub prs: Vec<PersonalRecord>,
}

/// Set weight with non-finite values treated as zero.
pub fn set_weight(set: &SetEntry) -> f64 {
    if set.weight.is_finite() { set.weight } else { 0.0 }
}

/// Heaviest set of one exercise entry, 0 when it has no sets.
fn entry_max_weight(entry: &ExerciseEntry) -> f64 {
    entry.sets.iter().map(set_weight).fold(0.0, f64::max)
}

#[derive(Default)]
struct Tally {
    total_reps: u64,
    total_sets: usize,
    reps_by_muscle: BTreeMap<String, u64>,
    sets_by_muscle: BTreeMap<String, usize>,
}

impl Tally {
    fn add(mut self, muscle: &str, reps: u32) -> Self {
        let reps = u64::from(reps);
        self.total_reps = self.total_reps.saturating_add(reps);
        self.total_sets += 1;
        let r = self.reps_by_muscle.entry(muscle.to_string()).or_insert(0);
        *r = r.saturating_add(reps);
        *self.sets_by_muscle.entry(muscle.to_string()).or_insert(0) += 1;
        self
    }
}

/// Best weight per exercise over every workout dated strictly before `from`.
fn best_before<'a>(records: &'a [WorkoutRecord], from: NaiveDate) -> HashMap<&'a str, f64> {
    records
        .iter()
        .filter(|w| w.parsed_date().is_some_and(|d| d < from))
        .flat_map(|w| w.exercises.iter())
        .fold(HashMap::new(), |mut best, ex| {
            let max = entry_max_weight(ex);
            let slot = best.entry(ex.exercise_name.as_str()).or_insert(0.0);
            if max > *slot {
                *slot = max;
            }
            best
        })
}

/// Best weight per exercise inside the period with the day it happened.
/// Ties go to the earlier day.
fn best_in_window<'a>(items: &[&'a WorkoutRecord]) -> BTreeMap<&'a str, (f64, NaiveDate)> {
    let mut best: BTreeMap<&'a str, (f64, NaiveDate)> = BTreeMap::new();
    for &w in items {
        let Some(d) = w.parsed_date() else { continue };
        for ex in &w.exercises {
            let max = entry_max_weight(ex);
            let replace = match best.get(ex.exercise_name.as_str()) {
                None => true,
                Some(&(current, seen)) => max > current || (max == current && d < seen),
            };
            if replace {
                best.insert(ex.exercise_name.as_str(), (max, d));
            }
        }
    }
    best
}

/// Compute the metrics of `period`.
///
/// `records` is the full history and is only used to find each exercise's
/// best weight before the period. An exercise is reported as a PR when its
/// best in the period is higher than that earlier best and the earlier best
/// is above zero, so a first-ever lift is never a PR.
pub fn compute_period_metrics(
    period: &Period<'_>,
    records: &[WorkoutRecord],
    catalog: &[ExerciseCatalogEntry],
) -> PeriodMetrics {
    let muscles = muscle_index(catalog);

    let tally = period
        .items
        .iter()
        .flat_map(|w| w.exercises.iter())
        .flat_map(|ex| {
            let muscle = muscles
                .get(ex.exercise_name.as_str())
                .copied()
                .unwrap_or(UNKNOWN_MUSCLE);
            ex.sets.iter().map(move |s| (muscle, s.reps))
        })
        .fold(Tally::default(), |tally, (muscle, reps)| tally.add(muscle, reps));

    let before = best_before(records, period.start_date());
    let mut prs: Vec<PersonalRecord> = best_in_window(&period.items)
        .into_iter()
        .filter_map(|(name, (best, date))| {
            let prev = before.get(name).copied().unwrap_or(0.0);
            (best > prev && prev > 0.0).then(|| PersonalRecord {
                exercise: name.to_string(),
                new_best: best,
                prev_best: prev,
                date,
            })
        })
        .collect();
    prs.sort_by(|a, b| b.new_best.total_cmp(&a.new_best));

    PeriodMetrics {
        frequency: period.items.len(),
        total_reps: tally.total_reps,
        total_sets: tally.total_sets,
        reps_by_muscle: tally.reps_by_muscle,
        sets_by_muscle: tally.sets_by_muscle,
        prs,
    }
}

//! Daily body-weight log and weekly averages.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dates::{end_of_week_sunday, start_of_week_monday};
use crate::units::round_to;

/// Body weight in kilograms keyed by calendar day.
pub type WeightLogs = BTreeMap<NaiveDate, f64>;

/// Log `kg` for `day`. `None` or a non-finite value clears the day.
pub fn record_weight(logs: &mut WeightLogs, day: NaiveDate, kg: Option<f64>) {
    match kg.filter(|kg| kg.is_finite()) {
        Some(kg) => {
            logs.insert(day, kg);
        }
        None => {
            if logs.remove(&day).is_some() {
                log::debug!("Cleared body weight for {day}");
            }
        }
    }
}

/// Mean of the finite weights logged between `from` and `to` inclusive,
/// rounded to one decimal. `None` when nothing was logged.
pub fn average_in_range(logs: &WeightLogs, from: NaiveDate, to: NaiveDate) -> Option<f64> {
    if from > to {
        return None;
    }
    let (sum, count) = logs
        .range(from..=to)
        .map(|(_, kg)| *kg)
        .filter(|kg| kg.is_finite())
        .fold((0.0, 0usize), |(sum, count), kg| (sum + kg, count + 1));
    (count > 0).then(|| round_to(sum / count as f64, 1))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyWeight {
    pub current: Option<f64>,
    pub previous: Option<f64>,
    pub delta: Option<f64>,
}

/// Average of the week containing `reference` and of the week before it.
pub fn weekly_average_and_delta(logs: &WeightLogs, reference: NaiveDate) -> WeeklyWeight {
    let from = start_of_week_monday(reference);
    let current = average_in_range(logs, from, end_of_week_sunday(reference));
    let last_week = from - Duration::days(1);
    let previous = average_in_range(
        logs,
        start_of_week_monday(last_week),
        end_of_week_sunday(last_week),
    );
    WeeklyWeight {
        current,
        previous,
        delta: crate::summary::delta(current, previous, 1),
    }
}

/// Chronological `(day, kg)` points for a trend line.
pub fn trend_points(logs: &WeightLogs) -> Vec<(NaiveDate, f64)> {
    logs.iter()
        .filter(|(_, kg)| kg.is_finite())
        .map(|(d, kg)| (*d, *kg))
        .collect()
}

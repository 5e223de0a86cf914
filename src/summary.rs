//! Period cards: metrics for each period next to those of the period before.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::body_weight::{WeightLogs, average_in_range};
use crate::catalog::ExerciseCatalogEntry;
use crate::metrics::{PeriodMetrics, compute_period_metrics};
use crate::periods::{Granularity, build_periods};
use crate::units::round_to;
use crate::WorkoutRecord;

/// Difference `current - previous` rounded to `decimals` places, or `None`
/// when either side is missing.
pub fn delta(current: Option<f64>, previous: Option<f64>, decimals: u32) -> Option<f64> {
    let (c, p) = (current?, previous?);
    let d = round_to(c - p, decimals);
    // normalise -0.0 so it prints as a zero change
    Some(if d == 0.0 { 0.0 } else { d })
}

/// `+3`, `-1.5`, `±0` or `—` when there is nothing to compare against.
pub fn format_delta(delta: Option<f64>) -> String {
    match delta {
        None => "—".to_string(),
        Some(d) if d == 0.0 => "±0".to_string(),
        Some(d) if d > 0.0 => format!("+{d}"),
        Some(d) => format!("{d}"),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDeltas {
    pub frequency: Option<f64>,
    pub total_reps: Option<f64>,
    pub total_sets: Option<f64>,
    pub prs: Option<f64>,
    pub body_weight: Option<f64>,
}

/// Everything a summary card shows for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub granularity: Granularity,
    pub key: String,
    pub label: String,
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
    pub metrics: PeriodMetrics,
    /// Metrics of the directly preceding period when it had any workouts.
    pub previous: Option<PeriodMetrics>,
    /// Average logged body weight over the period, weekly cards only.
    pub body_weight_avg: Option<f64>,
    /// Average logged body weight over the preceding week, weekly cards only.
    pub prev_body_weight_avg: Option<f64>,
}

impl PeriodSummary {
    pub fn deltas(&self) -> PeriodDeltas {
        let prev = self.previous.as_ref();
        let count = |f: fn(&PeriodMetrics) -> f64| delta(Some(f(&self.metrics)), prev.map(f), 0);
        PeriodDeltas {
            frequency: count(|m| m.frequency as f64),
            total_reps: count(|m| m.total_reps as f64),
            total_sets: count(|m| m.total_sets as f64),
            prs: count(|m| m.prs.len() as f64),
            body_weight: delta(self.body_weight_avg, self.prev_body_weight_avg, 1),
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.from.date()
    }
}

/// Build one summary per period that has workouts, most recent first.
pub fn summarize(
    records: &[WorkoutRecord],
    catalog: &[ExerciseCatalogEntry],
    weight_logs: &WeightLogs,
    granularity: Granularity,
) -> Vec<PeriodSummary> {
    let periods = build_periods(records, granularity);
    let metrics: HashMap<&str, PeriodMetrics> = periods
        .iter()
        .map(|p| (p.key.as_str(), compute_period_metrics(p, records, catalog)))
        .collect();

    periods
        .iter()
        .map(|p| {
            let (body_weight_avg, prev_body_weight_avg) = match granularity {
                Granularity::Week => {
                    let start = p.start_date();
                    (
                        average_in_range(weight_logs, start, p.end_date()),
                        average_in_range(
                            weight_logs,
                            start - Duration::days(7),
                            start - Duration::days(1),
                        ),
                    )
                }
                Granularity::Month => (None, None),
            };
            PeriodSummary {
                granularity,
                key: p.key.clone(),
                label: p.label.clone(),
                from: p.from,
                to: p.to,
                metrics: metrics.get(p.key.as_str()).cloned().unwrap_or_default(),
                previous: metrics.get(p.previous_key().as_str()).cloned(),
                body_weight_avg,
                prev_body_weight_avg,
            }
        })
        .collect()
}

//! Grouping workouts into calendar weeks and months.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::WorkoutRecord;
use crate::dates;

/// Bucket size used when summarizing workouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Week,
    Month,
}

impl Granularity {
    pub fn start_of(self, d: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Week => dates::start_of_week_monday(d),
            Granularity::Month => dates::start_of_month(d),
        }
    }

    pub fn end_of(self, d: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Week => dates::end_of_week_sunday(d),
            Granularity::Month => dates::end_of_month(d),
        }
    }

    pub fn key_of(self, d: NaiveDate) -> String {
        match self {
            Granularity::Week => dates::week_key(d),
            Granularity::Month => dates::month_key(d),
        }
    }

    pub fn label_of(self, d: NaiveDate) -> String {
        match self {
            Granularity::Week => dates::week_label(d),
            Granularity::Month => dates::month_label(d),
        }
    }

    /// Key of the period directly preceding the one that starts on `from`.
    pub fn previous_key(self, from: NaiveDate) -> String {
        match self {
            Granularity::Week => dates::prev_week_key_from(from),
            Granularity::Month => dates::prev_month_key_from(from),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Week => write!(f, "week"),
            Granularity::Month => write!(f, "month"),
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" | "weekly" => Ok(Granularity::Week),
            "month" | "monthly" => Ok(Granularity::Month),
            other => Err(format!("unknown period '{other}', expected week or month")),
        }
    }
}

/// A calendar week or month together with the workouts that fall inside it.
///
/// Periods are rebuilt from the workout list on every call and borrow the
/// records they contain.
#[derive(Debug, Clone, PartialEq)]
pub struct Period<'a> {
    pub granularity: Granularity,
    pub key: String,
    pub label: String,
    /// First day at 00:00:00.000.
    pub from: NaiveDateTime,
    /// Last day at 23:59:59.999.
    pub to: NaiveDateTime,
    pub items: Vec<&'a WorkoutRecord>,
}

impl<'a> Period<'a> {
    /// Empty period of the given size that contains `d`.
    pub fn containing(granularity: Granularity, d: NaiveDate) -> Self {
        Self {
            granularity,
            key: granularity.key_of(d),
            label: granularity.label_of(d),
            from: dates::day_start(granularity.start_of(d)),
            to: dates::day_end(granularity.end_of(d)),
            items: Vec::new(),
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.from.date()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.to.date()
    }

    pub fn contains(&self, d: NaiveDate) -> bool {
        let at = dates::day_start(d);
        at >= self.from && at <= self.to
    }

    pub fn previous_key(&self) -> String {
        self.granularity.previous_key(self.start_date())
    }
}

/// Partition `records` into the periods that contain at least one workout.
///
/// Records without a usable date are skipped. The result is ordered with the
/// most recent period first; inside a period records keep their input order.
pub fn build_periods(records: &[WorkoutRecord], granularity: Granularity) -> Vec<Period<'_>> {
    let mut buckets: BTreeMap<NaiveDate, Period<'_>> = BTreeMap::new();
    let mut skipped = 0usize;
    for record in records {
        let Some(d) = record.parsed_date() else {
            skipped += 1;
            continue;
        };
        buckets
            .entry(granularity.start_of(d))
            .or_insert_with(|| Period::containing(granularity, d))
            .items
            .push(record);
    }
    log::debug!(
        "Built {} {granularity} periods from {} workouts ({skipped} without a date)",
        buckets.len(),
        records.len()
    );
    buckets.into_values().rev().collect()
}

pub fn build_weeks(records: &[WorkoutRecord]) -> Vec<Period<'_>> {
    build_periods(records, Granularity::Week)
}

pub fn build_months(records: &[WorkoutRecord]) -> Vec<Period<'_>> {
    build_periods(records, Granularity::Month)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{exercise, set, workout};

    fn sample() -> Vec<WorkoutRecord> {
        vec![
            workout("a", "2024-01-01", vec![exercise("Squat", vec![set(100.0, 5)])]),
            workout("b", "2024-01-03", vec![exercise("Bench Press", vec![set(60.0, 5)])]),
            workout("c", "2024-01-08", vec![exercise("Squat", vec![set(105.0, 5)])]),
            workout("d", "2024-02-14", vec![]),
            WorkoutRecord {
                id: "e".into(),
                date: Some(String::new()),
                ..Default::default()
            },
            WorkoutRecord {
                id: "f".into(),
                date: None,
                ..Default::default()
            },
        ]
    }

    fn ids(p: &Period<'_>) -> Vec<String> {
        p.items.iter().map(|w| w.id.clone()).collect()
    }

    #[test]
    fn weekly_periods_descending() {
        let records = sample();
        let weeks = build_weeks(&records);
        let keys: Vec<&str> = weeks.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["2024-07", "2024-02", "2024-01"]);
        assert_eq!(ids(&weeks[2]), vec!["a", "b"]);
        assert_eq!(weeks[2].label, "2024-01-01 to 2024-01-07");
        assert_eq!(weeks[2].from.to_string(), "2024-01-01 00:00:00");
        assert_eq!(weeks[2].to.to_string(), "2024-01-07 23:59:59.999");
    }

    #[test]
    fn monthly_periods_descending() {
        let records = sample();
        let months = build_months(&records);
        let keys: Vec<&str> = months.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["2024-02", "2024-01"]);
        assert_eq!(ids(&months[1]), vec!["a", "b", "c"]);
        assert_eq!(months[0].to.to_string(), "2024-02-29 23:59:59.999");
    }

    #[test]
    fn every_dated_record_lands_in_exactly_one_period() {
        let records = sample();
        for granularity in [Granularity::Week, Granularity::Month] {
            let periods = build_periods(&records, granularity);
            for r in &records {
                let hits: Vec<&Period<'_>> = periods
                    .iter()
                    .filter(|p| p.items.iter().any(|w| std::ptr::eq(*w, r)))
                    .collect();
                match r.parsed_date() {
                    Some(d) => {
                        assert_eq!(hits.len(), 1, "record {} in {granularity}", r.id);
                        assert!(hits[0].contains(d));
                    }
                    None => assert!(hits.is_empty()),
                }
            }
        }
    }

    #[test]
    fn empty_and_undated_input_gives_no_periods() {
        assert!(build_weeks(&[]).is_empty());
        let undated = vec![WorkoutRecord::default()];
        assert!(build_months(&undated).is_empty());
    }

    #[test]
    fn building_twice_is_identical() {
        let records = sample();
        assert_eq!(build_weeks(&records), build_weeks(&records));
    }

    #[test]
    fn previous_key_of_period() {
        let records = sample();
        let weeks = build_weeks(&records);
        assert_eq!(weeks[1].previous_key(), weeks[2].key);
        let months = build_months(&records);
        assert_eq!(months[0].previous_key(), months[1].key);
    }

    #[test]
    fn granularity_parses() {
        assert_eq!("Month".parse::<Granularity>(), Ok(Granularity::Month));
        assert_eq!("weekly".parse::<Granularity>(), Ok(Granularity::Week));
        assert!("year".parse::<Granularity>().is_err());
    }
}

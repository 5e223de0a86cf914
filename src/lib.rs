//! Weekly and monthly training summaries for a personal workout log.
//!
//! Workouts are plain data: the crate groups them into calendar periods and
//! derives per-period totals, muscle breakdowns and personal records. Storage,
//! import/export and report rendering live in their own modules and only hand
//! already-loaded collections to the metrics engine.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub mod backup;
pub mod body_weight;
pub mod catalog;
pub mod dates;
pub mod export;
pub mod metrics;
pub mod periods;
pub mod report;
pub mod settings;
pub mod store;
pub mod summary;
pub mod units;

pub use catalog::ExerciseCatalogEntry;
pub use metrics::{PeriodMetrics, PersonalRecord, compute_period_metrics};
pub use periods::{Granularity, Period, build_months, build_periods, build_weeks};
pub use summary::{PeriodSummary, summarize};
pub use units::WeightUnit;

/// A single logged training session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkoutRecord {
    #[serde(deserialize_with = "lenient_text")]
    pub id: String,
    /// Calendar day as `YYYY-MM-DD`. Missing or unparseable dates keep the
    /// record out of every period.
    #[serde(deserialize_with = "lenient_date")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    pub exercises: Vec<ExerciseEntry>,
}

impl WorkoutRecord {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        dates::parse_date(self.date.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExerciseEntry {
    #[serde(deserialize_with = "lenient_text")]
    pub exercise_name: String,
    pub sets: Vec<SetEntry>,
}

/// One performed set. Weight is always stored in kilograms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetEntry {
    #[serde(deserialize_with = "lenient_index")]
    pub set: u32,
    #[serde(deserialize_with = "lenient_weight")]
    pub weight: f64,
    #[serde(deserialize_with = "lenient_reps")]
    pub reps: u32,
}

impl SetEntry {
    pub fn new(set: u32, weight: f64, reps: u32) -> Self {
        Self { set, weight, reps }
    }
}

/// Read a finite number out of a loosely typed JSON value.
///
/// Numbers and numeric strings are accepted, everything else (including
/// `NaN`/`inf` spelled as strings) yields `None`.
pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() { Some(0.0) } else { s.parse::<f64>().ok() }
        }
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Non-negative rep count from a float, rounding fractional input.
pub(crate) fn reps_from_f64(n: f64) -> u32 {
    if n.is_finite() && n > 0.0 { n.round() as u32 } else { 0 }
}

/// String field that also accepts numbers; anything else decodes as empty.
pub(crate) fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let text = lenient_text(d)?;
    Ok((!text.is_empty()).then_some(text))
}

fn lenient_weight<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(number_from_value).unwrap_or(0.0))
}

fn lenient_reps<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value
        .as_ref()
        .and_then(number_from_value)
        .map_or(0, reps_from_f64))
}

fn lenient_index<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    lenient_reps(d)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn set(weight: f64, reps: u32) -> SetEntry {
        SetEntry::new(1, weight, reps)
    }

    pub fn workout(id: &str, date: &str, exercises: Vec<ExerciseEntry>) -> WorkoutRecord {
        WorkoutRecord {
            id: id.into(),
            date: Some(date.into()),
            name: date.into(),
            exercises,
        }
    }

    pub fn exercise(name: &str, sets: Vec<SetEntry>) -> ExerciseEntry {
        ExerciseEntry {
            exercise_name: name.into(),
            sets,
        }
    }

    pub fn catalog_entry(name: &str, main_muscle: &str) -> crate::ExerciseCatalogEntry {
        crate::ExerciseCatalogEntry {
            name: name.into(),
            main_muscle: main_muscle.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_entry_decodes_loose_numbers() {
        let sets: Vec<SetEntry> = serde_json::from_str(
            r#"[
                {"set": 1, "weight": "62.5", "reps": 5},
                {"set": 2, "weight": null, "reps": "abc"},
                {"weight": "NaN", "reps": -3},
                {}
            ]"#,
        )
        .unwrap();
        assert_eq!(sets[0], SetEntry::new(1, 62.5, 5));
        assert_eq!(sets[1], SetEntry::new(2, 0.0, 0));
        assert_eq!(sets[2], SetEntry::new(0, 0.0, 0));
        assert_eq!(sets[3], SetEntry::default());
    }

    #[test]
    fn fractional_reps_round() {
        let s: SetEntry = serde_json::from_str(r#"{"weight": 20, "reps": 7.6}"#).unwrap();
        assert_eq!(s.reps, 8);
    }

    #[test]
    fn workout_record_uses_camel_case_and_null_date() {
        let w: WorkoutRecord = serde_json::from_str(
            r#"{"id": "a", "date": null, "name": "Push",
                "exercises": [{"exerciseName": "Bench Press", "sets": [{"weight": 60, "reps": 5}]}]}"#,
        )
        .unwrap();
        assert_eq!(w.date, None);
        assert_eq!(w.parsed_date(), None);
        assert_eq!(w.exercises[0].exercise_name, "Bench Press");
        assert_eq!(w.exercises[0].sets[0].weight, 60.0);
    }

    #[test]
    fn wrong_typed_text_fields_decode_to_defaults() {
        let w: WorkoutRecord = serde_json::from_str(
            r#"{"id": 7, "date": 20240108, "name": null,
                "exercises": [{"exerciseName": null, "sets": []}]}"#,
        )
        .unwrap();
        assert_eq!(w.id, "7");
        assert_eq!(w.date.as_deref(), Some("20240108"));
        assert_eq!(w.parsed_date(), None);
        assert_eq!(w.name, "");
        assert_eq!(w.exercises[0].exercise_name, "");

        let blank: WorkoutRecord = serde_json::from_str(r#"{"date": false}"#).unwrap();
        assert_eq!(blank.date, None);
    }

    #[test]
    fn parsed_date_reads_calendar_day() {
        let w = test_support::workout("a", "2024-03-09", vec![]);
        assert_eq!(w.parsed_date(), NaiveDate::from_ymd_opt(2024, 3, 9));
    }
}

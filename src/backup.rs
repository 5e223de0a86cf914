//! JSON backups: validation of imported files and merging into existing data.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::catalog::ExerciseCatalogEntry;
use crate::{ExerciseEntry, SetEntry, WorkoutRecord, number_from_value, reps_from_f64};

/// Sets kept per exercise when importing.
pub const MAX_SETS: usize = 5;

/// The document written by export and accepted by import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppBackup {
    pub exercises: Vec<ExerciseCatalogEntry>,
    pub workouts: Vec<WorkoutRecord>,
}

#[derive(Debug)]
pub enum ValidationError {
    Io(std::io::Error),
    NotJson(serde_json::Error),
    NotAnObject,
    /// A top-level collection is present but not an array.
    NotAnArray(&'static str),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Io(e) => write!(f, "could not read backup: {e}"),
            ValidationError::NotJson(e) => write!(f, "backup is not valid JSON: {e}"),
            ValidationError::NotAnObject => write!(f, "backup must be a JSON object"),
            ValidationError::NotAnArray(field) => write!(f, "backup field `{field}` must be an array"),
        }
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ValidationError::Io(e) => Some(e),
            ValidationError::NotJson(e) => Some(e),
            ValidationError::NotAnObject | ValidationError::NotAnArray(_) => None,
        }
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Clean up one imported exercise. Entries without a name are dropped.
pub fn normalize_exercise(value: &Value) -> Option<ExerciseCatalogEntry> {
    let name = text(value.get("name"));
    if name.is_empty() {
        return None;
    }
    Some(ExerciseCatalogEntry {
        name,
        recommend_rep: text(value.get("recommendRep")),
        main_muscle: text(value.get("mainMuscle")),
        secondary_muscles: text(value.get("secondaryMuscles")),
        kind: text(value.get("type")),
        equipment: text(value.get("equipment")),
        force: text(value.get("force")),
        last_workout: None,
    })
}

fn normalize_sets(value: Option<&Value>) -> Vec<SetEntry> {
    let sets: Vec<SetEntry> = value
        .and_then(Value::as_array)
        .map(|raw| {
            raw.iter()
                .take(MAX_SETS)
                .enumerate()
                .map(|(idx, s)| SetEntry {
                    set: idx as u32 + 1,
                    weight: s.get("weight").and_then(number_from_value).unwrap_or(0.0),
                    reps: s
                        .get("reps")
                        .and_then(number_from_value)
                        .map_or(0, reps_from_f64),
                })
                .collect()
        })
        .unwrap_or_default();
    if sets.is_empty() {
        vec![SetEntry::new(1, 0.0, 0)]
    } else {
        sets
    }
}

/// Clean up one imported workout.
///
/// Dates are cut to `YYYY-MM-DD` length; workouts without a date are dropped.
/// A missing name falls back to the date and a missing id gets a fresh one.
pub fn normalize_workout(value: &Value) -> Option<WorkoutRecord> {
    let date: String = text(value.get("date")).chars().take(10).collect();
    if date.is_empty() {
        return None;
    }
    let name = match text(value.get("name")) {
        n if n.is_empty() => date.clone(),
        n => n,
    };
    let id = match value.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => new_id(),
    };
    let exercises = value
        .get("exercises")
        .and_then(Value::as_array)
        .map(|raw| {
            raw.iter()
                .filter_map(|e| {
                    let exercise_name = text(e.get("exerciseName"));
                    (!exercise_name.is_empty()).then(|| ExerciseEntry {
                        exercise_name,
                        sets: normalize_sets(e.get("sets")),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    Some(WorkoutRecord {
        id,
        date: Some(date),
        name,
        exercises,
    })
}

fn collection<'a>(root: &'a serde_json::Map<String, Value>, field: &'static str) -> Result<&'a [Value], ValidationError> {
    match root.get(field) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(ValidationError::NotAnArray(field)),
    }
}

/// Validate a decoded backup and normalize every entry in it.
pub fn normalize_data(value: &Value) -> Result<AppBackup, ValidationError> {
    let root = value.as_object().ok_or(ValidationError::NotAnObject)?;
    let raw_exercises = collection(root, "exercises")?;
    let raw_workouts = collection(root, "workouts")?;
    let exercises: Vec<ExerciseCatalogEntry> =
        raw_exercises.iter().filter_map(normalize_exercise).collect();
    let workouts: Vec<WorkoutRecord> = raw_workouts.iter().filter_map(normalize_workout).collect();
    let dropped = raw_exercises.len() + raw_workouts.len() - exercises.len() - workouts.len();
    if dropped > 0 {
        log::warn!("Dropped {dropped} invalid entries from backup");
    }
    Ok(AppBackup { exercises, workouts })
}

pub fn parse_backup(json: &str) -> Result<AppBackup, ValidationError> {
    let value: Value = serde_json::from_str(json).map_err(ValidationError::NotJson)?;
    normalize_data(&value)
}

pub fn import_file<P: AsRef<Path>>(path: P) -> Result<AppBackup, ValidationError> {
    let data = std::fs::read_to_string(path).map_err(ValidationError::Io)?;
    parse_backup(&data)
}

pub fn export_file<P: AsRef<Path>>(path: P, backup: &AppBackup) -> std::io::Result<()> {
    crate::export::write_json(backup, path)
}

/// Merge imported exercises by case-insensitive name.
///
/// Known exercises keep their values and only gain fields that were blank;
/// new exercises are appended in import order.
pub fn merge_exercises(
    current: &[ExerciseCatalogEntry],
    incoming: &[ExerciseCatalogEntry],
) -> Vec<ExerciseCatalogEntry> {
    let mut merged: Vec<ExerciseCatalogEntry> = Vec::with_capacity(current.len() + incoming.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    for e in current.iter().chain(incoming) {
        let key = e.name.to_lowercase();
        match index.get(&key) {
            None => {
                index.insert(key, merged.len());
                merged.push(e.clone());
            }
            Some(&i) => {
                let cur = &mut merged[i];
                for (field, value) in [
                    (&mut cur.recommend_rep, &e.recommend_rep),
                    (&mut cur.main_muscle, &e.main_muscle),
                    (&mut cur.secondary_muscles, &e.secondary_muscles),
                    (&mut cur.kind, &e.kind),
                    (&mut cur.equipment, &e.equipment),
                    (&mut cur.force, &e.force),
                ] {
                    if field.trim().is_empty() && !value.is_empty() {
                        *field = value.clone();
                    }
                }
            }
        }
    }
    merged
}

/// Append imported workouts, giving a fresh id to any that collide with an
/// existing one. The result is ordered newest first.
pub fn merge_workouts(current: &[WorkoutRecord], incoming: &[WorkoutRecord]) -> Vec<WorkoutRecord> {
    let mut ids: HashSet<String> = current.iter().map(|w| w.id.clone()).collect();
    let mut merged = current.to_vec();
    for w in incoming {
        let mut w = w.clone();
        if !ids.insert(w.id.clone()) {
            w.id = new_id();
            ids.insert(w.id.clone());
        }
        merged.push(w);
    }
    merged.sort_by(|a, b| b.date.cmp(&a.date));
    merged
}

impl AppBackup {
    /// Merge `incoming` into this backup.
    pub fn merge(&self, incoming: &AppBackup) -> AppBackup {
        AppBackup {
            exercises: merge_exercises(&self.exercises, &incoming.exercises),
            workouts: merge_workouts(&self.workouts, &incoming.workouts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{catalog_entry, workout};
    use serde_json::json;

    #[test]
    fn normalizes_workouts() {
        let backup = normalize_data(&json!({
            "workouts": [
                {
                    "id": "w1",
                    "date": "2024-01-08T09:00:00.000Z",
                    "exercises": [
                        {"exerciseName": "  Bench Press ", "sets": [
                            {"weight": "60", "reps": 5},
                            {"weight": 62.5, "reps": "4"},
                            {"weight": 1}, {"weight": 2}, {"weight": 3}, {"weight": 4}
                        ]},
                        {"exerciseName": "   ", "sets": []},
                        {"exerciseName": "Plank"}
                    ]
                },
                {"id": "w2", "exercises": []},
                {"date": "2024-02-01", "name": "  Legs  "}
            ]
        }))
        .unwrap();

        assert_eq!(backup.workouts.len(), 2);
        let w1 = &backup.workouts[0];
        assert_eq!(w1.date.as_deref(), Some("2024-01-08"));
        assert_eq!(w1.name, "2024-01-08");
        assert_eq!(w1.exercises.len(), 2);
        let bench = &w1.exercises[0];
        assert_eq!(bench.exercise_name, "Bench Press");
        assert_eq!(bench.sets.len(), MAX_SETS);
        assert_eq!(bench.sets[0], SetEntry::new(1, 60.0, 5));
        assert_eq!(bench.sets[1], SetEntry::new(2, 62.5, 4));
        assert_eq!(bench.sets[4].set, 5);
        assert_eq!(w1.exercises[1].sets, vec![SetEntry::new(1, 0.0, 0)]);

        let legs = &backup.workouts[1];
        assert_eq!(legs.name, "Legs");
        assert!(!legs.id.is_empty());
        assert!(legs.exercises.is_empty());
    }

    #[test]
    fn normalizes_exercises() {
        let backup = normalize_data(&json!({
            "exercises": [
                {"name": " Dip ", "mainMuscle": " Chest ", "recommendRep": 8, "type": "Compound"},
                {"name": ""},
                {"mainMuscle": "Back"}
            ]
        }))
        .unwrap();
        assert_eq!(backup.exercises.len(), 1);
        let dip = &backup.exercises[0];
        assert_eq!(dip.name, "Dip");
        assert_eq!(dip.main_muscle, "Chest");
        assert_eq!(dip.recommend_rep, "8");
        assert_eq!(dip.kind, "Compound");
        assert!(backup.workouts.is_empty());
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(normalize_data(&json!([1, 2])), Err(ValidationError::NotAnObject)));
        assert!(matches!(
            normalize_data(&json!({"workouts": {"a": 1}})),
            Err(ValidationError::NotAnArray("workouts"))
        ));
        assert!(matches!(parse_backup("{oops"), Err(ValidationError::NotJson(_))));
        assert_eq!(normalize_data(&json!({})).unwrap(), AppBackup::default());
    }

    #[test]
    fn merge_exercises_fills_blank_fields() {
        let mut current = vec![catalog_entry("Bench Press", "")];
        current[0].equipment = "Barbell".into();
        let mut incoming = vec![catalog_entry("bench press", "Chest"), catalog_entry("Dip", "Chest")];
        incoming[0].equipment = "Machine".into();

        let merged = merge_exercises(&current, &incoming);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "Bench Press");
        assert_eq!(merged[0].main_muscle, "Chest");
        assert_eq!(merged[0].equipment, "Barbell");
        assert_eq!(merged[1].name, "Dip");
    }

    #[test]
    fn merge_workouts_reassigns_colliding_ids() {
        let current = vec![workout("a", "2024-01-01", vec![])];
        let incoming = vec![workout("a", "2024-01-05", vec![]), workout("b", "2023-12-30", vec![])];
        let merged = merge_workouts(&current, &incoming);
        let dates: Vec<&str> = merged.iter().filter_map(|w| w.date.as_deref()).collect();
        assert_eq!(dates, vec!["2024-01-05", "2024-01-01", "2023-12-30"]);
        assert_ne!(merged[0].id, "a");
        assert_eq!(merged[1].id, "a");
        assert_eq!(merged[2].id, "b");
    }

    #[test]
    fn export_then_import_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        let backup = AppBackup {
            exercises: vec![catalog_entry("Squat", "Quads")],
            workouts: vec![workout("a", "2024-01-01", vec![])],
        };
        export_file(&path, &backup).unwrap();
        let imported = import_file(&path).unwrap();
        assert_eq!(imported.exercises, backup.exercises);
        assert_eq!(imported.workouts[0].id, "a");
        // workouts without exercises are kept as-is
        assert!(imported.workouts[0].exercises.is_empty());
    }
}

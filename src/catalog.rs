use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::dates::{self, format_date};
use crate::{ExerciseEntry, SetEntry, WorkoutRecord};

/// Sentinel muscle group for exercises without a catalog entry.
pub const UNKNOWN_MUSCLE: &str = "Unknown";

/// Most recent occurrence of an exercise, cached on its catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LastWorkout {
    pub date: String,
    pub sets: Vec<SetEntry>,
}

/// User-editable exercise metadata. Only `name` and `main_muscle` feed the
/// period metrics; the other fields are carried for import/export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExerciseCatalogEntry {
    #[serde(deserialize_with = "crate::lenient_text")]
    pub name: String,
    pub recommend_rep: String,
    #[serde(deserialize_with = "crate::lenient_text")]
    pub main_muscle: String,
    pub secondary_muscles: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub equipment: String,
    pub force: String,
    pub last_workout: Option<LastWorkout>,
}

#[derive(Debug, Clone, Copy)]
pub struct SeedInfo {
    pub main_muscle: &'static str,
    pub secondary_muscles: &'static str,
    pub kind: &'static str,
    pub equipment: &'static str,
    pub force: &'static str,
    pub recommend_rep: &'static str,
}

/// Exercises available before the user has created any of their own.
pub static SEED_EXERCISES: phf::Map<&'static str, SeedInfo> = phf_map! {
    "Bench Press" => SeedInfo {
        main_muscle: "Chest",
        secondary_muscles: "Triceps, Shoulders",
        kind: "Compound",
        equipment: "Barbell",
        force: "Push",
        recommend_rep: "5-8",
    },
    "Incline Dumbbell Press" => SeedInfo {
        main_muscle: "Chest",
        secondary_muscles: "Shoulders, Triceps",
        kind: "Compound",
        equipment: "Dumbbell",
        force: "Push",
        recommend_rep: "8-12",
    },
    "Overhead Press" => SeedInfo {
        main_muscle: "Shoulders",
        secondary_muscles: "Triceps",
        kind: "Compound",
        equipment: "Barbell",
        force: "Push",
        recommend_rep: "5-8",
    },
    "Lateral Raise" => SeedInfo {
        main_muscle: "Shoulders",
        secondary_muscles: "",
        kind: "Isolation",
        equipment: "Dumbbell",
        force: "Push",
        recommend_rep: "12-15",
    },
    "Squat" => SeedInfo {
        main_muscle: "Quads",
        secondary_muscles: "Glutes, Hamstrings",
        kind: "Compound",
        equipment: "Barbell",
        force: "Push",
        recommend_rep: "5-8",
    },
    "Romanian Deadlift" => SeedInfo {
        main_muscle: "Hamstrings",
        secondary_muscles: "Glutes, Lower Back",
        kind: "Compound",
        equipment: "Barbell",
        force: "Pull",
        recommend_rep: "6-10",
    },
    "Deadlift" => SeedInfo {
        main_muscle: "Back",
        secondary_muscles: "Glutes, Hamstrings",
        kind: "Compound",
        equipment: "Barbell",
        force: "Pull",
        recommend_rep: "3-5",
    },
    "Barbell Row" => SeedInfo {
        main_muscle: "Back",
        secondary_muscles: "Biceps",
        kind: "Compound",
        equipment: "Barbell",
        force: "Pull",
        recommend_rep: "6-10",
    },
    "Pull-Up" => SeedInfo {
        main_muscle: "Back",
        secondary_muscles: "Biceps",
        kind: "Compound",
        equipment: "Bodyweight",
        force: "Pull",
        recommend_rep: "6-12",
    },
    "Bicep Curl" => SeedInfo {
        main_muscle: "Biceps",
        secondary_muscles: "",
        kind: "Isolation",
        equipment: "Dumbbell",
        force: "Pull",
        recommend_rep: "10-15",
    },
    "Triceps Pushdown" => SeedInfo {
        main_muscle: "Triceps",
        secondary_muscles: "",
        kind: "Isolation",
        equipment: "Cable",
        force: "Push",
        recommend_rep: "10-15",
    },
    "Leg Curl" => SeedInfo {
        main_muscle: "Hamstrings",
        secondary_muscles: "",
        kind: "Isolation",
        equipment: "Machine",
        force: "Pull",
        recommend_rep: "10-15",
    },
    "Calf Raise" => SeedInfo {
        main_muscle: "Calves",
        secondary_muscles: "",
        kind: "Isolation",
        equipment: "Machine",
        force: "Push",
        recommend_rep: "12-20",
    },
};

/// Catalog used when nothing has been stored yet, sorted by name.
pub fn seed_catalog() -> Vec<ExerciseCatalogEntry> {
    let mut entries: Vec<ExerciseCatalogEntry> = SEED_EXERCISES
        .entries()
        .map(|(name, info)| ExerciseCatalogEntry {
            name: (*name).to_string(),
            recommend_rep: info.recommend_rep.into(),
            main_muscle: info.main_muscle.into(),
            secondary_muscles: info.secondary_muscles.into(),
            kind: info.kind.into(),
            equipment: info.equipment.into(),
            force: info.force.into(),
            last_workout: None,
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

/// Exact, case-sensitive lookup. The first entry wins on duplicate names.
pub fn find_exact<'a>(catalog: &'a [ExerciseCatalogEntry], name: &str) -> Option<&'a ExerciseCatalogEntry> {
    catalog.iter().find(|e| e.name == name)
}

pub fn find_ignore_case<'a>(
    catalog: &'a [ExerciseCatalogEntry],
    name: &str,
) -> Option<&'a ExerciseCatalogEntry> {
    let wanted = name.to_lowercase();
    catalog.iter().find(|e| e.name.to_lowercase() == wanted)
}

/// Exercise name to trimmed main muscle, for repeated lookups in one pass.
///
/// Names are matched case-sensitively and entries with a blank muscle are
/// left out so they resolve to [`UNKNOWN_MUSCLE`].
pub fn muscle_index(catalog: &[ExerciseCatalogEntry]) -> HashMap<&str, &str> {
    let mut index = HashMap::with_capacity(catalog.len());
    for e in catalog {
        index.entry(e.name.as_str()).or_insert(e.main_muscle.trim());
    }
    index.retain(|_, muscle| !muscle.is_empty());
    index
}

/// Main muscle for `exercise_name`, or [`UNKNOWN_MUSCLE`].
pub fn resolve_main_muscle(exercise_name: &str, catalog: &[ExerciseCatalogEntry]) -> String {
    find_exact(catalog, exercise_name)
        .map(|e| e.main_muscle.trim())
        .filter(|m| !m.is_empty())
        .unwrap_or(UNKNOWN_MUSCLE)
        .to_string()
}

/// Point every catalog entry at the latest workout that used it.
pub fn refresh_last_workouts(catalog: &mut [ExerciseCatalogEntry], records: &[WorkoutRecord]) {
    let mut latest: HashMap<&str, (chrono::NaiveDate, &[SetEntry])> = HashMap::new();
    for w in records {
        let Some(d) = w.parsed_date() else { continue };
        for ex in &w.exercises {
            let newer = latest
                .get(ex.exercise_name.as_str())
                .is_none_or(|(seen, _)| *seen < d);
            if newer {
                latest.insert(ex.exercise_name.as_str(), (d, ex.sets.as_slice()));
            }
        }
    }
    for entry in catalog.iter_mut() {
        entry.last_workout = latest.get(entry.name.as_str()).map(|(d, sets)| LastWorkout {
            date: format_date(*d),
            sets: sets.to_vec(),
        });
    }
}

/// Result of adding an exercise to a workout being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedEntry {
    pub entry: ExerciseEntry,
    /// Catalog entry to append when the name was not known yet.
    pub new_catalog_entry: Option<ExerciseCatalogEntry>,
}

/// Start a new exercise entry for `raw_name`.
///
/// The catalog is searched case-insensitively. Known exercises start from the
/// last set of their most recent workout, everything else from a single empty
/// set. Blank names give `None`.
pub fn prepare_entry(raw_name: &str, catalog: &[ExerciseCatalogEntry]) -> Option<PreparedEntry> {
    let name = raw_name.trim();
    if name.is_empty() {
        return None;
    }
    let existing = find_ignore_case(catalog, name);
    let first_set = existing
        .and_then(|e| e.last_workout.as_ref())
        .and_then(|last| last.sets.last())
        .map(|s| SetEntry::new(1, s.weight, s.reps))
        .unwrap_or_else(|| SetEntry::new(1, 0.0, 0));
    let new_catalog_entry = existing.is_none().then(|| ExerciseCatalogEntry {
        name: name.to_string(),
        ..Default::default()
    });
    Some(PreparedEntry {
        entry: ExerciseEntry {
            exercise_name: name.to_string(),
            sets: vec![first_set],
        },
        new_catalog_entry,
    })
}

/// Workouts that include `exercise_name`, newest first, paired with the
/// first matching exercise entry of each.
pub fn exercise_history<'a>(
    records: &'a [WorkoutRecord],
    exercise_name: &str,
) -> Vec<(&'a WorkoutRecord, &'a ExerciseEntry)> {
    let mut history: Vec<(&WorkoutRecord, &ExerciseEntry)> = records
        .iter()
        .filter_map(|w| {
            w.exercises
                .iter()
                .find(|e| e.exercise_name == exercise_name)
                .map(|e| (w, e))
        })
        .collect();
    history.sort_by(|a, b| b.0.parsed_date().cmp(&a.0.parsed_date()));
    history
}

/// Workouts logged on the given calendar day.
pub fn workouts_on(records: &[WorkoutRecord], day: chrono::NaiveDate) -> Vec<&WorkoutRecord> {
    records
        .iter()
        .filter(|w| dates::parse_date(w.date.as_deref()) == Some(day))
        .collect()
}

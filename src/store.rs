//! Key/value persistence for the application collections.
//!
//! Each key holds one JSON document. Loading never fails: a missing or
//! corrupt value falls back to the caller's default.

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use dirs_next as dirs;

use crate::backup::new_id;
use crate::body_weight::{WeightLogs, record_weight};
use crate::catalog::{ExerciseCatalogEntry, prepare_entry, refresh_last_workouts, seed_catalog};
use crate::dates::format_date;
use crate::units::WeightUnit;
use crate::{ExerciseEntry, WorkoutRecord};

pub const K_EXERCISES: &str = "mgym.exercises.v1";
pub const K_WORKOUTS: &str = "mgym.workouts.v1";
pub const K_UNIT: &str = "mgym.unit.v1";
pub const K_WEIGHT_LOGS: &str = "weightLogs";

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "storage I/O failed: {e}"),
            StoreError::Json(e) => write!(f, "invalid stored JSON: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

pub trait Store {
    /// Raw JSON text stored under `key`, if any.
    fn read(&self, key: &str) -> Option<String>;

    fn write(&mut self, key: &str, json: String) -> Result<(), StoreError>;

    /// Typed value under `key`, or `fallback` when absent or unparseable.
    fn load<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T
    where
        Self: Sized,
    {
        let Some(raw) = self.read(key) else {
            return fallback;
        };
        match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Ignoring stored value for {key}: {e}");
                fallback
            }
        }
    }

    /// Array under `key`, decoded one element at a time.
    ///
    /// Elements that fail to decode are dropped with a warning and the rest
    /// are kept. `Ok(None)` when the key is absent, an error when the value is
    /// not a JSON array.
    fn load_each<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>, StoreError>
    where
        Self: Sized,
    {
        let Some(raw) = self.read(key) else {
            return Ok(None);
        };
        let items: Vec<Value> = serde_json::from_str(&raw)?;
        let decoded = items
            .into_iter()
            .enumerate()
            .filter_map(|(idx, item)| match serde_json::from_value(item) {
                Ok(v) => Some(v),
                Err(e) => {
                    log::warn!("Dropping entry {idx} of {key}: {e}");
                    None
                }
            })
            .collect();
        Ok(Some(decoded))
    }

    fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.write(key, json)
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    const DIR: &'static str = "gym_summary";

    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Store under the platform data directory, e.g. `~/.local/share/gym_summary`.
    pub fn default_location() -> Option<Self> {
        dirs::data_dir().map(|p| Self::new(p.join(Self::DIR)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Store for JsonFileStore {
    fn read(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path(key)).ok()
    }

    fn write(&mut self, key: &str, json: String) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(key), json)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn write(&mut self, key: &str, json: String) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), json);
        Ok(())
    }
}

/// The persisted collections, loaded together.
#[derive(Debug, Clone, PartialEq)]
pub struct AppData {
    pub exercises: Vec<ExerciseCatalogEntry>,
    pub workouts: Vec<WorkoutRecord>,
    pub weight_logs: WeightLogs,
    pub unit: WeightUnit,
}

impl AppData {
    /// Load every collection, seeding the exercise catalog on first run and
    /// refreshing each exercise's last workout.
    ///
    /// A collection that is not a JSON array is logged and replaced by its
    /// fallback. Use [`AppData::try_load`] before writing back to the store.
    pub fn load<S: Store>(store: &S) -> Self {
        fn or_warn<T>(key: &str, loaded: Result<Option<T>, StoreError>) -> Option<T> {
            loaded.unwrap_or_else(|e| {
                log::warn!("Ignoring stored value for {key}: {e}");
                None
            })
        }
        let workouts = or_warn(K_WORKOUTS, store.load_each(K_WORKOUTS)).unwrap_or_default();
        let exercises = or_warn(K_EXERCISES, store.load_each(K_EXERCISES)).unwrap_or_else(seed_catalog);
        Self::assemble(store, exercises, workouts)
    }

    /// Like [`AppData::load`] but fails when a stored collection is unreadable,
    /// so a later save cannot overwrite it.
    pub fn try_load<S: Store>(store: &S) -> Result<Self, StoreError> {
        let workouts = store.load_each(K_WORKOUTS)?.unwrap_or_default();
        let exercises = store.load_each(K_EXERCISES)?.unwrap_or_else(seed_catalog);
        Ok(Self::assemble(store, exercises, workouts))
    }

    fn assemble<S: Store>(
        store: &S,
        mut exercises: Vec<ExerciseCatalogEntry>,
        workouts: Vec<WorkoutRecord>,
    ) -> Self {
        refresh_last_workouts(&mut exercises, &workouts);
        let data = Self {
            exercises,
            workouts,
            weight_logs: store.load(K_WEIGHT_LOGS, WeightLogs::new()),
            unit: store.load(K_UNIT, WeightUnit::default()),
        };
        log::info!(
            "Loaded {} workouts and {} exercises",
            data.workouts.len(),
            data.exercises.len()
        );
        data
    }

    /// Add `exercise_name` to the workout logged on `day`, creating the
    /// workout when there is none yet.
    ///
    /// The entry is prefilled from the exercise's last set and unknown names
    /// are added to the catalog. Returns the new entry, or `None` for a blank
    /// name.
    pub fn add_exercise(&mut self, day: NaiveDate, exercise_name: &str) -> Option<&ExerciseEntry> {
        let prepared = prepare_entry(exercise_name, &self.exercises)?;
        if let Some(entry) = prepared.new_catalog_entry {
            self.exercises.push(entry);
        }
        let idx = match self.workouts.iter().position(|w| w.parsed_date() == Some(day)) {
            Some(idx) => idx,
            None => {
                let date = format_date(day);
                self.workouts.insert(
                    0,
                    WorkoutRecord {
                        id: new_id(),
                        date: Some(date.clone()),
                        name: date,
                        exercises: Vec::new(),
                    },
                );
                0
            }
        };
        self.workouts[idx].exercises.push(prepared.entry);
        refresh_last_workouts(&mut self.exercises, &self.workouts);
        self.workouts[idx].exercises.last()
    }

    /// Set or clear the body weight logged on `day`, in kilograms.
    pub fn record_weight(&mut self, day: NaiveDate, kg: Option<f64>) {
        record_weight(&mut self.weight_logs, day, kg);
    }

    pub fn save<S: Store>(&self, store: &mut S) -> Result<(), StoreError> {
        store.save(K_EXERCISES, &self.exercises)?;
        store.save(K_WORKOUTS, &self.workouts)?;
        store.save(K_WEIGHT_LOGS, &self.weight_logs)?;
        store.save(K_UNIT, &self.unit)
    }
}

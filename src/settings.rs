//! Persistent user preferences.

use dirs_next as dirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::periods::Granularity;
use crate::units::WeightUnit;

fn default_report_chart() -> bool {
    true
}

/// Preferences stored as JSON in the user's config directory.
///
/// Every field has a serde default so files written by older versions load
/// without losing the values they do contain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub unit: WeightUnit,
    #[serde(default)]
    pub granularity: Granularity,
    /// Overrides the default data directory of the JSON store.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Embed the weekly reps chart in HTML reports.
    #[serde(default = "default_report_chart")]
    pub report_chart: bool,
}

impl Settings {
    const FILE: &'static str = "gym_summary_settings.json";

    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(Self::FILE))
    }

    /// Load settings, falling back to defaults when the file is missing or
    /// cannot be parsed.
    pub fn load() -> Self {
        if let Some(path) = Self::path() {
            if let Ok(data) = std::fs::read_to_string(&path) {
                match serde_json::from_str(&data) {
                    Ok(cfg) => return cfg,
                    Err(e) => log::warn!("Ignoring invalid settings in {}: {e}", path.display()),
                }
            }
        }
        Self::default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match serde_json::to_string_pretty(self) {
                Ok(data) => {
                    if let Err(e) = std::fs::write(&path, data) {
                        log::warn!("Failed to save settings to {}: {e}", path.display());
                    }
                }
                Err(e) => log::warn!("Failed to encode settings: {e}"),
            }
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unit: WeightUnit::Kg,
            granularity: Granularity::Week,
            data_dir: None,
            report_chart: true,
        }
    }
}

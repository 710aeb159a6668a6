//! # Settings Repository
//!
//! App-wide settings kept in a single `settings.json` at the root of the
//! base directory, next to `data/`, `exports/` and `backups/`.
//!
//! ```json
//! {
//!   "data_format_version": "1.0",
//!   "backup_interval_minutes": 60,
//!   "last_selected_class": 3,
//!   "created_at": "2024-01-21T19:30:00+00:00",
//!   "updated_at": "2024-01-21T19:35:00+00:00"
//! }
//! ```

use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;

use super::connection::{replace_file, CsvConnection};
use crate::backend::domain::errors::Result;
use crate::backend::storage::traits::SettingsStorage;

pub const DEFAULT_BACKUP_INTERVAL_MINUTES: u64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Data format version for future migrations
    pub data_format_version: String,
    /// How often the running app snapshots `data/`
    #[serde(default = "default_backup_interval")]
    pub backup_interval_minutes: u64,
    /// Class the user last worked with, restored on the next launch
    #[serde(default)]
    pub last_selected_class: Option<u8>,
    pub created_at: String,
    pub updated_at: String,
}

fn default_backup_interval() -> u64 {
    DEFAULT_BACKUP_INTERVAL_MINUTES
}

impl Default for AppSettings {
    fn default() -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            data_format_version: "1.0".to_string(),
            backup_interval_minutes: DEFAULT_BACKUP_INTERVAL_MINUTES,
            last_selected_class: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// File-based settings repository using a single JSON file
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    connection: CsvConnection,
}

impl SettingsRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn load_or_create(&self) -> Result<AppSettings> {
        let path = self.connection.settings_file_path();

        if path.exists() {
            let json = fs::read_to_string(&path)?;
            let settings: AppSettings = serde_json::from_str(&json)?;
            debug!("Loaded settings from {:?}", path);
            Ok(settings)
        } else {
            let settings = AppSettings::default();
            self.save(&settings)?;
            info!("Created default settings at {:?}", path);
            Ok(settings)
        }
    }

    fn save(&self, settings: &AppSettings) -> Result<()> {
        let path = self.connection.settings_file_path();
        let json = serde_json::to_string_pretty(settings)?;
        replace_file(&path, |out| {
            out.write_all(json.as_bytes())?;
            Ok(())
        })?;
        debug!("Saved settings to {:?}", path);
        Ok(())
    }
}

impl SettingsStorage for SettingsRepository {
    fn get_settings(&self) -> Result<AppSettings> {
        self.load_or_create()
    }

    fn update_settings(&self, settings: &AppSettings) -> Result<()> {
        let mut updated = settings.clone();
        updated.updated_at = Utc::now().to_rfc3339();
        self.save(&updated)?;
        info!("Updated settings");
        Ok(())
    }
}

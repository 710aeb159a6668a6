use log::{info, warn};

use crate::backend::domain::errors::Result;
use crate::backend::domain::models::ClassNumber;
use crate::backend::storage::csv::settings_repository::DEFAULT_BACKUP_INTERVAL_MINUTES;
use crate::backend::storage::csv::{AppSettings, CsvConnection, SettingsRepository};
use crate::backend::storage::traits::SettingsStorage;

/// App preferences kept in `settings.json`
#[derive(Debug, Clone)]
pub struct SettingsService {
    settings_repository: SettingsRepository,
}

impl SettingsService {
    pub fn new(connection: CsvConnection) -> Self {
        Self {
            settings_repository: SettingsRepository::new(connection),
        }
    }

    pub fn get_settings(&self) -> Result<AppSettings> {
        self.settings_repository.get_settings()
    }

    /// Remember the class the user is working with for the next launch
    pub fn select_class(&self, class_num: ClassNumber) -> Result<AppSettings> {
        let mut settings = self.settings_repository.get_settings()?;
        settings.last_selected_class = Some(class_num.get());
        self.settings_repository.update_settings(&settings)?;
        info!("Selected class {}", class_num);
        self.settings_repository.get_settings()
    }

    /// The remembered class, if it is still a valid class number
    pub fn last_selected_class(&self) -> Option<ClassNumber> {
        let settings = self.get_settings().ok()?;
        settings
            .last_selected_class
            .and_then(|n| ClassNumber::new(n).ok())
    }

    /// Backup interval, falling back to the default when settings are unreadable
    pub fn backup_interval_minutes(&self) -> u64 {
        match self.get_settings() {
            Ok(settings) => settings.backup_interval_minutes,
            Err(e) => {
                warn!("Could not read settings, using default backup interval: {}", e);
                DEFAULT_BACKUP_INTERVAL_MINUTES
            }
        }
    }
}

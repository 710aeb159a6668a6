//! # Storage Traits
//!
//! Storage abstractions the domain services work against. Every mutation
//! rewrites a whole table; there is no row-level update.

use crate::backend::domain::errors::Result;
use crate::backend::domain::models::{AttendanceEvent, ClassNumber, Student};
use crate::backend::storage::csv::settings_repository::AppSettings;

/// Trait defining the interface for class roster storage
pub trait RosterStorage: Send + Sync {
    /// Whether the class has a table on disk
    fn class_exists(&self, class_num: ClassNumber) -> bool;

    /// Load every student of a class. A missing table is empty, an
    /// unreadable one is an error.
    fn load_class(&self, class_num: ClassNumber) -> Result<Vec<Student>>;

    /// Replace the class table with `students`
    fn save_class(&self, class_num: ClassNumber, students: &[Student]) -> Result<()>;
}

/// Trait defining the interface for attendance log storage
pub trait AttendanceLogStorage: Send + Sync {
    fn log_exists(&self) -> bool;

    /// Load the whole log in the order it was written. A missing log is empty.
    fn load_events(&self) -> Result<Vec<AttendanceEvent>>;

    /// Replace the whole log with `events`
    fn save_events(&self, events: &[AttendanceEvent]) -> Result<()>;
}

/// Trait defining the interface for the app settings file
pub trait SettingsStorage: Send + Sync {
    /// Get the settings, creating the file with defaults if needed
    fn get_settings(&self) -> Result<AppSettings>;

    fn update_settings(&self, settings: &AppSettings) -> Result<()>;
}

//! # CSV Storage Module
//!
//! Flat-file storage for the attendance tracker. Every table is a UTF-8 CSV
//! file with a header row, rewritten in full on each change.
//!
//! ## File Layout
//!
//! ```text
//! <base>/
//! ├── settings.json
//! ├── data/
//! │   ├── class_1.csv … class_8.csv
//! │   └── attendance_records.csv
//! ├── exports/
//! │   ├── class_3_20240105_143000.csv
//! │   └── all_classes_20240105_143000.csv
//! └── backups/
//!     └── backup_20240105_150000/
//! ```

pub mod attendance_repository;
pub mod connection;
pub mod roster_repository;
pub mod settings_repository;

#[cfg(test)]
pub mod test_utils;

pub use attendance_repository::AttendanceRepository;
pub use connection::{CsvConnection, StorageLayout};
pub use roster_repository::RosterRepository;
pub use settings_repository::{AppSettings, SettingsRepository};

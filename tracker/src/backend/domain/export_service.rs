//! Export service domain logic for the attendance tracker.
//!
//! Writes a snapshot of one roster, or of every roster combined, into
//! `exports/` for sharing outside the app. Exports are never read back.

use chrono::{Local, NaiveDateTime};
use csv::WriterBuilder;
use log::{error, info, warn};
use std::path::PathBuf;

use crate::backend::domain::errors::{Result, TrackerError};
use crate::backend::domain::models::{ClassNumber, Student};
use crate::backend::domain::FILE_TIMESTAMP_FORMAT;
use crate::backend::storage::csv::connection::{replace_file, TABLE_EXTENSION};
use crate::backend::storage::csv::roster_repository::{CsvStudent, ROSTER_HEADER};
use crate::backend::storage::csv::{CsvConnection, RosterRepository};
use crate::backend::storage::traits::RosterStorage;

/// Extra leading column of the combined export
pub const CLASS_COLUMN: &str = "class_num";

/// Export service that handles all export-related business logic
#[derive(Debug, Clone)]
pub struct ExportService {
    connection: CsvConnection,
    roster_repository: RosterRepository,
}

impl ExportService {
    pub fn new(connection: CsvConnection) -> Self {
        Self {
            roster_repository: RosterRepository::new(connection.clone()),
            connection,
        }
    }

    /// Export one class, or all classes when `class_num` is `None`.
    /// Returns the written file, or `None` if there was nothing to export or
    /// the write failed.
    pub fn export(&self, class_num: Option<ClassNumber>) -> Option<PathBuf> {
        self.export_at(class_num, Local::now().naive_local())
    }

    pub fn export_at(&self, class_num: Option<ClassNumber>, now: NaiveDateTime) -> Option<PathBuf> {
        let result = match class_num {
            Some(class_num) => self.export_class(class_num, now),
            None => self.export_all(now),
        };

        match result {
            Ok(Some(path)) => {
                info!("📄 EXPORT: Wrote {}", path.display());
                Some(path)
            }
            Ok(None) => {
                warn!("📄 EXPORT: Nothing to export");
                None
            }
            Err(e) => {
                error!("❌ EXPORT: Export failed: {}", e);
                None
            }
        }
    }

    fn export_class(&self, class_num: ClassNumber, now: NaiveDateTime) -> Result<Option<PathBuf>> {
        let students = self.roster_repository.load_class(class_num)?;
        if students.is_empty() {
            info!("Class {} has no students to export", class_num);
            return Ok(None);
        }

        let path = self.export_path(&format!("class_{}", class_num), now)?;
        replace_file(&path, |out| {
            let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);
            writer.write_record(ROSTER_HEADER)?;
            for student in &students {
                writer.write_record(CsvStudent::from_domain(student).fields())?;
            }
            writer.flush()?;
            Ok(())
        })?;
        Ok(Some(path))
    }

    fn export_all(&self, now: NaiveDateTime) -> Result<Option<PathBuf>> {
        let mut classes: Vec<(ClassNumber, Vec<Student>)> = Vec::new();
        for class_num in ClassNumber::all() {
            let students = match self.roster_repository.load_class(class_num) {
                Ok(students) => students,
                Err(e) => {
                    warn!("📄 EXPORT: Skipping unreadable roster for class {}: {}", class_num, e);
                    continue;
                }
            };
            if !students.is_empty() {
                classes.push((class_num, students));
            }
        }
        if classes.is_empty() {
            info!("All classes are empty, nothing to export");
            return Ok(None);
        }

        let path = self.export_path("all_classes", now)?;
        replace_file(&path, |out| {
            let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);
            writer.write_record(std::iter::once(CLASS_COLUMN).chain(ROSTER_HEADER))?;
            for (class_num, students) in &classes {
                let class_field = class_num.to_string();
                for student in students {
                    let row = CsvStudent::from_domain(student);
                    writer.write_record(std::iter::once(class_field.as_str()).chain(row.fields()))?;
                }
            }
            writer.flush()?;
            Ok(())
        })?;
        Ok(Some(path))
    }

    fn export_path(&self, stem: &str, now: NaiveDateTime) -> Result<PathBuf> {
        let layout = self.connection.ensure_directories()?;
        let path = layout.exports.join(format!(
            "{}_{}.{}",
            stem,
            now.format(FILE_TIMESTAMP_FORMAT),
            TABLE_EXTENSION
        ));
        if path.exists() {
            return Err(TrackerError::validation(format!(
                "Export {} already exists, try again in a second",
                path.display()
            )));
        }
        Ok(path)
    }
}

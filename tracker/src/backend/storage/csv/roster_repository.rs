//! Class roster tables, one CSV file per class under `data/`.
//!
//! ```csv
//! student_id,name,father_name,mother_name,contact,address,attendance_count,total_days,last_attendance_date,last_attendance_status
//! STU-7Q2K9XBA,Alice,Bob,Carol,555-0100,12 Elm St,3,4,2024-01-04,absent
//! ```

use csv::{ReaderBuilder, WriterBuilder};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::connection::{replace_file, CsvConnection};
use crate::backend::domain::errors::{Result, TrackerError};
use crate::backend::domain::models::attendance::{format_date, parse_date};
use crate::backend::domain::models::{AttendanceStatus, ClassNumber, Student};
use crate::backend::storage::traits::RosterStorage;

pub const ROSTER_HEADER: [&str; 10] = [
    "student_id",
    "name",
    "father_name",
    "mother_name",
    "contact",
    "address",
    "attendance_count",
    "total_days",
    "last_attendance_date",
    "last_attendance_status",
];

/// Row shape on disk; every field stays a string until validated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CsvStudent {
    pub student_id: String,
    pub name: String,
    #[serde(default)]
    pub father_name: String,
    #[serde(default)]
    pub mother_name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub attendance_count: String,
    #[serde(default)]
    pub total_days: String,
    #[serde(default)]
    pub last_attendance_date: String,
    #[serde(default)]
    pub last_attendance_status: String,
}

impl CsvStudent {
    pub(crate) fn from_domain(student: &Student) -> Self {
        Self {
            student_id: student.student_id.clone(),
            name: student.name.clone(),
            father_name: student.father_name.clone(),
            mother_name: student.mother_name.clone(),
            contact: student.contact.clone(),
            address: student.address.clone(),
            attendance_count: student.attendance_count.to_string(),
            total_days: student.total_days.to_string(),
            last_attendance_date: student
                .last_attendance_date
                .map(format_date)
                .unwrap_or_default(),
            last_attendance_status: student
                .last_attendance_status
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
        }
    }

    /// Field values in `ROSTER_HEADER` order
    pub(crate) fn fields(&self) -> [&str; 10] {
        [
            self.student_id.as_str(),
            self.name.as_str(),
            self.father_name.as_str(),
            self.mother_name.as_str(),
            self.contact.as_str(),
            self.address.as_str(),
            self.attendance_count.as_str(),
            self.total_days.as_str(),
            self.last_attendance_date.as_str(),
            self.last_attendance_status.as_str(),
        ]
    }

    fn into_domain(self, file: &Path) -> Result<Student> {
        let corrupt = |message: String| TrackerError::CorruptRecord {
            file: file.to_path_buf(),
            message,
        };

        let attendance_count = parse_counter(&self.attendance_count)
            .ok_or_else(|| corrupt(format!("bad attendance_count '{}'", self.attendance_count)))?;
        let total_days = parse_counter(&self.total_days)
            .ok_or_else(|| corrupt(format!("bad total_days '{}'", self.total_days)))?;

        let last_attendance_date = match self.last_attendance_date.trim() {
            "" => None,
            value => Some(
                parse_date(value)
                    .map_err(|_| corrupt(format!("bad last_attendance_date '{}'", value)))?,
            ),
        };
        let last_attendance_status = match self.last_attendance_status.trim() {
            "" => None,
            value => Some(value.parse::<AttendanceStatus>().map_err(corrupt)?),
        };

        Ok(Student {
            student_id: self.student_id,
            name: self.name,
            father_name: self.father_name,
            mother_name: self.mother_name,
            contact: self.contact,
            address: self.address,
            attendance_count,
            total_days,
            last_attendance_date,
            last_attendance_status,
        })
    }
}

/// Empty counters read as zero
fn parse_counter(value: &str) -> Option<u32> {
    match value.trim() {
        "" => Some(0),
        value => value.parse().ok(),
    }
}

/// CSV-based roster repository
#[derive(Debug, Clone)]
pub struct RosterRepository {
    connection: CsvConnection,
}

impl RosterRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Create an empty table for the class if it has no file yet.
    /// Returns true when a file was created.
    pub fn ensure_class_file(&self, class_num: ClassNumber) -> Result<bool> {
        if self.class_exists(class_num) {
            return Ok(false);
        }
        self.save_class(class_num, &[])?;
        info!("Created empty roster for class {}", class_num);
        Ok(true)
    }

    fn read_students(&self, path: &Path) -> Result<Vec<Student>> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

        let mut students = Vec::new();
        for result in reader.deserialize::<CsvStudent>() {
            let row = result?;
            students.push(row.into_domain(path)?);
        }

        debug!("Read {} students from {}", students.len(), path.display());
        Ok(students)
    }

    fn write_students(&self, path: &Path, students: &[Student]) -> Result<()> {
        replace_file(path, |out| {
            let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);
            writer.write_record(ROSTER_HEADER)?;
            for student in students {
                writer.serialize(CsvStudent::from_domain(student))?;
            }
            writer.flush()?;
            Ok(())
        })
    }
}

impl RosterStorage for RosterRepository {
    fn class_exists(&self, class_num: ClassNumber) -> bool {
        self.connection.class_file_path(class_num).exists()
    }

    fn load_class(&self, class_num: ClassNumber) -> Result<Vec<Student>> {
        let path = self.connection.class_file_path(class_num);
        if !path.exists() {
            return Ok(Vec::new());
        }
        self.read_students(&path)
    }

    fn save_class(&self, class_num: ClassNumber, students: &[Student]) -> Result<()> {
        let path = self.connection.class_file_path(class_num);
        self.write_students(&path, students)?;
        debug!("Saved {} students for class {}", students.len(), class_num);
        Ok(())
    }
}

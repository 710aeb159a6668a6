//! The attendance log: a single CSV file holding every mark ever saved.
//!
//! ```csv
//! date,class_num,student_id,status,reason
//! 2024-01-01,1,STU-7Q2K9XBA,present,
//! 2024-01-01,1,STU-M4X8ZP0C,absent,fever
//! ```

use csv::{ReaderBuilder, WriterBuilder};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::connection::{replace_file, CsvConnection};
use crate::backend::domain::errors::{Result, TrackerError};
use crate::backend::domain::models::attendance::{format_date, parse_date};
use crate::backend::domain::models::{AttendanceEvent, AttendanceStatus, ClassNumber};
use crate::backend::storage::traits::AttendanceLogStorage;

pub const LOG_HEADER: [&str; 5] = ["date", "class_num", "student_id", "status", "reason"];

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CsvAttendanceRecord {
    date: String,
    class_num: String,
    student_id: String,
    status: String,
    #[serde(default)]
    reason: String,
}

impl CsvAttendanceRecord {
    fn from_domain(event: &AttendanceEvent) -> Self {
        Self {
            date: format_date(event.date),
            class_num: event.class_num.to_string(),
            student_id: event.student_id.clone(),
            status: event.status.as_str().to_string(),
            reason: event.reason.clone(),
        }
    }

    fn into_domain(self, file: &Path, line: u64) -> Result<AttendanceEvent> {
        let corrupt = |message: String| TrackerError::CorruptRecord {
            file: file.to_path_buf(),
            message: format!("line {}: {}", line, message),
        };

        let date = parse_date(&self.date).map_err(|_| corrupt(format!("bad date '{}'", self.date)))?;
        let class_num = self
            .class_num
            .parse::<ClassNumber>()
            .map_err(|e| corrupt(e.to_string()))?;
        let status = self.status.parse::<AttendanceStatus>().map_err(corrupt)?;

        Ok(AttendanceEvent {
            date,
            class_num,
            student_id: self.student_id,
            status,
            reason: self.reason,
        })
    }
}

/// CSV-based attendance log repository
#[derive(Debug, Clone)]
pub struct AttendanceRepository {
    connection: CsvConnection,
}

impl AttendanceRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_events(&self, path: &Path) -> Result<Vec<AttendanceEvent>> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

        let mut events = Vec::new();
        for result in reader.deserialize::<CsvAttendanceRecord>() {
            let record = result?;
            // Header is line 1
            let line = events.len() as u64 + 2;
            events.push(record.into_domain(path, line)?);
        }

        debug!("Read {} attendance events from {}", events.len(), path.display());
        Ok(events)
    }

    fn write_events(&self, path: &Path, events: &[AttendanceEvent]) -> Result<()> {
        replace_file(path, |out| {
            let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);
            writer.write_record(LOG_HEADER)?;
            for event in events {
                writer.serialize(CsvAttendanceRecord::from_domain(event))?;
            }
            writer.flush()?;
            Ok(())
        })
    }
}

impl AttendanceLogStorage for AttendanceRepository {
    fn log_exists(&self) -> bool {
        self.connection.log_file_path().exists()
    }

    fn load_events(&self) -> Result<Vec<AttendanceEvent>> {
        let path = self.connection.log_file_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        self.read_events(&path)
    }

    fn save_events(&self, events: &[AttendanceEvent]) -> Result<()> {
        let path = self.connection.log_file_path();
        self.write_events(&path, events)?;
        debug!("Saved {} attendance events", events.len());
        Ok(())
    }
}

use chrono::NaiveDate;
use log::{error, info, warn};

use crate::backend::domain::commands::attendance::{MarkAttendanceCommand, MarkAttendanceResult};
use crate::backend::domain::errors::{Result, TrackerError};
use crate::backend::domain::models::attendance::{format_date, latest_per_key, parse_date};
use crate::backend::domain::models::{AttendanceEvent, AttendanceStatus, ClassNumber};
use crate::backend::domain::roster_service::RosterService;
use crate::backend::domain::rollup_service::RollupService;
use crate::backend::storage::csv::{AttendanceRepository, CsvConnection};
use crate::backend::storage::traits::AttendanceLogStorage;

/// Service for the attendance log. Every successful write is followed by a
/// rollup so roster counters never lag behind the log.
#[derive(Debug, Clone)]
pub struct AttendanceService {
    attendance_repository: AttendanceRepository,
    roster_service: RosterService,
    rollup_service: RollupService,
}

impl AttendanceService {
    pub fn new(connection: CsvConnection, roster_service: RosterService, rollup_service: RollupService) -> Self {
        Self {
            attendance_repository: AttendanceRepository::new(connection),
            roster_service,
            rollup_service,
        }
    }

    /// Append a batch of events and roll up. Returns false, leaving the log
    /// untouched, when the batch is empty or the log cannot be rewritten.
    pub fn append_events(&self, events: &[AttendanceEvent]) -> bool {
        if events.is_empty() {
            warn!("Ignoring empty attendance batch");
            return false;
        }

        match self.write_batch(events) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to save {} attendance events: {}", events.len(), e);
                false
            }
        }
    }

    /// The whole log in write order. An unreadable log is logged and read as empty.
    pub fn read_log(&self) -> Vec<AttendanceEvent> {
        match self.attendance_repository.load_events() {
            Ok(events) => events,
            Err(e) => {
                warn!("Attendance log is unreadable, showing it as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Save one day of marks for a class
    pub fn mark_attendance(&self, command: MarkAttendanceCommand) -> Result<MarkAttendanceResult> {
        let date = parse_date(&command.date).map_err(|_| {
            TrackerError::validation(format!("Invalid date '{}', expected YYYY-MM-DD", command.date))
        })?;
        if command.marks.is_empty() {
            return Err(TrackerError::validation("No students were marked"));
        }

        let enrolled = self.roster_service.student_ids(command.class_num)?;
        let mut events = Vec::with_capacity(command.marks.len());
        for mark in command.marks {
            if !enrolled.contains(&mark.student_id) {
                return Err(TrackerError::validation(format!(
                    "Student {} is not in class {}",
                    mark.student_id, command.class_num
                )));
            }

            let reason = match mark.status {
                AttendanceStatus::Present => String::new(),
                AttendanceStatus::Absent => mark.reason.trim().to_string(),
            };
            events.push(AttendanceEvent::new(date, command.class_num, mark.student_id, mark.status, reason));
        }

        self.write_batch(&events)?;

        let recorded_count = events.len();
        info!(
            "Recorded {} marks for class {} on {}",
            recorded_count,
            command.class_num,
            format_date(date)
        );
        Ok(MarkAttendanceResult {
            recorded_count,
            success_message: format!(
                "Attendance saved for {} students of class {} on {}",
                recorded_count,
                command.class_num,
                format_date(date)
            ),
        })
    }

    /// Current mark of each student for one day, latest logged row winning
    pub fn day_marks(&self, class_num: ClassNumber, date: NaiveDate) -> Vec<AttendanceEvent> {
        let log = self.read_log();
        latest_per_key(log.iter().filter(|e| e.class_num == class_num && e.date == date))
            .into_iter()
            .cloned()
            .collect()
    }

    fn write_batch(&self, events: &[AttendanceEvent]) -> Result<()> {
        // Strict read: appending to a log we could not parse would drop its rows
        let mut log = self.attendance_repository.load_events()?;
        log.extend_from_slice(events);
        self.attendance_repository.save_events(&log)?;
        info!("Appended {} events, log now holds {}", events.len(), log.len());

        self.rollup_service.recompute_all();
        Ok(())
    }
}

use chrono::NaiveDate;
use log::{info, warn};

use crate::backend::domain::commands::report::ReportQuery;
use crate::backend::domain::errors::{Result, TrackerError};
use crate::backend::domain::models::attendance::{format_date, latest_per_key, parse_date};
use crate::backend::domain::models::{
    AttendanceEvent, ReportCounts, ReportOutcome, ReportStats, Student, StudentAttendanceSummary,
};
use crate::backend::storage::csv::{AttendanceRepository, CsvConnection, RosterRepository};
use crate::backend::storage::traits::{AttendanceLogStorage, RosterStorage};

/// Percentage reports over a class and an inclusive date range
#[derive(Debug, Clone)]
pub struct ReportService {
    attendance_repository: AttendanceRepository,
    roster_repository: RosterRepository,
}

impl ReportService {
    pub fn new(connection: CsvConnection) -> Self {
        Self {
            attendance_repository: AttendanceRepository::new(connection.clone()),
            roster_repository: RosterRepository::new(connection),
        }
    }

    pub fn generate_report(&self, query: ReportQuery) -> Result<ReportStats> {
        let start_date = Self::parse_bound("start", &query.start_date)?;
        let end_date = Self::parse_bound("end", &query.end_date)?;
        if start_date > end_date {
            return Err(TrackerError::validation(format!(
                "Start date {} is after end date {}",
                format_date(start_date),
                format_date(end_date)
            )));
        }

        let stats = |outcome| ReportStats {
            class_num: query.class_num,
            start_date,
            end_date,
            outcome,
        };

        if !self.attendance_repository.log_exists() {
            info!("No attendance log yet, nothing to report for class {}", query.class_num);
            return Ok(stats(ReportOutcome::NoLogFile));
        }

        let log = self.attendance_repository.load_events().unwrap_or_else(|e| {
            warn!("Attendance log is unreadable, reporting it as empty: {}", e);
            Vec::new()
        });

        let in_range = latest_per_key(log.iter().filter(|e| {
            e.class_num == query.class_num && e.date >= start_date && e.date <= end_date
        }));
        if in_range.is_empty() {
            info!(
                "No records for class {} between {} and {}",
                query.class_num,
                format_date(start_date),
                format_date(end_date)
            );
            return Ok(stats(ReportOutcome::NoRecordsInRange));
        }

        let present_count = in_range.iter().filter(|e| e.status.is_present()).count();
        let counts = ReportCounts {
            total_records: in_range.len(),
            present_count,
            absent_count: in_range.len() - present_count,
        };

        let roster = self.roster_repository.load_class(query.class_num).unwrap_or_else(|e| {
            warn!("Roster for class {} is unreadable, report lists IDs only: {}", query.class_num, e);
            Vec::new()
        });
        let students = per_student(&roster, &in_range);

        info!(
            "Report for class {}: {} records, {:.1}% present",
            query.class_num,
            counts.total_records,
            counts.present_percent()
        );
        Ok(stats(ReportOutcome::Records { counts, students }))
    }

    fn parse_bound(which: &str, value: &str) -> Result<NaiveDate> {
        parse_date(value).map_err(|_| {
            TrackerError::validation(format!("Invalid {} date '{}', expected YYYY-MM-DD", which, value))
        })
    }
}

/// One row per roster student in roster order, then one per unknown ID in
/// the order it first appears in the log.
fn per_student(roster: &[Student], events: &[&AttendanceEvent]) -> Vec<StudentAttendanceSummary> {
    let mut rows: Vec<StudentAttendanceSummary> = roster
        .iter()
        .map(|s| StudentAttendanceSummary {
            student_id: s.student_id.clone(),
            name: s.name.clone(),
            present_count: 0,
            absent_count: 0,
        })
        .collect();

    for event in events {
        let index = match rows.iter().position(|r| r.student_id == event.student_id) {
            Some(index) => index,
            None => {
                rows.push(StudentAttendanceSummary {
                    student_id: event.student_id.clone(),
                    name: String::new(),
                    present_count: 0,
                    absent_count: 0,
                });
                rows.len() - 1
            }
        };

        if event.status.is_present() {
            rows[index].present_count += 1;
        } else {
            rows[index].absent_count += 1;
        }
    }

    rows
}

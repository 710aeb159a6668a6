//! Rollup of the derived attendance fields on every roster row.
//!
//! `attendance_count`, `total_days` and the two `last_attendance_*` fields are
//! never edited directly. They are recomputed from the log after every save.
//! Repeated marks for the same (date, class, student) count once, using the
//! mark that was logged last.

use log::{debug, error, info, warn};

use crate::backend::domain::commands::rollup::RollupSummary;
use crate::backend::domain::errors::Result;
use crate::backend::domain::models::attendance::latest_per_key;
use crate::backend::domain::models::{AttendanceEvent, ClassNumber, Student};
use crate::backend::storage::csv::{AttendanceRepository, CsvConnection, RosterRepository};
use crate::backend::storage::traits::{AttendanceLogStorage, RosterStorage};

#[derive(Debug, Clone)]
pub struct RollupService {
    roster_repository: RosterRepository,
    attendance_repository: AttendanceRepository,
}

/// Outcome for a single class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassRollup {
    Updated,
    /// Roster missing or empty
    Skipped,
}

impl RollupService {
    pub fn new(connection: CsvConnection) -> Self {
        Self {
            roster_repository: RosterRepository::new(connection.clone()),
            attendance_repository: AttendanceRepository::new(connection),
        }
    }

    /// Recompute every class. A class that fails is logged and reported in
    /// `failed`; the remaining classes are still processed.
    pub fn recompute_all(&self) -> RollupSummary {
        let mut summary = RollupSummary::default();

        let events = match self.attendance_repository.load_events() {
            Ok(events) => events,
            Err(e) => {
                error!("Rollup aborted, attendance log is unreadable: {}", e);
                summary.failed = ClassNumber::all().collect();
                return summary;
            }
        };

        for class_num in ClassNumber::all() {
            match self.recompute_with_events(class_num, &events) {
                Ok(ClassRollup::Updated) => summary.updated.push(class_num),
                Ok(ClassRollup::Skipped) => summary.skipped.push(class_num),
                Err(e) => {
                    error!("Rollup failed for class {}: {}", class_num, e);
                    summary.failed.push(class_num);
                }
            }
        }

        info!(
            "Rollup finished: {} updated, {} skipped, {} failed",
            summary.updated.len(),
            summary.skipped.len(),
            summary.failed.len()
        );
        summary
    }

    /// Recompute a single class from the current log
    pub fn recompute_class(&self, class_num: ClassNumber) -> Result<ClassRollup> {
        let events = self.attendance_repository.load_events()?;
        self.recompute_with_events(class_num, &events)
    }

    fn recompute_with_events(&self, class_num: ClassNumber, events: &[AttendanceEvent]) -> Result<ClassRollup> {
        let mut students = self.roster_repository.load_class(class_num)?;
        if students.is_empty() {
            debug!("Class {} has no students, skipping rollup", class_num);
            return Ok(ClassRollup::Skipped);
        }

        let class_events: Vec<&AttendanceEvent> = latest_per_key(events)
            .into_iter()
            .filter(|event| event.class_num == class_num)
            .collect();

        apply_rollup(&mut students, &class_events);
        self.roster_repository.save_class(class_num, &students)?;

        debug!(
            "Rolled up {} events into {} students of class {}",
            class_events.len(),
            students.len(),
            class_num
        );
        Ok(ClassRollup::Updated)
    }
}

/// Overwrite the derived fields of `students` from `events`, which must
/// already be limited to the students' class and free of duplicates.
pub fn apply_rollup(students: &mut [Student], events: &[&AttendanceEvent]) {
    for student in students.iter_mut() {
        let own: Vec<&AttendanceEvent> = events
            .iter()
            .copied()
            .filter(|event| event.student_id == student.student_id)
            .collect();

        student.total_days = own.len() as u32;
        student.attendance_count = own.iter().filter(|event| event.status.is_present()).count() as u32;

        match own.iter().max_by_key(|event| event.date) {
            Some(last) => {
                student.last_attendance_date = Some(last.date);
                student.last_attendance_status = Some(last.status);
            }
            None => {
                student.last_attendance_date = None;
                student.last_attendance_status = None;
            }
        }
    }

    let orphans = events
        .iter()
        .filter(|event| !students.iter().any(|s| s.student_id == event.student_id))
        .count();
    if orphans > 0 {
        warn!("{} attendance rows refer to students not on the roster", orphans);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::attendance::parse_date;
    use crate::backend::domain::models::{AttendanceStatus, StudentDetails};
    use crate::backend::storage::csv::roster_repository::ROSTER_HEADER;
    use std::fs;
    use tempfile::TempDir;

    fn class(n: u8) -> ClassNumber {
        ClassNumber::new(n).unwrap()
    }

    fn event(date: &str, class_num: u8, student_id: &str, status: AttendanceStatus) -> AttendanceEvent {
        AttendanceEvent::new(parse_date(date).unwrap(), class(class_num), student_id, status, "")
    }

    fn student(id: &str, name: &str) -> Student {
        Student::enrolled(
            id.to_string(),
            StudentDetails {
                name: name.to_string(),
                ..Default::default()
            },
        )
    }

    struct Fixture {
        service: RollupService,
        rosters: RosterRepository,
        log: AttendanceRepository,
        connection: CsvConnection,
        _temp_dir: TempDir,
    }

    fn setup() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        Fixture {
            service: RollupService::new(connection.clone()),
            rosters: RosterRepository::new(connection.clone()),
            log: AttendanceRepository::new(connection.clone()),
            connection,
            _temp_dir: temp_dir,
        }
    }

    #[test]
    fn test_single_present_event() {
        let f = setup();
        f.rosters.save_class(class(1), &[student("S1", "Alice")]).unwrap();
        f.log
            .save_events(&[event("2024-01-01", 1, "S1", AttendanceStatus::Present)])
            .unwrap();

        f.service.recompute_all();

        let s = &f.rosters.load_class(class(1)).unwrap()[0];
        assert_eq!(s.attendance_count, 1);
        assert_eq!(s.total_days, 1);
        assert_eq!(s.last_attendance_date, Some(parse_date("2024-01-01").unwrap()));
        assert_eq!(s.last_attendance_status, Some(AttendanceStatus::Present));
    }

    #[test]
    fn test_greatest_date_wins_and_rerun_is_idempotent() {
        let f = setup();
        f.rosters.save_class(class(1), &[student("S1", "Alice")]).unwrap();
        // Logged out of order on purpose
        f.log
            .save_events(&[
                event("2024-01-02", 1, "S1", AttendanceStatus::Absent),
                event("2024-01-01", 1, "S1", AttendanceStatus::Present),
            ])
            .unwrap();

        f.service.recompute_all();
        let first = f.rosters.load_class(class(1)).unwrap();
        f.service.recompute_all();
        let second = f.rosters.load_class(class(1)).unwrap();

        assert_eq!(first, second);
        let s = &second[0];
        assert_eq!(s.attendance_count, 1);
        assert_eq!(s.total_days, 2);
        assert_eq!(s.last_attendance_date, Some(parse_date("2024-01-02").unwrap()));
        assert_eq!(s.last_attendance_status, Some(AttendanceStatus::Absent));
    }

    #[test]
    fn test_dates_compare_as_calendar_dates() {
        let mut students = vec![student("S1", "Alice")];
        let events = vec![
            event("2024-10-01", 1, "S1", AttendanceStatus::Present),
            event("2024-9-30", 1, "S1", AttendanceStatus::Absent),
        ];
        let refs: Vec<&AttendanceEvent> = events.iter().collect();

        apply_rollup(&mut students, &refs);

        assert_eq!(students[0].last_attendance_date, Some(parse_date("2024-10-01").unwrap()));
        assert_eq!(students[0].last_attendance_status, Some(AttendanceStatus::Present));
    }

    #[test]
    fn test_duplicate_marks_count_once_with_latest_status() {
        let f = setup();
        f.rosters.save_class(class(2), &[student("S1", "Alice")]).unwrap();
        f.log
            .save_events(&[
                event("2024-01-01", 2, "S1", AttendanceStatus::Present),
                event("2024-01-01", 2, "S1", AttendanceStatus::Absent),
            ])
            .unwrap();

        f.service.recompute_all();

        let s = &f.rosters.load_class(class(2)).unwrap()[0];
        assert_eq!(s.total_days, 1);
        assert_eq!(s.attendance_count, 0);
        assert_eq!(s.last_attendance_status, Some(AttendanceStatus::Absent));
    }

    #[test]
    fn test_other_classes_do_not_leak_in() {
        let f = setup();
        f.rosters.save_class(class(1), &[student("S1", "Alice")]).unwrap();
        f.log
            .save_events(&[event("2024-01-01", 3, "S1", AttendanceStatus::Present)])
            .unwrap();

        f.service.recompute_all();

        let s = &f.rosters.load_class(class(1)).unwrap()[0];
        assert_eq!(s.total_days, 0);
        assert_eq!(s.last_attendance_date, None);
    }

    #[test]
    fn test_empty_rosters_are_skipped() {
        let f = setup();
        f.rosters.save_class(class(1), &[student("S1", "Alice")]).unwrap();
        f.rosters.save_class(class(2), &[]).unwrap();

        let summary = f.service.recompute_all();

        assert_eq!(summary.updated, vec![class(1)]);
        assert_eq!(summary.skipped.len(), 7);
        assert!(summary.failed.is_empty());
        assert!(!f.connection.class_file_path(class(3)).exists());
    }

    #[test]
    fn test_corrupt_class_does_not_block_others() {
        let f = setup();
        f.rosters.save_class(class(1), &[student("S1", "Alice")]).unwrap();
        fs::write(
            f.connection.class_file_path(class(4)),
            format!("{}\nS9,Bob,,,,,oops,0,,\n", ROSTER_HEADER.join(",")),
        )
        .unwrap();
        f.log
            .save_events(&[event("2024-01-01", 1, "S1", AttendanceStatus::Present)])
            .unwrap();

        let summary = f.service.recompute_all();

        assert_eq!(summary.failed, vec![class(4)]);
        assert_eq!(summary.updated, vec![class(1)]);
        assert_eq!(f.rosters.load_class(class(1)).unwrap()[0].attendance_count, 1);
    }

    #[test]
    fn test_unreadable_log_fails_every_class() {
        let f = setup();
        f.rosters.save_class(class(1), &[student("S1", "Alice")]).unwrap();
        fs::write(
            f.connection.log_file_path(),
            "date,class_num,student_id,status,reason\nnot-a-date,1,S1,present,\n",
        )
        .unwrap();

        let summary = f.service.recompute_all();

        assert_eq!(summary.failed.len(), 8);
        assert!(f.service.recompute_class(class(1)).is_err());
    }

    #[test]
    fn test_recompute_class_clears_stale_fields() {
        let f = setup();
        let mut stale = student("S1", "Alice");
        stale.attendance_count = 9;
        stale.total_days = 9;
        stale.last_attendance_status = Some(AttendanceStatus::Present);
        f.rosters.save_class(class(6), &[stale]).unwrap();

        assert_eq!(f.service.recompute_class(class(6)).unwrap(), ClassRollup::Updated);

        let s = &f.rosters.load_class(class(6)).unwrap()[0];
        assert_eq!(s.attendance_count, 0);
        assert_eq!(s.total_days, 0);
        assert_eq!(s.last_attendance_status, None);
    }
}

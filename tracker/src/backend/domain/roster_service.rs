use log::{error, info, warn};
use std::collections::HashSet;

use crate::backend::domain::commands::student::{AddStudentCommand, AddStudentResult};
use crate::backend::domain::errors::{Result, TrackerError};
use crate::backend::domain::models::{ClassNumber, Student, StudentDetails};
use crate::backend::storage::csv::{CsvConnection, RosterRepository};
use crate::backend::storage::traits::RosterStorage;

/// How many fresh IDs to try before giving up on a class
pub const MAX_ID_ATTEMPTS: u32 = 32;
const MAX_NAME_LEN: usize = 100;

/// Service for the eight class rosters
#[derive(Debug, Clone)]
pub struct RosterService {
    roster_repository: RosterRepository,
}

impl RosterService {
    pub fn new(connection: CsvConnection) -> Self {
        Self {
            roster_repository: RosterRepository::new(connection),
        }
    }

    /// Create an empty table for every class that has none. Idempotent.
    /// Returns the classes whose table was created by this call.
    pub fn initialize_all_classes(&self) -> Result<Vec<ClassNumber>> {
        let mut created = Vec::new();
        for class_num in ClassNumber::all() {
            if self.roster_repository.ensure_class_file(class_num)? {
                created.push(class_num);
            }
        }
        info!("Class tables ready ({} created)", created.len());
        Ok(created)
    }

    /// Get a class roster for display.
    ///
    /// A missing table is created empty. An unreadable table is logged and
    /// shown as empty so the screen still opens.
    pub fn get_class(&self, class_num: ClassNumber) -> Vec<Student> {
        if !self.roster_repository.class_exists(class_num) {
            if let Err(e) = self.roster_repository.ensure_class_file(class_num) {
                warn!("Could not create roster for class {}: {}", class_num, e);
            }
            return Vec::new();
        }

        match self.roster_repository.load_class(class_num) {
            Ok(students) => students,
            Err(e) => {
                error!("Roster for class {} is unreadable, showing it as empty: {}", class_num, e);
                Vec::new()
            }
        }
    }

    /// Find one student in a class
    pub fn find_student(&self, class_num: ClassNumber, student_id: &str) -> Result<Option<Student>> {
        let students = self.roster_repository.load_class(class_num)?;
        Ok(students.into_iter().find(|s| s.student_id == student_id))
    }

    /// IDs of every student in a class, read strictly
    pub fn student_ids(&self, class_num: ClassNumber) -> Result<HashSet<String>> {
        let students = self.roster_repository.load_class(class_num)?;
        Ok(students.into_iter().map(|s| s.student_id).collect())
    }

    /// Register a student with zeroed attendance counters
    pub fn add_student(&self, command: AddStudentCommand) -> Result<AddStudentResult> {
        let details = Self::normalize_details(command.details);
        Self::validate_details(&details)?;
        info!("Adding student '{}' to class {}", details.name, command.class_num);

        // Strict load: a corrupt table must not be replaced by a one-row table
        let mut students = self.roster_repository.load_class(command.class_num)?;
        let student_id = Self::unused_student_id(command.class_num, &students)?;

        let student = Student::enrolled(student_id, details);
        students.push(student.clone());
        self.roster_repository.save_class(command.class_num, &students)?;

        info!(
            "Added student {} ({}) to class {}",
            student.name, student.student_id, command.class_num
        );
        Ok(AddStudentResult {
            success_message: format!(
                "Student '{}' added to class {} with ID {}",
                student.name, command.class_num, student.student_id
            ),
            student,
        })
    }

    /// Overwrite a class table
    pub fn save_class(&self, class_num: ClassNumber, students: &[Student]) -> Result<()> {
        self.roster_repository.save_class(class_num, students)?;
        info!("Saved class {} ({} students)", class_num, students.len());
        Ok(())
    }

    fn normalize_details(details: StudentDetails) -> StudentDetails {
        StudentDetails {
            name: details.name.trim().to_string(),
            father_name: details.father_name.trim().to_string(),
            mother_name: details.mother_name.trim().to_string(),
            contact: details.contact.trim().to_string(),
            address: details.address.trim().to_string(),
        }
    }

    fn validate_details(details: &StudentDetails) -> Result<()> {
        if details.name.is_empty() {
            return Err(TrackerError::validation("Student name cannot be empty"));
        }
        if details.name.chars().count() > MAX_NAME_LEN {
            return Err(TrackerError::validation(format!(
                "Student name cannot exceed {} characters",
                MAX_NAME_LEN
            )));
        }
        Ok(())
    }

    fn unused_student_id(class_num: ClassNumber, students: &[Student]) -> Result<String> {
        Self::unused_id_from(class_num, students, Student::generate_id)
    }

    /// Draw candidates from `generate` until one is not taken in the class
    fn unused_id_from<F>(class_num: ClassNumber, students: &[Student], mut generate: F) -> Result<String>
    where
        F: FnMut() -> String,
    {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = generate();
            if !students.iter().any(|s| s.student_id == candidate) {
                return Ok(candidate);
            }
            warn!("Student ID {} already used in class {}, drawing again", candidate, class_num);
        }
        Err(TrackerError::IdSpaceExhausted {
            class_num: class_num.get(),
            attempts: MAX_ID_ATTEMPTS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::csv::roster_repository::ROSTER_HEADER;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (RosterService, CsvConnection, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        (RosterService::new(connection.clone()), connection, temp_dir)
    }

    fn class(n: u8) -> ClassNumber {
        ClassNumber::new(n).unwrap()
    }

    fn add_command(class_num: u8, name: &str) -> AddStudentCommand {
        AddStudentCommand {
            class_num: class(class_num),
            details: StudentDetails {
                name: name.to_string(),
                father_name: " Bob ".to_string(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_initialize_all_classes_creates_empty_tables() {
        let (service, connection, _temp_dir) = setup();

        let created = service.initialize_all_classes().unwrap();
        assert_eq!(created.len(), 8);

        for class_num in ClassNumber::all() {
            let contents = fs::read_to_string(connection.class_file_path(class_num)).unwrap();
            assert_eq!(contents.trim_end().split(',').collect::<Vec<_>>(), ROSTER_HEADER.to_vec());
            assert!(service.get_class(class_num).is_empty());
        }
    }

    #[test]
    fn test_initialize_all_classes_is_idempotent() {
        let (service, _connection, _temp_dir) = setup();
        service.initialize_all_classes().unwrap();
        service.add_student(add_command(1, "Alice")).unwrap();

        let created = service.initialize_all_classes().unwrap();

        assert!(created.is_empty());
        assert_eq!(service.get_class(class(1)).len(), 1);
    }

    #[test]
    fn test_get_class_lazily_creates_missing_table() {
        let (service, connection, _temp_dir) = setup();
        assert!(!connection.class_file_path(class(3)).exists());

        assert!(service.get_class(class(3)).is_empty());
        assert!(connection.class_file_path(class(3)).exists());
    }

    #[test]
    fn test_get_class_returns_empty_for_corrupt_table() {
        let (service, connection, _temp_dir) = setup();
        fs::write(connection.class_file_path(class(2)), "student_id,name\nSTU-1\n\"unterminated").unwrap();

        assert!(service.get_class(class(2)).is_empty());
    }

    #[test]
    fn test_add_student_with_zeroed_counters() {
        let (service, _connection, _temp_dir) = setup();
        service.initialize_all_classes().unwrap();

        let result = service.add_student(add_command(1, "  Alice  ")).unwrap();

        let roster = service.get_class(class(1));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].name, "Alice");
        assert_eq!(roster[0].father_name, "Bob");
        assert_eq!(roster[0].attendance_count, 0);
        assert_eq!(roster[0].total_days, 0);
        assert_eq!(roster[0].student_id, result.student.student_id);
        assert!(result.student.student_id.starts_with("STU-"));
    }

    #[test]
    fn test_add_student_rejects_blank_name_without_writing() {
        let (service, connection, _temp_dir) = setup();
        service.initialize_all_classes().unwrap();
        service.add_student(add_command(1, "Alice")).unwrap();
        let before = fs::read_to_string(connection.class_file_path(class(1))).unwrap();

        let err = service.add_student(add_command(1, "   ")).unwrap_err();

        assert!(err.is_validation());
        let after = fs::read_to_string(connection.class_file_path(class(1))).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_add_student_rejects_overlong_name() {
        let (service, _connection, _temp_dir) = setup();
        let err = service.add_student(add_command(1, &"a".repeat(101))).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_add_student_refuses_to_overwrite_corrupt_table() {
        let (service, connection, _temp_dir) = setup();
        let path = connection.class_file_path(class(5));
        let corrupt = format!("{}\nSTU-1,Bob,,,,,lots,1,,\n", ROSTER_HEADER.join(","));
        fs::write(&path, &corrupt).unwrap();

        assert!(service.add_student(add_command(5, "Alice")).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), corrupt);
    }

    #[test]
    fn test_ids_are_unique_within_class() {
        let (service, _connection, _temp_dir) = setup();
        for i in 0..20 {
            service.add_student(add_command(7, &format!("Student {}", i))).unwrap();
        }

        let roster = service.get_class(class(7));
        let mut ids: Vec<&str> = roster.iter().map(|s| s.student_id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn test_colliding_candidates_are_redrawn() {
        let taken = Student::enrolled("STU-AAAAAAAA".to_string(), StudentDetails::default());
        let mut candidates = vec!["STU-BBBBBBBB", "STU-AAAAAAAA"];

        let id = RosterService::unused_id_from(class(1), &[taken], || {
            candidates.pop().unwrap().to_string()
        })
        .unwrap();

        assert_eq!(id, "STU-BBBBBBBB");
    }

    #[test]
    fn test_id_generation_gives_up_after_bounded_attempts() {
        let taken = Student::enrolled("STU-AAAAAAAA".to_string(), StudentDetails::default());
        let mut calls = 0;

        let err = RosterService::unused_id_from(class(2), &[taken], || {
            calls += 1;
            "STU-AAAAAAAA".to_string()
        })
        .unwrap_err();

        assert_eq!(calls, MAX_ID_ATTEMPTS);
        assert!(matches!(err, TrackerError::IdSpaceExhausted { class_num: 2, .. }));
    }

    #[test]
    fn test_find_student() {
        let (service, _connection, _temp_dir) = setup();
        let added = service.add_student(add_command(4, "Dana")).unwrap().student;

        let found = service.find_student(class(4), &added.student_id).unwrap();
        assert_eq!(found.map(|s| s.name), Some("Dana".to_string()));
        assert!(service.find_student(class(4), "STU-NOPE0000").unwrap().is_none());
    }

    #[test]
    fn test_student_ids() {
        let (service, connection, _temp_dir) = setup();
        let dana = service.add_student(add_command(4, "Dana")).unwrap().student;
        let eli = service.add_student(add_command(4, "Eli")).unwrap().student;

        let ids = service.student_ids(class(4)).unwrap();
        assert_eq!(ids, HashSet::from([dana.student_id, eli.student_id]));
        assert!(service.student_ids(class(5)).unwrap().is_empty());

        fs::write(
            connection.class_file_path(class(6)),
            format!("{}\nS9,Bob,,,,,oops,0,,\n", ROSTER_HEADER.join(",")),
        )
        .unwrap();
        assert!(service.student_ids(class(6)).is_err());
    }

    #[test]
    fn test_save_class_overwrites_table() {
        let (service, _connection, _temp_dir) = setup();
        service.add_student(add_command(8, "Eve")).unwrap();
        let mut roster = service.get_class(class(8));
        roster[0].address = "1 Main St".to_string();

        service.save_class(class(8), &roster).unwrap();

        assert_eq!(service.get_class(class(8))[0].address, "1 Main St");
    }
}

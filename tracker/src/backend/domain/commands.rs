//! Domain-level command and result types.
//! The io layer maps the public DTOs from the `shared` crate onto these.

pub mod student {
    use crate::backend::domain::models::{ClassNumber, Student, StudentDetails};

    /// Input for registering a student in a class.
    #[derive(Debug, Clone)]
    pub struct AddStudentCommand {
        pub class_num: ClassNumber,
        pub details: StudentDetails,
    }

    #[derive(Debug, Clone)]
    pub struct AddStudentResult {
        pub student: Student,
        pub success_message: String,
    }
}

pub mod attendance {
    use crate::backend::domain::models::{AttendanceStatus, ClassNumber};

    /// A single mark as entered on the attendance screen.
    #[derive(Debug, Clone)]
    pub struct MarkEntry {
        pub student_id: String,
        pub status: AttendanceStatus,
        pub reason: String,
    }

    /// All marks saved for one class on one day.
    #[derive(Debug, Clone)]
    pub struct MarkAttendanceCommand {
        pub class_num: ClassNumber,
        /// YYYY-MM-DD as typed by the user
        pub date: String,
        pub marks: Vec<MarkEntry>,
    }

    #[derive(Debug, Clone)]
    pub struct MarkAttendanceResult {
        pub recorded_count: usize,
        pub success_message: String,
    }
}

pub mod report {
    use crate::backend::domain::models::ClassNumber;

    #[derive(Debug, Clone)]
    pub struct ReportQuery {
        pub class_num: ClassNumber,
        pub start_date: String,
        pub end_date: String,
    }
}

pub mod rollup {
    use crate::backend::domain::models::ClassNumber;

    /// Per-class outcome of a full rollup pass.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct RollupSummary {
        pub updated: Vec<ClassNumber>,
        /// Empty or missing rosters
        pub skipped: Vec<ClassNumber>,
        pub failed: Vec<ClassNumber>,
    }
}

pub mod backup {
    use std::path::PathBuf;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct BackupEntry {
        pub name: String,
        pub path: PathBuf,
    }

    #[derive(Debug, Clone)]
    pub struct RestoreBackupResult {
        pub restored_files: Vec<String>,
        pub success_message: String,
    }
}

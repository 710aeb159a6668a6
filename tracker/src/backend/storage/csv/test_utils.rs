//! Test utilities module for automatic cleanup and consistent test infrastructure
//!
//! Every environment lives in its own temporary directory, removed when the
//! environment is dropped, even if the test panics.

use std::path::PathBuf;
use tempfile::TempDir;

use super::connection::CsvConnection;
use crate::backend::domain::commands::student::AddStudentCommand;
use crate::backend::domain::errors::Result;
use crate::backend::domain::models::{ClassNumber, Student, StudentDetails};
use crate::backend::Backend;

/// A temporary base directory with a fully wired backend on top
pub struct TestEnvironment {
    pub connection: CsvConnection,
    pub backend: Backend,
    /// Base directory path for manual inspection if needed
    pub base_path: PathBuf,
    _temp_dir: TempDir, // Keep alive to prevent cleanup
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let connection = CsvConnection::new(temp_dir.path())?;
        Ok(Self {
            backend: Backend::with_connection(connection.clone()),
            connection,
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }

    /// Create all class tables and enroll `names` into `class_num`
    pub fn with_students(class_num: u8, names: &[&str]) -> Result<(Self, Vec<Student>)> {
        let env = Self::new()?;
        env.backend.roster_service.initialize_all_classes()?;
        let mut students = Vec::new();
        for name in names {
            students.push(env.enroll(class_num, name)?);
        }
        Ok((env, students))
    }

    pub fn enroll(&self, class_num: u8, name: &str) -> Result<Student> {
        let result = self.backend.roster_service.add_student(AddStudentCommand {
            class_num: ClassNumber::new(class_num)?,
            details: StudentDetails {
                name: name.to_string(),
                ..Default::default()
            },
        })?;
        Ok(result.student)
    }
}

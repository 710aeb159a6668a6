//! Mapper between the shared Student DTOs and the domain Student model.

use crate::backend::domain::commands::student::AddStudentCommand;
use crate::backend::domain::models::attendance::format_date;
use crate::backend::domain::models::{ClassNumber, Student as DomainStudent, StudentDetails};
use crate::backend::domain::Result;
use shared::{AddStudentRequest, Student as SharedStudent};

pub struct StudentMapper;

impl StudentMapper {
    /// Converts a domain Student to a shared Student DTO. Missing
    /// last-attendance fields become empty strings.
    pub fn to_dto(domain: DomainStudent) -> SharedStudent {
        SharedStudent {
            student_id: domain.student_id,
            name: domain.name,
            father_name: domain.father_name,
            mother_name: domain.mother_name,
            contact: domain.contact,
            address: domain.address,
            attendance_count: domain.attendance_count,
            total_days: domain.total_days,
            last_attendance_date: domain.last_attendance_date.map(format_date).unwrap_or_default(),
            last_attendance_status: domain
                .last_attendance_status
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
        }
    }

    pub fn to_add_command(request: AddStudentRequest) -> Result<AddStudentCommand> {
        Ok(AddStudentCommand {
            class_num: ClassNumber::new(request.class_num)?,
            details: StudentDetails {
                name: request.name,
                father_name: request.father_name,
                mother_name: request.mother_name,
                contact: request.contact,
                address: request.address,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::AttendanceStatus;
    use chrono::NaiveDate;

    #[test]
    fn test_to_dto_formats_last_attendance() {
        let mut student = DomainStudent::enrolled("STU-1".to_string(), StudentDetails::default());
        let empty = StudentMapper::to_dto(student.clone());
        assert_eq!(empty.last_attendance_date, "");
        assert_eq!(empty.last_attendance_status, "");

        student.last_attendance_date = NaiveDate::from_ymd_opt(2024, 3, 9);
        student.last_attendance_status = Some(AttendanceStatus::Present);
        let dto = StudentMapper::to_dto(student);
        assert_eq!(dto.last_attendance_date, "2024-03-09");
        assert_eq!(dto.last_attendance_status, "present");
    }

    #[test]
    fn test_add_request_with_bad_class_is_rejected() {
        let request = AddStudentRequest {
            class_num: 0,
            name: "Alice".to_string(),
            father_name: String::new(),
            mother_name: String::new(),
            contact: String::new(),
            address: String::new(),
        };
        assert!(StudentMapper::to_add_command(request).unwrap_err().is_validation());
    }
}

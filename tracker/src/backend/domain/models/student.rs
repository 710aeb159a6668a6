use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attendance::AttendanceStatus;

const ID_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ID_SUFFIX_LEN: usize = 8;

/// Domain model for one row of a class roster.
///
/// The four attendance fields are derived from the attendance log and are
/// only ever written by the rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: String,
    pub name: String,
    pub father_name: String,
    pub mother_name: String,
    pub contact: String,
    pub address: String,
    pub attendance_count: u32,
    pub total_days: u32,
    pub last_attendance_date: Option<NaiveDate>,
    pub last_attendance_status: Option<AttendanceStatus>,
}

impl Student {
    pub const ID_PREFIX: &'static str = "STU-";

    /// Generate a candidate ID: "STU-" followed by 8 uppercase alphanumerics.
    /// The caller is responsible for checking it against the roster.
    pub fn generate_id() -> String {
        // Bytes 6 and 8 of a v4 UUID carry version and variant bits
        let bytes = Uuid::new_v4().into_bytes();
        let suffix: String = bytes
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != 6 && *index != 8)
            .take(ID_SUFFIX_LEN)
            .map(|(_, byte)| ID_ALPHABET[*byte as usize % ID_ALPHABET.len()] as char)
            .collect();
        format!("{}{}", Self::ID_PREFIX, suffix)
    }

    /// A freshly registered student with zeroed counters
    pub fn enrolled(student_id: String, details: StudentDetails) -> Self {
        Self {
            student_id,
            name: details.name,
            father_name: details.father_name,
            mother_name: details.mother_name,
            contact: details.contact,
            address: details.address,
            attendance_count: 0,
            total_days: 0,
            last_attendance_date: None,
            last_attendance_status: None,
        }
    }
}

/// User-entered fields of a student record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentDetails {
    pub name: String,
    pub father_name: String,
    pub mother_name: String,
    pub contact: String,
    pub address: String,
}

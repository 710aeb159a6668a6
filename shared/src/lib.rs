use serde::{Deserialize, Serialize};
use std::fmt;

/// One student row as shown in the class roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Student ID in format: "STU-XXXXXXXX"
    pub student_id: String,
    pub name: String,
    pub father_name: String,
    pub mother_name: String,
    pub contact: String,
    pub address: String,
    /// Number of days marked present
    pub attendance_count: u32,
    /// Number of days marked at all
    pub total_days: u32,
    /// Most recent marked date (YYYY-MM-DD), empty if never marked
    pub last_attendance_date: String,
    /// Status on the most recent marked date, empty if never marked
    pub last_attendance_status: String,
}

/// Attendance status for a single student on a single day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "present"),
            AttendanceStatus::Absent => write!(f, "absent"),
        }
    }
}

/// One row of the attendance log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Date of the mark (YYYY-MM-DD)
    pub date: String,
    pub class_num: u8,
    pub student_id: String,
    pub status: AttendanceStatus,
    /// Free text, empty when present
    pub reason: String,
}

/// A single mark entered on the attendance screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceMark {
    pub student_id: String,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataDirectoryResponse {
    pub base_path: String,
    pub data_path: String,
    pub exports_path: String,
    pub backups_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializeClassesResponse {
    /// Class numbers whose table file was created by this call
    pub created_classes: Vec<u8>,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRosterRequest {
    pub class_num: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRosterResponse {
    pub class_num: u8,
    pub students: Vec<Student>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddStudentRequest {
    pub class_num: u8,
    pub name: String,
    #[serde(default)]
    pub father_name: String,
    #[serde(default)]
    pub mother_name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddStudentResponse {
    pub student: Student,
    pub success_message: String,
}

/// Marks for one class on one day, saved together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkAttendanceRequest {
    pub class_num: u8,
    /// Date of the marks (YYYY-MM-DD)
    pub date: String,
    pub marks: Vec<AttendanceMark>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkAttendanceResponse {
    pub recorded_count: usize,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayMarksRequest {
    pub class_num: u8,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayMarksResponse {
    pub class_num: u8,
    pub date: String,
    pub marks: Vec<AttendanceMark>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceLogResponse {
    pub records: Vec<AttendanceRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollupResponse {
    pub updated_classes: Vec<u8>,
    pub skipped_classes: Vec<u8>,
    pub failed_classes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub class_num: u8,
    /// Inclusive start date (YYYY-MM-DD)
    pub start_date: String,
    /// Inclusive end date (YYYY-MM-DD)
    pub end_date: String,
}

/// Which of the three report outcomes the UI should render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportState {
    /// No attendance has ever been saved
    NoLogFile,
    /// Attendance exists, but none for this class in the date range
    NoRecordsInRange,
    RecordsFound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_records: usize,
    pub present_count: usize,
    pub absent_count: usize,
    /// Percentage rounded to two decimals
    pub present_percent: f64,
    /// Percentage rounded to two decimals
    pub absent_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentReportRow {
    pub student_id: String,
    pub name: String,
    pub present_count: usize,
    pub absent_count: usize,
    pub present_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResponse {
    pub class_num: u8,
    pub start_date: String,
    pub end_date: String,
    pub state: ReportState,
    pub summary: Option<ReportSummary>,
    pub students: Vec<StudentReportRow>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupResponse {
    pub success: bool,
    pub message: String,
    pub backup_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupInfo {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupListResponse {
    /// Newest first
    pub backups: Vec<BackupInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreBackupRequest {
    pub backup_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreBackupResponse {
    pub restored_files: Vec<String>,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Export a single class, or all classes when omitted
    pub class_num: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportResponse {
    pub success: bool,
    pub message: String,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub backup_interval_minutes: u64,
    pub last_selected_class: Option<u8>,
    pub data_format_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectClassRequest {
    pub class_num: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendance_status_serializes_lowercase() {
        let json = serde_json::to_string(&AttendanceStatus::Present).unwrap();
        assert_eq!(json, "\"present\"");
        let parsed: AttendanceStatus = serde_json::from_str("\"absent\"").unwrap();
        assert_eq!(parsed, AttendanceStatus::Absent);
        assert_eq!(AttendanceStatus::Absent.to_string(), "absent");
    }

    #[test]
    fn test_mark_reason_defaults_to_empty() {
        let mark: AttendanceMark =
            serde_json::from_str(r#"{"student_id":"STU-ABCD1234","status":"present"}"#).unwrap();
        assert_eq!(mark.reason, "");
    }

    #[test]
    fn test_report_state_serializes_snake_case() {
        let json = serde_json::to_string(&ReportState::NoRecordsInRange).unwrap();
        assert_eq!(json, "\"no_records_in_range\"");
    }
}

//! # UI Command Handlers
//!
//! The call boundary between the UI collaborator and the data core. Each
//! handler takes a request DTO from the `shared` crate, calls the domain and
//! maps the outcome back to a response DTO. Errors cross the boundary as
//! display strings.
//!
//! [`UiCommand`] gives every handler a JSON shape so a host can drive the core
//! without linking against the DTO types:
//!
//! ```json
//! {"command": "mark_attendance", "request": {"class_num": 1, "date": "2024-01-01", "marks": []}}
//! ```

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::backend::domain::models::attendance::parse_date;
use crate::backend::domain::models::ClassNumber;
use crate::backend::io::mappers::{AttendanceMapper, ReportMapper, StudentMapper};
use crate::backend::Backend;
use shared::{
    AddStudentRequest, AddStudentResponse, AttendanceLogResponse, BackupInfo, BackupListResponse,
    BackupResponse, ClassRosterRequest, ClassRosterResponse, DataDirectoryResponse, DayMarksRequest,
    DayMarksResponse, ExportRequest, ExportResponse, InitializeClassesResponse, MarkAttendanceRequest,
    MarkAttendanceResponse, ReportRequest, ReportResponse, RestoreBackupRequest, RestoreBackupResponse,
    RollupResponse, SelectClassRequest, SettingsResponse,
};

fn class_number(value: u8) -> Result<ClassNumber, String> {
    ClassNumber::new(value).map_err(|e| e.to_string())
}

fn class_list(classes: Vec<ClassNumber>) -> Vec<u8> {
    classes.into_iter().map(ClassNumber::get).collect()
}

pub fn get_data_directories(backend: &Backend) -> Result<DataDirectoryResponse, String> {
    let layout = backend
        .data_directory_service
        .get_directories()
        .map_err(|e| e.to_string())?;

    Ok(DataDirectoryResponse {
        base_path: layout.base.to_string_lossy().to_string(),
        data_path: layout.data.to_string_lossy().to_string(),
        exports_path: layout.exports.to_string_lossy().to_string(),
        backups_path: layout.backups.to_string_lossy().to_string(),
    })
}

pub fn initialize_classes(backend: &Backend) -> Result<InitializeClassesResponse, String> {
    let created = backend
        .roster_service
        .initialize_all_classes()
        .map_err(|e| e.to_string())?;

    Ok(InitializeClassesResponse {
        success_message: format!("{} class tables created", created.len()),
        created_classes: class_list(created),
    })
}

pub fn get_class_roster(backend: &Backend, request: ClassRosterRequest) -> Result<ClassRosterResponse, String> {
    let class_num = class_number(request.class_num)?;
    let students = backend
        .roster_service
        .get_class(class_num)
        .into_iter()
        .map(StudentMapper::to_dto)
        .collect();

    Ok(ClassRosterResponse {
        class_num: class_num.get(),
        students,
    })
}

pub fn add_student(backend: &Backend, request: AddStudentRequest) -> Result<AddStudentResponse, String> {
    info!("add_student: class {} name '{}'", request.class_num, request.name);

    let command = StudentMapper::to_add_command(request).map_err(|e| e.to_string())?;
    let result = backend.roster_service.add_student(command).map_err(|e| {
        error!("Failed to add student: {}", e);
        e.to_string()
    })?;

    Ok(AddStudentResponse {
        student: StudentMapper::to_dto(result.student),
        success_message: result.success_message,
    })
}

pub fn mark_attendance(backend: &Backend, request: MarkAttendanceRequest) -> Result<MarkAttendanceResponse, String> {
    info!(
        "mark_attendance: class {} on {} ({} marks)",
        request.class_num,
        request.date,
        request.marks.len()
    );

    let command = AttendanceMapper::to_mark_command(request).map_err(|e| e.to_string())?;
    let result = backend.attendance_service.mark_attendance(command).map_err(|e| {
        error!("Failed to save attendance: {}", e);
        e.to_string()
    })?;

    Ok(MarkAttendanceResponse {
        recorded_count: result.recorded_count,
        success_message: result.success_message,
    })
}

pub fn get_day_marks(backend: &Backend, request: DayMarksRequest) -> Result<DayMarksResponse, String> {
    let class_num = class_number(request.class_num)?;
    let date = parse_date(&request.date)
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", request.date))?;

    let marks = backend
        .attendance_service
        .day_marks(class_num, date)
        .into_iter()
        .map(AttendanceMapper::to_mark_dto)
        .collect();

    Ok(DayMarksResponse {
        class_num: class_num.get(),
        date: request.date,
        marks,
    })
}

pub fn get_attendance_log(backend: &Backend) -> Result<AttendanceLogResponse, String> {
    let records = backend
        .attendance_service
        .read_log()
        .into_iter()
        .map(AttendanceMapper::to_record_dto)
        .collect();

    Ok(AttendanceLogResponse { records })
}

pub fn recompute_rollups(backend: &Backend) -> Result<RollupResponse, String> {
    let summary = backend.rollup_service.recompute_all();

    Ok(RollupResponse {
        updated_classes: class_list(summary.updated),
        skipped_classes: class_list(summary.skipped),
        failed_classes: class_list(summary.failed),
    })
}

pub fn generate_report(backend: &Backend, request: ReportRequest) -> Result<ReportResponse, String> {
    info!(
        "generate_report: class {} from {} to {}",
        request.class_num, request.start_date, request.end_date
    );

    let query = ReportMapper::to_query(request).map_err(|e| e.to_string())?;
    let stats = backend
        .report_service
        .generate_report(query)
        .map_err(|e| e.to_string())?;

    Ok(ReportMapper::to_dto(stats))
}

/// Never an `Err`: a failed backup is reported in the response
pub fn create_backup(backend: &Backend) -> Result<BackupResponse, String> {
    Ok(match backend.backup_service.create_backup() {
        Some(path) => BackupResponse {
            success: true,
            message: format!("Backup created at {}", path.display()),
            backup_path: Some(path.to_string_lossy().to_string()),
        },
        None => BackupResponse {
            success: false,
            message: "No backup was created, see the log for details".to_string(),
            backup_path: None,
        },
    })
}

pub fn list_backups(backend: &Backend) -> Result<BackupListResponse, String> {
    let backups = backend
        .backup_service
        .list_backups()
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|b| BackupInfo {
            name: b.name,
            path: b.path.to_string_lossy().to_string(),
        })
        .collect();

    Ok(BackupListResponse { backups })
}

pub fn restore_backup(backend: &Backend, request: RestoreBackupRequest) -> Result<RestoreBackupResponse, String> {
    info!("restore_backup: {}", request.backup_name);

    let result = backend
        .backup_service
        .restore_backup(&request.backup_name)
        .map_err(|e| {
            error!("Failed to restore backup {}: {}", request.backup_name, e);
            e.to_string()
        })?;

    Ok(RestoreBackupResponse {
        restored_files: result.restored_files,
        success_message: result.success_message,
    })
}

/// Never an `Err` for an empty or failed export, only for a bad class number
pub fn export_roster(backend: &Backend, request: ExportRequest) -> Result<ExportResponse, String> {
    let class_num = request.class_num.map(class_number).transpose()?;
    let scope = match class_num {
        Some(class_num) => format!("class {}", class_num),
        None => "all classes".to_string(),
    };

    Ok(match backend.export_service.export(class_num) {
        Some(path) => ExportResponse {
            success: true,
            message: format!("Exported {} to {}", scope, path.display()),
            file_path: Some(path.to_string_lossy().to_string()),
        },
        None => ExportResponse {
            success: false,
            message: format!("Nothing exported for {}", scope),
            file_path: None,
        },
    })
}

pub fn get_settings(backend: &Backend) -> Result<SettingsResponse, String> {
    let settings = backend
        .settings_service
        .get_settings()
        .map_err(|e| e.to_string())?;

    Ok(SettingsResponse {
        backup_interval_minutes: settings.backup_interval_minutes,
        last_selected_class: settings.last_selected_class,
        data_format_version: settings.data_format_version,
    })
}

pub fn select_class(backend: &Backend, request: SelectClassRequest) -> Result<SettingsResponse, String> {
    let class_num = class_number(request.class_num)?;
    let settings = backend
        .settings_service
        .select_class(class_num)
        .map_err(|e| e.to_string())?;

    Ok(SettingsResponse {
        backup_interval_minutes: settings.backup_interval_minutes,
        last_selected_class: settings.last_selected_class,
        data_format_version: settings.data_format_version,
    })
}

/// Every handler as a JSON-addressable command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "request", rename_all = "snake_case")]
pub enum UiCommand {
    GetDataDirectories,
    InitializeClasses,
    GetClassRoster(ClassRosterRequest),
    AddStudent(AddStudentRequest),
    MarkAttendance(MarkAttendanceRequest),
    GetDayMarks(DayMarksRequest),
    GetAttendanceLog,
    RecomputeRollups,
    GenerateReport(ReportRequest),
    CreateBackup,
    ListBackups,
    RestoreBackup(RestoreBackupRequest),
    ExportRoster(ExportRequest),
    GetSettings,
    SelectClass(SelectClassRequest),
}

impl UiCommand {
    /// Whether the command can change files under `data/`
    pub fn modifies_data(&self) -> bool {
        matches!(
            self,
            UiCommand::InitializeClasses
                | UiCommand::AddStudent(_)
                | UiCommand::MarkAttendance(_)
                | UiCommand::RecomputeRollups
                | UiCommand::RestoreBackup(_)
        )
    }
}

fn to_json<T: Serialize>(response: Result<T, String>) -> Result<serde_json::Value, String> {
    response.and_then(|r| serde_json::to_value(r).map_err(|e| e.to_string()))
}

/// Run one command and serialize its response
pub fn dispatch(backend: &Backend, command: UiCommand) -> Result<serde_json::Value, String> {
    match command {
        UiCommand::GetDataDirectories => to_json(get_data_directories(backend)),
        UiCommand::InitializeClasses => to_json(initialize_classes(backend)),
        UiCommand::GetClassRoster(request) => to_json(get_class_roster(backend, request)),
        UiCommand::AddStudent(request) => to_json(add_student(backend, request)),
        UiCommand::MarkAttendance(request) => to_json(mark_attendance(backend, request)),
        UiCommand::GetDayMarks(request) => to_json(get_day_marks(backend, request)),
        UiCommand::GetAttendanceLog => to_json(get_attendance_log(backend)),
        UiCommand::RecomputeRollups => to_json(recompute_rollups(backend)),
        UiCommand::GenerateReport(request) => to_json(generate_report(backend, request)),
        UiCommand::CreateBackup => to_json(create_backup(backend)),
        UiCommand::ListBackups => to_json(list_backups(backend)),
        UiCommand::RestoreBackup(request) => to_json(restore_backup(backend, request)),
        UiCommand::ExportRoster(request) => to_json(export_roster(backend, request)),
        UiCommand::GetSettings => to_json(get_settings(backend)),
        UiCommand::SelectClass(request) => to_json(select_class(backend, request)),
    }
}

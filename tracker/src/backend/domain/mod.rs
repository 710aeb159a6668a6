pub mod attendance_service;
pub mod backup_service;
pub mod commands;
pub mod data_directory_service;
pub mod errors;
pub mod export_service;
pub mod models;
pub mod report_service;
pub mod rollup_service;
pub mod roster_service;
pub mod settings_service;

pub use attendance_service::AttendanceService;
pub use backup_service::{BackupScheduler, BackupService};
pub use data_directory_service::DataDirectoryService;
pub use errors::{Result, TrackerError};
pub use export_service::ExportService;
pub use report_service::ReportService;
pub use rollup_service::RollupService;
pub use roster_service::RosterService;
pub use settings_service::SettingsService;

/// Timestamp embedded in backup and export names, second resolution
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

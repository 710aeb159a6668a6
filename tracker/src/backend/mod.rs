//! # Backend Module
//!
//! Data core of the attendance tracker. The UI collaborator talks to it only
//! through the handlers in [`io`]. Everything runs synchronously on the
//! caller's thread.

pub mod domain;
pub mod io;
pub mod storage;

pub use storage::csv::CsvConnection;

use domain::errors::Result;

/// Main backend struct that holds every service over one storage location
#[derive(Debug, Clone)]
pub struct Backend {
    pub connection: CsvConnection,
    pub roster_service: domain::RosterService,
    pub attendance_service: domain::AttendanceService,
    pub rollup_service: domain::RollupService,
    pub report_service: domain::ReportService,
    pub backup_service: domain::BackupService,
    pub export_service: domain::ExportService,
    pub data_directory_service: domain::DataDirectoryService,
    pub settings_service: domain::SettingsService,
}

impl Backend {
    /// Open the backend in the platform data directory
    pub fn new() -> Result<Self> {
        Ok(Self::with_connection(CsvConnection::new_default()?))
    }

    /// Open the backend over an existing connection
    pub fn with_connection(connection: CsvConnection) -> Self {
        let roster_service = domain::RosterService::new(connection.clone());
        let rollup_service = domain::RollupService::new(connection.clone());
        let attendance_service = domain::AttendanceService::new(
            connection.clone(),
            roster_service.clone(),
            rollup_service.clone(),
        );

        Self {
            report_service: domain::ReportService::new(connection.clone()),
            backup_service: domain::BackupService::new(connection.clone()),
            export_service: domain::ExportService::new(connection.clone()),
            data_directory_service: domain::DataDirectoryService::new(connection.clone()),
            settings_service: domain::SettingsService::new(connection.clone()),
            roster_service,
            attendance_service,
            rollup_service,
            connection,
        }
    }
}

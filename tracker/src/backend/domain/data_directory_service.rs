use log::info;

use crate::backend::domain::errors::Result;
use crate::backend::storage::csv::{CsvConnection, StorageLayout};

/// Service for managing data directory operations
#[derive(Debug, Clone)]
pub struct DataDirectoryService {
    csv_connection: CsvConnection,
}

impl DataDirectoryService {
    pub fn new(csv_connection: CsvConnection) -> Self {
        Self { csv_connection }
    }

    /// The base directory and its three subdirectories, re-created if any
    /// went missing while the app was running
    pub fn get_directories(&self) -> Result<StorageLayout> {
        let layout = self.csv_connection.ensure_directories()?;
        info!("Data directory: {}", layout.base.display());
        Ok(layout)
    }
}

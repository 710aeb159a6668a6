//! Error taxonomy shared by the storage and domain layers.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// A user-correctable input problem. Nothing was written.
    #[error("{0}")]
    Validation(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Corrupt record in {}: {message}", file.display())]
    CorruptRecord { file: PathBuf, message: String },
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),
    #[error("Copy error: {0}")]
    Copy(#[from] fs_extra::error::Error),
    #[error("Could not generate an unused student ID for class {class_num} after {attempts} attempts")]
    IdSpaceExhausted { class_num: u8, attempts: u32 },
}

impl TrackerError {
    pub fn validation(message: impl Into<String>) -> Self {
        TrackerError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TrackerError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

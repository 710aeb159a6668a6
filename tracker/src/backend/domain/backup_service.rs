//! # Backups
//!
//! A backup is a copy of every table in `data/` placed in
//! `backups/backup_YYYYMMDD_HHMMSS/`. Only the newest five are kept.
//!
//! Names sort chronologically, so rotation is a plain name sort. Two backups
//! in the same second get a `_01`, `_02`, ... suffix, which still sorts after
//! the unsuffixed name and before the next second.

use chrono::{Duration, Local, NaiveDateTime};
use fs_extra::file::CopyOptions;
use log::{debug, error, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::backend::domain::commands::backup::{BackupEntry, RestoreBackupResult};
use crate::backend::domain::errors::{Result, TrackerError};
use crate::backend::domain::FILE_TIMESTAMP_FORMAT;
use crate::backend::storage::csv::connection::replace_file_with_copy;
use crate::backend::storage::csv::CsvConnection;

pub const BACKUP_PREFIX: &str = "backup_";
pub const BACKUPS_TO_KEEP: usize = 5;
const MAX_SAME_SECOND_SUFFIX: u32 = 99;

#[derive(Debug, Clone)]
pub struct BackupService {
    connection: CsvConnection,
}

impl BackupService {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Snapshot `data/` now. Failures are logged and reported as `None`.
    pub fn create_backup(&self) -> Option<PathBuf> {
        self.create_backup_at(Local::now().naive_local())
    }

    /// Snapshot `data/` using `now` for the directory name
    pub fn create_backup_at(&self, now: NaiveDateTime) -> Option<PathBuf> {
        match self.try_create_backup(now) {
            Ok(path) => {
                info!("💾 BACKUP: Created {}", path.display());
                Some(path)
            }
            Err(e) => {
                error!("❌ BACKUP: No backup created: {}", e);
                None
            }
        }
    }

    /// Backups on disk, newest first
    pub fn list_backups(&self) -> Result<Vec<BackupEntry>> {
        let mut backups = self.backup_dirs()?;
        backups.reverse();
        Ok(backups)
    }

    /// Copy every table of the named backup back into `data/`.
    ///
    /// Tables that are not in the backup are left alone. Each table is
    /// replaced whole, so a failure part way leaves every file either old or
    /// restored.
    pub fn restore_backup(&self, backup_name: &str) -> Result<RestoreBackupResult> {
        let backup = self
            .backup_dirs()?
            .into_iter()
            .find(|b| b.name == backup_name)
            .ok_or_else(|| TrackerError::validation(format!("No backup named '{}'", backup_name)))?;

        let data_dir = self.connection.data_directory().to_path_buf();
        fs::create_dir_all(&data_dir)?;

        let mut restored_files = Vec::new();
        for table in table_files(&backup.path)? {
            let Some(file_name) = table.file_name() else {
                continue;
            };
            replace_file_with_copy(&table, &data_dir.join(file_name))?;
            restored_files.push(file_name.to_string_lossy().to_string());
        }

        info!("Restored {} tables from {}", restored_files.len(), backup.name);
        Ok(RestoreBackupResult {
            success_message: format!(
                "Restored {} files from backup {}",
                restored_files.len(),
                backup.name
            ),
            restored_files,
        })
    }

    fn try_create_backup(&self, now: NaiveDateTime) -> Result<PathBuf> {
        let layout = self.connection.ensure_directories()?;
        let backup_dir = self.unused_backup_dir(&layout.backups, now)?;
        fs::create_dir(&backup_dir)?;

        if let Err(e) = copy_tables(&layout.data, &backup_dir) {
            if let Err(cleanup) = fs::remove_dir_all(&backup_dir) {
                warn!("Could not remove partial backup {}: {}", backup_dir.display(), cleanup);
            }
            return Err(e);
        }

        // The snapshot is complete at this point; rotation trouble only gets logged
        if let Err(e) = self.prune() {
            warn!("Backup rotation failed: {}", e);
        }
        Ok(backup_dir)
    }

    fn unused_backup_dir(&self, backups_dir: &Path, now: NaiveDateTime) -> Result<PathBuf> {
        let stem = format!("{}{}", BACKUP_PREFIX, now.format(FILE_TIMESTAMP_FORMAT));
        let first = backups_dir.join(&stem);
        if !first.exists() {
            return Ok(first);
        }

        for suffix in 1..=MAX_SAME_SECOND_SUFFIX {
            let candidate = backups_dir.join(format!("{}_{:02}", stem, suffix));
            if !candidate.exists() {
                debug!("Backup name {} taken, using suffix {:02}", stem, suffix);
                return Ok(candidate);
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("too many backups named {}", stem),
        )
        .into())
    }

    /// Delete all but the newest `BACKUPS_TO_KEEP` backups
    fn prune(&self) -> Result<()> {
        let backups = self.backup_dirs()?;
        if backups.len() <= BACKUPS_TO_KEEP {
            return Ok(());
        }

        let stale: Vec<PathBuf> = backups[..backups.len() - BACKUPS_TO_KEEP]
            .iter()
            .map(|b| b.path.clone())
            .collect();
        fs_extra::remove_items(&stale)?;
        info!("Removed {} old backups", stale.len());
        Ok(())
    }

    /// Backup directories, oldest first. Names not shaped like
    /// `backup_YYYYMMDD_HHMMSS` or `backup_YYYYMMDD_HHMMSS_NN` are ignored.
    fn backup_dirs(&self) -> Result<Vec<BackupEntry>> {
        let backups_dir = self.connection.backup_directory();
        if !backups_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        for entry in fs::read_dir(backups_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if is_backup_name(name) {
                backups.push(BackupEntry {
                    name: name.to_string(),
                    path: path.clone(),
                });
            }
        }

        backups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(backups)
    }
}

/// Whether `name` is one this service generates
fn is_backup_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix(BACKUP_PREFIX) else {
        return false;
    };
    // YYYYMMDD_HHMMSS
    let Some(timestamp) = rest.get(..15) else {
        return false;
    };
    if !timestamp.bytes().all(|b| b.is_ascii_digit() || b == b'_')
        || NaiveDateTime::parse_from_str(timestamp, FILE_TIMESTAMP_FORMAT).is_err()
    {
        return false;
    }

    match &rest.as_bytes()[15..] {
        [] => true,
        [b'_', a, b] => a.is_ascii_digit() && b.is_ascii_digit(),
        _ => false,
    }
}

/// Table files directly inside `dir`, sorted by name
fn table_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut tables = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if CsvConnection::is_table_file(&path) {
            tables.push(path);
        }
    }
    tables.sort();
    Ok(tables)
}

fn copy_tables(data_dir: &Path, backup_dir: &Path) -> Result<()> {
    let options = CopyOptions::new();
    let mut copied = 0;
    for table in table_files(data_dir)? {
        let Some(file_name) = table.file_name() else {
            continue;
        };
        fs_extra::file::copy(&table, backup_dir.join(file_name), &options)?;
        copied += 1;
    }
    debug!("Copied {} tables into {}", copied, backup_dir.display());
    Ok(())
}

/// Cooperative backup timer.
///
/// Holds no thread. The host calls [`BackupScheduler::tick`] from its own
/// event loop and [`BackupScheduler::on_shutdown`] on the way out.
#[derive(Debug, Clone)]
pub struct BackupScheduler {
    interval: Duration,
    last_run: Option<NaiveDateTime>,
}

impl BackupScheduler {
    /// Upper bound on the configurable interval, one week
    pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

    /// A scheduler whose first backup is due one interval after `started_at`
    pub fn new(interval_minutes: u64, started_at: NaiveDateTime) -> Self {
        let minutes = interval_minutes.clamp(1, Self::MAX_INTERVAL_MINUTES) as i64;
        Self {
            interval: Duration::minutes(minutes),
            last_run: Some(started_at),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        match self.last_run {
            Some(last) => now - last >= self.interval,
            None => true,
        }
    }

    /// Run a backup if the interval has elapsed since the last one
    pub fn tick(&mut self, now: NaiveDateTime, backups: &BackupService) -> Option<PathBuf> {
        if !self.is_due(now) {
            return None;
        }
        self.last_run = Some(now);
        backups.create_backup_at(now)
    }

    /// Final backup as the application exits
    pub fn on_shutdown(&mut self, now: NaiveDateTime, backups: &BackupService) -> Option<PathBuf> {
        self.last_run = Some(now);
        backups.create_backup_at(now)
    }
}

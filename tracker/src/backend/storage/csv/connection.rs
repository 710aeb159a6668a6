use log::{debug, info, warn};
use std::env;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::backend::domain::errors::Result;
use crate::backend::domain::models::ClassNumber;

/// Overrides the resolved base directory when set
pub const BASE_DIR_ENV: &str = "ATTENDANCE_TRACKER_HOME";
const APP_DIR_NAME: &str = "AttendanceTracker";
const FALLBACK_DIR_NAME: &str = ".attendance_tracker";

pub const TABLE_EXTENSION: &str = "csv";
pub const LOG_FILE_NAME: &str = "attendance_records.csv";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// The four directories the tracker keeps its files in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    pub base: PathBuf,
    pub data: PathBuf,
    pub exports: PathBuf,
    pub backups: PathBuf,
}

impl StorageLayout {
    pub fn under<P: AsRef<Path>>(base: P) -> Self {
        let base = base.as_ref().to_path_buf();
        Self {
            data: base.join("data"),
            exports: base.join("exports"),
            backups: base.join("backups"),
            base,
        }
    }
}

/// Pick the platform's per-app data directory.
///
/// Order: `ATTENDANCE_TRACKER_HOME`, then the platform data directory, then
/// `~/.attendance_tracker`.
pub fn resolve_base_dir() -> PathBuf {
    choose_base_dir(env::var_os(BASE_DIR_ENV), platform_data_dir(), dirs::home_dir())
}

/// Resolution order of [`resolve_base_dir`] over already looked-up candidates.
/// An empty override counts as unset.
pub fn choose_base_dir(
    env_override: Option<OsString>,
    platform_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(path) = env_override.filter(|p| !p.is_empty()) {
        let path = PathBuf::from(path);
        info!("Using data directory from {}: {}", BASE_DIR_ENV, path.display());
        return path;
    }

    match platform_dir {
        Some(path) => path,
        None => {
            let fallback = home_dir
                .unwrap_or_else(|| PathBuf::from("."))
                .join(FALLBACK_DIR_NAME);
            warn!(
                "Could not determine platform data directory, using {}",
                fallback.display()
            );
            fallback
        }
    }
}

#[cfg(any(target_os = "android", target_os = "ios"))]
fn platform_data_dir() -> Option<PathBuf> {
    env::var_os("ANDROID_PRIVATE")
        .map(PathBuf::from)
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join(APP_DIR_NAME))
}

#[cfg(not(any(target_os = "android", target_os = "ios")))]
fn platform_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME))
}

/// Create the base, data, exports and backups directories. Idempotent.
/// Creation errors are returned as-is.
pub fn ensure_directories<P: AsRef<Path>>(base: P) -> Result<StorageLayout> {
    let layout = StorageLayout::under(base);
    for dir in [&layout.base, &layout.data, &layout.exports, &layout.backups] {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
            info!("Created directory: {}", dir.display());
        }
    }
    Ok(layout)
}

/// Replace `path` with whatever `write_contents` produces.
///
/// Contents go to a sibling temp file first and are renamed over the target,
/// so readers see the old file or the new one, never a partial write.
pub fn replace_file<F>(path: &Path, write_contents: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let temp_path = temp_path_for(path);

    let written = (|| -> Result<()> {
        let mut writer = BufWriter::new(File::create(&temp_path)?);
        write_contents(&mut writer)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    })();

    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(&temp_path) {
            debug!("Could not remove temp file {}: {}", temp_path.display(), cleanup);
        }
        return Err(e);
    }

    fs::rename(&temp_path, path)?;
    debug!("Replaced {}", path.display());
    Ok(())
}

/// Copy `source` over `destination` with the same whole-file guarantee as [`replace_file`]
pub fn replace_file_with_copy(source: &Path, destination: &Path) -> Result<()> {
    let temp_path = temp_path_for(destination);
    if let Err(e) = fs::copy(source, &temp_path) {
        if let Err(cleanup) = fs::remove_file(&temp_path) {
            debug!("Could not remove temp file {}: {}", temp_path.display(), cleanup);
        }
        return Err(e.into());
    }
    fs::rename(&temp_path, destination)?;
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// CsvConnection owns the directory layout and knows where every table lives
#[derive(Debug, Clone)]
pub struct CsvConnection {
    layout: StorageLayout,
}

impl CsvConnection {
    /// Create a connection rooted at `base_directory`, creating subdirectories as needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let layout = ensure_directories(base_directory)?;
        Ok(Self { layout })
    }

    /// Create a connection in the platform default location
    pub fn new_default() -> Result<Self> {
        Self::new(resolve_base_dir())
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn base_directory(&self) -> &Path {
        &self.layout.base
    }

    pub fn data_directory(&self) -> &Path {
        &self.layout.data
    }

    pub fn export_directory(&self) -> &Path {
        &self.layout.exports
    }

    pub fn backup_directory(&self) -> &Path {
        &self.layout.backups
    }

    /// Re-create any directory that went missing since the connection was opened
    pub fn ensure_directories(&self) -> Result<StorageLayout> {
        ensure_directories(&self.layout.base)
    }

    pub fn class_file_path(&self, class_num: ClassNumber) -> PathBuf {
        self.layout
            .data
            .join(format!("class_{}.{}", class_num, TABLE_EXTENSION))
    }

    pub fn log_file_path(&self) -> PathBuf {
        self.layout.data.join(LOG_FILE_NAME)
    }

    pub fn settings_file_path(&self) -> PathBuf {
        self.layout.base.join(SETTINGS_FILE_NAME)
    }

    /// Whether a file name looks like one of our tables
    pub fn is_table_file(path: &Path) -> bool {
        path.is_file()
            && path
                .extension()
                .map_or(false, |ext| ext == TABLE_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_new_creates_all_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("nested").join("tracker");

        let connection = CsvConnection::new(&base).unwrap();

        assert!(connection.data_directory().is_dir());
        assert!(connection.export_directory().is_dir());
        assert!(connection.backup_directory().is_dir());
        assert_eq!(connection.base_directory(), base.as_path());
    }

    #[test]
    fn test_ensure_directories_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let first = ensure_directories(temp_dir.path()).unwrap();
        fs::write(first.data.join("keep.csv"), "x\n").unwrap();

        let second = ensure_directories(temp_dir.path()).unwrap();

        assert_eq!(first, second);
        assert!(second.data.join("keep.csv").exists());
    }

    #[test]
    fn test_ensure_directories_propagates_errors() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        assert!(ensure_directories(&blocker).is_err());
    }

    #[test]
    fn test_env_override_wins() {
        let chosen = choose_base_dir(
            Some(OsString::from("/srv/school")),
            Some(PathBuf::from("/data/AttendanceTracker")),
            Some(PathBuf::from("/home/teacher")),
        );
        assert_eq!(chosen, PathBuf::from("/srv/school"));
    }

    #[test]
    fn test_empty_override_falls_through_to_platform_dir() {
        let chosen = choose_base_dir(
            Some(OsString::new()),
            Some(PathBuf::from("/data/AttendanceTracker")),
            Some(PathBuf::from("/home/teacher")),
        );
        assert_eq!(chosen, PathBuf::from("/data/AttendanceTracker"));
    }

    #[test]
    fn test_hidden_home_directory_is_last_resort() {
        let chosen = choose_base_dir(None, None, Some(PathBuf::from("/home/teacher")));
        assert_eq!(chosen, PathBuf::from("/home/teacher/.attendance_tracker"));

        let no_home = choose_base_dir(None, None, None);
        assert_eq!(no_home, PathBuf::from(".").join(".attendance_tracker"));
    }

    #[test]
    fn test_replace_file_with_copy_swaps_contents() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("backup.csv");
        let destination = temp_dir.path().join("class_1.csv");
        fs::write(&source, "restored\n").unwrap();
        fs::write(&destination, "current\n").unwrap();

        replace_file_with_copy(&source, &destination).unwrap();
        assert_eq!(fs::read_to_string(&destination).unwrap(), "restored\n");
        assert!(!temp_dir.path().join("class_1.csv.tmp").exists());

        let missing = temp_dir.path().join("missing.csv");
        assert!(replace_file_with_copy(&missing, &destination).is_err());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "restored\n");
        assert!(!temp_dir.path().join("class_1.csv.tmp").exists());
    }

    #[test]
    fn test_table_paths() {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        let class_3 = ClassNumber::new(3).unwrap();

        assert_eq!(
            connection.class_file_path(class_3),
            temp_dir.path().join("data").join("class_3.csv")
        );
        assert_eq!(
            connection.log_file_path(),
            temp_dir.path().join("data").join("attendance_records.csv")
        );
        assert_eq!(
            connection.settings_file_path(),
            temp_dir.path().join("settings.json")
        );
    }

    #[test]
    fn test_replace_file_swaps_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("table.csv");
        fs::write(&path, "old\n").unwrap();

        replace_file(&path, |out| {
            out.write_all(b"new\n")?;
            Ok(())
        })
        .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
        assert!(!temp_dir.path().join("table.csv.tmp").exists());
    }

    #[test]
    fn test_replace_file_keeps_old_contents_on_failure() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("table.csv");
        fs::write(&path, "old\n").unwrap();

        let result = replace_file(&path, |out| {
            out.write_all(b"half a row")?;
            Err(crate::backend::domain::errors::TrackerError::validation("boom"))
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "old\n");
        assert!(!temp_dir.path().join("table.csv.tmp").exists());
    }

    #[test]
    fn test_is_table_file_ignores_other_files() {
        let temp_dir = TempDir::new().unwrap();
        let csv = temp_dir.path().join("class_1.csv");
        let tmp = temp_dir.path().join("class_1.csv.tmp");
        fs::write(&csv, "").unwrap();
        fs::write(&tmp, "").unwrap();

        assert!(CsvConnection::is_table_file(&csv));
        assert!(!CsvConnection::is_table_file(&tmp));
        assert!(!CsvConnection::is_table_file(temp_dir.path()));
    }
}

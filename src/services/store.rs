//! File-backed attempt store.
//!
//! The whole record list lives in one JSON file that is re-read on every
//! request; there is no cross-request cache. Writers serialize through
//! [`AttemptStore::lock`], which holds both an in-process mutex and an
//! exclusive advisory lock on a sibling `.lock` file, so separate processes
//! sharing the file do not lose each other's updates. Saves go through a
//! temp file and `rename`, so readers never see a partial write.

use std::{
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use tracing::{debug, error, info, warn};

use crate::{error::GuardError, models::AttemptRecord};

/// Marker written next to the store so web servers refuse to serve it
const ACCESS_MARKER_FILE: &str = ".htaccess";
const ACCESS_MARKER_CONTENT: &str = "Deny from all";

/// Durable mapping from IP address to [`AttemptRecord`]
#[derive(Debug)]
pub struct AttemptStore {
    path: PathBuf,
    lock_path: PathBuf,
    writer: Mutex<()>,
}

/// Exclusive access to the store, released on drop
#[derive(Debug)]
pub struct StoreLock<'a> {
    _writer: MutexGuard<'a, ()>,
    _file: Option<File>,
}

impl AttemptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = sibling(&path, "lock");
        Self {
            path,
            lock_path,
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire the store for a load-modify-save sequence.
    ///
    /// If the lock file cannot be opened or locked, only in-process
    /// serialization is provided and a warning is logged.
    pub fn lock(&self) -> StoreLock<'_> {
        let writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let file = self
            .open_lock_file()
            .and_then(|file| file.lock().map(|()| file))
            .inspect_err(|e| {
                warn!(
                    path = %self.lock_path.display(),
                    error = %e,
                    "Could not acquire attempt store file lock, continuing with process lock only"
                )
            })
            .ok();

        StoreLock {
            _writer: writer,
            _file: file,
        }
    }

    /// Read every record.
    ///
    /// Never fails: a missing store is created empty, while unreadable or
    /// corrupt content yields no records. Reads fail open, so a storage
    /// outage lifts bans instead of locking everyone out.
    pub fn load(&self) -> Vec<AttemptRecord> {
        match self.try_load() {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable attempt store state");
                Vec::new()
            }
        }
    }

    /// Read every record, reporting why the content could not be used.
    ///
    /// A missing store is created empty.
    pub fn try_load(&self) -> Result<Vec<AttemptRecord>, GuardError> {
        match self.read_existing()? {
            Some(records) => Ok(records),
            None => {
                self.initialize()?;
                Ok(Vec::new())
            }
        }
    }

    /// Read every record without touching the filesystem otherwise.
    ///
    /// Returns `None` when the store does not exist yet.
    pub fn read_existing(&self) -> Result<Option<Vec<AttemptRecord>>, GuardError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(GuardError::StorageRead {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(Some(Vec::new()));
        }

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| GuardError::CorruptStore {
                path: self.path.clone(),
                source,
            })
    }

    /// Replace the stored records with `records`
    pub fn save(&self, records: &[AttemptRecord]) -> Result<(), GuardError> {
        let buffer = serde_json::to_vec(records)?;
        self.ensure_directory()?;

        let tmp_path = sibling(&self.path, &format!("{}.tmp", std::process::id()));
        let written = write_restricted(&tmp_path, &buffer, false)
            .and_then(|()| fs::rename(&tmp_path, &self.path));

        if let Err(source) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(GuardError::StorageWrite {
                path: self.path.clone(),
                source,
            });
        }

        debug!(path = %self.path.display(), records = records.len(), "Attempt store saved");
        Ok(())
    }

    /// Create an empty, access-restricted store file and its directory marker
    fn initialize(&self) -> Result<(), GuardError> {
        self.ensure_directory()?;

        match write_restricted(&self.path, b"", true) {
            Ok(()) => info!(path = %self.path.display(), "Created attempt store"),
            // Another request created it first
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(source) => {
                return Err(GuardError::StorageWrite {
                    path: self.path.clone(),
                    source,
                });
            }
        }

        self.write_access_marker();
        Ok(())
    }

    fn ensure_directory(&self) -> Result<(), GuardError> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                fs::create_dir_all(dir).map_err(|source| GuardError::StorageWrite {
                    path: dir.to_path_buf(),
                    source,
                })
            }
            _ => Ok(()),
        }
    }

    fn write_access_marker(&self) {
        let marker = self
            .path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(ACCESS_MARKER_FILE);
        if marker.exists() {
            return;
        }
        if let Err(e) = fs::write(&marker, ACCESS_MARKER_CONTENT) {
            error!(path = %marker.display(), error = %e, "Failed to write access marker");
        }
    }

    fn open_lock_file(&self) -> std::io::Result<File> {
        self.ensure_directory()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
    }
}

/// `store.json` -> `store.json.<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

/// Write `contents` to `path` with owner-only permissions on Unix
fn write_restricted(path: &Path, contents: &[u8], create_new: bool) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if create_new {
        options.create_new(true);
    } else {
        options.create(true).truncate(true);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, AttemptStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = AttemptStore::new(temp_dir.path().join("files").join("ip.json"));
        (temp_dir, store)
    }

    fn record(ip: &str, attempts: u32) -> AttemptRecord {
        AttemptRecord {
            ip: ip.to_string(),
            last_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            attempts,
            notified: false,
        }
    }

    #[test]
    fn test_missing_store_is_created_empty() {
        let (temp_dir, store) = create_test_store();

        assert!(store.load().is_empty());
        assert!(store.path().exists());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "");

        let marker = temp_dir.path().join("files").join(".htaccess");
        assert_eq!(fs::read_to_string(marker).unwrap(), "Deny from all");
    }

    #[cfg(unix)]
    #[test]
    fn test_store_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let (_temp_dir, store) = create_test_store();

        store.load();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        store.save(&[record("192.0.2.1", 1)]).unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_existing_marker_is_left_alone() {
        let (temp_dir, store) = create_test_store();
        let dir = temp_dir.path().join("files");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(".htaccess"), "Require all denied").unwrap();

        store.load();
        assert_eq!(
            fs::read_to_string(dir.join(".htaccess")).unwrap(),
            "Require all denied"
        );
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let (_temp_dir, store) = create_test_store();
        let records = vec![record("192.0.2.1", 3), record("192.0.2.2", 10)];

        store.save(&records).unwrap();
        assert_eq!(store.load(), records);

        let reloaded = store.load();
        store.save(&reloaded).unwrap();
        assert_eq!(store.load(), records);
    }

    #[test]
    fn test_corrupt_content_loads_empty_and_heals_on_save() {
        let (_temp_dir, store) = create_test_store();
        store.load();
        fs::write(store.path(), "{not json").unwrap();

        assert!(matches!(
            store.try_load(),
            Err(GuardError::CorruptStore { .. })
        ));
        assert!(store.load().is_empty());

        store.save(&[record("192.0.2.9", 1)]).unwrap();
        let content = fs::read_to_string(store.path()).unwrap();
        let parsed: Vec<AttemptRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_whitespace_only_content_loads_empty() {
        let (_temp_dir, store) = create_test_store();
        store.load();
        fs::write(store.path(), " \n").unwrap();
        assert!(store.try_load().unwrap().is_empty());
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let (temp_dir, store) = create_test_store();
        store.save(&[record("192.0.2.1", 1)]).unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path().join("files"))
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_unwritable_location_reports_write_failure() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "a file, not a directory").unwrap();
        let store = AttemptStore::new(blocker.join("ip.json"));

        assert!(matches!(
            store.save(&[record("192.0.2.1", 1)]),
            Err(GuardError::StorageWrite { .. })
        ));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_lock_is_released_on_drop() {
        let (_temp_dir, store) = create_test_store();
        {
            let _lock = store.lock();
            store.save(&[record("192.0.2.1", 1)]).unwrap();
        }
        let _lock = store.lock();
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_read_existing_does_not_create_store() {
        let (temp_dir, store) = create_test_store();
        assert!(store.read_existing().unwrap().is_none());
        assert!(!store.path().exists());
        assert!(!temp_dir.path().join("files").join(".htaccess").exists());

        store.save(&[record("192.0.2.1", 1)]).unwrap();
        assert_eq!(store.read_existing().unwrap().map(|r| r.len()), Some(1));
    }
}

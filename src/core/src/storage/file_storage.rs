use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, info};
use uuid::Uuid;

use crate::error_handling::types::StorageError;
use crate::storage::storage_trait::Storage;
use crate::storage::types::MirrorLogEntry;

const LOG_FILE_PREFIX: &str = "mirror";
const LOG_FILE_EXTENSION: &str = "json";

/// Directory of mirror logs, one JSON file per entry.
///
/// File names are `mirror-<yyyymmdd>-<hhmmss><millis>-<token>.json`. The
/// timestamp keeps them sortable by creation order and the six-character
/// random token separates concurrent writers without any locking; two
/// writers in the same millisecond can still collide with probability
/// 16^-6. Files are created exclusively, so a collision fails the write
/// instead of replacing the earlier log.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn next_file_name() -> String {
        let token = Uuid::new_v4().simple().to_string();
        format!(
            "{}-{}-{}.{}",
            LOG_FILE_PREFIX,
            Utc::now().format("%Y%m%d-%H%M%S%3f"),
            &token[..6],
            LOG_FILE_EXTENSION
        )
    }

    fn write_new(path: &Path, data: &[u8]) -> Result<(), StorageError> {
        let write_failed = |source| StorageError::WriteFailed {
            path: path.to_path_buf(),
            source,
        };
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(write_failed)?;
        file.write_all(data).map_err(write_failed)
    }

    /// Parses one persisted entry.
    pub fn read_entry(path: &Path) -> Result<MirrorLogEntry, StorageError> {
        let data = fs::read(path).map_err(|source| StorageError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let entry = serde_json::from_slice(&data).map_err(|source| StorageError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Parsed mirror log {}", path.display());
        Ok(entry)
    }

    /// Resolves `path` to the files it names.
    ///
    /// A file resolves to itself. A directory resolves to its direct
    /// non-directory children sorted by name; subdirectories are not
    /// descended into.
    pub fn collect_log_files(path: &Path) -> Result<Vec<PathBuf>, StorageError> {
        let read_failed = |source| StorageError::ReadFailed {
            path: path.to_path_buf(),
            source,
        };
        let metadata = fs::metadata(path).map_err(read_failed)?;
        if !metadata.is_dir() {
            return Ok(vec![path.to_path_buf()]);
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(path).map_err(read_failed)? {
            let entry = entry.map_err(read_failed)?;
            let file_type = entry.file_type().map_err(read_failed)?;
            if file_type.is_dir() {
                continue;
            }
            files.push(entry.path());
        }
        files.sort();
        debug!("Found {} mirror log(s) in {}", files.len(), path.display());
        Ok(files)
    }
}

impl Storage for FileStorage {
    fn save_entry(&self, entry: &MirrorLogEntry) -> Result<PathBuf, StorageError> {
        fs::create_dir_all(&self.base_path).map_err(|source| StorageError::CreateDirFailed {
            path: self.base_path.clone(),
            source,
        })?;
        let data = serde_json::to_vec(entry).map_err(StorageError::SerializeFailed)?;
        let path = self.base_path.join(Self::next_file_name());
        Self::write_new(&path, &data)?;
        info!("Saved mirror log {}", path.display());
        Ok(path)
    }
}

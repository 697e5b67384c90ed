use std::path::PathBuf;

use crate::error_handling::types::StorageError;
use crate::storage::types::MirrorLogEntry;

pub trait Storage: Send + Sync {
    /// Persists `entry`, returning where it was written.
    fn save_entry(&self, entry: &MirrorLogEntry) -> Result<PathBuf, StorageError>;
}

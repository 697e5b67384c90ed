//! Storage subsystem
//!
//! Persistence of mirrored connections, one JSON document per sampled
//! connection.
//!
//! Components:
//! - `storage_trait`: the Storage trait the mirror proxy writes through.
//! - `types`: the persisted `MirrorLogEntry` record.
//! - `file_storage`: directory-backed implementation, also used by replay to
//!   enumerate and parse persisted files.

pub mod file_storage;
pub mod storage_trait;
pub mod types;

pub use file_storage::FileStorage;
pub use storage_trait::Storage;
pub use types::MirrorLogEntry;

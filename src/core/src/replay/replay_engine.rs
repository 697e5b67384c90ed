use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::configuration::ReplayConfig;
use crate::error_handling::types::ReplayError;
use crate::network::send_payload;
use crate::storage::FileStorage;

/// One file whose payload was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayedFile {
    pub path: PathBuf,
    pub bytes: usize,
}

/// What a successful run did, in processing order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub replayed: Vec<ReplayedFile>,
    /// Files whose payload decoded to zero bytes
    pub skipped: Vec<PathBuf>,
}

/// Resends the payloads stored under `log_path` to `target`.
///
/// `log_path` names one file or a directory whose direct files are replayed
/// in lexicographic name order. Files are handled strictly one after the
/// other over a fresh connection each, without pacing or retries. The first
/// failure stops the run: files already sent stay sent, the rest are never
/// attempted.
pub async fn replay(log_path: &str, target: &str) -> Result<ReplayReport, ReplayError> {
    let config = ReplayConfig {
        log_path: log_path.to_string(),
        target: target.to_string(),
    };
    config.validate()?;

    let root = Path::new(log_path);
    let files = FileStorage::collect_log_files(root)?;
    if files.is_empty() {
        return Err(ReplayError::NoLogsFound(root.to_path_buf()));
    }

    let mut report = ReplayReport::default();
    for file in files {
        let entry = FileStorage::read_entry(&file)?;
        let payload = entry
            .decode_payload()
            .map_err(|source| ReplayError::InvalidPayload {
                path: file.clone(),
                source,
            })?;
        if payload.is_empty() {
            report.skipped.push(file);
            continue;
        }
        if entry.truncated {
            warn!(
                "Mirror log {} was truncated at capture, replaying the first {} byte(s) only",
                display_name(&file),
                payload.len()
            );
        }

        send_payload(target, &payload).await?;
        info!("Replayed mirror log {} to {}", display_name(&file), target);
        report.replayed.push(ReplayedFile {
            path: file,
            bytes: payload.len(),
        });
    }
    Ok(report)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error_handling::types::ConfigError;

/// Default sampling percentage when none is configured: mirror everything.
///
/// `MirrorConfig::default()` carries this rate too, so a config built with
/// `..Default::default()` samples every connection once a target or log
/// path is set. Set `sample_rate: 0` explicitly to sample none.
pub const DEFAULT_SAMPLE_RATE: i32 = 100;

/// Mirroring options handed to a proxy at start-up.
///
/// Read-only once built. Mirroring is *enabled* when either a target address
/// or a log directory is present; a proxy built from a disabled config only
/// relays. Only an empty string counts as an absent target or log path.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Address every sampled payload is forwarded to, e.g. `127.0.0.1:18080`
    pub target: Option<String>,
    /// Sampling percentage; values outside 0..=100 are clamped
    pub sample_rate: i32,
    /// `pattern=replacement` entries separated by `;`
    pub redact_rules: String,
    /// Directory receiving one JSON file per sampled connection
    pub log_path: Option<PathBuf>,
    /// Label recorded as `localAddr` in persisted entries
    pub local_address: String,
    /// Explicit seed for the sampling source; time-seeded when absent
    pub seed: Option<u64>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            target: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            redact_rules: String::new(),
            log_path: None,
            local_address: String::new(),
            seed: None,
        }
    }
}

impl MirrorConfig {
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref().filter(|t| !t.is_empty())
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    pub fn enabled(&self) -> bool {
        self.target().is_some() || self.log_path().is_some()
    }

    /// Rejects a mirror target that is not `host:port` shaped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.target() {
            Some(target) => validate_address(target),
            None => Ok(()),
        }
    }
}

/// Inputs of a replay run. Both values are required; emptiness is reported
/// by the replay engine before any I/O happens.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub log_path: String,
    pub target: String,
}

impl ReplayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_path.trim().is_empty() {
            return Err(ConfigError::MissingLogPath);
        }
        if self.target.trim().is_empty() {
            return Err(ConfigError::MissingTarget);
        }
        Ok(())
    }
}

pub(crate) fn validate_address(address: &str) -> Result<(), ConfigError> {
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| ConfigError::BadAddressFormatting(format!("missing port in {}", address)))?;
    if host.is_empty() {
        return Err(ConfigError::BadAddressFormatting(format!(
            "missing host in {}",
            address
        )));
    }
    port.parse::<u16>().map_err(|e| {
        ConfigError::BadAddressFormatting(format!("invalid port in {}: {}", address, e))
    })?;
    Ok(())
}

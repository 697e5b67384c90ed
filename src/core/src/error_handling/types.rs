use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    MissingLogPath,
    MissingTarget,
    BadAddressFormatting(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::MissingLogPath => write!(f, "mirror log path is required"),
            ConfigError::MissingTarget => write!(f, "target address is required"),
            ConfigError::BadAddressFormatting(e) => write!(f, "Address formatting error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Reason a single `pattern=replacement` entry was dropped.
#[derive(Debug)]
pub enum RedactError {
    MissingSeparator(String),
    InvalidPattern { pattern: String, source: regex::Error },
}

impl fmt::Display for RedactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedactError::MissingSeparator(rule) => {
                write!(f, "Invalid mirror redact rule: {}", rule)
            }
            RedactError::InvalidPattern { pattern, source } => {
                write!(f, "Invalid mirror redact regex {}: {}", pattern, source)
            }
        }
    }
}

impl std::error::Error for RedactError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RedactError::InvalidPattern { source, .. } => Some(source),
            RedactError::MissingSeparator(_) => None,
        }
    }
}

#[derive(Debug)]
pub enum StorageError {
    CreateDirFailed { path: PathBuf, source: std::io::Error },
    SerializeFailed(serde_json::Error),
    WriteFailed { path: PathBuf, source: std::io::Error },
    ReadFailed { path: PathBuf, source: std::io::Error },
    ParseFailed { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::CreateDirFailed { path, source } => {
                write!(f, "Failed to create directory {}: {}", path.display(), source)
            }
            StorageError::SerializeFailed(e) => write!(f, "Failed to serialize mirror log: {}", e),
            StorageError::WriteFailed { path, source } => {
                write!(f, "Failed to write {}: {}", path.display(), source)
            }
            StorageError::ReadFailed { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            StorageError::ParseFailed { path, source } => {
                write!(f, "invalid mirror log {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::CreateDirFailed { source, .. }
            | StorageError::WriteFailed { source, .. }
            | StorageError::ReadFailed { source, .. } => Some(source),
            StorageError::SerializeFailed(e) | StorageError::ParseFailed { source: e, .. } => {
                Some(e)
            }
        }
    }
}

#[derive(Debug)]
pub enum NetworkError {
    BindError(std::io::Error),
    LocalConnectFailed { port: u16, source: std::io::Error },
    TargetConnectFailed { target: String, source: std::io::Error },
    WriteFailed { target: String, source: std::io::Error },
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::BindError(e) => write!(f, "Network bind error: {}", e),
            NetworkError::LocalConnectFailed { port, source } => {
                write!(f, "Failed to connect to local service on port {}: {}", port, source)
            }
            NetworkError::TargetConnectFailed { target, source } => {
                write!(f, "Failed to connect to {}: {}", target, source)
            }
            NetworkError::WriteFailed { target, source } => {
                write!(f, "Failed to write payload to {}: {}", target, source)
            }
        }
    }
}

impl std::error::Error for NetworkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NetworkError::BindError(e) => Some(e),
            NetworkError::LocalConnectFailed { source, .. }
            | NetworkError::TargetConnectFailed { source, .. }
            | NetworkError::WriteFailed { source, .. } => Some(source),
        }
    }
}

#[derive(Debug)]
pub enum ReplayError {
    ConfigurationError(ConfigError),
    NoLogsFound(PathBuf),
    StorageError(StorageError),
    InvalidPayload { path: PathBuf, source: base64::DecodeError },
    NetworkError(NetworkError),
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::ConfigurationError(e) => write!(f, "Configuration error: {}", e),
            ReplayError::NoLogsFound(path) => {
                write!(f, "no mirror logs found in {}", path.display())
            }
            ReplayError::StorageError(e) => write!(f, "Storage error: {}", e),
            ReplayError::InvalidPayload { path, source } => {
                write!(f, "invalid mirror log payload in {}: {}", path.display(), source)
            }
            ReplayError::NetworkError(e) => write!(f, "Network error: {}", e),
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReplayError::ConfigurationError(e) => Some(e),
            ReplayError::NoLogsFound(_) => None,
            ReplayError::StorageError(e) => Some(e),
            ReplayError::InvalidPayload { source, .. } => Some(source),
            ReplayError::NetworkError(e) => Some(e),
        }
    }
}

impl From<ConfigError> for ReplayError {
    fn from(err: ConfigError) -> Self {
        ReplayError::ConfigurationError(err)
    }
}

impl From<StorageError> for ReplayError {
    fn from(err: StorageError) -> Self {
        ReplayError::StorageError(err)
    }
}

impl From<NetworkError> for ReplayError {
    fn from(err: NetworkError) -> Self {
        ReplayError::NetworkError(err)
    }
}

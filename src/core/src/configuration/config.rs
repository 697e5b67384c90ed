use super::types::*;
use crate::error_handling::types::ConfigError;
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Values loaded from a TOML configuration file.
///
/// Both tables are optional; missing keys fall back to their defaults:
///
/// ```toml
/// [mirror]
/// target = "127.0.0.1:18080"
/// sample_rate = 50
/// redact_rules = "password=***;token=***"
/// log_path = "./mirror-logs"
///
/// [replay]
/// log_path = "./mirror-logs"
/// target = "127.0.0.1:8080"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mirror: MirrorConfig,
    pub replay: ReplayConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))
    }

    fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }
}

/// Command line of the `kt-mirror` binary.
#[derive(Parser, Debug)]
#[command(name = "kt-mirror")]
#[command(version)]
#[command(about = "Mirror, sample, redact and replay TCP traffic of a local service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start one mirror proxy per local port and run until interrupted
    Proxy(ProxyArgs),
    /// Replay mirrored traffic logs to a target address
    Replay(ReplayArgs),
}

/// Options of the `proxy` subcommand.
///
/// Every mirror option may come from the command line, from a `KT_MIRROR_*`
/// environment variable, or from the `[mirror]` table of `--config`; the
/// first two override the file.
#[derive(Args, Debug, Clone)]
pub struct ProxyArgs {
    /// Local service ports to proxy, e.g. `8080` or `7001,8080`
    #[arg(long = "local-port", required = true, value_delimiter = ',')]
    pub local_ports: Vec<u16>,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Mirror traffic to the specified address, e.g. 127.0.0.1:18080
    #[arg(long, env = "KT_MIRROR_TARGET")]
    pub mirror_target: Option<String>,

    /// Mirror sample rate in percentage (0-100)
    #[arg(long, env = "KT_MIRROR_SAMPLE_RATE", allow_negative_numbers = true)]
    pub mirror_sample_rate: Option<i32>,

    /// Mirror redact rules in 'pattern=replacement' format, separated by ';'
    #[arg(long, env = "KT_MIRROR_REDACT_RULES")]
    pub mirror_redact_rules: Option<String>,

    /// Directory to write mirror request logs
    #[arg(long, env = "KT_MIRROR_LOG_PATH")]
    pub mirror_log_path: Option<PathBuf>,

    /// Fixed seed for the sampling decision (reproducible runs)
    #[arg(long, env = "KT_MIRROR_SEED")]
    pub mirror_seed: Option<u64>,
}

impl ProxyArgs {
    /// Merges the configuration file (if any) with command-line values.
    pub fn resolve(&self) -> Result<MirrorConfig, ConfigError> {
        let mut mirror = Config::load(self.config.as_deref())?.mirror;
        if let Some(ref target) = self.mirror_target {
            mirror.target = Some(target.clone());
        }
        if let Some(rate) = self.mirror_sample_rate {
            mirror.sample_rate = rate;
        }
        if let Some(ref rules) = self.mirror_redact_rules {
            mirror.redact_rules = rules.clone();
        }
        if let Some(ref path) = self.mirror_log_path {
            mirror.log_path = Some(path.clone());
        }
        if self.mirror_seed.is_some() {
            mirror.seed = self.mirror_seed;
        }
        mirror.validate()?;
        Ok(mirror)
    }
}

/// Options of the `replay` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Path to mirror log file or directory
    #[arg(long, env = "KT_MIRROR_REPLAY_LOG_PATH")]
    pub log_path: Option<String>,

    /// Target address to replay traffic to, e.g. 127.0.0.1:8080
    #[arg(long, env = "KT_MIRROR_REPLAY_TARGET")]
    pub target: Option<String>,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ReplayArgs {
    pub fn resolve(&self) -> Result<ReplayConfig, ConfigError> {
        let mut replay = Config::load(self.config.as_deref())?.replay;
        if let Some(ref log_path) = self.log_path {
            replay.log_path = log_path.clone();
        }
        if let Some(ref target) = self.target {
            replay.target = target.clone();
        }
        Ok(replay)
    }
}

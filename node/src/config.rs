//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use jury_types::LifecycleParams;

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for a jury node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Data directory for the LMDB store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub lmdb_map_size: usize,

    /// Whether to enable the HTTP API.
    #[serde(default = "default_true")]
    pub enable_rpc: bool,

    /// Address the HTTP API binds to.
    #[serde(default = "default_rpc_host")]
    pub rpc_host: String,

    /// HTTP API port (if enabled). 0 picks a free port.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Seconds between sweeps for expired cases.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to serve Prometheus metrics at `/metrics`.
    #[serde(default = "default_true")]
    pub enable_metrics: bool,

    /// Closure, reward and voting parameters.
    #[serde(default)]
    pub lifecycle: LifecycleParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./jury_data")
}

fn default_map_size() -> usize {
    1024 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

fn default_rpc_host() -> String {
    "0.0.0.0".to_string()
}

fn default_rpc_port() -> u16 {
    7070
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Reject values the node cannot run with.
    pub fn validate(&self) -> Result<(), NodeError> {
        if self.sweep_interval_secs == 0 {
            return Err(NodeError::Config("sweep_interval_secs must be positive".into()));
        }
        if self.lifecycle.threshold_bps > 10_000 {
            return Err(NodeError::Config(format!(
                "lifecycle.threshold_bps must be at most 10000, got {}",
                self.lifecycle.threshold_bps
            )));
        }
        self.parsed_log_format()?;
        Ok(())
    }

    pub fn parsed_log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            lmdb_map_size: default_map_size(),
            enable_rpc: default_true(),
            rpc_host: default_rpc_host(),
            rpc_port: default_rpc_port(),
            sweep_interval_secs: default_sweep_interval_secs(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            enable_metrics: default_true(),
            lifecycle: LifecycleParams::default(),
        }
    }
}

//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the watchdog.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// User-Agent the node's auth filter recognises as server-to-server traffic.
pub const DEFAULT_USER_AGENT: &str = "Nacos-Server:2.3.2";

/// Root configuration for the consensus watchdog.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Probe loop settings (enable switch, retry budget, intervals).
    pub monitor: MonitorConfig,

    /// Where the node's own API and data directory live.
    pub node: NodeConfig,

    /// Server identity header sent with every probe request.
    pub auth: AuthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Probe loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Run the watchdog at all.
    pub enabled: bool,

    /// Maximum number of probe attempts before giving up.
    pub max_retries: u32,

    /// Delay before each probe attempt in milliseconds.
    pub probe_interval_ms: u64,

    /// Readiness poll interval in milliseconds (polling fallback only).
    pub readiness_poll_ms: u64,

    /// Per-request timeout for calls to the node API in milliseconds.
    ///
    /// Must stay well above the node's own consensus RPC timeout, or a slow
    /// "no leader" reply is cut off and read as a terminal failure.
    pub request_timeout_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_retries: 20,
            probe_interval_ms: 3_000,
            readiness_poll_ms: 1_000,
            request_timeout_ms: 30_000,
        }
    }
}

/// Node API and on-disk layout.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Base URL of the node's own API (e.g., "http://127.0.0.1:8848").
    pub api_base_url: String,

    /// Path of the instance endpoint the marker is written to.
    pub instance_path: String,

    /// Optional module readiness endpoint, queried once the node is up.
    pub readiness_path: Option<String>,

    /// Node home directory.
    pub home: PathBuf,

    /// Consensus state directory, relative to `home`.
    pub consensus_subdir: PathBuf,

    /// User-Agent header value for probe requests.
    pub user_agent: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8848".to_string(),
            instance_path: "/nacos/v1/ns/instance".to_string(),
            readiness_path: Some("/nacos/v1/console/health/readiness".to_string()),
            home: default_home(),
            consensus_subdir: PathBuf::from("data/protocol/raft"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

fn default_home() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join("nacos"))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl NodeConfig {
    /// Absolute-or-relative path of the consensus state directory.
    pub fn consensus_dir(&self) -> PathBuf {
        self.home.join(&self.consensus_subdir)
    }
}

/// Server identity header pair.
///
/// Only sent when `server_identity_key` is non-blank.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub server_identity_key: String,
    pub server_identity_value: String,
}

impl AuthConfig {
    /// The header pair to attach, if an identity key is configured.
    pub fn identity_header(&self) -> Option<(&str, &str)> {
        let key = self.server_identity_key.trim();
        if key.is_empty() {
            None
        } else {
            Some((key, self.server_identity_value.as_str()))
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9464".to_string(),
        }
    }
}

//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::WatchdogConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment switch that enables the watchdog.
pub const ENV_ENABLED: &str = "WATCHDOG_ENABLED";
/// Environment override for the retry budget.
pub const ENV_MAX_RETRIES: &str = "WATCHDOG_MAX_RETRIES";
/// Environment override for the node home directory.
pub const ENV_NODE_HOME: &str = "WATCHDOG_NODE_HOME";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, value } => {
                write!(f, "Invalid value for {}: {:?}", var, value)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
///
/// Environment overrides are applied between parsing and validation.
pub fn load_config(path: &Path) -> Result<WatchdogConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: WatchdogConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    finish(config)
}

/// Load from `path` if given, otherwise start from defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<WatchdogConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => finish(WatchdogConfig::default()),
    }
}

fn finish(mut config: WatchdogConfig) -> Result<WatchdogConfig, ConfigError> {
    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply `WATCHDOG_*` overrides read through `lookup`.
pub fn apply_env_overrides<F>(config: &mut WatchdogConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_ENABLED) {
        config.monitor.enabled = parse_bool(&value).ok_or(ConfigError::Env {
            var: ENV_ENABLED,
            value: value.clone(),
        })?;
    }

    if let Some(value) = lookup(ENV_MAX_RETRIES) {
        config.monitor.max_retries = value.trim().parse().map_err(|_| ConfigError::Env {
            var: ENV_MAX_RETRIES,
            value: value.clone(),
        })?;
    }

    if let Some(value) = lookup(ENV_NODE_HOME) {
        if !value.trim().is_empty() {
            config.node.home = PathBuf::from(value);
        }
    }

    Ok(())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), or defaults
//!     → loader.rs (parse & deserialize, WATCHDOG_* env overrides)
//!     → validation.rs (semantic checks)
//!     → WatchdogConfig (validated, immutable)
//!     → cloned into the watchdog task
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the watchdog runs once per process
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::WatchdogConfig;
pub use schema::{AuthConfig, LogFormat, MonitorConfig, NodeConfig, ObservabilityConfig};
pub use validation::ValidationError;

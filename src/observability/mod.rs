//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! watchdog produces:
//!     → logging.rs (structured log events per attempt, cleanup, recovery)
//!     → metrics.rs (probe outcome and recovery counters)
//! ```
//!
//! # Design Decisions
//! - Every probe attempt is logged with status and body
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

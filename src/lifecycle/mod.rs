//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config loaded → enabled? → spawn watchdog task → WatchdogHandle
//!
//! Shutdown (shutdown.rs):
//!     Trigger → readiness wait / probe sleep aborts → RunReport::Cancelled
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Watchdog starts after the host is wired, runs once, never blocks the host
//! - Shutdown cannot interrupt recovery once it has begun

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::{launch, launch_with, WatchdogHandle};

//! Consensus health watchdog library.
//!
//! After a node starts, write a persistent marker through its own API to
//! prove the consensus layer has a leader. If the write keeps failing with
//! "no leader", wipe the local consensus state and exit with code 100 so a
//! supervisor restarts the node clean.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod watchdog;

pub use config::schema::WatchdogConfig;
pub use lifecycle::{launch, Shutdown, WatchdogHandle};
pub use watchdog::{RunReport, RECOVERY_EXIT_CODE};

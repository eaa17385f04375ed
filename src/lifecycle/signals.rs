//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGTERM/SIGINT (Ctrl-C on other platforms)
//! - Translate them into a [`Shutdown`](super::Shutdown) trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A watchdog already wiping state is not interrupted by signals

/// Resolves when the process is asked to terminate.
pub async fn terminate_requested() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

//! OS signal handling.
//!
//! First Ctrl-C stops dispatching new sweeps; in-flight sweeps run until
//! they finish or hit their deadline. A second Ctrl-C exits immediately.

use crate::lifecycle::shutdown::Shutdown;

/// Spawn a task translating Ctrl-C into a shutdown trigger.
pub fn spawn_ctrl_c_handler(shutdown: Shutdown) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::warn!("Ctrl-C handler unavailable");
            return;
        }
        tracing::warn!("Interrupt received, finishing in-flight sweeps");
        shutdown.trigger();

        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::error!("Second interrupt, exiting");
            std::process::exit(130);
        }
    });
}

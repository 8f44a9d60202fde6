//! Signal handling for graceful engine shutdown.
//!
//! A termination signal is turned into a [`QuitEvent`] queued on the
//! process-wide event manager, so the main loop stops through the same path
//! as any other quit request.

use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use zenith_event_system::{EventManager, QuitEvent};

/// Exit code reported for a quit caused by a signal.
pub const SIGNAL_EXIT_CODE: i32 = 130;

/// Waits until a termination signal is received.
///
/// # Platform Support
///
/// * **Unix platforms**: Handles SIGINT and SIGTERM signals
/// * **Windows**: Handles Ctrl+C signal
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => {
                info!("📡 Received SIGINT");
            }
            _ = sigterm.recv() => {
                info!("📡 Received SIGTERM");
            }
        }
    }

    #[cfg(windows)]
    {
        signal::ctrl_c().await?;
        info!("📡 Received Ctrl+C");
    }

    Ok(())
}

/// Queues a quit request on the process-wide manager, if there is one.
pub fn request_quit(exit_code: i32) -> bool {
    match EventManager::instance() {
        Some(events) => events.queue(QuitEvent::new(exit_code).into_ref()),
        None => {
            warn!("⚠️ Quit requested but no event manager is installed");
            false
        }
    }
}

/// Spawns a task that queues a quit request when a termination signal
/// arrives.
pub fn spawn_quit_on_signal() -> JoinHandle<()> {
    tokio::spawn(async {
        match wait_for_shutdown_signal().await {
            Ok(()) => {
                info!("🛑 Shutdown signal received, requesting quit");
                request_quit(SIGNAL_EXIT_CODE);
            }
            Err(e) => error!("❌ Failed to install signal handlers: {}", e),
        }
    })
}

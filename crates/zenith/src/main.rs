//! Main entry point for the Zenith engine host
//!
//! Loads configuration, initializes logging, then runs the event-driven main
//! loop until a quit event is delivered or a termination signal arrives.

mod cli;
mod config;
mod engine;
mod logging;
mod signals;

use anyhow::{anyhow, Result};
use cli::CliArgs;
use config::AppConfig;
use engine::{Engine, EngineReport};
use tracing::{info, warn};
use zenith_event_system::create_event_manager;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Configuration is loaded before logging so its level can be applied
    let mut config = AppConfig::load_from_file(&args.config_path).await?;
    args.apply_to(&mut config);
    config
        .validate()
        .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

    logging::setup_logging(&config.logging)?;
    display_banner();
    info!("📂 Config: {}", args.config_path.display());

    let events = create_event_manager();
    let engine = Engine::new(events.clone(), config.engine.clone());
    let signal_task = signals::spawn_quit_on_signal();

    info!("🛑 Press Ctrl+C to quit");
    let report = engine.run().await;
    signal_task.abort();

    log_report(&report);
    for issue in events.validate() {
        warn!("⚠️ {}", issue);
    }

    if report.exit_code != 0 {
        std::process::exit(report.exit_code);
    }
    Ok(())
}

fn display_banner() {
    let version = option_env!("CARGO_PKG_VERSION").unwrap_or("UNK");
    info!("╔══════════════════════════════════════╗");
    info!("║           🌟 ZENITH ENGINE 🌟         ║");
    info!("║              v{:<22} ║", version);
    info!("╚══════════════════════════════════════╝");
}

fn log_report(report: &EngineReport) {
    let stats = &report.events;
    info!("📊 Final Statistics:");
    info!("  - Ticks: {} ({} updates, {} renders)", report.ticks, report.updates, report.renders);
    info!(
        "  - Events: {} queued, {} dequeued, {} dispatched, {} consumed",
        stats.events_queued, stats.events_dequeued, stats.events_dispatched, stats.events_consumed
    );
    info!(
        "  - Drains: {} ({} complete, {} partial)",
        stats.total_drains(),
        stats.drains_completed,
        stats.drains_partial
    );
    if stats.dispatch_anomalies > 0 {
        warn!("  - Dispatch anomalies: {}", stats.dispatch_anomalies);
    }
    info!("👋 Zenith shut down with exit code {}", report.exit_code);
}

//! Coster Bridge - standalone headless bridge for Coster EW-50E controllers.
//!
//! Keeps a session to the controller open, mirrors every zone in memory, and
//! logs a climate summary whenever the controller reports a change.

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use coster_core::{Coordinator, ZoneListener};
use tokio::signal;

use crate::config::{BridgeConfig, StartupCommand};

/// How often the startup command task checks for a live session.
const STARTUP_COMMAND_POLL: Duration = Duration::from_millis(500);

/// Coster Bridge - Headless client for the Coster EW-50E HVAC controller.
#[derive(Parser, Debug)]
#[command(name = "coster-bridge")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "COSTER_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Controller host (overrides config file).
    #[arg(long)]
    host: Option<String>,

    /// Connect over plain http/ws (overrides config file).
    #[arg(long)]
    no_tls: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("Coster Bridge v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config =
        BridgeConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(host) = args.host {
        config.host = host;
    }
    if args.no_tls {
        config.use_tls = false;
    }

    let core_config = config.to_core_config();
    core_config.validate().map_err(|e| {
        anyhow!(
            "Invalid configuration: {}. Set `host` in the config file, \
             pass --host, or set COSTER_HOST.",
            e
        )
    })?;

    log::info!(
        "Configuration: host={}, tls={}, zones={}",
        core_config.host,
        core_config.use_tls,
        core_config.zone_ids.len()
    );

    let coordinator =
        Coordinator::from_config(core_config).context("Failed to create coordinator")?;

    // Listener lives for the whole process; the coordinator only holds it weakly.
    let config = Arc::new(config);
    let summary_listener: Arc<dyn ZoneListener> = {
        let coordinator = Arc::downgrade(&coordinator);
        let config = Arc::clone(&config);
        Arc::new(move || {
            if let Some(coordinator) = coordinator.upgrade() {
                log_zone_summary(&coordinator, &config);
            }
        })
    };
    coordinator.add_listener(&summary_listener);

    coordinator.start();

    if let Some(command) = config.startup_command.clone() {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            send_startup_command(&coordinator, command).await;
        });
    }

    // Wait for shutdown signal
    shutdown_signal().await;

    log::info!("Shutdown signal received, cleaning up...");
    coordinator.stop();

    log::info!("Shutdown complete");
    Ok(())
}

/// Waits for the first live session, then sends `command` once.
async fn send_startup_command(coordinator: &Coordinator, command: StartupCommand) {
    while !coordinator.is_connected() {
        if !coordinator.is_running() {
            return;
        }
        tokio::time::sleep(STARTUP_COMMAND_POLL).await;
    }

    if coordinator.set_zone(&command.zone, &command.attributes).await {
        log::info!("Startup command sent to zone {}", command.zone);
    } else {
        log::warn!("Startup command for zone {} was not sent", command.zone);
    }
}

/// Logs one line per known zone.
fn log_zone_summary(coordinator: &Coordinator, config: &BridgeConfig) {
    let mut zone_ids: Vec<String> = coordinator.data().into_keys().collect();
    zone_ids.sort_by_key(|id| id.parse::<u32>().unwrap_or(u32::MAX));

    for zone_id in zone_ids {
        let Some(zone) = coordinator.climate(&zone_id) else {
            continue;
        };
        log::info!(
            "{}: mode={:?} set={:?} current={:?} fan={:?} swing={:?}{}",
            config.zone_label(&zone_id),
            zone.hvac_mode(),
            zone.target_temperature(),
            zone.current_temperature(),
            zone.fan_mode(),
            zone.swing_mode(),
            if zone.has_error() { " ERROR" } else { "" }
        );
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

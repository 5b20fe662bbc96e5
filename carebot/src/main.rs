//! # CareBot Supervisor Binary
//!
//! Loads the configuration, builds the CareBot context and runs the
//! rotation scheduler until Ctrl+C or SIGTERM. The actuator outputs are
//! released on every exit path.
//!
//! # Usage
//!
//! ```bash
//! # Simulation backend, default config path
//! carebot --simulate
//!
//! # Specific config, debug logging, JSON logs
//! carebot --config config/carebot.toml -v --json
//! ```

use carebot::CareBot;
use carebot_common::config::{CareBotConfig, ConfigError, LogLevel};
use carebot_common::consts::DEFAULT_CONFIG_PATH;
use carebot_hal::DriverRegistry;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// CareBot - scheduled patient repositioning for pressure-ulcer prevention
#[derive(Parser, Debug)]
#[command(name = "carebot")]
#[command(version)]
#[command(about = "Scheduled patient repositioning controller")]
#[command(long_about = None)]
struct Args {
    /// Path to the configuration file (carebot.toml).
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Force the simulation output backend
    #[arg(short = 's', long)]
    simulate: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let (mut config, missing) = match CareBotConfig::load_validated(&args.config) {
        Ok(config) => (config, false),
        Err(ConfigError::FileNotFound) => (CareBotConfig::default(), true),
        Err(e) => {
            eprintln!("{}: {}", args.config.display(), e);
            return Err(e.into());
        }
    };

    setup_tracing(&args, config.shared.log_level);

    info!("🚀 CareBot v{} starting", env!("CARGO_PKG_VERSION"));
    if missing {
        warn!(
            "No configuration at {}, using built-in defaults",
            args.config.display()
        );
    }
    if args.simulate {
        info!("Simulation mode enabled");
        config.driver = "simulation".to_string();
    }

    let registry = DriverRegistry::with_builtin();
    for (name, summary) in registry.describe() {
        info!("Output backend available: {} ({})", name, summary);
    }

    let carebot = Arc::new(CareBot::from_config(config, &registry)?);
    let release = carebot.release_guard();

    let runner = {
        let carebot = Arc::clone(&carebot);
        tokio::spawn(async move { carebot.run().await })
    };

    shutdown_signal().await;
    info!("Initiating graceful shutdown...");

    carebot.stop();
    // Halts any move in flight so the loop can exit promptly.
    drop(release);
    if let Err(e) = runner.await {
        error!("Scheduler task ended abnormally: {}", e);
    }

    let status = carebot.status();
    info!("📊 Final status:");
    info!("  - Posture: {}", status.scheduler.current_position_label);
    info!("  - Total rotations: {}", status.scheduler.total_rotations);
    info!("  - Emergency halts: {}", status.emergency_halts);

    info!("🏁 CareBot shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Unable to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Unable to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("🛑 Received shutdown signal (Ctrl+C)"),
        _ = terminate => info!("🛑 Received shutdown signal (SIGTERM)"),
    }
}

/// Setup tracing subscriber: config level, `--verbose` forces debug.
fn setup_tracing(args: &Args, level: LogLevel) {
    let level = if args.verbose { LogLevel::Debug } else { level };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_line_number(true)
            .init();
    }
}

//! Account autopilot entry point.
//!
//! The runner drives freshly registered game accounts without a human at
//! the keyboard. It receives decoded server notifications via NATS, feeds
//! them to one [`AccountSession`](autopilot_core::AccountSession) per
//! configured account, and publishes the commands the sessions send back.
//!
//! # Architecture
//!
//! ```text
//! NATS (notification) --> EventBus --> creation / onboarding / progression --> NATS (command)
//! ```
//!
//! Sessions share nothing. Ctrl-C cancels every pending delay and wait,
//! drains outbound commands, and exits.

mod error;
mod nats;
mod runner;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use autopilot_core::{BotConfig, GameDataProvider, SessionSettings, StaticGameData};
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::RunnerError;
use crate::nats::NatsBridge;
use crate::runner::AccountRunner;

/// Default configuration path, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "autopilot-config.yaml";

/// Application entry point.
///
/// Loads configuration and reference data, initializes logging, connects
/// to NATS, then runs every account session until Ctrl-C.
///
/// # Errors
///
/// Returns an error if initialization fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path =
        std::env::var("AUTOPILOT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
    let config = BotConfig::from_file(Path::new(&config_path))
        .map_err(RunnerError::from)
        .with_context(|| format!("loading {config_path}"))?;

    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        config = config_path,
        accounts = config.accounts.len(),
        nats_url = config.infrastructure.nats_url,
        "autopilot-runner starting"
    );

    let data = StaticGameData::from_file(Path::new(&config.infrastructure.game_data_path))
        .map_err(RunnerError::from)
        .with_context(|| format!("loading {}", config.infrastructure.game_data_path))?;
    info!(breeds = data.breed_count(), "reference data loaded");
    let data: Arc<dyn GameDataProvider> = Arc::new(data);

    let bridge = NatsBridge::connect(&config.infrastructure.nats_url).await?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            return;
        }
        info!("shutdown requested");
        signal.cancel();
    });

    let settings = SessionSettings::from_config(&config);
    let runners = config.accounts.iter().cloned().map(|account| {
        let username = account.username.clone();
        let runner = AccountRunner::new(bridge.clone(), account, settings.clone(), Arc::clone(&data));
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = runner.run(shutdown).await {
                error!(account = %username, error = %e, "account session failed");
            }
        }
    });
    join_all(runners).await;

    info!("autopilot-runner stopped");
    Ok(())
}

//! AAVE Position Monitor
//!
//! Watches borrowing positions on AAVE V3 across multiple EVM networks,
//! derives each position's liquidation risk and keeps a single Telegram
//! message updated with the latest snapshot.
//! Features:
//! - Multi-endpoint RPC pool with health tracking and failover
//! - Per-address fetch retry with fixed backoff
//! - Closed-form liquidation-distance derivation from the health factor

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use monitor_api::{Notifier, TelegramClient};
use monitor_chain::{EndpointPool, NetworkConfig, PoolOptions, PoolReader};
use monitor_core::{Monitor, MonitorConfig, PositionFetcher};

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,monitor_core=debug,monitor_chain=debug")),
        )
        .init();

    // Config file: first CLI argument, CONFIG_PATH, or ./config.toml
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CONFIG_PATH").ok())
        .unwrap_or_else(|| "config.toml".to_string());
    let config = MonitorConfig::load(&config_path)?;

    // Startup failures past this point are unrecoverable by design: an
    // unknown network, zero usable endpoints or a missing token mean the
    // process cannot do anything useful.
    let network = NetworkConfig::by_name(&config.network)?;
    info!(
        network = network.name,
        chain_id = network.chain_id,
        addresses = config.addresses.len(),
        interval_secs = config.update_interval_secs,
        "Starting AAVE position monitor"
    );

    let pool = Arc::new(EndpointPool::new(&network, PoolOptions::default())?);
    let fetcher = PositionFetcher::new(pool, PoolReader::new(&network));

    let token = config.telegram_token()?;
    let notifier = Notifier::new(TelegramClient::new(token, config.telegram.chat_id.clone()));

    let monitor = Monitor::new(
        fetcher,
        notifier,
        network.name,
        config.addresses.clone(),
        config.update_interval(),
        config.max_concurrent_fetches,
    );

    // Ctrl-C flips the shutdown signal; the monitor drains cleanly.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            shutdown_tx.send(true).ok();
        }
    });

    monitor.run(shutdown_rx).await
}

/// Print startup banner.
fn print_banner() {
    println!(
        r#"
    ╔═╗╔═╗╦  ╦╔═╗  ╔╦╗╔═╗╔╗╔╦╔╦╗╔═╗╦═╗
    ╠═╣╠═╣╚╗╔╝║╣   ║║║║ ║║║║║ ║ ║ ║╠╦╝
    ╩ ╩╩ ╩ ╚╝ ╚═╝  ╩ ╩╚═╝╝╚╝╩ ╩ ╚═╝╩╚═
    Position Monitor v0.1.0
    "#
    );
}

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bbo_relay::api::{self, AppState};
use bbo_relay::config::{self, ServiceConfig};
use bbo_relay::market_data::adapters::binance::BinanceClient;
use bbo_relay::market_data::{PriceCache, PricePoller, QuoteSource};
use bbo_relay::telemetry;
use clap::Parser;
use rust_decimal::Decimal;
use tokio::signal;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "bbo-relay", about = "Serves a commission-adjusted best bid/ask over HTTP")]
struct Args {
    /// Read environment variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Validate configuration, print it and exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    config::load_env_file(args.env_file.as_deref())?;

    telemetry::init_tracing("info");
    telemetry::install_panic_hook();

    let cfg = ServiceConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to start: invalid configuration");
        e
    })?;
    info!("Configuration validated successfully");

    if args.check_config {
        println!("{:#?}", cfg);
        return Ok(());
    }
    let cfg = Arc::new(cfg);

    telemetry::init_metrics(cfg.metrics_port)?;

    let source: Arc<dyn QuoteSource> = Arc::new(BinanceClient::new(&cfg.binance_api_url));
    let cache = Arc::new(PriceCache::new(source, cfg.service_commission));
    let app = api::create_router(AppState::new(Arc::clone(&cfg), Arc::clone(&cache)));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cfg.port)).await?;
    info!("BBO relay running on port {}", cfg.port);
    info!("Service commission: {}%", (cfg.service_commission * Decimal::ONE_HUNDRED).round_dp(4));
    info!("Update interval: {}ms", cfg.update_interval_ms);
    info!("Binance API URL: {}", cfg.binance_api_url);

    let poller = PricePoller::new(cache, Duration::from_millis(cfg.update_interval_ms)).start();

    let shutdown = async move {
        let which = shutdown_signal().await;
        info!("Received {}, shutting down gracefully...", which);
        // in-flight refreshes are left to finish or be dropped with the runtime
        drop(poller.stop());
    };

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use latencyglobe::{serve, AppState, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "latencyglobe")]
#[command(about = "Cloud region latency API backed by Cloudflare Radar")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the config file (host:port)
    #[arg(short, long)]
    listen: Option<String>,

    /// Log filter used when RUST_LOG is unset (e.g. "info", "latencyglobe=debug")
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = ServiceConfig::load(args.config.as_deref()).context("loading config")?;
    if let Some(listen) = args.listen {
        config.server.listen_addr = listen;
    }

    let state = Arc::new(AppState::from_config(&config).context("building radar client")?);

    let listener = TcpListener::bind(&config.server.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.server.listen_addr))?;

    tokio::select! {
        result = serve(listener, state) => result.context("server stopped")?,
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }

    Ok(())
}

//! newsdesk server binary

use anyhow::Context;
use clap::Parser;
use newsdesk_server::{AppState, build_router};
use newsdesk_utils::{LogFormat, Settings, init_tracing_with};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "newsdesk")]
#[command(about = "Chat relay to a hosted assistant with live news search", long_about = None)]
struct Args {
    /// Address to bind
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Log output format (pretty or json)
    #[arg(long, env = "LOG_FORMAT", default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before clap reads its env fallbacks
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing_with(args.log_format, "info,newsdesk=debug,tower_http=info");

    let mut settings = Settings::from_env().context("Failed to load settings")?;
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    info!(?settings, "Starting newsdesk");

    let state = AppState::from_settings(&settings)?;
    let app = build_router(state);

    let addr = settings.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(address = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

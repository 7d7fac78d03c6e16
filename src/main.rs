use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use duckdb_proxy::{app, backend::HttpBackend, config::ProxyConfig, log_config_warnings, AppState};

#[derive(Parser)]
#[command(name = "duckdb-proxy")]
#[command(about = "Forwards dashboard requests to the DuckDB backend with server-held credentials")]
#[command(version)]
struct Args {
    #[arg(long, env = "PROXY_PORT", help = "Port to listen on [default: $PORT or 3000]")]
    port: Option<u16>,

    #[arg(long, env = "PROXY_BIND", default_value = "0.0.0.0", help = "Address to bind")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up DUCKDB_BACKEND_URL, keys, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    // Hosting platforms hand the port over as PORT
    let port = args
        .port
        .or_else(|| std::env::var("PORT").ok().and_then(|s| s.parse::<u16>().ok()))
        .unwrap_or(3000);

    let config = ProxyConfig::from_env();
    tracing::info!(
        environment = ?config.environment,
        backend = %config.backend.base_url,
        "Starting DuckDB proxy"
    );
    log_config_warnings(&config);

    let backend = HttpBackend::new(config.backend_timeout()).context("failed to build backend client")?;
    let router = app(AppState::new(config, Arc::new(backend)));

    let bind_addr = format!("{}:{}", args.bind, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

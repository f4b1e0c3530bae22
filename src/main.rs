use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use incident_report_api::config::AppConfig;
use incident_report_api::{app, database, AppState};

#[derive(Debug, Parser)]
#[command(name = "incident-report-api", version, about = "Incident reporting API server")]
struct Args {
    /// Bind address, overrides SERVER_HOST
    #[arg(long)]
    host: Option<String>,

    /// Listen port, overrides PORT
    #[arg(long, short)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SECRET_KEY, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;
    tracing::info!("Starting Incident Report API in {:?} mode", config.environment);
    if config.is_production() && !config.security.cookie_secure {
        tracing::warn!("COOKIE_SECURE is off in production; session cookies will travel over plain HTTP");
    }

    let pool = database::connect(&config.database).await?;
    database::ensure_schema(&pool).await?;

    tokio::fs::create_dir_all(&config.media.upload_dir)
        .await
        .with_context(|| format!("failed to create upload dir {}", config.media.upload_dir))?;
    tracing::info!("Storing uploads under {}", config.media.upload_dir);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    let app = app(AppState::new(config, pool));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

//! holocron-api - Movie catalog service
//!
//! Serves the catalog and account endpoints, and keeps the catalog in step
//! with the Star Wars API through a daily synchronization.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use holocron_api::config::{self, Args};
use holocron_api::swapi::SwapiClient;
use holocron_api::sync::scheduler::{spawn_daily_sync, DailySchedule};
use holocron_api::{build_router, db, AppState, AuthSettings};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let loaded = config::load(&args).context("Failed to load configuration")?;
    let config = loaded.config;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Holocron movie catalog (holocron-api) v{}",
        env!("CARGO_PKG_VERSION")
    );
    match &loaded.source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No config file found, using defaults"),
    }
    if config.uses_default_secret() {
        warn!("JWT_SECRET not set; using the built-in development secret");
    }

    info!("Database path: {}", config.database_path.display());
    let pool = db::init_database_pool(&config.database_path)
        .await
        .context("Failed to open database")?;

    let film_source = SwapiClient::new(
        &config.swapi_base_url,
        Duration::from_secs(config.http_timeout_secs),
    )
    .context("Failed to create Star Wars API client")?;
    info!("Star Wars API: {}", film_source.base_url());

    let state = AppState::new(
        pool,
        AuthSettings::new(config.jwt_secret.clone(), config.jwt_expiration_secs),
        Arc::new(film_source),
    );

    if config.seed_default_users {
        let seeded = state
            .auth
            .seed_default_accounts()
            .await
            .context("Failed to seed default accounts")?;
        if seeded > 0 {
            warn!("Created {} default accounts; change their passwords", seeded);
        }
    }

    let shutdown = CancellationToken::new();
    let schedule = DailySchedule::new(config.sync_hour, config.sync_minute)?;
    let scheduler = spawn_daily_sync(state.synchronizer.clone(), schedule, shutdown.clone());
    info!(
        "Daily synchronization at {:02}:{:02} local time",
        config.sync_hour, config.sync_minute
    );

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("holocron-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    shutdown.cancel();
    if let Err(e) = scheduler.await {
        warn!("Sync scheduler ended abnormally: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

//! Coursehub API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use coursehub_core::AppError;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

use crate::api_config::{ApiConfig, init_tracing};
use crate::api_services::{
    build_app_state, build_key_value_backend, connect_and_migrate, spawn_rate_limit_sweeper,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    // rediss:// connections need a process-wide rustls provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = ApiConfig::load()?;

    if config.migrate_only {
        let database_url = config.database_url.as_deref().ok_or_else(|| {
            AppError::Validation("DATABASE_URL is required to run migrations".to_owned())
        })?;
        connect_and_migrate(database_url, config.database_pool).await?;
        info!("database migrations applied successfully");
        return Ok(());
    }

    let pool = match config.database_url.as_deref() {
        Some(database_url) => {
            Some(connect_and_migrate(database_url, config.database_pool).await?)
        }
        None => {
            info!("DATABASE_URL is not set, course endpoints will answer 503");
            None
        }
    };

    let key_value = build_key_value_backend(&config);
    let app_state = build_app_state(&config, pool, &key_value);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = spawn_rate_limit_sweeper(
        app_state.rate_limit_service.clone(),
        config.rate_limit_sweep_interval,
        shutdown_rx,
    );

    let app = api_router::build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "coursehub-api listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")));

    let _ = shutdown_tx.send(true);
    if let Err(error) = sweeper.await {
        error!(error = %error, "rate limit sweeper task failed");
    }

    if let Some(redis) = &key_value.redis {
        redis.disconnect().await;
    }

    info!("coursehub-api stopped");
    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            error!(error = %error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                error!(error = %error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

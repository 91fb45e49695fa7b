//! Stock Home server - household inventory JSON backend.
//!
//! # Architecture
//!
//! - Axum web framework serving JSON
//! - `PostgreSQL` (sqlx) for accounts, houses, stock, shopping and activity
//! - tower-sessions with a `PostgreSQL` store and a signed cookie
//! - Sentry for error tracking, tracing for structured logs
//!
//! Schema migrations are applied with `sh-cli migrate`, not at startup.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;

use sentry::integrations::tracing::{self as sentry_tracing, EventFilter};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stock_home_server::config::ServerConfig;
use stock_home_server::state::AppState;
use stock_home_server::{app, db, middleware};

const DEFAULT_LOG_FILTER: &str = "stock_home_server=info,tower_http=debug";

/// Anything that stops the server from coming up or staying up.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("session store: {0}")]
    SessionStore(sqlx::Error),
    #[error("STOCK_HOME_SESSION_SECRET is not a usable signing key: {0}")]
    SigningKey(String),
    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

fn sentry_client(config: &ServerConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;
    let options = sentry::ClientOptions {
        release: sentry::release_name!(),
        environment: config.sentry_environment.clone().map(Into::into),
        sample_rate: config.sentry_sample_rate,
        traces_sample_rate: config.sentry_traces_sample_rate,
        attach_stacktrace: true,
        ..Default::default()
    };
    Some(sentry::init((dsn, options)))
}

/// Warnings and errors become Sentry events, info and debug become breadcrumbs.
fn sentry_level(metadata: &tracing::Metadata<'_>) -> EventFilter {
    match *metadata.level() {
        Level::ERROR | Level::WARN => EventFilter::Event,
        Level::INFO | Level::DEBUG => EventFilter::Breadcrumb,
        _ => EventFilter::Ignore,
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true)))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .with(sentry_tracing::layer().event_filter(sentry_level))
        .init();
}

async fn serve(config: ServerConfig) -> Result<(), StartupError> {
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("database pool ready");

    PostgresStore::new(pool.clone())
        .migrate()
        .await
        .map_err(StartupError::SessionStore)?;

    let sessions = middleware::create_session_layer(&pool, &config)
        .map_err(|e| StartupError::SigningKey(e.to_string()))?;

    let addr = config.socket_addr();
    let router = app(AppState::new(config, pool), sessions)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "stock-home-server listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server stopped");
    Ok(())
}

#[tokio::main]
async fn main() {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(2);
        }
    };

    // The Sentry client has to exist before the tracing layer that feeds it.
    let sentry_guard = sentry_client(&config);
    init_logging(config.log_json);

    if let Err(e) = serve(config).await {
        tracing::error!(error = %e, "server failed");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::warn!(error = %e, "cannot listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
        () = terminate => {}
    }

    tracing::info!("shutdown signal received, draining connections");
}

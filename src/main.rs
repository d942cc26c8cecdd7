//! Microloan Backend Server
//!
//! Serves the loan, EMI schedule and trash APIs and runs the periodic
//! trash cleanup.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use microloan_server::auth::JwtSecret;
use microloan_server::config::{Config, StoreBackend};
use microloan_server::db::{create_pool, run_migrations};
use microloan_server::routes::build_router;
use microloan_server::state::AppState;
use microloan_server::store::{InMemoryLoanStore, LoanStore, PgLoanStore};
use microloan_server::trash::{start_cleanup_job, RetentionPolicy};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!(
        environment = config.environment.as_str(),
        "Starting microloan server"
    );

    let (store, db_pool) = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = create_pool(&config).await?;
            run_migrations(&pool).await?;
            let store: Arc<dyn LoanStore> = Arc::new(PgLoanStore::new(pool.clone()));
            (store, Some(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory loan store, data will not survive a restart");
            let store: Arc<dyn LoanStore> = Arc::new(InMemoryLoanStore::new());
            (store, None)
        }
    };

    let policy = RetentionPolicy::with_days(config.trash_retention_days);
    let app_state = AppState::from_store(
        store,
        policy,
        JwtSecret::new(config.jwt_secret.as_str()),
        db_pool,
    );

    // Dropping the scheduler stops the job
    let _cleanup_scheduler =
        start_cleanup_job(app_state.trash_service.clone(), &config.trash_cleanup_cron)
            .await
            .context("Failed to schedule trash cleanup")?;

    let app = build_router(app_state).layer(configure_cors(config.cors_allowed_origins.as_deref()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check at http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn configure_cors(allowed_origins: Option<&str>) -> CorsLayer {
    let allowed_origins = allowed_origins.unwrap_or_default();

    if allowed_origins.is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

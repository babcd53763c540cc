//! REST backend for a single todo list.
//!
//! A request flows through [`validation`], then one [`gateway`] call, and
//! any failure is turned into a response by [`error::ErrorClassifier`]. The
//! [`pipeline`] module holds that sequence for list, create, update and
//! delete; [`routes`] binds it to HTTP.

pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod pipeline;
pub mod routes;
pub mod validation;

use thiserror::Error;
use tokio::net::TcpListener;

pub use config::{AppConfig, ConfigError, Environment};
pub use error::{ErrorBody, ErrorClassifier, FieldViolation, TodoError, ValidationError};
pub use gateway::{GatewayError, MemoryGateway, SqliteGateway, TodoGateway};
pub use model::{Todo, TodoPatch, TodoUpdate};
pub use pipeline::DeletedTodo;
pub use routes::{app, with_middleware, AppState, HealthStatus};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to open store: {0}")]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Serve the API on `listener` until Ctrl-C.
///
/// The store is SQLite when `config.database_url` is set and in-memory
/// otherwise.
pub async fn run(listener: TcpListener, config: AppConfig) -> Result<(), StartupError> {
    let router = match config.database_url.as_deref() {
        Some(url) => {
            let gateway = SqliteGateway::connect(url).await?;
            tracing::info!(url, "using sqlite store");
            app(AppState::new(gateway, config.environment))
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory store");
            app(AppState::new(MemoryGateway::new(), config.environment))
        }
    };
    let router = with_middleware(router, &config);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}

use tokio::net::TcpListener;
use todo_server::{AppConfig, StartupError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;
    init_tracing(&config);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(environment = %config.environment, "listening on http://{addr}");
    tracing::info!("  GET    /api/todos");
    tracing::info!("  POST   /api/todos");
    tracing::info!("  PUT    /api/todos/{{id}}");
    tracing::info!("  DELETE /api/todos/{{id}}");
    tracing::info!("  GET    /health");
    todo_server::run(listener, config).await
}

/// `LOG_LEVEL` wins over `RUST_LOG`. Production logs are JSON lines.
fn init_tracing(config: &AppConfig) {
    let filter = match &config.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let registry = tracing_subscriber::registry().with(filter);
    if config.environment.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

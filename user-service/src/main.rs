use std::net::SocketAddr;
use std::sync::Arc;

use service_core::observability::logging::init_tracing;
use tokio::signal;
use user_service::{
    bootstrap, build_router,
    config::UserServiceConfig,
    repos::{InMemorySessionRepository, InMemoryUserRepository, SessionRepository, UserRepository},
    services::{AccountService, CredentialService, JwtService, SessionService},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    dotenvy::dotenv().ok();

    // Load configuration - fail fast if invalid.
    let config = UserServiceConfig::from_env()?;

    init_tracing(&config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting user service"
    );

    // Construct the stores explicitly; all state lives behind these
    // injected instances.
    let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
    let sessions: Arc<dyn SessionRepository> = Arc::new(InMemorySessionRepository::new());

    let jwt = JwtService::new(&config.jwt);
    let credentials = CredentialService::new(users.clone())?;
    let session_service = SessionService::new(credentials, jwt.clone(), sessions.clone());
    let accounts = AccountService::new(users.clone(), sessions.clone());

    // Provision the root account before accepting traffic.
    bootstrap::ensure_root(&users, &config.root).await?;

    let state = AppState {
        config: config.clone(),
        users,
        sessions,
        jwt,
        session_service,
        accounts,
    };

    let app = build_router(state).await?;

    let addr: SocketAddr = format!("{}:{}", config.common.host, config.common.port)
        .parse()
        .map_err(|e| {
            service_core::error::AppError::ConfigError(anyhow::anyhow!(
                "invalid listen address: {}",
                e
            ))
        })?;

    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}

//! Application builder and server lifecycle.

use std::future::IntoFuture;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

use pulse_cache::CacheManager;
use pulse_core::config::AppConfig;
use pulse_core::error::AppError;
use pulse_core::result::AppResult;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the Pulse server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    info!("Starting Pulse server...");

    info!(provider = %config.cache.provider, "Initializing session store");
    let cache = CacheManager::new(&config.cache).await?;

    let state = AppState::new(config.clone(), cache);
    spawn_rate_limit_cleanup(&state);

    let app = build_app(state);
    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(
        addr = %addr,
        environment = %config.environment,
        "Pulse server listening, WebSocket relay enabled at /ws"
    );

    serve(listener, app).await
}

/// Serves `app` on `listener` until SIGINT or SIGTERM.
///
/// In-flight requests are not drained: the process stops as soon as the
/// signal is seen.
pub async fn serve(listener: TcpListener, app: Router) -> AppResult<()> {
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .into_future();

    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        signal = shutdown_signal() => {
            info!(signal, "Shutdown signal received, stopping server");
        }
    }

    Ok(())
}

fn spawn_rate_limit_cleanup(state: &AppState) {
    let limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(limiter.window());
        loop {
            interval.tick().await;
            let purged = limiter.purge_expired().await;
            if purged > 0 {
                tracing::debug!(purged, "Purged expired rate limit windows");
            }
        }
    });
}

/// Resolves with the name of the first termination signal received.
pub async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}

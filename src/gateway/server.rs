//! Usage: Bind the configured listen address and serve the router until shutdown.

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::listen;
use super::routes::build_router;
use crate::app::app_state::AppState;
use crate::infra::session_file::FileSessionStore;
use crate::infra::settings::AppSettings;
use crate::shared::error::{AppError, AppResult};

pub async fn run(settings: AppSettings) -> AppResult<()> {
    let parsed = listen::parse_listen_address(&settings.listen_address)?;
    let port = parsed.port_or_default();
    let listen_addr = listen::format_host_port(&parsed.host, port);

    let listener = TcpListener::bind((parsed.host.as_str(), port))
        .await
        .map_err(|e| {
            AppError::with_source("LISTEN_BIND", format!("failed to bind {listen_addr}"), e)
        })?;

    let store = Arc::new(FileSessionStore::new(settings.session_file_path()));
    tracing::info!(path = %store.path().display(), "session store ready");
    let state = AppState::new(settings, store)?;

    let browse_host = if listen::is_wildcard_host(&parsed.host) {
        "127.0.0.1"
    } else {
        parsed.host.as_str()
    };
    tracing::info!(
        listen_addr = %listen_addr,
        base_url = %format!("http://{}", listen::format_host_port(browse_host, port)),
        "strava data viewer listening"
    );

    serve(listener, state, shutdown_signal()).await
}

pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> AppResult<()> {
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::with_source("SERVER_ERROR", "http server stopped", e))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

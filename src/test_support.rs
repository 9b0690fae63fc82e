//! Usage: Public test helpers for integration tests (spawn a fully wired app on an ephemeral port).

use crate::app::app_state::AppState;
use crate::domain::session::SessionStore;
use crate::gateway::oauth::providers::StravaEndpoints;
use crate::infra::settings::{AppSettings, ClientCredentials};
use crate::shared::error::{AppError, AppResult};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const TEST_CLIENT_ID: &str = "12345";
pub const TEST_CLIENT_SECRET: &str = "test-client-secret";

/// Settings for a test app; the redirect URI is filled in once the port is known.
pub fn settings_for(endpoints: StravaEndpoints) -> AppSettings {
    AppSettings {
        credentials: ClientCredentials {
            client_id: TEST_CLIENT_ID.to_string(),
            client_secret: TEST_CLIENT_SECRET.to_string(),
            redirect_uri: String::new(),
        },
        endpoints,
        upstream_connect_timeout_seconds: 2,
        upstream_request_timeout_seconds: 5,
        ..AppSettings::default()
    }
}

/// Endpoints that all point at one mock server base URL.
pub fn endpoints_at(base_url: &str) -> StravaEndpoints {
    let base = base_url.trim_end_matches('/');
    StravaEndpoints {
        authorize_url: format!("{base}/oauth/authorize"),
        token_url: format!("{base}/oauth/token"),
        api_base_url: format!("{base}/api/v3"),
    }
}

pub struct SpawnedApp {
    pub base_url: String,
    pub store: Arc<dyn SessionStore>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<AppResult<()>>>,
}

impl SpawnedApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn shutdown(mut self) -> AppResult<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.take() {
            Some(task) => task
                .await
                .map_err(|e| AppError::new("TASK_JOIN", format!("server task failed: {e}")))?,
            None => Ok(()),
        }
    }
}

impl Drop for SpawnedApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn spawn_app(
    settings: AppSettings,
    store: Arc<dyn SessionStore>,
) -> AppResult<SpawnedApp> {
    spawn_app_with(settings, store, |state| state).await
}

/// Like `spawn_app`, with a hook to adjust the wired state (e.g. swap the token endpoint).
pub async fn spawn_app_with(
    mut settings: AppSettings,
    store: Arc<dyn SessionStore>,
    customize: impl FnOnce(AppState) -> AppState,
) -> AppResult<SpawnedApp> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    let base_url = format!("http://127.0.0.1:{port}");
    if settings.credentials.redirect_uri.trim().is_empty() {
        settings.credentials.redirect_uri = format!("{base_url}/api/auth/callback");
    }
    settings.listen_address = format!("127.0.0.1:{port}");

    let state = customize(AppState::new(settings, Arc::clone(&store))?);
    let (tx, rx) = oneshot::channel::<()>();
    let task = tokio::spawn(crate::gateway::serve(listener, state, async move {
        let _ = rx.await;
    }));

    Ok(SpawnedApp {
        base_url,
        store,
        shutdown: Some(tx),
        task: Some(task),
    })
}

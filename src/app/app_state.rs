//! Usage: Shared router state (settings, HTTP client, session store, token endpoint).

use crate::domain::session::SessionStore;
use crate::gateway::oauth::token_exchange::{StravaTokenEndpoint, TokenEndpoint};
use crate::infra::settings::AppSettings;
use crate::shared::error::AppResult;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub(crate) settings: Arc<AppSettings>,
    pub(crate) client: reqwest::Client,
    pub(crate) store: Arc<dyn SessionStore>,
    pub(crate) token_endpoint: Arc<dyn TokenEndpoint>,
    // Origin of the redirect URI; app-internal redirects are absolute URLs on it.
    pub(crate) origin: Url,
}

impl AppState {
    pub fn new(settings: AppSettings, store: Arc<dyn SessionStore>) -> AppResult<Self> {
        let client = build_http_client(&settings)?;
        let origin = settings.credentials.app_origin()?;
        let token_endpoint: Arc<dyn TokenEndpoint> = Arc::new(StravaTokenEndpoint::new(
            client.clone(),
            settings.endpoints.token_url.clone(),
            settings.credentials.clone(),
        ));
        Ok(Self {
            settings: Arc::new(settings),
            client,
            store,
            token_endpoint,
            origin,
        })
    }

    pub fn with_token_endpoint(mut self, token_endpoint: Arc<dyn TokenEndpoint>) -> Self {
        self.token_endpoint = token_endpoint;
        self
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.store)
    }
}

pub(crate) fn build_http_client(settings: &AppSettings) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(format!("strava-data-viewer/{}", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(u64::from(
            settings.upstream_connect_timeout_seconds,
        )))
        .timeout(Duration::from_secs(u64::from(
            settings.upstream_request_timeout_seconds,
        )))
        .build()
        .map_err(|e| format!("HTTP_CLIENT_INIT: failed to build http client: {e}").into())
}

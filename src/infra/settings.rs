//! Usage: Process-wide settings (schema + defaults + TOML file + environment overrides).
//!
//! Layering, lowest to highest precedence:
//! 1. built-in defaults
//! 2. optional TOML file named by `STRAVA_VIEWER_CONFIG`
//! 3. environment variables (`CLIENT_ID`, `CLIENT_SECRET`, `REDIRECT_URI`, `STRAVA_VIEWER_*`)
//!
//! Settings are read once at startup and shared read-only afterwards.

use crate::gateway::oauth::providers::StravaEndpoints;
use crate::shared::error::AppResult;
use crate::shared::security::mask_token;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_LISTEN_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/api/auth/callback";
const DEFAULT_DATA_DIR: &str = ".strava-viewer";
const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECONDS: u32 = 10;
const DEFAULT_UPSTREAM_REQUEST_TIMEOUT_SECONDS: u32 = 30;
const MAX_UPSTREAM_TIMEOUT_SECONDS: u32 = 600;

pub const ENV_CONFIG_PATH: &str = "STRAVA_VIEWER_CONFIG";
pub const ENV_CLIENT_ID: &str = "CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "REDIRECT_URI";
pub const ENV_LISTEN: &str = "STRAVA_VIEWER_LISTEN";
pub const ENV_DATA_DIR: &str = "STRAVA_VIEWER_DATA_DIR";
pub const ENV_LOG_DIR: &str = "STRAVA_VIEWER_LOG_DIR";

/// OAuth client registration. Only `client_id` ever leaves the process (inside the authorize URL).
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl Default for ClientCredentials {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
        }
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &mask_token(&self.client_secret))
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

impl ClientCredentials {
    /// Origin of the redirect URI; every app-internal redirect is built against it.
    pub fn app_origin(&self) -> AppResult<Url> {
        let parsed = Url::parse(self.redirect_uri.trim())
            .map_err(|e| format!("CONFIG_INVALID: redirect_uri is not a valid URL: {e}"))?;
        let origin = parsed.origin().ascii_serialization();
        Url::parse(&format!("{origin}/"))
            .map_err(|e| format!("CONFIG_INVALID: redirect_uri has no usable origin: {e}").into())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    // Host or host:port; IPv6 hosts use brackets.
    pub listen_address: String,
    // Directory holding the persisted session file.
    pub data_dir: PathBuf,
    // Daily rolling log files are written here when set.
    pub log_dir: Option<PathBuf>,
    pub upstream_connect_timeout_seconds: u32,
    pub upstream_request_timeout_seconds: u32,
    pub credentials: ClientCredentials,
    pub endpoints: StravaEndpoints,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_dir: None,
            upstream_connect_timeout_seconds: DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECONDS,
            upstream_request_timeout_seconds: DEFAULT_UPSTREAM_REQUEST_TIMEOUT_SECONDS,
            credentials: ClientCredentials::default(),
            endpoints: StravaEndpoints::default(),
        }
    }
}

impl AppSettings {
    pub fn session_file_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }
}

fn sanitize_upstream_timeouts(settings: &mut AppSettings) -> bool {
    let mut changed = false;

    if settings.upstream_connect_timeout_seconds == 0 {
        settings.upstream_connect_timeout_seconds = DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECONDS;
        changed = true;
    }
    if settings.upstream_request_timeout_seconds == 0 {
        settings.upstream_request_timeout_seconds = DEFAULT_UPSTREAM_REQUEST_TIMEOUT_SECONDS;
        changed = true;
    }
    if settings.upstream_connect_timeout_seconds > MAX_UPSTREAM_TIMEOUT_SECONDS {
        settings.upstream_connect_timeout_seconds = MAX_UPSTREAM_TIMEOUT_SECONDS;
        changed = true;
    }
    if settings.upstream_request_timeout_seconds > MAX_UPSTREAM_TIMEOUT_SECONDS {
        settings.upstream_request_timeout_seconds = MAX_UPSTREAM_TIMEOUT_SECONDS;
        changed = true;
    }

    changed
}

fn sanitize_strings(settings: &mut AppSettings) -> bool {
    let mut changed = false;

    let listen = settings.listen_address.trim();
    if listen.is_empty() {
        settings.listen_address = DEFAULT_LISTEN_ADDRESS.to_string();
        changed = true;
    } else if listen.len() != settings.listen_address.len() {
        settings.listen_address = listen.to_string();
        changed = true;
    }

    let redirect = settings.credentials.redirect_uri.trim();
    if redirect.is_empty() {
        settings.credentials.redirect_uri = DEFAULT_REDIRECT_URI.to_string();
        changed = true;
    } else if redirect.len() != settings.credentials.redirect_uri.len() {
        settings.credentials.redirect_uri = redirect.to_string();
        changed = true;
    }

    for value in [
        &mut settings.credentials.client_id,
        &mut settings.credentials.client_secret,
    ] {
        let trimmed = value.trim();
        if trimmed.len() != value.len() {
            *value = trimmed.to_string();
            changed = true;
        }
    }

    changed
}

fn sanitize(settings: &mut AppSettings) -> bool {
    let mut changed = sanitize_upstream_timeouts(settings);
    changed |= sanitize_strings(settings);
    changed |= settings.endpoints.sanitize();
    changed
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn apply_env_overrides(settings: &mut AppSettings, lookup: &dyn Fn(&str) -> Option<String>) {
    if let Some(v) = non_empty(lookup(ENV_CLIENT_ID)) {
        settings.credentials.client_id = v;
    }
    if let Some(v) = non_empty(lookup(ENV_CLIENT_SECRET)) {
        settings.credentials.client_secret = v;
    }
    if let Some(v) = non_empty(lookup(ENV_REDIRECT_URI)) {
        settings.credentials.redirect_uri = v;
    }
    if let Some(v) = non_empty(lookup(ENV_LISTEN)) {
        settings.listen_address = v;
    }
    if let Some(v) = non_empty(lookup(ENV_DATA_DIR)) {
        settings.data_dir = PathBuf::from(v);
    }
    if let Some(v) = non_empty(lookup(ENV_LOG_DIR)) {
        settings.log_dir = Some(PathBuf::from(v));
    }
}

pub fn parse_toml(raw: &str) -> AppResult<AppSettings> {
    toml::from_str::<AppSettings>(raw)
        .map_err(|e| format!("CONFIG_INVALID: settings file is not valid TOML: {e}").into())
}

fn read_file(path: &Path) -> AppResult<AppSettings> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        format!(
            "CONFIG_READ: failed to read settings file {}: {e}",
            path.display()
        )
    })?;
    parse_toml(&raw)
}

/// Resolve settings from an explicit lookup function (tests pass a map instead of the process env).
pub fn resolve(lookup: &dyn Fn(&str) -> Option<String>) -> AppResult<AppSettings> {
    let mut settings = match non_empty(lookup(ENV_CONFIG_PATH)) {
        Some(path) => read_file(Path::new(&path))?,
        None => AppSettings::default(),
    };

    apply_env_overrides(&mut settings, lookup);
    if sanitize(&mut settings) {
        tracing::debug!("settings normalized after load");
    }

    // Fail fast on a redirect URI the app cannot build its own redirects from.
    settings.credentials.app_origin()?;

    Ok(settings)
}

pub fn read_from_env() -> AppResult<AppSettings> {
    resolve(&|key| std::env::var(key).ok())
}

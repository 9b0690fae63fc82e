mod app;
mod domain;
mod gateway;
mod infra;
mod shared;
pub mod test_support;

pub(crate) use shared::blocking;

pub use app::app_state::AppState;
pub use app::logging;
pub use domain::dashboard::{Activity, Athlete, DashboardSummary, Stats, Totals};
pub use domain::session::{
    MemorySessionStore, MissingAccessToken, SessionStore, StoredEntries, TokenSet,
    ACCESS_TOKEN_KEY, EXPIRES_AT_KEY, REFRESH_TOKEN_KEY,
};
pub use domain::session_guard::{check as check_session, SessionState};
pub use gateway::oauth::flow::AuthFlowError;
pub use gateway::oauth::providers::StravaEndpoints;
pub use gateway::oauth::token_exchange::{ExchangeFuture, TokenEndpoint};
pub use gateway::{build_router, serve};
pub use infra::session_file::FileSessionStore;
pub use infra::settings::{AppSettings, ClientCredentials};
pub use shared::error::{AppError, AppResult};

/// Read settings, install logging and serve until Ctrl-C.
pub fn run() -> AppResult<()> {
    let settings = infra::settings::read_from_env()?;
    let _log_guard = logging::init(settings.log_dir.as_deref());
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        credentials = ?settings.credentials,
        "starting strava data viewer"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::with_source("RUNTIME_INIT", "failed to build tokio runtime", e))?;
    runtime.block_on(gateway::run(settings))
}

//! Usage: Session guard extractor for protected views, plus store access off the async runtime.

use axum::{extract::FromRequestParts, http::request::Parts, response::Redirect};

use super::oauth::flow::entry_url;
use crate::app::app_state::AppState;
use crate::blocking;
use crate::domain::session::TokenSet;
use crate::domain::session_guard::{self, SessionState};
use crate::shared::error::{AppError, AppResult};

/// Admits the request only when a token set is stored; otherwise redirects to the entry point.
pub(crate) struct AuthenticatedSession(pub(crate) TokenSet);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthenticatedSession {
    type Rejection = Redirect;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        current_session(state)
            .await
            .into_token_set()
            .map(Self)
            .ok_or_else(|| Redirect::to(entry_url(&state.origin).as_str()))
    }
}

pub(crate) async fn current_session(state: &AppState) -> SessionState {
    let store = state.store();
    let checked = blocking::run("session_guard_check", move || {
        Ok::<_, AppError>(session_guard::check(store.as_ref()))
    })
    .await;
    match checked {
        Ok(session) => session,
        Err(err) => {
            tracing::warn!("session check failed, treating as signed out: {err}");
            SessionState::Unauthenticated
        }
    }
}

pub(crate) async fn save_session(state: &AppState, tokens: TokenSet) -> AppResult<()> {
    let store = state.store();
    blocking::run("session_store_save", move || store.save(&tokens)).await
}

pub(crate) async fn clear_session(state: &AppState) -> AppResult<()> {
    let store = state.store();
    blocking::run("session_store_clear", move || store.clear()).await
}

//! Usage: OAuth routes (`/auth/authorize`, `/api/auth/callback`, `/auth/callback`, `/logout`).

use axum::{
    extract::{Query, State},
    response::Redirect,
};

use super::authorize::authorize_url;
use super::flow::{self, AuthFlowError, ERROR_NO_TOKEN, ERROR_SAVE_FAILED};
use crate::app::app_state::AppState;
use crate::gateway::guard::{clear_session, save_session};
use crate::shared::query::{first_value, pairs_or_empty, QueryPairs};

pub(crate) async fn authorize(State(state): State<AppState>) -> Redirect {
    let settings = state.settings();
    Redirect::temporary(&authorize_url(&settings.credentials, &settings.endpoints))
}

/// Provider redirect target. Every outcome, including a malformed or repeated query, ends in a
/// redirect; for repeated keys the first non-blank value is used.
pub(crate) async fn exchange_callback(
    State(state): State<AppState>,
    query: Option<Query<QueryPairs>>,
) -> Redirect {
    let query = pairs_or_empty(query);
    let outcome = flow::exchange(
        state.token_endpoint.as_ref(),
        first_value(&query, "code"),
        first_value(&query, "error"),
    )
    .await;

    match &outcome {
        Ok(tokens) => {
            tracing::info!(
                has_refresh_token = tokens.refresh_token().is_some(),
                expires_at = ?tokens.expires_at(),
                "token exchange succeeded"
            );
        }
        Err(AuthFlowError::ExchangeFailed(detail)) => {
            tracing::error!(detail = %detail, "token exchange failed");
        }
        Err(err) => {
            tracing::warn!("authorization callback rejected: {err}");
        }
    }

    Redirect::temporary(flow::exchange_redirect(&state.origin, &outcome).as_str())
}

/// One-shot handoff page: persist the tokens and continue to the dashboard.
pub(crate) async fn callback_page(
    State(state): State<AppState>,
    query: Option<Query<QueryPairs>>,
) -> Redirect {
    let query = pairs_or_empty(query);
    let Some(tokens) = flow::parse_handoff(
        first_value(&query, "access_token"),
        first_value(&query, "refresh_token"),
        first_value(&query, "expires_at"),
    ) else {
        tracing::warn!("callback page reached without an access token");
        return Redirect::to(flow::entry_redirect_url(&state.origin, ERROR_NO_TOKEN).as_str());
    };

    if let Err(err) = save_session(&state, tokens).await {
        tracing::error!("failed to persist session: {err}");
        return Redirect::to(flow::entry_redirect_url(&state.origin, ERROR_SAVE_FAILED).as_str());
    }
    tracing::info!("session stored");
    Redirect::to(flow::dashboard_url(&state.origin).as_str())
}

pub(crate) async fn logout(State(state): State<AppState>) -> Redirect {
    if let Err(err) = clear_session(&state).await {
        tracing::error!("failed to clear session: {err}");
    } else {
        tracing::info!("session cleared");
    }
    Redirect::to(flow::entry_url(&state.origin).as_str())
}

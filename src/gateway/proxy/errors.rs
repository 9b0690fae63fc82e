//! Usage: Proxy error classification + the uniform `{ "error": ... }` response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::strava::StravaResource;

#[derive(Debug, Serialize)]
struct ProxyErrorResponse {
    error: String,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ProxyError {
    #[error("No access token provided")]
    MissingAccessToken,
    #[error("Missing required parameters")]
    MissingParameters,
    #[error("Invalid athlete_id")]
    InvalidAthleteId,
    /// Upstream rejected the bearer token.
    #[error("Failed to fetch {}", .resource.label())]
    Unauthorized { resource: StravaResource },
    /// Transport failure, other non-success status or an unreadable body.
    #[error("Failed to fetch {}", .resource.label())]
    DownstreamFetchFailed {
        resource: StravaResource,
        detail: String,
    },
}

impl ProxyError {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::MissingAccessToken | Self::MissingParameters | Self::Unauthorized { .. } => {
                StatusCode::UNAUTHORIZED
            }
            Self::InvalidAthleteId => StatusCode::BAD_REQUEST,
            Self::DownstreamFetchFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(super) fn classify_reqwest_error(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        return "UPSTREAM_TIMEOUT";
    }
    if err.is_connect() {
        return "UPSTREAM_CONNECT_FAILED";
    }
    if err.is_decode() || err.is_body() {
        return "UPSTREAM_BODY_READ_ERROR";
    }
    "UPSTREAM_REQUEST_FAILED"
}

pub(super) fn classify_upstream_status(
    resource: StravaResource,
    status: reqwest::StatusCode,
    detail: String,
) -> ProxyError {
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return ProxyError::Unauthorized { resource };
    }
    ProxyError::DownstreamFetchFailed { resource, detail }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        if let Self::DownstreamFetchFailed { resource, detail } = &self {
            tracing::warn!(resource = resource.label(), detail = %detail, "strava fetch failed");
        }
        let payload = ProxyErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(payload)).into_response()
    }
}

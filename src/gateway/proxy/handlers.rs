//! Usage: `/api/strava/*` pass-through handlers (token from the query string, JSON body verbatim).

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderValue},
    response::Response,
};
use bytes::Bytes;

use super::errors::ProxyError;
use super::strava::{fetch_bytes, StravaResource};
use crate::app::app_state::AppState;
use crate::shared::query::{first_value, pairs_or_empty, QueryPairs};

fn json_passthrough(body: Bytes) -> Response {
    let mut resp = Response::new(Body::from(body));
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    resp
}

async fn forward(
    state: &AppState,
    resource: StravaResource,
    access_token: &str,
) -> Result<Response, ProxyError> {
    let body = fetch_bytes(
        &state.client,
        &state.settings.endpoints,
        resource,
        access_token,
    )
    .await?;
    Ok(json_passthrough(body))
}

pub(crate) async fn athlete(
    State(state): State<AppState>,
    query: Option<Query<QueryPairs>>,
) -> Result<Response, ProxyError> {
    let query = pairs_or_empty(query);
    let token = first_value(&query, "access_token").ok_or(ProxyError::MissingAccessToken)?;
    forward(&state, StravaResource::Athlete, token.trim()).await
}

pub(crate) async fn activities(
    State(state): State<AppState>,
    query: Option<Query<QueryPairs>>,
) -> Result<Response, ProxyError> {
    let query = pairs_or_empty(query);
    let token = first_value(&query, "access_token").ok_or(ProxyError::MissingAccessToken)?;
    forward(&state, StravaResource::Activities, token.trim()).await
}

pub(crate) async fn stats(
    State(state): State<AppState>,
    query: Option<Query<QueryPairs>>,
) -> Result<Response, ProxyError> {
    let query = pairs_or_empty(query);
    let (Some(token), Some(raw_id)) = (
        first_value(&query, "access_token"),
        first_value(&query, "athlete_id"),
    ) else {
        return Err(ProxyError::MissingParameters);
    };
    let athlete_id: i64 = raw_id
        .trim()
        .parse()
        .map_err(|_| ProxyError::InvalidAthleteId)?;
    forward(&state, StravaResource::Stats { athlete_id }, token.trim()).await
}

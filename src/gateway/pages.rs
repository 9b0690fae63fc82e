//! Usage: Entry page, dashboard and image export handlers.

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};

use super::guard::{current_session, AuthenticatedSession};
use super::oauth::flow::dashboard_url;
use super::proxy::strava::{fetch_json, StravaResource};
use crate::app::app_state::AppState;
use crate::blocking;
use crate::domain::dashboard::{export, render, Activity, Athlete, DashboardSummary, Stats};
use crate::domain::session::TokenSet;
use crate::shared::query::{first_value, pairs_or_empty, QueryPairs};
use crate::shared::time::now_unix_seconds;

const NOTICE_EXPIRED: &str =
    "Your Strava session has expired. Reconnect with Strava if data fails to load.";
const NOTICE_ATHLETE_UNAVAILABLE: &str = "Athlete profile could not be loaded.";
const NOTICE_ACTIVITIES_UNAVAILABLE: &str = "Recent activities could not be loaded.";
const NOTICE_STATS_UNAVAILABLE: &str = "Totals could not be loaded.";

pub(crate) async fn entry(
    State(state): State<AppState>,
    query: Option<Query<QueryPairs>>,
) -> Response {
    if current_session(&state).await.is_authenticated() {
        return Redirect::to(dashboard_url(&state.origin).as_str()).into_response();
    }
    let query = pairs_or_empty(query);
    Html(render::entry_page(first_value(&query, "error"))).into_response()
}

/// Athlete and activities load concurrently; stats need the athlete id. A failed section turns
/// into a notice and an empty state, never an error page.
pub(crate) async fn load_summary(state: &AppState, tokens: &TokenSet) -> DashboardSummary {
    let client = &state.client;
    let endpoints = &state.settings.endpoints;
    let token = tokens.access_token();

    let mut summary = DashboardSummary::default();
    if tokens.is_expired_at(now_unix_seconds()) {
        summary.notices.push(NOTICE_EXPIRED.to_string());
    }

    let (athlete, activities) = tokio::join!(
        fetch_json::<Athlete>(client, endpoints, StravaResource::Athlete, token),
        fetch_json::<Vec<Activity>>(client, endpoints, StravaResource::Activities, token),
    );

    match athlete {
        Ok(athlete) => summary.athlete = Some(athlete),
        Err(err) => {
            tracing::warn!("dashboard athlete fetch failed: {err:?}");
            summary.notices.push(NOTICE_ATHLETE_UNAVAILABLE.to_string());
        }
    }
    match activities {
        Ok(activities) => summary.activities = activities,
        Err(err) => {
            tracing::warn!("dashboard activities fetch failed: {err:?}");
            summary.notices.push(NOTICE_ACTIVITIES_UNAVAILABLE.to_string());
        }
    }

    if let Some(athlete_id) = summary.athlete.as_ref().and_then(|a| a.id) {
        match fetch_json::<Stats>(client, endpoints, StravaResource::Stats { athlete_id }, token)
            .await
        {
            Ok(stats) => summary.stats = Some(stats),
            Err(err) => {
                tracing::warn!("dashboard stats fetch failed: {err:?}");
                summary.notices.push(NOTICE_STATS_UNAVAILABLE.to_string());
            }
        }
    }

    summary
}

pub(crate) async fn dashboard(
    State(state): State<AppState>,
    AuthenticatedSession(tokens): AuthenticatedSession,
) -> Html<String> {
    let summary = load_summary(&state, &tokens).await;
    Html(render::dashboard_page(&summary))
}

pub(crate) async fn export_image(
    State(state): State<AppState>,
    AuthenticatedSession(tokens): AuthenticatedSession,
) -> Response {
    let summary = load_summary(&state, &tokens).await;
    let png = match blocking::run("dashboard_export_png", move || export::render_png(&summary)).await
    {
        Ok(png) => png,
        Err(err) => {
            tracing::error!("dashboard image export failed: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to export image").into_response();
        }
    };

    let file_name = export::export_file_name(chrono::Utc::now().date_naive());
    let mut resp = png.into_response();
    let headers = resp.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(export::CONTENT_TYPE),
    );
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\"")) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    resp
}

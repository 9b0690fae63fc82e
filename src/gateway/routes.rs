use axum::{routing::get, Json, Router};
use serde::Serialize;

use super::oauth::flow::{CALLBACK_PAGE_PATH, DASHBOARD_PATH, ENTRY_PATH, EXCHANGE_PATH};
use super::oauth::handlers as oauth;
use super::pages;
use super::proxy::handlers as proxy;
use crate::app::app_state::AppState;
use crate::shared::time::now_unix_seconds;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    app: &'static str,
    version: &'static str,
    ts: i64,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        app: "strava-data-viewer",
        version: env!("CARGO_PKG_VERSION"),
        ts: now_unix_seconds(),
    })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(ENTRY_PATH, get(pages::entry))
        .route("/health", get(health))
        .route("/auth/authorize", get(oauth::authorize))
        .route(EXCHANGE_PATH, get(oauth::exchange_callback))
        .route(CALLBACK_PAGE_PATH, get(oauth::callback_page))
        .route("/logout", get(oauth::logout).post(oauth::logout))
        .route(DASHBOARD_PATH, get(pages::dashboard))
        .route("/dashboard/export", get(pages::export_image))
        .route("/api/strava/athlete", get(proxy::athlete))
        .route("/api/strava/activities", get(proxy::activities))
        .route("/api/strava/stats", get(proxy::stats))
        .with_state(state)
}

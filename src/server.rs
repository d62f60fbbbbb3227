//! HTTP query surface: two read endpoints over the current cache snapshot.
//! Handlers never fetch; they only serialize what the scheduler last stored.

use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::cache::CacheHandle;

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState {
    pub cache: CacheHandle,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CalendarResponse {
    events: Vec<crate::ics::Event>,
    fetched_at: Option<DateTime<Utc>>,
    last_attempt_at: Option<DateTime<Utc>>,
    stale: bool,
    error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    ok: bool,
    fetched_at: Option<DateTime<Utc>>,
    last_attempt_at: Option<DateTime<Utc>>,
    stale: bool,
    error: Option<String>,
    event_count: usize,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Build the router. Every response carries permissive CORS headers (the
/// CORS layer also answers OPTIONS pre-flights) and is marked
/// non-cacheable for intermediaries.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/calendar", get(calendar_handler))
        .route("/api/calendar/health", get(health_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}

/// Always 200; upstream health is reported in the body, not the status
async fn calendar_handler(State(state): State<AppState>) -> Json<CalendarResponse> {
    let snapshot = state.cache.snapshot().await;
    Json(CalendarResponse {
        events: snapshot.events.clone(),
        fetched_at: snapshot.fetched_at,
        last_attempt_at: snapshot.last_attempt_at,
        stale: snapshot.stale(),
        error: snapshot.error.clone(),
    })
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.cache.snapshot().await;
    Json(HealthResponse {
        ok: true,
        fetched_at: snapshot.fetched_at,
        last_attempt_at: snapshot.last_attempt_at,
        stale: snapshot.stale(),
        error: snapshot.error.clone(),
        event_count: snapshot.events.len(),
    })
}

async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorBody { error: "Not found" }))
}

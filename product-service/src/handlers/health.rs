use crate::config::HealthMode;
use crate::dtos::HealthResponse;
use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use chrono::{SecondsFormat, Utc};

/// `GET /api/health`. Never touches the store; reads the observed phase.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let health = state.health.current_health();

    let timestamp = match state.health.mode() {
        HealthMode::Strict => Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        HealthMode::Optimistic => None,
    };

    (
        health.status,
        Json(HealthResponse {
            ok: health.ok,
            database: health.phase.as_str(),
            timestamp,
        }),
    )
}

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::SecondsFormat;

use crate::{AppState, utils::{error_to_api_response, iso_timestamp}};

use super::model::HealthResponse;

/// Liveness plus a read-only look at the cached portal session.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.sessions.status().await;

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK".to_string(),
            timestamp: iso_timestamp(),
            session_active: session.active,
            session_expiry: session
                .expires_at
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            session_source: session.source,
        }),
    )
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        error_to_api_response("Ruta no encontrada".to_string(), None),
    )
}

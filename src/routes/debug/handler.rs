use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::{AppState, attendance::Section};

/// Executor output with nothing trimmed, for troubleshooting the portal.
#[derive(Debug, Serialize)]
pub struct DebugResponse {
    pub success: bool,
    pub nrc: String,
    pub attempts: u32,
    pub resultado: Vec<Section>,
    pub raw: Vec<Value>,
}

#[axum::debug_handler]
pub async fn test_nrc(State(state): State<AppState>, Path(nrc): Path<String>) -> Response {
    match state.executor.consult(&nrc).await {
        Ok(consultation) => (
            StatusCode::OK,
            Json(DebugResponse {
                success: true,
                nrc: consultation.nrc,
                attempts: consultation.attempts,
                resultado: consultation.sections,
                raw: consultation.raw,
            }),
        )
            .into_response(),
        Err(err) => err.into_reply(true),
    }
}

use axum::{
    extract::{Json, Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::{AppState, error::AppError, utils::iso_timestamp};

use super::model::{ConsultRequest, ConsultResponse};

const MISSING_NRC: &str = "Falta el parámetro NRC";

#[axum::debug_handler]
pub async fn consult_by_body(
    State(state): State<AppState>,
    payload: Result<Json<ConsultRequest>, JsonRejection>,
) -> Response {
    let nrc = match payload {
        Ok(Json(req)) => req.nrc_text(),
        Err(rejection) => {
            warn!("Rejected consult body: {}", rejection.body_text());
            None
        }
    };

    match nrc {
        Some(nrc) => consult(&state, &nrc).await,
        None => AppError::InvalidInput(MISSING_NRC.to_string())
            .into_reply(state.config.expose_error_details),
    }
}

#[axum::debug_handler]
pub async fn consult_by_path(State(state): State<AppState>, Path(nrc): Path<String>) -> Response {
    consult(&state, &nrc).await
}

async fn consult(state: &AppState, nrc: &str) -> Response {
    match state.executor.consult(nrc).await {
        Ok(consultation) => (
            StatusCode::OK,
            Json(ConsultResponse::new(consultation, iso_timestamp())),
        )
            .into_response(),
        Err(err) => {
            warn!("Consultation for {:?} failed: {}", nrc, err);
            err.into_reply(state.config.expose_error_details)
        }
    }
}

use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use crate::{AppState, error::AppError};

use super::model::{LoginRequest, LoginResponse, RenewSessionResponse};

#[axum::debug_handler]
pub async fn renew_session(State(state): State<AppState>) -> Response {
    state.sessions.invalidate().await;

    match state.sessions.acquire().await {
        Ok(session) => {
            info!("Session renewed on request ({:?})", session.source);
            (
                StatusCode::OK,
                Json(RenewSessionResponse {
                    success: true,
                    session_active: !state.sessions.is_expired().await,
                }),
            )
                .into_response()
        }
        Err(err) => err.into_reply(state.config.expose_error_details),
    }
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!("Rejected login body: {}", rejection.body_text());
            return AppError::InvalidInput("Cuerpo de la solicitud inválido".to_string())
                .into_reply(state.config.expose_error_details);
        }
    };

    let Some((user, pin)) = req.credentials() else {
        return AppError::InvalidInput("Faltan usuario o contraseña".to_string())
            .into_reply(state.config.expose_error_details);
    };

    match state.sessions.login(user, pin).await {
        Ok(_) => (StatusCode::OK, Json(LoginResponse { success: true })).into_response(),
        Err(err) => err.into_reply(state.config.expose_error_details),
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::utils::error_to_api_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("La sesión con el portal expiró")]
    SessionExpired,

    #[error("{0}")]
    Upstream(String),

    #[error("El portal devolvió una respuesta inválida")]
    MalformedResponse,

    #[error("{0}")]
    LoginRejected(String),

    #[error("No se pudo contactar al portal")]
    Transport(#[from] reqwest::Error),

    #[error("Error interno del servidor")]
    Internal(String),
}

impl AppError {
    /// Only an expired session is worth a fresh acquisition and a second try.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::SessionExpired)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::Upstream(_) => StatusCode::BAD_REQUEST,
            AppError::SessionExpired | AppError::LoginRejected(_) => StatusCode::UNAUTHORIZED,
            AppError::MalformedResponse | AppError::Transport(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the error body, attaching the debug form of the error when
    /// diagnostics are enabled.
    pub fn into_reply(self, expose_details: bool) -> Response {
        let status = self.status();
        let details = expose_details.then(|| format!("{:?}", self));
        (status, error_to_api_response(self.to_string(), details)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_reply(false)
    }
}

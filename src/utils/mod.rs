use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub fn error_to_api_response(error: String, details: Option<String>) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        success: false,
        error,
        details,
    })
}

/// Current time in the same shape as JavaScript's `toISOString`.
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Keeps only the first few characters of a cookie value for log lines.
pub fn mask_secret(value: &str) -> String {
    let visible: String = value.chars().take(6).collect();
    if visible.len() < value.len() {
        format!("{}…", visible)
    } else {
        "****".to_string()
    }
}

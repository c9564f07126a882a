use serde::Serialize;

use crate::portal::SessionSource;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub session_active: bool,
    pub session_expiry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_source: Option<SessionSource>,
}

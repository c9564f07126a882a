use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub usuario: Option<String>,
    #[serde(default)]
    pub contrasena: Option<String>,
}

impl LoginRequest {
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let user = self.usuario.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        let pin = self.contrasena.as_deref().filter(|p| !p.is_empty())?;
        Some((user, pin))
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewSessionResponse {
    pub success: bool,
    pub session_active: bool,
}

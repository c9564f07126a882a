// Upstream portal client
// Everything that talks HTTP to the self-service portal lives here.

use std::sync::Arc;

use reqwest::{
    Client, StatusCode,
    header::{self, HeaderMap, HeaderValue},
    redirect::Policy,
};
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::AppError,
    portal::model::PortalEnvelope,
    utils::mask_secret,
};

const GENERIC_UPSTREAM_ERROR: &str = "Error en la respuesta del portal";

pub struct PortalClient {
    http_client: Client,
    config: Arc<Config>,
}

impl PortalClient {
    pub fn new(config: Arc<Config>) -> Result<Self, AppError> {
        // Redirects mean "log in again" on this portal, so they must reach us.
        let http_client = Client::builder()
            .redirect(Policy::none())
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.upstream_timeout())
            .user_agent(&config.portal_user_agent)
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.session_cookie_name
    }

    fn base_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("es-ES,es;q=0.8"),
        );
        headers
    }

    /// Fetches the entry page anonymously and returns the cookie header the
    /// portal handed out.
    pub async fn open_session(&self) -> Result<String, AppError> {
        let url = self.config.entry_url();
        debug!("Requesting anonymous session from {}", url);

        let response = self
            .http_client
            .get(&url)
            .headers(self.base_headers())
            .send()
            .await?;

        let status = response.status();
        match extract_session_cookie(response.headers(), self.cookie_name()) {
            Some(cookie) => {
                info!(
                    "Portal issued anonymous session {} (status {})",
                    mask_secret(&cookie),
                    status
                );
                Ok(cookie)
            }
            None => {
                warn!("Entry page answered {} without a session cookie", status);
                Err(AppError::Upstream(
                    "El portal no entregó una cookie de sesión".to_string(),
                ))
            }
        }
    }

    /// Submits the credential form and returns the authenticated cookie header.
    pub async fn login(&self, user: &str, pin: &str) -> Result<String, AppError> {
        let url = self.config.login_url();
        info!("Logging in to portal as {}", user);

        let response = self
            .http_client
            .post(&url)
            .headers(self.base_headers())
            .header(header::REFERER, self.config.entry_url())
            .form(&[("username", user), ("password", pin)])
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            warn!("Portal login failed with {}", status);
            return Err(AppError::Upstream(
                "El portal no respondió al inicio de sesión".to_string(),
            ));
        }

        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if status.is_client_error() || location.contains("error") {
            warn!("Portal rejected credentials for {} ({})", user, status);
            return Err(AppError::LoginRejected("Credenciales inválidas".to_string()));
        }

        extract_session_cookie(response.headers(), self.cookie_name())
            .inspect(|cookie| info!("Portal login succeeded, session {}", mask_secret(cookie)))
            .ok_or_else(|| {
                warn!("Portal login answered {} without a session cookie", status);
                AppError::LoginRejected("El portal no aceptó las credenciales".to_string())
            })
    }

    /// Queries the attendance listing for one NRC using the given cookie header.
    pub async fn registered_sections(
        &self,
        nrc: &str,
        cookie: &str,
    ) -> Result<PortalEnvelope, AppError> {
        let page_size = self.config.page_size.to_string();
        let response = self
            .http_client
            .get(self.config.sections_url())
            .query(&[
                ("filterText", nrc),
                ("pageMaxSize", page_size.as_str()),
                ("pageOffset", "0"),
                ("sortColumn", "courseReferenceNumber"),
                ("sortDirection", "asc"),
            ])
            .headers(self.base_headers())
            .header(header::COOKIE, cookie)
            .header(header::REFERER, self.config.entry_url())
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        debug!("Portal answered {} ({}) for NRC {}", status, content_type, nrc);

        if let Some(signal) = expiry_signal(status, &content_type) {
            warn!(
                "Session {} looks expired: {} (status {}, content-type {:?})",
                mask_secret(cookie),
                signal,
                status,
                content_type
            );
            return Err(AppError::SessionExpired);
        }

        let body = response.text().await?;
        debug!(
            "Portal body preview: {}",
            body.chars().take(200).collect::<String>()
        );
        parse_envelope(&body)
    }
}

/// Collects the `name=value` pairs of every `Set-Cookie` header into a single
/// `Cookie` header value, provided the session cookie is among them.
pub fn extract_session_cookie(headers: &HeaderMap, session_cookie: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| {
            let pair = raw.split(';').next()?.trim();
            let (name, value) = pair.split_once('=')?;
            let (name, value) = (name.trim(), value.trim());
            (!name.is_empty() && !value.is_empty()).then(|| (name.to_string(), value.to_string()))
        })
        .collect();

    if !pairs.iter().any(|(name, _)| name == session_cookie) {
        return None;
    }

    Some(
        pairs
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

/// Returns why a response means the session is no longer valid, if it does.
pub fn expiry_signal(status: StatusCode, content_type: &str) -> Option<&'static str> {
    if status.is_redirection() {
        Some("redirect")
    } else if status != StatusCode::OK {
        Some("unexpected status")
    } else if !content_type.to_ascii_lowercase().contains("json") {
        Some("non-JSON content type")
    } else {
        None
    }
}

pub fn parse_envelope(body: &str) -> Result<PortalEnvelope, AppError> {
    let envelope: PortalEnvelope = serde_json::from_str(body).map_err(|e| {
        warn!("Portal body is not a valid envelope: {}", e);
        AppError::MalformedResponse
    })?;

    if !envelope.success {
        let message = envelope
            .error
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(GENERIC_UPSTREAM_ERROR)
            .to_string();
        return Err(AppError::Upstream(message));
    }

    Ok(envelope)
}

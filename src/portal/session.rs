use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::{error::AppError, portal::client::PortalClient, utils::mask_secret};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionSource {
    Anonymous,
    Login,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Session {
    /// Value sent verbatim as the `Cookie` header.
    pub cookie: String,
    pub acquired_at: DateTime<Utc>,
    pub source: SessionSource,
}

/// Read-only view of the slot for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub source: Option<SessionSource>,
}

#[derive(Clone)]
struct Credentials {
    user: String,
    pin: String,
}

/// Owns the single cached portal session.
pub struct SessionManager {
    portal: Arc<PortalClient>,
    slot: RwLock<Option<Session>>,
    credentials: RwLock<Option<Credentials>>,
    ttl: Duration,
    fallback_cookie: Option<String>,
}

impl SessionManager {
    pub fn new(
        portal: Arc<PortalClient>,
        ttl: std::time::Duration,
        fallback_cookie: Option<String>,
    ) -> Self {
        // A bare token is assumed to be the value of the session cookie.
        let fallback_cookie = fallback_cookie.map(|value| {
            if value.contains('=') {
                value
            } else {
                format!("{}={}", portal.cookie_name(), value)
            }
        });

        Self {
            portal,
            slot: RwLock::new(None),
            credentials: RwLock::new(None),
            ttl: Duration::from_std(ttl).unwrap_or(Duration::MAX),
            fallback_cookie,
        }
    }

    /// Fetches a brand new session from the portal and caches it.
    pub async fn acquire(&self) -> Result<Session, AppError> {
        let credentials = self.credentials.read().await.clone();
        let fetched = match credentials {
            Some(c) => self
                .portal
                .login(&c.user, &c.pin)
                .await
                .map(|cookie| (cookie, SessionSource::Login)),
            None => self
                .portal
                .open_session()
                .await
                .map(|cookie| (cookie, SessionSource::Anonymous)),
        };

        let (cookie, source) = match (fetched, &self.fallback_cookie) {
            (Ok(fetched), _) => fetched,
            (Err(err), Some(fallback)) => {
                warn!("Session acquisition failed ({}), using fallback cookie", err);
                (fallback.clone(), SessionSource::Fallback)
            }
            (Err(err), None) => {
                error!("Session acquisition failed: {}", err);
                return Err(err);
            }
        };

        Ok(self.store(cookie, source, Utc::now()).await)
    }

    /// Returns the cached session, acquiring a new one when it is stale.
    pub async fn current(&self) -> Result<Session, AppError> {
        let now = Utc::now();
        if let Some(session) = self.slot.read().await.as_ref() {
            if !is_stale(session, self.ttl, now) {
                return Ok(session.clone());
            }
            info!("Cached session from {} is stale", session.acquired_at);
        }
        self.acquire().await
    }

    pub async fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now()).await
    }

    pub async fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.slot.read().await.as_ref() {
            Some(session) => is_stale(session, self.ttl, now),
            None => true,
        }
    }

    pub async fn invalidate(&self) {
        if let Some(session) = self.slot.write().await.take() {
            info!("Invalidated session {}", mask_secret(&session.cookie));
        }
    }

    pub async fn status(&self) -> SessionStatus {
        let now = Utc::now();
        match self.slot.read().await.as_ref() {
            Some(session) => SessionStatus {
                active: !is_stale(session, self.ttl, now),
                expires_at: session.acquired_at.checked_add_signed(self.ttl),
                source: Some(session.source),
            },
            None => SessionStatus {
                active: false,
                expires_at: None,
                source: None,
            },
        }
    }

    /// Logs in with the given credentials. On success they replace anonymous
    /// acquisition for every later refresh.
    pub async fn login(&self, user: &str, pin: &str) -> Result<Session, AppError> {
        let cookie = self.portal.login(user, pin).await?;
        *self.credentials.write().await = Some(Credentials {
            user: user.to_string(),
            pin: pin.to_string(),
        });
        Ok(self.store(cookie, SessionSource::Login, Utc::now()).await)
    }

    async fn store(&self, cookie: String, source: SessionSource, at: DateTime<Utc>) -> Session {
        let session = Session {
            cookie,
            acquired_at: at,
            source,
        };
        *self.slot.write().await = Some(session.clone());
        session
    }
}

fn is_stale(session: &Session, ttl: Duration, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(session.acquired_at) >= ttl
}

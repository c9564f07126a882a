use std::sync::Arc;

use config::Config;
use error::AppError;
use portal::{PortalClient, SessionManager};
use attendance::QueryExecutor;

pub mod attendance;
pub mod config;
pub mod error;
pub mod middleware;
pub mod portal;
pub mod router;
pub mod routes;
pub mod utils;

pub use router::create_router;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionManager>,
    pub executor: Arc<QueryExecutor>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let config = Arc::new(config);
        let portal = Arc::new(PortalClient::new(config.clone())?);
        let sessions = Arc::new(SessionManager::new(
            portal.clone(),
            config.session_ttl(),
            config.fallback_cookie.clone(),
        ));
        let executor = Arc::new(QueryExecutor::new(
            portal,
            sessions.clone(),
            config.filter_unscheduled,
        ));

        Ok(Self {
            config,
            sessions,
            executor,
        })
    }
}

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::{
    attendance::transform::{Section, has_schedule, to_section},
    error::AppError,
    portal::{PortalClient, SessionManager, model::{PortalEnvelope, RawSection}},
};

/// How many times a query is replayed after the portal drops the session.
pub const MAX_SESSION_RETRIES: u32 = 1;

#[derive(Debug)]
pub struct Consultation {
    pub nrc: String,
    pub sections: Vec<Section>,
    /// Records exactly as the portal returned them.
    pub raw: Vec<Value>,
    pub attempts: u32,
}

pub fn validate_nrc(raw: &str) -> Result<String, AppError> {
    let nrc = raw.trim();
    if nrc.is_empty() {
        return Err(AppError::InvalidInput("NRC no puede estar vacío".to_string()));
    }
    if !nrc.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::InvalidInput(
            "El NRC debe contener solo dígitos".to_string(),
        ));
    }
    Ok(nrc.to_string())
}

pub struct QueryExecutor {
    portal: Arc<PortalClient>,
    sessions: Arc<SessionManager>,
    filter_unscheduled: bool,
}

impl QueryExecutor {
    pub fn new(
        portal: Arc<PortalClient>,
        sessions: Arc<SessionManager>,
        filter_unscheduled: bool,
    ) -> Self {
        Self {
            portal,
            sessions,
            filter_unscheduled,
        }
    }

    pub async fn consult(&self, nrc: &str) -> Result<Consultation, AppError> {
        let nrc = validate_nrc(nrc)?;
        info!("Consulting NRC {}", nrc);

        let mut attempts = 0;
        loop {
            attempts += 1;
            let session = self.sessions.current().await?;

            match self.portal.registered_sections(&nrc, &session.cookie).await {
                Ok(envelope) => return self.shape(nrc, envelope, attempts),
                Err(err) if err.is_retryable() => {
                    self.sessions.invalidate().await;
                    if attempts > MAX_SESSION_RETRIES {
                        warn!("NRC {} failed after {} attempts: {}", nrc, attempts, err);
                        return Err(err);
                    }
                    warn!("Session rejected for NRC {}, renewing and retrying", nrc);
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn shape(
        &self,
        nrc: String,
        envelope: PortalEnvelope,
        attempts: u32,
    ) -> Result<Consultation, AppError> {
        let mut sections = Vec::with_capacity(envelope.data.len());
        for record in &envelope.data {
            let raw: RawSection = serde_json::from_value(record.clone()).map_err(|e| {
                warn!("Unexpected section record for NRC {}: {}", nrc, e);
                AppError::MalformedResponse
            })?;
            if self.filter_unscheduled
                && !raw.meeting_days.as_deref().is_some_and(has_schedule)
            {
                continue;
            }
            sections.push(to_section(&raw, &nrc));
        }

        info!(
            "NRC {} returned {} of {} sections",
            nrc,
            sections.len(),
            envelope.data.len()
        );
        Ok(Consultation {
            nrc,
            sections,
            raw: envelope.data,
            attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_are_accepted_and_trimmed() {
        assert_eq!(validate_nrc("28423").unwrap(), "28423");
        assert_eq!(validate_nrc("  007 ").unwrap(), "007");
    }

    #[test]
    fn blank_and_non_numeric_are_rejected() {
        for input in ["", "   ", "\t\n"] {
            assert!(matches!(
                validate_nrc(input),
                Err(AppError::InvalidInput(ref m)) if m == "NRC no puede estar vacío"
            ));
        }
        for input in ["28A23", "284 23", "-1", "１２３"] {
            assert!(matches!(validate_nrc(input), Err(AppError::InvalidInput(_))));
        }
    }
}

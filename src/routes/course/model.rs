use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attendance::{Consultation, Section};

#[derive(Debug, Deserialize)]
pub struct ConsultRequest {
    #[serde(default)]
    pub nrc: Option<Value>,
}

impl ConsultRequest {
    /// Only a JSON string counts as an NRC.
    pub fn nrc_text(&self) -> Option<String> {
        match self.nrc.as_ref()? {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultResponse {
    pub success: bool,
    pub nrc: String,
    pub total_secciones: usize,
    pub secciones: Vec<Section>,
    pub timestamp: String,
}

impl ConsultResponse {
    pub fn new(consultation: Consultation, timestamp: String) -> Self {
        Self {
            success: true,
            nrc: consultation.nrc,
            total_secciones: consultation.sections.len(),
            secciones: consultation.sections,
            timestamp,
        }
    }
}

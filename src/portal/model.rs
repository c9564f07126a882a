use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Top-level body returned by `getRegisteredSections`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// One enrollment row as the portal sends it. Every field is optional and
/// numeric fields show up both as JSON numbers and as strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSection {
    #[serde(deserialize_with = "string_or_number")]
    pub course_reference_number: Option<String>,
    pub course_title: Option<String>,
    pub subject: Option<String>,
    pub subject_description: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub course_number: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub term: Option<String>,
    pub term_description: Option<String>,
    pub meeting_days: Option<Vec<Value>>,
    #[serde(deserialize_with = "string_or_number")]
    pub begin_time: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub end_time: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    pub total_missed: Option<f64>,
    #[serde(deserialize_with = "number_or_string")]
    pub attendance_percentage: Option<f64>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_defaults_to_failure() {
        let envelope: PortalEnvelope = serde_json::from_value(json!({})).unwrap();
        assert!(!envelope.success);
        assert!(envelope.data.is_empty());
    }

    #[test]
    fn mixed_numeric_fields_are_accepted() {
        let raw: RawSection = serde_json::from_value(json!({
            "courseReferenceNumber": 28423,
            "courseTitle": "CALCULO DIFERENCIAL",
            "term": "202450",
            "beginTime": "0700",
            "totalMissed": "3",
            "attendancePercentage": 92.5
        }))
        .unwrap();
        assert_eq!(raw.course_reference_number.as_deref(), Some("28423"));
        assert_eq!(raw.begin_time.as_deref(), Some("0700"));
        assert_eq!(raw.total_missed, Some(3.0));
        assert_eq!(raw.attendance_percentage, Some(92.5));
        assert!(raw.meeting_days.is_none());
    }

    #[test]
    fn null_fields_become_none() {
        let raw: RawSection = serde_json::from_value(json!({
            "courseReferenceNumber": null,
            "totalMissed": null
        }))
        .unwrap();
        assert!(raw.course_reference_number.is_none());
        assert!(raw.total_missed.is_none());
    }
}

use serde::Serialize;
use serde_json::Value;

use crate::portal::model::RawSection;

/// Sunday-first, matching the portal's schedule slots.
const DAY_NAMES: [&str; 7] = [
    "Domingo",
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
];

pub const NO_SCHEDULE: &str = "Sin horario";
pub const TIME_NOT_SPECIFIED: &str = "No especificado";
const UNTITLED: &str = "Sin título";
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub nrc: String,
    pub titulo: String,
    pub codigo_curso: String,
    pub materia: String,
    pub periodo: String,
    pub dias: String,
    pub hora_inicio: String,
    pub hora_fin: String,
    pub faltas: u32,
    pub porcentaje_asistencia: f64,
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn has_schedule(slots: &[Value]) -> bool {
    slots.iter().take(DAY_NAMES.len()).any(is_truthy)
}

pub fn day_names(slots: &[Value]) -> String {
    let days: Vec<&str> = slots
        .iter()
        .zip(DAY_NAMES)
        .filter(|(slot, _)| is_truthy(slot))
        .map(|(_, name)| name)
        .collect();

    if days.is_empty() {
        NO_SCHEDULE.to_string()
    } else {
        days.join(", ")
    }
}

/// `"1430"` becomes `"14:30"`. Anything that is not a real HHMM clock time
/// (including the portal's `"0000"` filler) is reported as unspecified.
pub fn format_time(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim) else {
        return TIME_NOT_SPECIFIED.to_string();
    };
    if raw.len() != 4 || !raw.bytes().all(|b| b.is_ascii_digit()) || raw == "0000" {
        return TIME_NOT_SPECIFIED.to_string();
    }

    let (hours, minutes) = raw.split_at(2);
    match (hours.parse::<u8>(), minutes.parse::<u8>()) {
        (Ok(h), Ok(m)) if h < 24 && m < 60 => format!("{}:{}", hours, minutes),
        _ => TIME_NOT_SPECIFIED.to_string(),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn to_section(raw: &RawSection, queried_nrc: &str) -> Section {
    let subject = non_blank(&raw.subject);
    let course_number = non_blank(&raw.course_number);
    let codigo_curso = match (subject, course_number) {
        (Some(s), Some(n)) => format!("{}{}", s, n),
        (Some(part), None) | (None, Some(part)) => part.to_string(),
        (None, None) => NOT_AVAILABLE.to_string(),
    };

    Section {
        nrc: non_blank(&raw.course_reference_number)
            .unwrap_or(queried_nrc)
            .to_string(),
        titulo: non_blank(&raw.course_title).unwrap_or(UNTITLED).to_string(),
        codigo_curso,
        materia: non_blank(&raw.subject_description)
            .or(subject)
            .unwrap_or(NOT_AVAILABLE)
            .to_string(),
        periodo: non_blank(&raw.term_description)
            .or(non_blank(&raw.term))
            .unwrap_or(NOT_AVAILABLE)
            .to_string(),
        dias: day_names(raw.meeting_days.as_deref().unwrap_or_default()),
        hora_inicio: format_time(raw.begin_time.as_deref()),
        hora_fin: format_time(raw.end_time.as_deref()),
        faltas: raw
            .total_missed
            .filter(|n| n.is_finite() && *n > 0.0)
            .map(|n| n.round() as u32)
            .unwrap_or(0),
        porcentaje_asistencia: raw
            .attendance_percentage
            .filter(|p| p.is_finite())
            .unwrap_or(0.0),
    }
}

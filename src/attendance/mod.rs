mod executor;
mod transform;

pub use executor::{Consultation, MAX_SESSION_RETRIES, QueryExecutor, validate_nrc};
pub use transform::{Section, day_names, format_time, has_schedule, to_section};

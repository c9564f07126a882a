mod handler;
mod model;

pub use handler::{health, not_found};
pub use model::HealthResponse;

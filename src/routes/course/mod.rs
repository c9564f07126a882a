mod handler;
mod model;

pub use handler::{consult_by_body, consult_by_path};
pub use model::{ConsultRequest, ConsultResponse};

mod handler;
mod model;

pub use handler::{login, renew_session};
pub use model::{LoginRequest, LoginResponse, RenewSessionResponse};

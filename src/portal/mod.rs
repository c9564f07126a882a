pub mod client;
pub mod model;
pub mod session;

pub use client::PortalClient;
pub use session::{Session, SessionManager, SessionSource, SessionStatus};

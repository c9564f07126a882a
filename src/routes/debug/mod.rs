mod handler;

pub use handler::{DebugResponse, test_nrc};

pub mod course;
pub mod debug;
pub mod session;
pub mod system;

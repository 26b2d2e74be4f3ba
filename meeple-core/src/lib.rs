// Core types for the meeple API services
// Request/response wrappers, status codes, and the shared error type

pub mod error;
pub mod http;
pub mod status;

// Re-export commonly used types
pub use error::*;
pub use http::*;
pub use status::*;

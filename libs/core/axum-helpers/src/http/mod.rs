//! HTTP-level layers shared by every router.

pub mod cors;
pub mod message;
pub mod security;

pub use cors::{CorsConfig, create_cors_layer};
pub use message::MessageResponse;
pub use security::security_headers;

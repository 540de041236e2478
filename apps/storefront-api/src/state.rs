//! Shared application state.

use axum_helpers::JwtAuth;
use mongodb::{Client, Database};

/// Cloned into every router; all fields share their underlying pools.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub mongo_client: Client,
    pub db: Database,
    /// Signs and verifies bearer tokens for every domain router
    pub jwt: JwtAuth,
}

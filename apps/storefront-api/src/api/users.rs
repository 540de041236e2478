//! Users API wiring

use axum::Router;
use domain_users::{MongoUserRepository, UserService, handlers};
use tracing::info;

use crate::state::AppState;

fn service(state: &AppState) -> UserService<MongoUserRepository> {
    UserService::new(MongoUserRepository::new(state.db.clone()), state.jwt.clone())
}

pub fn router(state: &AppState) -> Router {
    handlers::router(service(state))
}

/// Unique indexes, then the seed admin if one is configured.
pub async fn init(state: &AppState) -> eyre::Result<()> {
    MongoUserRepository::new(state.db.clone())
        .init_indexes()
        .await?;

    if let Some(seed) = state.config.seed_admin.clone() {
        match service(state).ensure_admin(seed).await? {
            Some(admin) => info!(user_id = %admin.id, username = %admin.username, "Seed admin created"),
            None => info!("Seed admin already exists"),
        }
    }
    Ok(())
}

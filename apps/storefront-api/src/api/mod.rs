//! API routes, nested under /api by `axum_helpers::create_router`.

pub mod contacts;
pub mod health;
pub mod orders;
pub mod users;

use axum::Router;

use crate::state::AppState;

pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/users", users::router(state))
        .nest("/contacts", contacts::router(state))
        .nest("/orders", orders::router(state))
        .merge(health::router(state.clone()))
}

/// Indexes and seed data needed before serving.
pub async fn init(state: &AppState) -> eyre::Result<()> {
    users::init(state).await?;
    orders::init_indexes(state).await?;
    Ok(())
}

//! Contacts API wiring

use axum::Router;
use domain_contacts::{ContactService, MongoContactRepository, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = MongoContactRepository::new(state.db.clone());
    handlers::router(ContactService::new(repository), state.jwt.clone())
}

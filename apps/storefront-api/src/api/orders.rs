//! Orders API wiring

use axum::Router;
use domain_orders::{MongoOrderRepository, OrderService, ReadAccess, handlers};
use tracing::info;

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = MongoOrderRepository::new(state.db.clone());
    let read_access = ReadAccess::from_public_flag(state.config.orders_public_read);
    if read_access == ReadAccess::Public {
        info!("Orders are readable without authentication");
    }

    handlers::router(OrderService::new(repository), state.jwt.clone(), read_access)
}

pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    MongoOrderRepository::new(state.db.clone())
        .init_indexes()
        .await?;
    Ok(())
}

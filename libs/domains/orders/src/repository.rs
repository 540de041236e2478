use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{OrderError, OrderResult};
use crate::models::{Order, OrderFilter, OrderStatus};

/// Repository trait for Order persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: Order) -> OrderResult<Order>;

    async fn get_by_id(&self, id: Uuid) -> OrderResult<Option<Order>>;

    /// Newest first, filtered and paged
    async fn list(&self, filter: OrderFilter) -> OrderResult<Vec<Order>>;

    /// Store `order` if the stored version still equals `order.version`.
    ///
    /// Returns the stored order with its version bumped. Fails with
    /// `ConcurrentModification` when the versions differ and `NotFound` when
    /// the order is gone.
    async fn replace(&self, order: Order) -> OrderResult<Order>;

    /// Set the status in a single atomic write; `None` if the order does not
    /// exist.
    async fn set_status(&self, id: Uuid, status: OrderStatus) -> OrderResult<Option<Order>>;

    async fn delete(&self, id: Uuid) -> OrderResult<bool>;
}

/// In-memory implementation of OrderRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: Order) -> OrderResult<Order> {
        self.orders.write().await.insert(order.id, order.clone());
        tracing::info!(order_id = %order.id, "Created order");
        Ok(order)
    }

    async fn get_by_id(&self, id: Uuid) -> OrderResult<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list(&self, filter: OrderFilter) -> OrderResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut result: Vec<Order> = orders
            .values()
            .filter(|o| filter.status.is_none_or(|status| o.status == status))
            .cloned()
            .collect();
        result.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn replace(&self, mut order: Order) -> OrderResult<Order> {
        let mut orders = self.orders.write().await;

        let stored = orders.get(&order.id).ok_or(OrderError::NotFound(order.id))?;
        if stored.version != order.version {
            return Err(OrderError::ConcurrentModification(order.id));
        }

        order.version += 1;
        orders.insert(order.id, order.clone());
        tracing::info!(order_id = %order.id, version = order.version, "Replaced order");
        Ok(order)
    }

    async fn set_status(&self, id: Uuid, status: OrderStatus) -> OrderResult<Option<Order>> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(&id) else {
            return Ok(None);
        };

        order.status = status;
        order.version += 1;
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    async fn delete(&self, id: Uuid) -> OrderResult<bool> {
        let removed = self.orders.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(order_id = %id, "Deleted order");
        }
        Ok(removed)
    }
}

use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{OrderError, OrderResult};
use crate::models::{
    CreateOrder, MAX_LIMIT, Order, OrderFilter, OrderStatus, StatusUpdate, UpdateOrder,
};
use crate::repository::OrderRepository;

/// Order lifecycle: placement, replacement, status changes
pub struct OrderService<R: OrderRepository> {
    repository: Arc<R>,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Place a new order with status `pending`
    #[instrument(skip(self, input), fields(customer = %input.name))]
    pub async fn create_order(&self, input: CreateOrder) -> OrderResult<Order> {
        input
            .validate()
            .map_err(|e| OrderError::Validation(e.to_string()))?;

        let order = Order::new(input);
        check_cart_total(&order)?;
        self.repository.create(order).await
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: Uuid) -> OrderResult<Order> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(OrderError::NotFound(id))
    }

    /// Newest first. A non-positive limit falls back to the default page size.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, mut filter: OrderFilter) -> OrderResult<Vec<Order>> {
        if filter.limit <= 0 {
            filter.limit = OrderFilter::default().limit;
        }
        filter.limit = filter.limit.min(MAX_LIMIT);
        self.repository.list(filter).await
    }

    /// Replace an order's fields.
    ///
    /// A `version` in the body must match the stored one; without it the
    /// version just read guards the write.
    #[instrument(skip(self, input))]
    pub async fn update_order(&self, id: Uuid, input: UpdateOrder) -> OrderResult<Order> {
        input
            .validate()
            .map_err(|e| OrderError::Validation(e.to_string()))?;

        let mut order = self.get_order(id).await?;
        if let Some(expected) = input.version {
            if expected != order.version {
                tracing::info!(
                    order_id = %id,
                    expected,
                    stored = order.version,
                    "Rejected update with stale version"
                );
                return Err(OrderError::ConcurrentModification(id));
            }
        }

        order.replace_with(input);
        check_cart_total(&order)?;
        self.repository.replace(order).await
    }

    /// Move an order to any status.
    #[instrument(skip(self))]
    pub async fn set_status(&self, id: Uuid, status: OrderStatus) -> OrderResult<Order> {
        self.repository
            .set_status(id, status)
            .await?
            .ok_or(OrderError::NotFound(id))
    }

    /// [`set_status`](Self::set_status) from the raw request body.
    pub async fn apply_status_update(&self, id: Uuid, input: StatusUpdate) -> OrderResult<Order> {
        let status = OrderStatus::from_str(input.status.trim())
            .map_err(|_| OrderError::InvalidStatus(input.status.clone()))?;
        self.set_status(id, status).await
    }

    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: Uuid) -> OrderResult<()> {
        if !self.repository.delete(id).await? {
            return Err(OrderError::NotFound(id));
        }
        Ok(())
    }
}

/// Rejects carts whose total overflows; a mismatch with `total_amount` is
/// only logged.
fn check_cart_total(order: &Order) -> OrderResult<()> {
    let Some(cart_total) = order.cart_total() else {
        return Err(OrderError::Validation("Cart total is out of range".to_string()));
    };
    if cart_total != order.total_amount {
        tracing::warn!(
            order_id = %order.id,
            total_amount = %order.total_amount,
            cart_total = %cart_total,
            "Order total does not match cart lines"
        );
    }
    Ok(())
}

impl<R: OrderRepository> Clone for OrderService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

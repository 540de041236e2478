//! MongoDB implementation of OrderRepository

use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, to_bson},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{OrderError, OrderResult};
use crate::models::{Order, OrderFilter, OrderStatus};
use crate::repository::OrderRepository;

/// MongoDB implementation of the OrderRepository
pub struct MongoOrderRepository {
    collection: Collection<Order>,
}

impl MongoOrderRepository {
    pub fn new(db: Database) -> Self {
        Self {
            collection: db.collection::<Order>("orders"),
        }
    }

    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<Order>(collection_name),
        }
    }

    /// Index backing the status filter and newest-first listing.
    pub async fn init_indexes(&self) -> OrderResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "status": 1, "created_at": -1 })
            .build();
        self.collection.create_index(index).await?;

        tracing::info!("Order indexes ensured");
        Ok(())
    }

    fn id_filter(id: Uuid) -> OrderResult<Document> {
        let id = to_bson(&id).map_err(|e| OrderError::Internal(e.to_string()))?;
        Ok(doc! { "_id": id })
    }

    fn build_filter(filter: &OrderFilter) -> Document {
        let mut doc = doc! {};
        if let Some(status) = filter.status {
            doc.insert("status", status.to_string());
        }
        doc
    }
}

#[async_trait]
impl OrderRepository for MongoOrderRepository {
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn create(&self, order: Order) -> OrderResult<Order> {
        self.collection.insert_one(&order).await?;
        tracing::info!(order_id = %order.id, "Order created successfully");
        Ok(order)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> OrderResult<Option<Order>> {
        Ok(self.collection.find_one(Self::id_filter(id)?).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: OrderFilter) -> OrderResult<Vec<Order>> {
        use futures_util::TryStreamExt;

        let options = FindOptions::builder()
            .limit(filter.limit)
            .skip(filter.offset)
            .sort(doc! { "created_at": -1, "_id": -1 })
            .build();

        let cursor = self
            .collection
            .find(Self::build_filter(&filter))
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, order), fields(order_id = %order.id, expected_version = order.version))]
    async fn replace(&self, mut order: Order) -> OrderResult<Order> {
        let mut filter = Self::id_filter(order.id)?;
        filter.insert("version", order.version);

        order.version += 1;
        let result = self.collection.replace_one(filter, &order).await?;

        if result.matched_count == 0 {
            return match self.get_by_id(order.id).await? {
                Some(_) => Err(OrderError::ConcurrentModification(order.id)),
                None => Err(OrderError::NotFound(order.id)),
            };
        }

        tracing::info!(order_id = %order.id, version = order.version, "Order replaced successfully");
        Ok(order)
    }

    #[instrument(skip(self))]
    async fn set_status(&self, id: Uuid, status: OrderStatus) -> OrderResult<Option<Order>> {
        let updated_at = to_bson(&Utc::now()).map_err(|e| OrderError::Internal(e.to_string()))?;
        let update = doc! {
            "$set": { "status": status.to_string(), "updated_at": updated_at },
            "$inc": { "version": 1_i64 },
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let order = self
            .collection
            .find_one_and_update(Self::id_filter(id)?, update)
            .with_options(options)
            .await?;

        if order.is_some() {
            tracing::info!(order_id = %id, status = %status, "Order status updated");
        }
        Ok(order)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> OrderResult<bool> {
        let result = self.collection.delete_one(Self::id_filter(id)?).await?;
        if result.deleted_count > 0 {
            tracing::info!(order_id = %id, "Order deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }
}

//! MongoDB implementation of ContactRepository

use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    Collection, Database,
    bson::{Document, doc, to_bson},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ContactError, ContactResult};
use crate::models::ContactMessage;
use crate::repository::ContactRepository;

pub struct MongoContactRepository {
    collection: Collection<ContactMessage>,
}

impl MongoContactRepository {
    pub fn new(db: Database) -> Self {
        Self {
            collection: db.collection::<ContactMessage>("contacts"),
        }
    }

    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<ContactMessage>(collection_name),
        }
    }

    fn id_filter(id: Uuid) -> ContactResult<Document> {
        let id = to_bson(&id).map_err(|e| ContactError::Internal(e.to_string()))?;
        Ok(doc! { "_id": id })
    }
}

#[async_trait]
impl ContactRepository for MongoContactRepository {
    #[instrument(skip(self, message), fields(contact_id = %message.id))]
    async fn create(&self, message: ContactMessage) -> ContactResult<ContactMessage> {
        self.collection.insert_one(&message).await?;
        tracing::info!(contact_id = %message.id, "Contact message stored");
        Ok(message)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ContactResult<Option<ContactMessage>> {
        Ok(self.collection.find_one(Self::id_filter(id)?).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> ContactResult<Vec<ContactMessage>> {
        use futures_util::TryStreamExt;

        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1, "_id": -1 })
            .build();
        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, reply))]
    async fn set_reply(&self, id: Uuid, reply: String) -> ContactResult<Option<ContactMessage>> {
        let updated_at =
            to_bson(&Utc::now()).map_err(|e| ContactError::Internal(e.to_string()))?;
        let update = doc! { "$set": { "reply": reply, "updated_at": updated_at } };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let message = self
            .collection
            .find_one_and_update(Self::id_filter(id)?, update)
            .with_options(options)
            .await?;

        if message.is_some() {
            tracing::info!(contact_id = %id, "Contact message replied");
        }
        Ok(message)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ContactResult<bool> {
        let result = self.collection.delete_one(Self::id_filter(id)?).await?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_filter_uses_underscore_id() {
        let filter = MongoContactRepository::id_filter(Uuid::now_v7()).unwrap();
        assert!(filter.contains_key("_id"));
    }
}

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ContactResult;
use crate::models::ContactMessage;

/// Repository trait for contact messages
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, message: ContactMessage) -> ContactResult<ContactMessage>;

    async fn get_by_id(&self, id: Uuid) -> ContactResult<Option<ContactMessage>>;

    /// Newest first
    async fn list(&self) -> ContactResult<Vec<ContactMessage>>;

    /// Store `reply` and bump `updated_at`; `None` if the message is gone.
    async fn set_reply(&self, id: Uuid, reply: String) -> ContactResult<Option<ContactMessage>>;

    async fn delete(&self, id: Uuid) -> ContactResult<bool>;
}

/// In-memory implementation of ContactRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryContactRepository {
    messages: Arc<RwLock<HashMap<Uuid, ContactMessage>>>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn create(&self, message: ContactMessage) -> ContactResult<ContactMessage> {
        self.messages
            .write()
            .await
            .insert(message.id, message.clone());
        tracing::info!(contact_id = %message.id, "Stored contact message");
        Ok(message)
    }

    async fn get_by_id(&self, id: Uuid) -> ContactResult<Option<ContactMessage>> {
        Ok(self.messages.read().await.get(&id).cloned())
    }

    async fn list(&self) -> ContactResult<Vec<ContactMessage>> {
        let messages = self.messages.read().await;
        let mut result: Vec<ContactMessage> = messages.values().cloned().collect();
        result.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(result)
    }

    async fn set_reply(&self, id: Uuid, reply: String) -> ContactResult<Option<ContactMessage>> {
        let mut messages = self.messages.write().await;
        let Some(message) = messages.get_mut(&id) else {
            return Ok(None);
        };

        message.reply = Some(reply);
        message.updated_at = Utc::now();
        Ok(Some(message.clone()))
    }

    async fn delete(&self, id: Uuid) -> ContactResult<bool> {
        let removed = self.messages.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(contact_id = %id, "Deleted contact message");
        }
        Ok(removed)
    }
}

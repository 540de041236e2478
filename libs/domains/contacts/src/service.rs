use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ContactError, ContactResult};
use crate::models::{ContactMessage, CreateContact, ReplyContact};
use crate::repository::ContactRepository;

pub struct ContactService<R: ContactRepository> {
    repository: Arc<R>,
}

impl<R: ContactRepository> ContactService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Store a message from the public contact form
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn submit(&self, input: CreateContact) -> ContactResult<ContactMessage> {
        input
            .validate()
            .map_err(|e| ContactError::Validation(e.to_string()))?;
        self.repository.create(ContactMessage::new(input)).await
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> ContactResult<Vec<ContactMessage>> {
        self.repository.list().await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> ContactResult<ContactMessage> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ContactError::NotFound(id))
    }

    /// Set the staff reply. Sending the stored reply again writes nothing.
    #[instrument(skip(self, input))]
    pub async fn reply(&self, id: Uuid, input: ReplyContact) -> ContactResult<ContactMessage> {
        input
            .validate()
            .map_err(|e| ContactError::Validation(e.to_string()))?;

        let message = self.get(id).await?;
        if message.reply.as_deref() == Some(input.reply.as_str()) {
            tracing::debug!(contact_id = %id, "Reply unchanged");
            return Ok(message);
        }

        self.repository
            .set_reply(id, input.reply)
            .await?
            .ok_or(ContactError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ContactResult<()> {
        if !self.repository.delete(id).await? {
            return Err(ContactError::NotFound(id));
        }
        tracing::info!(contact_id = %id, "Contact message deleted");
        Ok(())
    }
}

impl<R: ContactRepository> Clone for ContactService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryContactRepository, MockContactRepository};
    use mockall::predicate;

    fn form() -> CreateContact {
        CreateContact {
            name: "Alan".into(),
            email: "alan@example.com".into(),
            title: "Returns".into(),
            message: "How do I return a broken item?".into(),
        }
    }

    fn reply(text: &str) -> ReplyContact {
        ReplyContact {
            reply: text.into(),
        }
    }

    #[tokio::test]
    async fn test_submit_and_list_newest_first() {
        let service = ContactService::new(InMemoryContactRepository::new());
        let first = service.submit(form()).await.unwrap();
        let second = service.submit(form()).await.unwrap();

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_submit_rejects_short_message() {
        let service = ContactService::new(InMemoryContactRepository::new());
        let mut input = form();
        input.message = "hi".into();
        let result = service.submit(input).await;
        assert!(matches!(result, Err(ContactError::Validation(_))));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reply_sets_text() {
        let service = ContactService::new(InMemoryContactRepository::new());
        let message = service.submit(form()).await.unwrap();

        let replied = service
            .reply(message.id, reply("Use the returns portal."))
            .await
            .unwrap();
        assert_eq!(replied.reply.as_deref(), Some("Use the returns portal."));
        assert_eq!(service.get(message.id).await.unwrap(), replied);
    }

    #[tokio::test]
    async fn test_identical_reply_does_not_write() {
        let stored = ContactMessage {
            reply: Some("Already answered".into()),
            ..ContactMessage::new(form())
        };
        let id = stored.id;

        let mut mock_repo = MockContactRepository::new();
        mock_repo
            .expect_get_by_id()
            .with(predicate::eq(id))
            .returning(move |_| Ok(Some(stored.clone())));
        mock_repo.expect_set_reply().never();

        let service = ContactService::new(mock_repo);
        let result = service.reply(id, reply("Already answered")).await.unwrap();
        assert_eq!(result.reply.as_deref(), Some("Already answered"));
    }

    #[tokio::test]
    async fn test_reply_missing_message() {
        let service = ContactService::new(InMemoryContactRepository::new());
        let result = service.reply(Uuid::now_v7(), reply("Hello")).await;
        assert!(matches!(result, Err(ContactError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let service = ContactService::new(InMemoryContactRepository::new());
        let message = service.submit(form()).await.unwrap();
        service.delete(message.id).await.unwrap();
        assert!(matches!(
            service.delete(message.id).await,
            Err(ContactError::NotFound(_))
        ));
    }
}

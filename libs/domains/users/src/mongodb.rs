//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, to_bson},
    error::{ErrorKind, WriteFailure},
    options::{FindOptions, IndexOptions},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::repository::UserRepository;

const DUPLICATE_KEY: i32 = 11000;

/// MongoDB implementation of the UserRepository
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: Database) -> Self {
        Self {
            collection: db.collection::<User>("users"),
        }
    }

    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<User>(collection_name),
        }
    }

    /// Unique indexes on `email` and `username`.
    pub async fn init_indexes(&self) -> UserResult<()> {
        let unique = |field: &str| {
            let mut keys = Document::new();
            keys.insert(field, 1);
            IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(true).build())
                .build()
        };

        self.collection
            .create_indexes([unique("email"), unique("username")])
            .await?;

        tracing::info!("User indexes ensured");
        Ok(())
    }

    fn id_filter(id: Uuid) -> UserResult<Document> {
        let id = to_bson(&id).map_err(|e| UserError::Internal(e.to_string()))?;
        Ok(doc! { "_id": id })
    }

    /// Translate a duplicate-key write error into the matching domain error.
    fn map_write_error(err: mongodb::error::Error, user: &User) -> UserError {
        if let ErrorKind::Write(WriteFailure::WriteError(ref write_error)) = *err.kind {
            if write_error.code == DUPLICATE_KEY {
                return if write_error.message.contains("username") {
                    UserError::DuplicateUsername(user.username.clone())
                } else {
                    UserError::DuplicateEmail(user.email.clone())
                };
            }
        }
        err.into()
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: User) -> UserResult<User> {
        self.collection
            .insert_one(&user)
            .await
            .map_err(|e| Self::map_write_error(e, &user))?;

        tracing::info!(user_id = %user.id, "User created successfully");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(Self::id_filter(id)?).await?)
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let filter = doc! { "email": email.to_lowercase() };
        Ok(self.collection.find_one(filter).await?)
    }

    #[instrument(skip(self))]
    async fn get_by_username(&self, username: &str) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "username": username }).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> UserResult<Vec<User>> {
        use futures_util::TryStreamExt;

        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1, "_id": -1 })
            .build();

        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id, expected_version = user.version))]
    async fn update(&self, mut user: User) -> UserResult<User> {
        let mut filter = Self::id_filter(user.id)?;
        filter.insert("version", user.version);

        user.version += 1;
        let result = self
            .collection
            .replace_one(filter, &user)
            .await
            .map_err(|e| Self::map_write_error(e, &user))?;

        if result.matched_count == 0 {
            return match self.get_by_id(user.id).await? {
                Some(_) => Err(UserError::ConcurrentModification(user.id)),
                None => Err(UserError::NotFound(user.id)),
            };
        }

        tracing::info!(user_id = %user.id, version = user.version, "User updated successfully");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let result = self.collection.delete_one(Self::id_filter(id)?).await?;
        if result.deleted_count > 0 {
            tracing::info!(user_id = %id, "User deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }
}

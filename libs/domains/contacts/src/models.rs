use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Loose `something@something.tld` check used by the contact form.
pub static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is a valid regex"));

/// A message sent through the public contact form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContactMessage {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub title: String,
    pub message: String,
    /// Staff reply, once one has been written
    #[serde(default)]
    pub reply: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateContact {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(regex(path = *EMAIL_PATTERN, message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(
        min = 10,
        max = 5000,
        message = "Message must be at least 10 characters long"
    ))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReplyContact {
    #[validate(length(min = 1, max = 5000, message = "Reply must not be empty"))]
    pub reply: String,
}

impl ContactMessage {
    pub fn new(input: CreateContact) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            title: input.title.trim().to_string(),
            message: input.message,
            reply: None,
            created_at: now,
            updated_at: now,
        }
    }
}

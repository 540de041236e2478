use axum_helpers::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError};

/// Stored account record.
///
/// Emails are kept lowercase so uniqueness is case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
    pub role: Role,
    /// Argon2 PHC string
    pub password_hash: String,
    /// Bumped on every write; guards read-modify-write cycles
    #[serde(default)]
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a [`User`]; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            username: user.username,
            role: user.role,
            version: user.version,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    /// Defaults to `user`; privileged roles need an admin caller
    #[serde(default)]
    pub role: Option<Role>,
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

/// Partial edit. Absent or empty fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(custom(function = "email_or_empty"))]
    pub email: Option<String>,
    pub role: Option<Role>,
    #[validate(custom(function = "username_or_empty"))]
    pub username: Option<String>,
    #[validate(custom(function = "password_or_empty"))]
    pub password: Option<String>,
}

/// Self-service profile edit.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(custom(function = "email_or_empty"))]
    pub email: Option<String>,
    #[validate(custom(function = "username_or_empty"))]
    pub username: Option<String>,
}

impl From<UpdateProfile> for UpdateUser {
    fn from(profile: UpdateProfile) -> Self {
        Self {
            name: profile.name,
            email: profile.email,
            username: profile.username,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

/// Initial administrator created at start-up when absent.
#[derive(Clone)]
pub struct SeedAdmin {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

fn email_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || value.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

fn username_or_empty(value: &str) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if len == 0 || (3..=50).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::new("length"))
    }
}

fn password_or_empty(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len == 0 || (6..=128).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::new("length"))
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `Some(trimmed)` when the field was sent with content.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl User {
    /// `password_hash` must already be hashed.
    pub fn new(input: &CreateUser, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            email: normalize_email(&input.email),
            username: input.username.trim().to_string(),
            role: input.role.unwrap_or_default(),
            password_hash,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge-if-present. The password is handled by the service, which
    /// passes the replacement hash (if any) separately.
    pub fn apply_update(&mut self, update: &UpdateUser, new_password_hash: Option<String>) {
        if let Some(name) = present(&update.name) {
            self.name = name.to_string();
        }
        if let Some(email) = present(&update.email) {
            self.email = normalize_email(email);
        }
        if let Some(username) = present(&update.username) {
            self.username = username.to_string();
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(hash) = new_password_hash {
            self.password_hash = hash;
        }
        self.updated_at = Utc::now();
    }
}

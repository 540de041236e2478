use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, AuthError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("User '{0}' not found")]
    UsernameNotFound(String),

    #[error("Email '{0}' already in use")]
    DuplicateEmail(String),

    #[error("Username '{0}' already in use")]
    DuplicateUsername(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Cannot delete an admin")]
    ProtectedRole(Uuid),

    #[error("User {0} was modified concurrently")]
    ConcurrentModification(Uuid),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            UserError::UsernameNotFound(_) => AppError::NotFound("User not found".to_string()),
            UserError::DuplicateEmail(_) => AppError::BadRequest("Email already in use.".to_string()),
            UserError::DuplicateUsername(_) => {
                AppError::BadRequest("Username already in use.".to_string())
            }
            UserError::InvalidCredentials => AppError::InvalidCredentials,
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::Unauthenticated(msg) => AppError::Unauthorized(msg),
            UserError::Forbidden(msg) => AppError::Forbidden(msg),
            UserError::ProtectedRole(_) => AppError::Forbidden("Cannot delete an admin".to_string()),
            UserError::ConcurrentModification(id) => AppError::Conflict(format!(
                "User {} was modified concurrently, reload and retry",
                id
            )),
            UserError::Database(msg) => AppError::Database(msg),
            UserError::PasswordHash(msg) | UserError::Token(msg) | UserError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Database(err.to_string())
    }
}

impl From<AuthError> for UserError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated(msg) => UserError::Unauthenticated(msg),
            AuthError::Forbidden(_) => UserError::Forbidden(err.to_string()),
        }
    }
}

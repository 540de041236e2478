use super::{jwt::JwtClaims, roles::Role};
use crate::errors::AppError;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Roles allowed to run back-office operations.
pub const ADMINISTRATIVE: &[Role] = &[Role::Admin, Role::Manager];

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Router state for [`require_roles`](super::middleware::require_roles).
#[derive(Debug, Clone, Copy)]
pub struct AllowedRoles(pub &'static [Role]);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    Unauthenticated(String),
    #[error("role '{0}' is not allowed to perform this action")]
    Forbidden(Role),
}

/// Exact membership check: no role implies another.
pub fn authorize(claims: &JwtClaims, allowed: &[Role]) -> Result<(), AuthError> {
    if allowed.contains(&claims.role) {
        Ok(())
    } else {
        Err(AuthError::Forbidden(claims.role))
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated(msg) => AppError::Unauthorized(msg),
            AuthError::Forbidden(_) => AppError::Forbidden(err.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

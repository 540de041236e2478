//! Bearer-token authentication and role-based authorization.
//!
//! - [`JwtAuth`] issues and verifies HS256 tokens, accepting rotated secrets
//! - [`jwt_auth_middleware`] rejects requests without a valid token
//! - [`require_roles`] gates a router on an exact set of [`Role`]s
//! - [`CurrentUser`] hands the verified [`JwtClaims`] to handlers
//!
//! ```ignore
//! use axum::middleware::from_fn_with_state;
//! use axum_helpers::auth::{ADMINISTRATIVE, AllowedRoles, JwtAuth, jwt_auth_middleware, require_roles};
//!
//! let protected = Router::new()
//!     .route("/contacts", get(list_contacts))
//!     .layer(from_fn_with_state(AllowedRoles(ADMINISTRATIVE), require_roles))
//!     .layer(from_fn_with_state(jwt_auth.clone(), jwt_auth_middleware));
//! ```

pub mod config;
pub mod gate;
pub mod jwt;
pub mod middleware;
pub mod roles;

pub use config::JwtConfig;
pub use gate::{ADMIN_ONLY, ADMINISTRATIVE, AllowedRoles, AuthError, authorize};
pub use jwt::{JwtAuth, JwtClaims, TokenError};
pub use middleware::{CurrentUser, jwt_auth_middleware, optional_jwt_auth_middleware, require_roles};
pub use roles::Role;

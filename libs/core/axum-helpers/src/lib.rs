//! # Axum Helpers
//!
//! Shared HTTP plumbing for the storefront services.
//!
//! - **[`auth`]**: JWT issuance/verification, role gate, auth middleware
//! - **[`server`]**: router assembly, health checks, graceful shutdown
//! - **[`http`]**: CORS, security headers and the plain message body
//! - **[`errors`]**: [`AppError`] and the JSON error envelope
//! - **[`extractors`]**: [`UuidPath`] and [`ValidatedJson`]
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router};
//!
//! let router = create_router::<ApiDoc>(api_routes, &CorsConfig::from_env()?);
//! create_production_app(router, &ServerConfig::from_env()?, Duration::from_secs(30), async {}).await?;
//! ```

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{
    ADMIN_ONLY, ADMINISTRATIVE, AllowedRoles, AuthError, CurrentUser, JwtAuth, JwtClaims,
    JwtConfig, Role, TokenError, authorize, jwt_auth_middleware, optional_jwt_auth_middleware,
    require_roles,
};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use http::{CorsConfig, MessageResponse, create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{UuidPath, ValidatedJson};

//! Orders Domain
//!
//! Order placement, full replacement under optimistic concurrency, and
//! status changes.
//!
//! ```text
//! Handlers → OrderService → OrderRepository (in-memory | MongoDB)
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_orders::{InMemoryOrderRepository, OrderService, ReadAccess, handlers};
//!
//! let jwt = JwtAuth::new(&JwtConfig::new("a-development-secret-of-32-characters!"));
//! let service = OrderService::new(InMemoryOrderRepository::new());
//! let router = handlers::router(service, jwt, ReadAccess::Administrative);
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{OrderError, OrderResult};
pub use handlers::{ApiDoc, ReadAccess};
pub use models::{CartItem, CreateOrder, Order, OrderFilter, OrderStatus, StatusUpdate, UpdateOrder};
pub use mongodb::MongoOrderRepository;
pub use repository::{InMemoryOrderRepository, OrderRepository};
pub use service::OrderService;

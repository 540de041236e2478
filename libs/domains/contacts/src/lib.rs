//! Contacts Domain
//!
//! Messages from the public contact form and staff replies to them.

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{ContactError, ContactResult};
pub use handlers::ApiDoc;
pub use models::{ContactMessage, CreateContact, ReplyContact};
pub use mongodb::MongoContactRepository;
pub use repository::{ContactRepository, InMemoryContactRepository};
pub use service::ContactService;

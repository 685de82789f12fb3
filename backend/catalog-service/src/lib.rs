/// Catalog Service Library
///
/// Owns the video lifecycle: records uploads as PENDING, applies processing
/// results, and emits creator notifications.
pub mod config;
pub mod consumers;
pub mod error;
pub mod repository;
pub mod service;

pub use config::Config;
pub use consumers::handler_registry;
pub use error::{CatalogError, Result};
pub use repository::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};
pub use service::{CatalogService, RegisterOutcome, ResultOutcome};

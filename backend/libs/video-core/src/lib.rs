//! Video pipeline core models and types
//!
//! Shared data structures for the catalog and processor services

pub mod constants;
pub mod models;

pub use models::*;

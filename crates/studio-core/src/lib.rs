//! Studio Core Library
//!
//! Domain models, error types, configuration, request validation and file identity
//! allocation shared by every Studio crate.

pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, StudioConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use identity::{FileIdAllocator, RandomFileIds};
// Storage, StorageError and StorageResult live in studio-storage

//! Data models for the application
//!
//! Users, media records and the request/response shapes of the HTTP surface.

mod media;
mod user;

// Re-export all models for convenient imports
pub use media::*;
pub use user::*;

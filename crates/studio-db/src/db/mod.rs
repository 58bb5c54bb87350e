//! Database repositories for data access layer
//!
//! Each repository wraps the shared `InstrumentedPool` and implements a store trait, so the
//! services above can be exercised against in-memory stores in tests.

pub mod media;
pub mod user;

pub use media::{MediaRepository, MediaStore};
pub use user::{UserRepository, UserStore};

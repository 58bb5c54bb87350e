//! Studio Database Library
//!
//! The association store: registered users and the media records linking each
//! uploaded blob to its owner.

pub mod db;
pub mod pool;

pub use db::{MediaRepository, MediaStore, UserRepository, UserStore};
pub use pool::{InstrumentedPool, WaitSnapshot};

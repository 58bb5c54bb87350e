//! Caller identity.
//!
//! There is no authentication: the caller names itself, and uploads are attributed to
//! that user.

pub mod acting_user;

pub use acting_user::ActingUser;

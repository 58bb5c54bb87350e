//! Studio Processing Library
//!
//! Upload inspection that happens before anything touches storage: bounded reads of
//! the inbound stream and magic-byte classification against the accepted media kinds.

pub mod limits;
pub mod validator;

pub use limits::read_capped;
pub use validator::{ContentValidator, MediaKind, ValidationError, SNIFF_LEN};

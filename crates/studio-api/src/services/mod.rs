//! Application services.
//!
//! Services hold the upload, registration and retrieval rules. They see the database and
//! blob store only through the `UserStore`, `MediaStore` and `Storage` traits.

pub mod ingestion;
pub mod orphan_sweeper;
pub mod retrieval;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

pub use ingestion::{IncomingMedia, IngestionService};
pub use orphan_sweeper::{OrphanSweeper, SweepReport};
pub use retrieval::RetrievalService;
pub use users::UserService;

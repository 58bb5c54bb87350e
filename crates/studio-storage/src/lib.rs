//! Studio Storage Library
//!
//! Blob storage abstraction and the local filesystem backend.
//!
//! # Blob naming
//!
//! Every blob is stored under a flat name derived from its file identifier and the
//! extension recorded at upload time: `{file_id}.{ext}`, or `{file_id}` when there is
//! no extension. Names are built only through [`BlobKey`], so they can never contain
//! path separators.

pub mod factory;
pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::BlobKey;
pub use local::LocalStorage;
pub use traits::{
    BlobDownload, BlobEntry, BlobReader, ByteStream, Storage, StorageError, StorageResult,
    StoredBlob,
};

//! File identity allocation.

use uuid::Uuid;

/// Source of file identifiers for accepted uploads.
///
/// Every call must return a value never returned before. Uniqueness is not
/// re-checked against the store, so implementations need a space large enough
/// that collisions are not a practical concern.
pub trait FileIdAllocator: Send + Sync {
    fn allocate(&self) -> Uuid;
}

/// Random 128-bit (v4) identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomFileIds;

impl FileIdAllocator for RandomFileIds {
    fn allocate(&self) -> Uuid {
        Uuid::new_v4()
    }
}

//! In-memory stand-ins for the database and blob store, with failure switches.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};
use studio_core::models::{MediaRecord, NewMediaLink, NewUser, User};
use studio_core::{AppError, FileIdAllocator};
use studio_db::{MediaStore, UserStore};
use studio_storage::{
    BlobDownload, BlobEntry, BlobKey, BlobReader, Storage, StorageError, StorageResult,
    StoredBlob,
};
use tokio::io::AsyncReadExt;
use uuid::Uuid;

pub fn jpeg_bytes(tail: usize) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.extend((0..tail).map(|i| (i % 251) as u8));
    data
}

pub fn png_bytes(tail: usize) -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend((0..tail).map(|i| (i % 13) as u8));
    data
}

#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<Vec<User>>,
}

impl InMemoryUsers {
    pub fn insert(&self, email: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            created_at: Utc::now(),
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    fn id_for(&self, email: &str) -> Option<Uuid> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.id)
    }

    fn contains_id(&self, id: Uuid) -> bool {
        self.users.lock().unwrap().iter().any(|u| u.id == id)
    }
}

#[async_trait]
impl UserStore for InMemoryUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(format!(
                "A user with email {} already exists",
                user.email
            )));
        }
        let created = User {
            id: Uuid::new_v4(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }
}

pub struct InMemoryMedia {
    users: Arc<InMemoryUsers>,
    records: Mutex<Vec<MediaRecord>>,
}

impl InMemoryMedia {
    pub fn new(users: Arc<InMemoryUsers>) -> Self {
        Self {
            users,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn ids_for(&self, email: &str) -> Vec<Uuid> {
        let Some(user_id) = self.users.id_for(email) else {
            return Vec::new();
        };
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.file_id)
            .collect()
    }
}

#[async_trait]
impl MediaStore for InMemoryMedia {
    async fn link(&self, link: &NewMediaLink) -> Result<MediaRecord, AppError> {
        if !self.users.contains_id(link.user_id) {
            return Err(AppError::Database(sqlx::Error::RowNotFound));
        }
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.file_id == link.file_id) {
            return Err(AppError::Database(sqlx::Error::RowNotFound));
        }
        let record = MediaRecord {
            file_id: link.file_id,
            user_id: link.user_id,
            extension: link.extension.clone(),
            content_type: link.content_type.clone(),
            size_bytes: link.size_bytes,
            created_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn list_for_email(&self, email: &str) -> Result<Vec<Uuid>, AppError> {
        Ok(self.ids_for(email))
    }

    async fn find(&self, file_id: Uuid) -> Result<Option<MediaRecord>, AppError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.file_id == file_id)
            .cloned())
    }

    async fn exists(&self, file_id: Uuid) -> Result<bool, AppError> {
        Ok(self.find(file_id).await?.is_some())
    }
}

/// Media store whose every call fails like an unreachable database.
pub struct FailingMedia;

#[async_trait]
impl MediaStore for FailingMedia {
    async fn link(&self, _link: &NewMediaLink) -> Result<MediaRecord, AppError> {
        Err(AppError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn list_for_email(&self, _email: &str) -> Result<Vec<Uuid>, AppError> {
        Err(AppError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn find(&self, _file_id: Uuid) -> Result<Option<MediaRecord>, AppError> {
        Err(AppError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn exists(&self, _file_id: Uuid) -> Result<bool, AppError> {
        Err(AppError::Database(sqlx::Error::PoolTimedOut))
    }
}

/// Allocator handing out 1, 2, 3, ... as UUIDs.
#[derive(Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl FileIdAllocator for SequentialIds {
    fn allocate(&self) -> Uuid {
        Uuid::from_u128(u128::from(self.next.fetch_add(1, Ordering::SeqCst) + 1))
    }
}

/// Blob store kept in a map, keyed by blob filename.
#[derive(Default)]
pub struct MockStorage {
    blobs: Mutex<HashMap<String, (BlobKey, Vec<u8>, SystemTime)>>,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
    deletes: AtomicUsize,
}

impl MockStorage {
    pub fn fail_puts(&self) {
        self.fail_puts.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn contents(&self, filename: &str) -> Option<Vec<u8>> {
        self.blobs
            .lock()
            .unwrap()
            .get(filename)
            .map(|(_, data, _)| data.clone())
    }

    /// Place a blob directly, as if written `age` ago.
    pub fn insert_aged(&self, key: &BlobKey, data: Vec<u8>, age: Duration) {
        let modified = SystemTime::now() - age;
        self.blobs
            .lock()
            .unwrap()
            .insert(key.filename(), (key.clone(), data, modified));
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn put(&self, key: &BlobKey, mut reader: BlobReader) -> StorageResult<StoredBlob> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("disk unavailable".to_string()));
        }
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        let size_bytes = data.len() as u64;
        self.blobs
            .lock()
            .unwrap()
            .insert(key.filename(), (key.clone(), data, SystemTime::now()));
        Ok(StoredBlob {
            key: key.clone(),
            size_bytes,
        })
    }

    async fn get(&self, key: &BlobKey) -> StorageResult<BlobDownload> {
        let data = self
            .contents(&key.filename())
            .ok_or_else(|| StorageError::NotFound(key.filename()))?;
        let size_bytes = data.len() as u64;
        let stream = futures::stream::once(async move { Ok(Bytes::from(data)) });
        Ok(BlobDownload {
            filename: key.filename(),
            size_bytes,
            stream: Box::pin(stream),
        })
    }

    async fn delete(&self, key: &BlobKey) -> StorageResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed("disk unavailable".to_string()));
        }
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.blobs.lock().unwrap().remove(&key.filename());
        Ok(())
    }

    async fn exists(&self, key: &BlobKey) -> StorageResult<bool> {
        Ok(self.blobs.lock().unwrap().contains_key(&key.filename()))
    }

    async fn list(&self) -> StorageResult<Vec<BlobEntry>> {
        Ok(self
            .blobs
            .lock()
            .unwrap()
            .values()
            .map(|(key, data, modified)| BlobEntry {
                key: key.clone(),
                size_bytes: data.len() as u64,
                modified: *modified,
            })
            .collect())
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

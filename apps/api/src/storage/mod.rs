//! Resume file storage.
//!
//! `FileStore` is the swappable contract; `MemoryFileStore` keeps files for the
//! life of the process, `S3FileStore` persists them to a bucket.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::sync::RwLock;

pub mod handlers;
pub mod s3;
pub mod upload;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// File content plus the metadata captured at upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub bytes: Bytes,
    pub original_name: String,
    pub file_size: u64,
    pub mime_type: String,
}

#[async_trait]
pub trait FileStore: Send + Sync {
    async fn store_file(&self, name: &str, file: StoredFile) -> Result<(), StorageError>;

    async fn get_file(&self, name: &str) -> Result<Option<StoredFile>, StorageError>;

    async fn delete_file(&self, name: &str) -> Result<(), StorageError>;

    async fn file_exists(&self, name: &str) -> Result<bool, StorageError>;

    /// Stored names, sorted.
    async fn list_files(&self) -> Result<Vec<String>, StorageError>;
}

#[derive(Default)]
pub struct MemoryFileStore {
    files: RwLock<HashMap<String, StoredFile>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn store_file(&self, name: &str, file: StoredFile) -> Result<(), StorageError> {
        self.files.write().await.insert(name.to_string(), file);
        Ok(())
    }

    async fn get_file(&self, name: &str) -> Result<Option<StoredFile>, StorageError> {
        Ok(self.files.read().await.get(name).cloned())
    }

    async fn delete_file(&self, name: &str) -> Result<(), StorageError> {
        self.files.write().await.remove(name);
        Ok(())
    }

    async fn file_exists(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.files.read().await.contains_key(name))
    }

    async fn list_files(&self) -> Result<Vec<String>, StorageError> {
        let mut names: Vec<String> = self.files.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

use crate::storage::error::StorageError;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// Storage trait defining the interface for the object store holding
/// submission files and ground-truth answer files
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Download an object by its key
    async fn get_object(&self, key: &str) -> Result<Bytes, StorageError>;

    /// Upload an object under the given key
    async fn put_object(&self, key: &str, data: Bytes) -> Result<(), StorageError>;
}

/// Implementation of Storage trait for Arc<T> where T implements Storage
///
/// This allows sharing storage instances across threads and components
/// efficiently.
#[async_trait]
impl<T: Storage + ?Sized> Storage for Arc<T> {
    async fn get_object(&self, key: &str) -> Result<Bytes, StorageError> {
        (**self).get_object(key).await
    }

    async fn put_object(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        (**self).put_object(key, data).await
    }
}

use crate::storage::error::StorageError;
use crate::storage::storage::Storage;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A fake in-memory implementation of the Storage trait for testing
#[derive(Clone)]
pub struct FakeStorage {
    objects: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl FakeStorage {
    /// Create a new empty FakeStorage
    pub fn new() -> Self {
        FakeStorage {
            objects: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed an object directly, bypassing put_object
    pub fn fake_add_object(&self, key: &str, data: Bytes) {
        let mut objects = self.objects.write().unwrap();
        objects.insert(key.to_string(), data);
    }

    /// Remove an object, simulating a missing or deleted file
    pub fn fake_remove_object(&self, key: &str) {
        let mut objects = self.objects.write().unwrap();
        objects.remove(key);
    }
}

impl Default for FakeStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for FakeStorage {
    async fn get_object(&self, key: &str) -> Result<Bytes, StorageError> {
        let objects = self.objects.read().unwrap();
        objects
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::ObjectNotFound(key.to_string()))
    }

    async fn put_object(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        let mut objects = self.objects.write().unwrap();
        objects.insert(key.to_string(), data);
        Ok(())
    }
}

use crate::blob::error::StorageError;
use crate::blob::storage::Storage;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// `FakeStorage` is an in-memory implementation of the `Storage` trait for
/// testing. It records per-key write counts so tests can verify overwrite
/// behavior, and supports injecting failures for writes and container
/// creation.
#[derive(Clone, Default)]
pub struct FakeStorage {
    objects: Arc<Mutex<HashMap<(String, String), Bytes>>>,
    containers: Arc<Mutex<HashSet<String>>>,
    put_counts: Arc<Mutex<HashMap<String, usize>>>,
    fail_puts: Arc<Mutex<bool>>,
    fail_container_create: Arc<Mutex<bool>>,
}

#[allow(dead_code)]
impl FakeStorage {
    pub fn new() -> Self {
        FakeStorage::default()
    }

    /// Make every subsequent put_object fail with Unavailable
    pub async fn fake_fail_puts(&self) {
        *self.fail_puts.lock().await = true;
    }

    /// Make every subsequent create_container fail
    pub async fn fake_fail_container_create(&self) {
        *self.fail_container_create.lock().await = true;
    }

    /// Number of objects stored across all containers
    pub async fn object_count(&self) -> usize {
        self.objects.lock().await.len()
    }

    /// How many times a key has been written
    pub async fn put_count(&self, key: &str) -> usize {
        self.put_counts
            .lock()
            .await
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    /// Total writes across all keys
    pub async fn total_puts(&self) -> usize {
        self.put_counts.lock().await.values().sum()
    }

    pub async fn has_object(&self, container: &str, key: &str) -> bool {
        self.objects
            .lock()
            .await
            .contains_key(&(container.to_string(), key.to_string()))
    }

    pub async fn object_bytes(&self, container: &str, key: &str) -> Option<Bytes> {
        self.objects
            .lock()
            .await
            .get(&(container.to_string(), key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl Storage for FakeStorage {
    async fn put_object(
        &self,
        container: &str,
        key: &str,
        data: Bytes,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        if *self.fail_puts.lock().await {
            return Err(StorageError::Unavailable(
                "simulated storage outage".to_string(),
            ));
        }

        let mut counts = self.put_counts.lock().await;
        *counts.entry(key.to_string()).or_insert(0) += 1;

        let mut objects = self.objects.lock().await;
        objects.insert((container.to_string(), key.to_string()), data);
        Ok(())
    }

    async fn has_container(&self, container: &str) -> Result<bool, StorageError> {
        let containers = self.containers.lock().await;
        Ok(containers.contains(container))
    }

    async fn create_container(&self, container: &str) -> Result<(), StorageError> {
        if *self.fail_container_create.lock().await {
            return Err(StorageError::ContainerCreate(
                container.to_string(),
                "simulated creation failure".to_string(),
            ));
        }

        let mut containers = self.containers.lock().await;
        containers.insert(container.to_string());
        Ok(())
    }

    #[cfg(test)]
    async fn get_object(&self, container: &str, key: &str) -> Result<Bytes, StorageError> {
        let objects = self.objects.lock().await;
        match objects.get(&(container.to_string(), key.to_string())) {
            Some(bytes) => Ok(bytes.clone()),
            None => Err(StorageError::Write(
                key.to_string(),
                "object not found".to_string(),
            )),
        }
    }
}

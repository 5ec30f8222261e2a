use crate::blob::error::StorageError;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// Storage trait defining the interface for writing data objects to
/// S3-compatible blob storage. The pipeline only ever writes; reads exist
/// for test verification.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Write an object, unconditionally overwriting any existing object
    /// under the same key.
    async fn put_object(
        &self,
        container: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Check whether a container exists
    async fn has_container(&self, container: &str) -> Result<bool, StorageError>;

    /// Create a container; succeeding when it already exists
    async fn create_container(&self, container: &str) -> Result<(), StorageError>;

    /// Read an object back (test-only)
    #[cfg(test)]
    async fn get_object(&self, container: &str, key: &str) -> Result<Bytes, StorageError>;
}

/// Implementation of Storage trait for Arc<T> where T implements Storage
///
/// This allows sharing storage instances across components efficiently.
#[async_trait]
impl<T: Storage + ?Sized> Storage for Arc<T> {
    async fn put_object(
        &self,
        container: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        (**self).put_object(container, key, data, content_type).await
    }

    async fn has_container(&self, container: &str) -> Result<bool, StorageError> {
        (**self).has_container(container).await
    }

    async fn create_container(&self, container: &str) -> Result<(), StorageError> {
        (**self).create_container(container).await
    }

    #[cfg(test)]
    async fn get_object(&self, container: &str, key: &str) -> Result<Bytes, StorageError> {
        (**self).get_object(container, key).await
    }
}

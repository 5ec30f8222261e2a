use thiserror::Error;

/// Errors that can occur when interacting with blob storage
#[derive(Error, Debug)]
pub enum StorageError {
    /// Authentication or connectivity failure against the storage account
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Container creation failed for a reason other than "already exists"
    #[error("Failed to create container {0}: {1}")]
    ContainerCreate(String, String),

    #[error("Failed to write object {0}: {1}")]
    Write(String, String),

    #[error("Other storage error: {0}")]
    Other(#[from] anyhow::Error),
}

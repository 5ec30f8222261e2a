use crate::blob::{Storage, StorageError};
use bytes::Bytes;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info};

const CONTENT_TYPE: &str = "application/json";

/// Writes the raw payload to the bronze layer: one blob per logical day,
/// overwritten on re-runs of the same day.
pub struct Archiver<S: Storage> {
    storage: S,
    container: String,
    prefix: String,
}

impl<S: Storage> Archiver<S> {
    pub fn new(storage: S, container: &str, prefix: &str) -> Self {
        Archiver {
            storage,
            container: container.to_string(),
            prefix: prefix.to_string(),
        }
    }

    /// Object key for a logical date: `<prefix>_<YYYY-MM-DD>.json`
    pub fn object_key(&self, date: NaiveDate) -> String {
        format!("{}_{}.json", self.prefix, date.format("%Y-%m-%d"))
    }

    /// Serialize the payload and write it under the per-day key, creating
    /// the container on first use. Returns the object key written.
    pub async fn archive(&self, date: NaiveDate, payload: &Value) -> Result<String, StorageError> {
        let key = self.object_key(date);
        let body = serde_json::to_vec(payload)
            .map_err(|e| StorageError::Write(key.clone(), e.to_string()))?;

        // Check-then-create is not atomic; a concurrent creator is
        // tolerated because create_container treats "already exists"
        // as success.
        if !self.storage.has_container(&self.container).await? {
            info!("Container '{}' missing, creating it", self.container);
            self.storage.create_container(&self.container).await?;
        }

        debug!(
            "Archiving {} bytes to {}/{}",
            body.len(),
            self.container,
            key
        );
        self.storage
            .put_object(&self.container, &key, Bytes::from(body), CONTENT_TYPE)
            .await?;

        info!("Archived raw payload as {}/{}", self.container, key);
        Ok(key)
    }
}

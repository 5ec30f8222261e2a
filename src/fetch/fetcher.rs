use crate::fetch::error::FetchError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Fetcher trait defining the interface for retrieving the source payload
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    /// Issue one GET against the fully-qualified `url` and return the body
    /// parsed as JSON. No retries, no query templating.
    async fn fetch(&self, url: &str) -> Result<Value, FetchError>;
}

/// Implementation of Fetcher for Arc<T> where T implements Fetcher,
/// so a fetcher can be shared across components without cloning clients.
#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        (**self).fetch(url).await
    }
}

use crate::fetch::error::FetchError;
use crate::fetch::fetcher::Fetcher;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// `FakeFetcher` is an in-memory implementation of the `Fetcher` trait for
/// testing. Responses are queued in advance and each call consumes one;
/// the call counter lets tests assert how often the pipeline fetched.
#[derive(Clone, Default)]
pub struct FakeFetcher {
    responses: Arc<Mutex<VecDeque<Result<Value, FetchError>>>>,
    calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl FakeFetcher {
    pub fn new() -> Self {
        FakeFetcher::default()
    }

    /// Queue a successful JSON response
    pub async fn push_payload(&self, payload: Value) {
        let mut responses = self.responses.lock().await;
        responses.push_back(Ok(payload));
    }

    /// Queue a failure for the next call
    pub async fn push_error(&self, error: FetchError) {
        let mut responses = self.responses.lock().await;
        responses.push_back(Err(error));
    }

    /// Number of fetch calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, _url: &str) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut responses = self.responses.lock().await;
        responses
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Transient("no queued response".to_string())))
    }
}

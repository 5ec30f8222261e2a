use crate::fetch::error::FetchError;
use crate::fetch::fetcher::Fetcher;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Real HTTP implementation of the Fetcher trait, backed by a single
/// reqwest client with a request timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Transient(format!("failed to build HTTP client: {}", e)))?;

        Ok(HttpFetcher { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        info!("Fetching data from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transient(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transient(format!(
                "{} returned HTTP {}",
                url, status
            )));
        }

        // Read the body as text first so a broken body is reported as
        // malformed rather than as a transport failure.
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transient(format!("failed to read response body: {}", e)))?;

        let payload: Value = serde_json::from_str(&body)
            .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

        debug!("Fetched {} bytes of JSON from {}", body.len(), url);
        Ok(payload)
    }
}

use thiserror::Error;

/// Errors that can occur while fetching the source payload
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failure or non-2xx HTTP status. The next scheduled run may
    /// succeed; no retry is attempted within the pipeline.
    #[error("Transient fetch failure: {0}")]
    Transient(String),

    /// The endpoint answered 2xx but the body is not valid JSON.
    #[error("Response body is not valid JSON: {0}")]
    MalformedResponse(String),
}

pub mod error;
#[cfg(test)]
pub mod fake;
pub mod fetcher;
pub mod http;

pub use error::FetchError;
pub use fetcher::Fetcher;
pub use http::HttpFetcher;

pub mod http_fetcher;
pub mod memory;

use async_trait::async_trait;

use crate::app::FetchError;

pub use http_fetcher::HttpFetcher;
pub use memory::MemoryFetcher;

/// Obtains the raw content published at a feed URL.
#[async_trait]
pub trait Fetcher {
    async fn fetch_raw(&self, url: &str) -> Result<String, FetchError>;
}

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::app::FetchError;
use crate::fetcher::Fetcher;

#[derive(Debug, Clone)]
enum Scripted {
    Body(String),
    Status(u16),
    Unreachable,
}

#[derive(Debug, Default)]
struct Inner {
    responses: HashMap<String, Scripted>,
    calls: HashMap<String, usize>,
}

/// Fetcher answering from a table of scripted responses.
///
/// URLs without a response fail as unreachable. Responses can be swapped
/// between calls to simulate a feed publishing new entries.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    inner: Mutex<Inner>,
    latency: Option<Duration>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response, to exercise concurrent fan-out.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            inner: Mutex::default(),
            latency: Some(latency),
        }
    }

    pub fn respond(&self, url: &str, body: impl Into<String>) {
        self.script(url, Scripted::Body(body.into()));
    }

    pub fn respond_status(&self, url: &str, status: u16) {
        self.script(url, Scripted::Status(status));
    }

    pub fn fail(&self, url: &str) {
        self.script(url, Scripted::Unreachable);
    }

    /// Number of fetches made for `url`.
    pub fn calls(&self, url: &str) -> usize {
        self.lock().calls.get(url).copied().unwrap_or(0)
    }

    fn script(&self, url: &str, response: Scripted) {
        self.lock().responses.insert(url.to_string(), response);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch_raw(&self, url: &str) -> Result<String, FetchError> {
        let response = {
            let mut inner = self.lock();
            *inner.calls.entry(url.to_string()).or_insert(0) += 1;
            inner.responses.get(url).cloned()
        };

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match response {
            Some(Scripted::Body(body)) => Ok(body),
            Some(Scripted::Status(status)) => Err(FetchError::Status(status)),
            Some(Scripted::Unreachable) | None => Err(FetchError::Unreachable(url.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses() {
        let fetcher = MemoryFetcher::new();
        fetcher.respond("a", "<rss/>");
        fetcher.respond_status("b", 503);

        assert_eq!(fetcher.fetch_raw("a").await.unwrap(), "<rss/>");
        assert!(matches!(
            fetcher.fetch_raw("b").await,
            Err(FetchError::Status(503))
        ));
        assert!(matches!(
            fetcher.fetch_raw("missing").await,
            Err(FetchError::Unreachable(_))
        ));
        assert_eq!(fetcher.calls("a"), 1);
    }

    #[tokio::test]
    async fn test_response_can_be_replaced() {
        let fetcher = MemoryFetcher::new();
        fetcher.respond("a", "one");
        fetcher.respond("a", "two");
        assert_eq!(fetcher.fetch_raw("a").await.unwrap(), "two");

        fetcher.fail("a");
        assert!(fetcher.fetch_raw("a").await.is_err());
        assert_eq!(fetcher.calls("a"), 2);
    }
}

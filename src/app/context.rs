use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::scheduler::Scheduler;
use crate::sync::Synchronizer;

/// Wires configuration, fetcher and synchronizer together.
pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub synchronizer: Synchronizer,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> =
            Arc::new(HttpFetcher::new(&config.http).map_err(crate::app::SyncError::from)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        let synchronizer = Synchronizer::new(fetcher.clone(), config.sync.identity);
        Self {
            config,
            fetcher,
            synchronizer,
        }
    }

    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(self.synchronizer.clone(), &self.config.sync)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::MemoryFetcher;
    use crate::merge::IdentityKey;

    #[test]
    fn test_context_uses_configured_identity() {
        let mut config = Config::default();
        config.sync.identity = IdentityKey::TitleAndLink;

        let ctx = AppContext::with_fetcher(config, Arc::new(MemoryFetcher::new()));
        let scheduler = ctx.scheduler();
        assert_eq!(scheduler.store().identity(), IdentityKey::TitleAndLink);
    }

    #[test]
    fn test_http_context_builds() {
        assert!(AppContext::new(Config::default()).is_ok());
    }
}

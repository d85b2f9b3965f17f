//! Fetch task: one pass over the market list.
//!
//! For each market: discovery request, image download, dedup insert. A
//! failure ends that market's iteration only. Every newly stored image asks
//! the scheduler for one more task, so the pool grows with the discovery rate.

use std::sync::Arc;

use crate::config::SpotlightConfig;
use crate::content::ContentFetcher;
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::metadata::MetadataFetcher;
use crate::store::{DedupStore, InsertOutcome};

/// Capability to schedule one more task. Implemented by the pool handle.
pub trait TaskSubmitter: Send + Sync {
    fn submit_one(&self);
}

/// Everything a fetch task needs, shared by all tasks of a run.
#[derive(Debug)]
pub struct FetchContext {
    pub metadata: MetadataFetcher,
    pub content: ContentFetcher,
    pub store: Arc<DedupStore>,
    pub markets: Vec<String>,
}

impl FetchContext {
    pub fn new(cfg: &SpotlightConfig, store: Arc<DedupStore>) -> Self {
        let http = HttpClient::new(cfg);
        Self {
            metadata: MetadataFetcher::new(http.clone(), cfg),
            content: ContentFetcher::new(http),
            store,
            markets: cfg.markets.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchTask {
    ctx: Arc<FetchContext>,
}

impl FetchTask {
    pub fn new(ctx: Arc<FetchContext>) -> Self {
        Self { ctx }
    }

    /// Runs every market in order. Errors are logged, never propagated.
    pub fn run(&self, submitter: &dyn TaskSubmitter) {
        for market in &self.ctx.markets {
            match self.run_market(market) {
                Ok(InsertOutcome::Inserted(path)) => {
                    tracing::info!(market = %market, path = %path.display(), "new image added");
                    submitter.submit_one();
                }
                Ok(InsertOutcome::Existing(path)) => {
                    tracing::debug!(market = %market, path = %path.display(), "image already stored");
                }
                Err(e) => {
                    tracing::error!(market = %market, "error while getting image: {:#}", anyhow::Error::new(e));
                }
            }
        }
    }

    /// One market iteration: metadata, content, dedup insert.
    pub fn run_market(&self, country: &str) -> Result<InsertOutcome, FetchError> {
        let descriptor = self.ctx.metadata.fetch(country)?;
        tracing::debug!(market = country, image = %descriptor, "discovered image");
        let bytes = self.ctx.content.fetch(&descriptor)?;
        Ok(self.ctx.store.insert_if_new(&descriptor, &bytes)?)
    }
}

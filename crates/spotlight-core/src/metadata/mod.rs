//! Discovery request: which image is on offer for a market right now.
//!
//! Every request picks a random product id and a random cache-busting `lo`
//! value so the delivery cache hands out a fresh rotation entry.

mod parse;

use rand::Rng;

use crate::config::SpotlightConfig;
use crate::descriptor::ImageDescriptor;
use crate::error::FetchError;
use crate::http::HttpClient;

/// Issues the discovery request and parses the response into a descriptor.
#[derive(Debug, Clone)]
pub struct MetadataFetcher {
    http: HttpClient,
    base_url: String,
    product_ids: Vec<String>,
}

impl MetadataFetcher {
    pub fn new(http: HttpClient, cfg: &SpotlightConfig) -> Self {
        Self {
            http,
            base_url: cfg.discovery_url.clone(),
            product_ids: cfg.product_ids.clone(),
        }
    }

    /// Fetch the descriptor of the image currently offered for `country`.
    ///
    /// No retries; a non-200 status is logged and the body parsed anyway
    /// unless the client is in strict mode.
    pub fn fetch(&self, country: &str) -> Result<ImageDescriptor, FetchError> {
        let url = self.random_request_url(country);
        let response = self.http.get(
            &url,
            &[
                ("Cache-Control", "no-cache"),
                ("Accept-Encoding", "gzip, deflate"),
            ],
        )?;
        if !response.is_ok() {
            tracing::error!(
                market = country,
                status = response.status,
                "failed to retrieve new image data"
            );
        }

        parse::parse_discovery(&response.body).map_err(|e| {
            tracing::error!(
                market = country,
                body = %String::from_utf8_lossy(&response.body),
                "failed to parse discovery response: {}",
                e
            );
            FetchError::from(e)
        })
    }

    fn random_request_url(&self, country: &str) -> String {
        let mut rng = rand::rng();
        // An empty catalog is rejected by config validation; "" keeps this total.
        let pid = match self.product_ids.len() {
            0 => "",
            n => self.product_ids[rng.random_range(0..n)].as_str(),
        };
        let lo: u32 = rng.random_range(100_000..1_000_000);
        discovery_url(&self.base_url, pid, country, lo)
    }
}

/// Builds `<base>?pid=<pid>&ctry=<country>&lc=en&fmt=json&lo=<lo>`.
pub fn discovery_url(base: &str, pid: &str, country: &str, lo: u32) -> String {
    format!(
        "{}?pid={}&ctry={}&lc=en&fmt=json&lo={}",
        base, pid, country, lo
    )
}

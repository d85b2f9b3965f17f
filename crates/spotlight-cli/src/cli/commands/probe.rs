//! `spotlight probe` – one discovery request, printed, nothing stored.

use anyhow::Result;
use spotlight_core::config::SpotlightConfig;
use spotlight_core::http::HttpClient;
use spotlight_core::metadata::MetadataFetcher;

pub fn run_probe(cfg: &SpotlightConfig, country: &str) -> Result<()> {
    let fetcher = MetadataFetcher::new(HttpClient::new(cfg), cfg);
    let descriptor = fetcher.fetch(country)?;
    println!("id:    {}", descriptor.id());
    println!("title: {}", descriptor.title());
    println!("url:   {}", descriptor.url());
    Ok(())
}

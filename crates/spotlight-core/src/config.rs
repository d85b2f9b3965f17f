use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default discovery endpoint (delivery cache).
pub const DEFAULT_DISCOVERY_URL: &str = "https://arc.msn.com/v3/Delivery/Cache";

/// Desktop browser UA; the delivery cache serves the same payload to it as to the OS client.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/75.0.3770.100 Safari/537.36";

/// Global configuration loaded from `~/.config/spotlight/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotlightConfig {
    /// Directory images are written to (and scanned at startup).
    pub output_dir: PathBuf,
    /// Worker threads in the pool; also the number of initial fetch tasks.
    pub workers: usize,
    /// Market/country codes each fetch task iterates, in order.
    pub markets: Vec<String>,
    /// Product ids; one is picked at random for every discovery request.
    pub product_ids: Vec<String>,
    /// Base URL of the discovery endpoint (query string is appended).
    pub discovery_url: String,
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    /// If true, a non-2xx status fails the request instead of being logged and parsed anyway.
    #[serde(default)]
    pub strict_status: bool,
}

impl Default for SpotlightConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("images"),
            workers: 4,
            markets: vec!["en".into(), "de".into(), "us".into()],
            product_ids: vec!["209567".into(), "279978".into(), "209562".into()],
            discovery_url: DEFAULT_DISCOVERY_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_secs: 15,
            timeout_secs: 120,
            strict_status: false,
        }
    }
}

impl SpotlightConfig {
    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            bail!("workers must be at least 1");
        }
        if self.markets.is_empty() {
            bail!("markets must not be empty");
        }
        if self.product_ids.is_empty() {
            bail!("product_ids must not be empty");
        }
        if self.discovery_url.trim().is_empty() {
            bail!("discovery_url must not be empty");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("spotlight")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SpotlightConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SpotlightConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SpotlightConfig = toml::from_str(&data)?;
    cfg.validate()?;
    Ok(cfg)
}

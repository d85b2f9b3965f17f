//! `spotlight status` – scan the output directory.

use anyhow::{Context, Result};
use spotlight_core::config::SpotlightConfig;
use spotlight_core::store::DedupStore;

pub fn run_status(cfg: &SpotlightConfig) -> Result<()> {
    let Some(store) = DedupStore::open_existing(&cfg.output_dir)
        .with_context(|| format!("scan {}", cfg.output_dir.display()))?
    else {
        println!("No images in {} (directory does not exist).", cfg.output_dir.display());
        return Ok(());
    };
    if store.is_empty() {
        println!("No images in {}.", store.dir().display());
        return Ok(());
    }
    println!("{} distinct image(s) in {}", store.len(), store.dir().display());
    for entry in store.entries() {
        println!("{}  {}", &entry.digest[..12], entry.path.display());
    }
    Ok(())
}

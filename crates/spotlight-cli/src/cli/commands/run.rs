//! `spotlight run` – fetch images with the self-growing worker pool.

use anyhow::{Context, Result};
use spotlight_core::config::SpotlightConfig;
use spotlight_core::pool::WorkerPool;
use spotlight_core::store::DedupStore;
use spotlight_core::task::{FetchContext, FetchTask};
use std::sync::Arc;
use std::time::Instant;

pub fn run_fetch(cfg: &SpotlightConfig) -> Result<()> {
    let store = Arc::new(
        DedupStore::open(&cfg.output_dir)
            .with_context(|| format!("open image store at {}", cfg.output_dir.display()))?,
    );
    let known_before = store.len();
    tracing::info!(
        dir = %store.dir().display(),
        known = known_before,
        workers = cfg.workers,
        "starting fetch run"
    );

    let started = Instant::now();
    let ctx = Arc::new(FetchContext::new(cfg, Arc::clone(&store)));
    let pool = WorkerPool::start(cfg.workers, FetchTask::new(ctx)).context("start worker pool")?;
    for _ in 0..cfg.workers {
        pool.submit_one();
    }
    pool.wait_idle();
    let tasks = pool.submitted();
    pool.shutdown();

    let added = store.len().saturating_sub(known_before);
    tracing::info!(added, tasks, "fetch run finished");
    println!(
        "{} new image(s) in {} ({} known, {} task(s), {:.1}s)",
        added,
        store.dir().display(),
        store.len(),
        tasks,
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

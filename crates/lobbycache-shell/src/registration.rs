//! Worker registration.
//!
//! The page registers the controller at a fixed script path, drives it
//! through install and activation, and keeps the running event host for the
//! rest of the session. Observing an update only logs a reload hint;
//! offering an actual reload is the page's responsibility.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use url::Url;

use lobbycache_core::cache::BucketStore;
use lobbycache_core::fetch::{Fetcher, HttpFetcher};
use lobbycache_core::host::WorkerHost;
use lobbycache_core::push::{LogNotifier, NotificationSink};
use lobbycache_core::sync::SyncQueue;
use lobbycache_core::worker::CacheController;

/// Fixed path the controller script is registered at.
pub const WORKER_SCRIPT_PATH: &str = "/sw.js";

/// File name of the persisted sync queue inside the cache directory.
const SYNC_QUEUE_FILE: &str = "sync-queue.json";

/// Subdirectory of the cache directory holding bucket files.
const BUCKET_DIR: &str = "buckets";

/// A registered worker: the controller plus its running event host.
pub struct Registration {
    controller: Arc<CacheController>,
    host: WorkerHost,
}

impl Registration {
    /// Register the controller at [`WORKER_SCRIPT_PATH`] under `scope` and
    /// drive it through install and activation.
    pub async fn register(scope: Url, cache_dir: PathBuf) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher> =
            Arc::new(HttpFetcher::new(scope.clone()).context("Failed to build HTTP fetcher")?);
        let notifier: Arc<dyn NotificationSink> = Arc::new(LogNotifier);
        Self::register_with(scope, cache_dir, fetcher, notifier).await
    }

    /// Registration seam taking the network and notification sink, used by
    /// tests to substitute both.
    pub async fn register_with(
        scope: Url,
        cache_dir: PathBuf,
        fetcher: Arc<dyn Fetcher>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Result<Self> {
        let store =
            BucketStore::new(cache_dir.join(BUCKET_DIR)).context("Failed to open bucket store")?;
        let sync_queue = SyncQueue::new(cache_dir.join(SYNC_QUEUE_FILE));

        let controller = Arc::new(CacheController::new(
            scope.clone(),
            store,
            sync_queue,
            fetcher,
            notifier,
        ));
        info!(script = WORKER_SCRIPT_PATH, scope = %scope, "Worker registered");

        controller.install().await;
        controller.activate().await;

        let host = WorkerHost::spawn(Arc::clone(&controller));
        Ok(Self { controller, host })
    }

    pub fn controller(&self) -> &Arc<CacheController> {
        &self.controller
    }

    pub fn host(&self) -> &WorkerHost {
        &self.host
    }

    /// An updated worker was found. Adopting it requires a reload, which is
    /// the page's call to make.
    pub fn on_update_found(&self) {
        info!("New version available. Reload to update.");
    }

    /// Stop the event host and wait for in-flight work to finish.
    pub async fn shutdown(self) {
        self.host.shutdown().await;
    }
}

// ============================================================================
// Tests
// ============================================================================

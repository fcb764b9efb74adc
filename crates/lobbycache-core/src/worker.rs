//! The offline cache controller.
//!
//! Owns the versioned cache bucket and implements the worker lifecycle:
//! install (per-asset tolerant precache), activate (stale-bucket purge and
//! client claim), fetch interception, push notifications, and sync replay.
//!
//! Every external I/O on these paths degrades to a defined fallback; no
//! handler returns an error to the event host.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::BucketStore;
use crate::clients::Clients;
use crate::fetch::Fetcher;
use crate::models::{PrecacheManifest, Request, Response};
use crate::push::{Notification, NotificationSink, PushPayload};
use crate::strategy::{self, Routing, Strategy};
use crate::sync::{SyncQueue, SYNC_TAG};

/// Current cache bucket. Bumping the version is the only cache-invalidation
/// mechanism: activation purges every other bucket name.
pub const CACHE_NAME: &str = "bihunters-v1";

/// Worker lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerState::Parsed => write!(f, "parsed"),
            WorkerState::Installing => write!(f, "installing"),
            WorkerState::Installed => write!(f, "installed"),
            WorkerState::Activating => write!(f, "activating"),
            WorkerState::Activated => write!(f, "activated"),
            WorkerState::Redundant => write!(f, "redundant"),
        }
    }
}

/// The offline cache controller for one worker scope.
pub struct CacheController {
    scope: Url,
    store: BucketStore,
    sync_queue: SyncQueue,
    fetcher: Arc<dyn Fetcher>,
    notifier: Arc<dyn NotificationSink>,
    clients: Arc<Clients>,
    manifest: PrecacheManifest,
    state: RwLock<WorkerState>,
    skip_waiting: AtomicBool,
}

impl CacheController {
    pub fn new(
        scope: Url,
        store: BucketStore,
        sync_queue: SyncQueue,
        fetcher: Arc<dyn Fetcher>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            scope,
            store,
            sync_queue,
            fetcher,
            notifier,
            clients: Arc::new(Clients::new()),
            manifest: PrecacheManifest::default(),
            state: RwLock::new(WorkerState::Parsed),
            skip_waiting: AtomicBool::new(false),
        }
    }

    /// Replace the default precache manifest.
    pub fn with_manifest(mut self, manifest: PrecacheManifest) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn scope(&self) -> &Url {
        &self.scope
    }

    pub fn store(&self) -> &BucketStore {
        &self.store
    }

    pub fn sync_queue(&self) -> &SyncQueue {
        &self.sync_queue
    }

    pub fn clients(&self) -> Arc<Clients> {
        Arc::clone(&self.clients)
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    async fn set_state(&self, state: WorkerState) {
        *self.state.write().await = state;
        debug!(state = %state, "Worker state changed");
    }

    /// Whether the worker asked to take control without waiting for open
    /// pages to close.
    pub fn skips_waiting(&self) -> bool {
        self.skip_waiting.load(Ordering::Relaxed)
    }

    /// Request immediate takeover once installed.
    pub fn skip_waiting(&self) {
        self.skip_waiting.store(true, Ordering::Relaxed);
    }

    /// Install: open the current bucket and precache the manifest.
    ///
    /// A failure to cache any individual asset is logged and skipped; the
    /// install itself never aborts.
    pub async fn install(&self) {
        self.set_state(WorkerState::Installing).await;

        match self.store.open(CACHE_NAME) {
            Ok(bucket) => {
                for asset in &self.manifest.assets {
                    let url = match self.scope.join(asset) {
                        Ok(url) => url,
                        Err(e) => {
                            warn!(asset = %asset, error = %e, "Skipping unparseable asset");
                            continue;
                        }
                    };
                    let request = Request::get(url);
                    match self.fetcher.fetch(&request).await {
                        Ok(response) if response.is_ok() => {
                            match bucket.put(request.cache_key(), &response) {
                                Ok(()) => info!(asset = %asset, "Cached"),
                                Err(e) => warn!(asset = %asset, error = %e, "Failed to cache"),
                            }
                        }
                        Ok(response) => {
                            warn!(asset = %asset, status = response.status, "Failed to cache")
                        }
                        Err(e) => warn!(asset = %asset, error = %e, "Failed to cache"),
                    }
                }

                for font in &self.manifest.fonts {
                    let url = match Url::parse(font) {
                        Ok(url) => url,
                        Err(e) => {
                            warn!(font = %font, error = %e, "Skipping unparseable font URL");
                            continue;
                        }
                    };
                    let request = Request::no_cors(url);
                    match self.fetcher.fetch(&request).await {
                        Ok(response) => match bucket.put(request.cache_key(), &response) {
                            Ok(()) => info!(font = %font, "Cached font"),
                            Err(e) => warn!(font = %font, error = %e, "Font unavailable offline"),
                        },
                        Err(e) => warn!(font = %font, error = %e, "Font unavailable offline"),
                    }
                }
            }
            Err(e) => warn!(bucket = CACHE_NAME, error = %e, "Failed to open cache bucket"),
        }

        self.skip_waiting();
        self.set_state(WorkerState::Installed).await;
    }

    /// Activate: purge every bucket whose name is not the current version,
    /// then claim all open clients.
    pub async fn activate(&self) {
        self.set_state(WorkerState::Activating).await;

        match self.store.names() {
            Ok(names) => {
                for name in names.iter().filter(|name| name.as_str() != CACHE_NAME) {
                    match self.store.delete(name) {
                        Ok(_) => info!(bucket = %name, "Purged stale cache bucket"),
                        Err(e) => warn!(bucket = %name, error = %e, "Failed to purge stale bucket"),
                    }
                }
            }
            Err(e) => warn!(error = %e, "Failed to enumerate cache buckets"),
        }

        let claimed = self.clients.claim().await;
        debug!(claimed, "Claimed open clients");

        self.set_state(WorkerState::Activated).await;
    }

    /// Intercept a request. `None` means the platform should handle it
    /// natively.
    pub async fn handle_fetch(&self, request: &Request) -> Option<Response> {
        let strategy = match strategy::classify(request, &self.scope) {
            Routing::Passthrough => return None,
            Routing::Handle(strategy) => strategy,
        };

        let bucket = self.store.bucket(CACHE_NAME);
        let response = match strategy {
            Strategy::CacheFirst => {
                strategy::cache_first(&bucket, self.fetcher.as_ref(), request).await
            }
            Strategy::NetworkFirst => {
                strategy::network_first(&bucket, self.fetcher.as_ref(), request).await
            }
        };
        Some(response)
    }

    /// Display a notification for a push message. Malformed payloads
    /// degrade to the defaults.
    pub async fn handle_push(&self, payload: Option<&[u8]>) -> Notification {
        let notification = Notification::from_payload(PushPayload::parse(payload));
        self.notifier.show(notification.clone());
        notification
    }

    /// A notification was clicked: open or focus a window at its target.
    pub async fn handle_notification_click(&self, notification: &Notification) {
        let target = match self.scope.join(&notification.url) {
            Ok(url) => url,
            Err(e) => {
                warn!(url = %notification.url, error = %e, "Invalid notification target, opening root");
                match self.scope.join("/") {
                    Ok(url) => url,
                    Err(_) => self.scope.clone(),
                }
            }
        };
        self.clients.open_or_focus(target).await;
    }

    /// Replay queued operations for a recognized sync tag.
    pub async fn handle_sync(&self, tag: &str) {
        if tag != SYNC_TAG {
            debug!(tag, "Ignoring unknown sync tag");
            return;
        }
        match self.sync_queue.replay(tag, self.fetcher.as_ref()).await {
            Ok(report) => info!(
                delivered = report.delivered,
                retained = report.retained,
                dropped = report.dropped,
                "Background sync replay finished"
            ),
            Err(e) => warn!(tag, error = %e, "Background sync replay failed"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::ScriptedFetcher;
    use crate::models::Method;
    use crate::push::testing::RecordingNotifier;
    use crate::push::APP_NAME;
    use tempfile::TempDir;

    fn scope() -> Url {
        Url::parse("https://play.bihunters.io").unwrap()
    }

    struct Harness {
        controller: CacheController,
        fetcher: Arc<ScriptedFetcher>,
        notifier: Arc<RecordingNotifier>,
        _dir: TempDir,
    }

    fn harness(manifest: PrecacheManifest) -> Harness {
        let dir = TempDir::new().unwrap();
        let store = BucketStore::new(dir.path().join("buckets")).unwrap();
        let sync_queue = SyncQueue::new(dir.path().join("sync-queue.json"));
        let fetcher = Arc::new(ScriptedFetcher::new());
        let notifier = Arc::new(RecordingNotifier::default());

        let controller = CacheController::new(
            scope(),
            store,
            sync_queue,
            Arc::clone(&fetcher) as Arc<dyn Fetcher>,
            Arc::clone(&notifier) as Arc<dyn NotificationSink>,
        )
        .with_manifest(manifest);

        Harness {
            controller,
            fetcher,
            notifier,
            _dir: dir,
        }
    }

    fn manifest(assets: &[&str], fonts: &[&str]) -> PrecacheManifest {
        PrecacheManifest {
            assets: assets.iter().map(|s| s.to_string()).collect(),
            fonts: fonts.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_install_caches_reachable_assets_despite_failures() {
        let h = harness(manifest(&["/", "/css/styles.css", "/missing.css"], &[]));
        h.fetcher.respond(
            "https://play.bihunters.io/",
            Response::new(200, b"<html>".to_vec()),
        );
        h.fetcher.respond(
            "https://play.bihunters.io/css/styles.css",
            Response::new(200, b"body{}".to_vec()),
        );

        h.controller.install().await;

        let bucket = h.controller.store().bucket(CACHE_NAME);
        assert!(bucket.contains("https://play.bihunters.io/").unwrap());
        assert!(bucket
            .contains("https://play.bihunters.io/css/styles.css")
            .unwrap());
        assert!(!bucket
            .contains("https://play.bihunters.io/missing.css")
            .unwrap());

        assert!(h.controller.skips_waiting());
        assert_eq!(h.controller.state().await, WorkerState::Installed);
    }

    #[tokio::test]
    async fn test_install_stores_opaque_font_responses() {
        let font = "https://fonts.googleapis.com/css2?family=Rajdhani";
        let h = harness(manifest(&[], &[font]));
        h.fetcher.respond(font, Response::opaque(b"woff".to_vec()));

        h.controller.install().await;

        let stored = h
            .controller
            .store()
            .bucket(CACHE_NAME)
            .match_request(font)
            .unwrap()
            .unwrap();
        assert_eq!(stored.kind, crate::models::ResponseKind::Opaque);
    }

    #[tokio::test]
    async fn test_activate_purges_every_stale_bucket() {
        let h = harness(PrecacheManifest::empty());
        h.controller.store().open("bihunters-v0").unwrap();
        h.controller.store().open("some-other-cache").unwrap();
        h.controller.store().open(CACHE_NAME).unwrap();

        h.controller.activate().await;

        assert_eq!(
            h.controller.store().names().unwrap(),
            vec![CACHE_NAME.to_string()]
        );
        assert_eq!(h.controller.state().await, WorkerState::Activated);
    }

    #[tokio::test]
    async fn test_fetch_passthrough_never_touches_strategies() {
        let h = harness(PrecacheManifest::empty());

        let post = Request::new(
            Method::Post,
            Url::parse("https://play.bihunters.io/api/join").unwrap(),
        );
        assert!(h.controller.handle_fetch(&post).await.is_none());

        let extension = Request::get(Url::parse("chrome-extension://abcdef/page.html").unwrap());
        assert!(h.controller.handle_fetch(&extension).await.is_none());

        assert!(h.fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_same_origin_cache_hit_skips_network() {
        let h = harness(PrecacheManifest::empty());
        let request = Request::get(Url::parse("https://play.bihunters.io/index.html").unwrap());

        let bucket = h.controller.store().open(CACHE_NAME).unwrap();
        bucket
            .put(request.cache_key(), &Response::new(200, b"shell".to_vec()))
            .unwrap();

        let response = h.controller.handle_fetch(&request).await.unwrap();
        assert_eq!(response.body, b"shell");
        assert!(h.fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_same_origin_offline_serves_offline_page() {
        let h = harness(PrecacheManifest::empty());
        let request = Request::get(Url::parse("https://play.bihunters.io/lobbies").unwrap());

        let response = h.controller.handle_fetch(&request).await.unwrap();
        assert_eq!(response.content_type(), Some("text/html"));
        assert!(response.text().contains("YOU ARE OFFLINE"));
    }

    #[tokio::test]
    async fn test_fetch_third_party_offline_serves_offline_json() {
        let h = harness(PrecacheManifest::empty());
        let request = Request::get(Url::parse("https://newsapi.org/v2/top-headlines").unwrap());

        let response = h.controller.handle_fetch(&request).await.unwrap();
        assert_eq!(response.text(), r#"{"error":"offline"}"#);
        assert_eq!(response.content_type(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_push_with_payload_shows_notification() {
        let h = harness(PrecacheManifest::empty());

        h.controller
            .handle_push(Some(br#"{"title":"T","body":"B","url":"/x"}"#.as_slice()))
            .await;

        let shown = h.notifier.shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "T");
        assert_eq!(shown[0].body, "B");
        assert_eq!(shown[0].url, "/x");
    }

    #[tokio::test]
    async fn test_push_without_payload_uses_defaults() {
        let h = harness(PrecacheManifest::empty());

        h.controller.handle_push(None).await;

        let shown = h.notifier.shown();
        assert_eq!(shown[0].title, APP_NAME);
        assert_eq!(shown[0].url, "/");
    }

    #[tokio::test]
    async fn test_notification_click_opens_window_at_target() {
        let h = harness(PrecacheManifest::empty());
        let notification = h
            .controller
            .handle_push(Some(br#"{"url":"/party/42"}"#.as_slice()))
            .await;

        h.controller.handle_notification_click(&notification).await;

        let windows = h.controller.clients().windows().await;
        assert_eq!(windows.len(), 1);
        assert_eq!(
            windows[0].url.as_str(),
            "https://play.bihunters.io/party/42"
        );
        assert!(windows[0].focused);
    }

    #[tokio::test]
    async fn test_sync_replays_only_known_tag() {
        let h = harness(PrecacheManifest::empty());
        let join_url = Url::parse("https://play.bihunters.io/api/party/join").unwrap();
        h.controller
            .sync_queue()
            .enqueue(crate::sync::PendingOperation::new(
                SYNC_TAG,
                Method::Post,
                &join_url,
                Vec::new(),
            ))
            .unwrap();

        // Unknown tag: the queue is untouched.
        h.controller.handle_sync("sync-unknown").await;
        assert_eq!(h.controller.sync_queue().len().unwrap(), 1);

        h.fetcher
            .respond(join_url.as_str(), Response::new(200, Vec::new()));
        h.controller.handle_sync(SYNC_TAG).await;
        assert!(h.controller.sync_queue().is_empty().unwrap());
    }
}

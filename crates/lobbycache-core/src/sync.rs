//! Persisted background-sync queue.
//!
//! Operations queued while offline (lobby joins, mostly) are replayed when a
//! sync event for their tag arrives. Successes are removed; failures stay
//! queued with an incremented attempt count until the cap is reached.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::fetch::{FetchError, Fetcher};
use crate::models::{Method, Request};

/// Sync tag registered for queued lobby joins.
pub const SYNC_TAG: &str = "sync-party-join";

/// Operations are dropped after this many failed replays.
const MAX_ATTEMPTS: u32 = 5;

/// An operation waiting for connectivity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingOperation {
    pub tag: String,
    pub method: Method,
    pub url: String,
    #[serde(with = "crate::models::encoding::base64_bytes", default)]
    pub body: Vec<u8>,
    pub queued_at: DateTime<Utc>,
    #[serde(default)]
    pub attempts: u32,
}

impl PendingOperation {
    pub fn new(tag: &str, method: Method, url: &Url, body: Vec<u8>) -> Self {
        Self {
            tag: tag.to_string(),
            method,
            url: url.to_string(),
            body,
            queued_at: Utc::now(),
            attempts: 0,
        }
    }

    fn request(&self) -> Result<Request, FetchError> {
        let url = Url::parse(&self.url).map_err(|_| FetchError::InvalidUrl(self.url.clone()))?;
        Ok(Request::new(self.method, url).with_body(self.body.clone()))
    }
}

/// Outcome of one replay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub delivered: usize,
    pub retained: usize,
    pub dropped: usize,
}

/// FIFO of pending operations, persisted as a JSON file beside the bucket
/// store.
pub struct SyncQueue {
    path: PathBuf,
}

impl SyncQueue {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append an operation and persist the queue.
    pub fn enqueue(&self, operation: PendingOperation) -> Result<()> {
        let mut operations = self.load()?;
        operations.push(operation);
        self.save(&operations)
    }

    /// Pending operations for a tag, oldest first.
    pub fn pending(&self, tag: &str) -> Result<Vec<PendingOperation>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|operation| operation.tag == tag)
            .collect())
    }

    /// Replay every pending operation for `tag`, oldest first. Operations
    /// for other tags are left untouched.
    pub async fn replay(&self, tag: &str, fetcher: &dyn Fetcher) -> Result<ReplayReport> {
        let operations = self.load()?;
        let mut report = ReplayReport::default();
        let mut remaining = Vec::with_capacity(operations.len());

        for mut operation in operations {
            if operation.tag != tag {
                remaining.push(operation);
                continue;
            }

            let request = match operation.request() {
                Ok(request) => request,
                Err(e) => {
                    warn!(url = %operation.url, error = %e, "Dropping unreplayable operation");
                    report.dropped += 1;
                    continue;
                }
            };

            let delivered = match fetcher.fetch(&request).await {
                Ok(response) if response.is_ok() => true,
                Ok(response) => {
                    debug!(url = %operation.url, status = response.status, "Sync replay rejected");
                    false
                }
                Err(e) => {
                    debug!(url = %operation.url, error = %e, "Sync replay failed");
                    false
                }
            };

            if delivered {
                report.delivered += 1;
            } else {
                operation.attempts += 1;
                if operation.attempts >= MAX_ATTEMPTS {
                    warn!(
                        url = %operation.url,
                        attempts = operation.attempts,
                        "Dropping operation after repeated failures"
                    );
                    report.dropped += 1;
                } else {
                    report.retained += 1;
                    remaining.push(operation);
                }
            }
        }

        self.save(&remaining)?;
        Ok(report)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.load()?.is_empty())
    }

    fn load(&self) -> Result<Vec<PendingOperation>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path).context("Failed to read sync queue")?;
        serde_json::from_str(&contents).context("Failed to parse sync queue")
    }

    fn save(&self, operations: &[PendingOperation]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&operations)?;
        std::fs::write(&self.path, contents).context("Failed to write sync queue")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::ScriptedFetcher;
    use crate::models::Response;
    use tempfile::TempDir;

    fn queue() -> (TempDir, SyncQueue) {
        let dir = TempDir::new().unwrap();
        let queue = SyncQueue::new(dir.path().join("sync-queue.json"));
        (dir, queue)
    }

    fn join_operation(path: &str) -> PendingOperation {
        let url = Url::parse("https://play.bihunters.io")
            .unwrap()
            .join(path)
            .unwrap();
        PendingOperation::new(SYNC_TAG, Method::Post, &url, br#"{"party":42}"#.to_vec())
    }

    #[test]
    fn test_enqueue_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sync-queue.json");

        SyncQueue::new(path.clone())
            .enqueue(join_operation("/api/party/join"))
            .unwrap();

        let reopened = SyncQueue::new(path);
        let pending = reopened.pending(SYNC_TAG).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].url, "https://play.bihunters.io/api/party/join");
        assert_eq!(pending[0].body, br#"{"party":42}"#);
    }

    #[tokio::test]
    async fn test_replay_removes_delivered_operations() {
        let (_dir, queue) = queue();
        queue.enqueue(join_operation("/api/party/join")).unwrap();

        let fetcher = ScriptedFetcher::new();
        fetcher.respond(
            "https://play.bihunters.io/api/party/join",
            Response::new(200, Vec::new()),
        );

        let report = queue.replay(SYNC_TAG, &fetcher).await.unwrap();
        assert_eq!(report.delivered, 1);
        assert_eq!(report.retained, 0);
        assert!(queue.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_replay_retains_failed_operations_with_attempt_count() {
        let (_dir, queue) = queue();
        queue.enqueue(join_operation("/api/party/join")).unwrap();

        let fetcher = ScriptedFetcher::new();
        let report = queue.replay(SYNC_TAG, &fetcher).await.unwrap();

        assert_eq!(report.delivered, 0);
        assert_eq!(report.retained, 1);
        let pending = queue.pending(SYNC_TAG).unwrap();
        assert_eq!(pending[0].attempts, 1);
    }

    #[tokio::test]
    async fn test_replay_drops_operations_at_attempt_cap() {
        let (_dir, queue) = queue();
        queue.enqueue(join_operation("/api/party/join")).unwrap();

        let fetcher = ScriptedFetcher::new();
        for _ in 0..4 {
            let report = queue.replay(SYNC_TAG, &fetcher).await.unwrap();
            assert_eq!(report.retained, 1);
        }

        let report = queue.replay(SYNC_TAG, &fetcher).await.unwrap();
        assert_eq!(report.dropped, 1);
        assert!(queue.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_replay_leaves_other_tags_untouched() {
        let (_dir, queue) = queue();
        queue.enqueue(join_operation("/api/party/join")).unwrap();

        let other = PendingOperation::new(
            "sync-other",
            Method::Post,
            &Url::parse("https://play.bihunters.io/api/other").unwrap(),
            Vec::new(),
        );
        queue.enqueue(other).unwrap();

        let fetcher = ScriptedFetcher::new();
        fetcher.respond(
            "https://play.bihunters.io/api/party/join",
            Response::new(200, Vec::new()),
        );

        let report = queue.replay(SYNC_TAG, &fetcher).await.unwrap();
        assert_eq!(report.delivered, 1);
        assert_eq!(queue.pending("sync-other").unwrap().len(), 1);
    }
}

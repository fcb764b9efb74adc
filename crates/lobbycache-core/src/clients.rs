//! Window clients controlled by the worker.
//!
//! Open pages register here; activation claims them all so they are served
//! without a reload, and notification clicks open or focus a window.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

/// Identifier for a window client.
pub type ClientId = u64;

/// A page the worker can control.
#[derive(Debug, Clone)]
pub struct WindowClient {
    pub id: ClientId,
    pub url: Url,
    pub focused: bool,
    pub controlled: bool,
}

/// Registry of open window clients.
#[derive(Debug)]
pub struct Clients {
    windows: RwLock<HashMap<ClientId, WindowClient>>,
    next_id: AtomicU64,
}

impl Clients {
    pub fn new() -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn allocate_id(&self) -> ClientId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a page that opened under the worker scope. New pages start
    /// uncontrolled until the worker claims them.
    pub async fn add_window(&self, url: Url) -> ClientId {
        let id = self.allocate_id();
        self.windows.write().await.insert(
            id,
            WindowClient {
                id,
                url,
                focused: false,
                controlled: false,
            },
        );
        id
    }

    /// Take control of every open page without a reload. Returns how many
    /// clients are now controlled.
    pub async fn claim(&self) -> usize {
        let mut windows = self.windows.write().await;
        for client in windows.values_mut() {
            client.controlled = true;
        }
        windows.len()
    }

    /// Focus an existing window showing `url`, or open a new one.
    pub async fn open_or_focus(&self, url: Url) -> ClientId {
        let mut windows = self.windows.write().await;
        if let Some(existing) = windows.values_mut().find(|client| client.url == url) {
            existing.focused = true;
            debug!(client = existing.id, url = %url, "Focused existing window");
            return existing.id;
        }

        let id = self.allocate_id();
        debug!(client = id, url = %url, "Opened window");
        windows.insert(
            id,
            WindowClient {
                id,
                url,
                focused: true,
                controlled: true,
            },
        );
        id
    }

    pub async fn focus(&self, id: ClientId) -> bool {
        let mut windows = self.windows.write().await;
        match windows.get_mut(&id) {
            Some(client) => {
                client.focused = true;
                true
            }
            None => false,
        }
    }

    pub async fn get(&self, id: ClientId) -> Option<WindowClient> {
        self.windows.read().await.get(&id).cloned()
    }

    /// All open windows, in id order.
    pub async fn windows(&self) -> Vec<WindowClient> {
        let mut windows: Vec<WindowClient> =
            self.windows.read().await.values().cloned().collect();
        windows.sort_by_key(|client| client.id);
        windows
    }

    pub async fn controlled_count(&self) -> usize {
        self.windows
            .read()
            .await
            .values()
            .filter(|client| client.controlled)
            .count()
    }
}

impl Default for Clients {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

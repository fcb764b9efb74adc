//! Background execution context for the worker.
//!
//! Events arrive on an mpsc channel and each one is handled by its own task
//! in a `JoinSet`, so handling extends until the asynchronous work finishes
//! and a slow fetch never blocks a push. Dropping the sender shuts the
//! context down after in-flight work drains.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

use crate::models::{Request, Response};
use crate::push::Notification;
use crate::worker::CacheController;

/// Buffer size for the worker event channel.
const EVENT_CHANNEL_SIZE: usize = 32;

/// Events delivered to the worker context.
#[derive(Debug)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch {
        request: Request,
        reply: oneshot::Sender<Option<Response>>,
    },
    Push {
        payload: Option<Vec<u8>>,
    },
    NotificationClick {
        notification: Notification,
    },
    Sync {
        tag: String,
    },
}

/// Handle to a running worker context.
pub struct WorkerHost {
    tx: mpsc::Sender<WorkerEvent>,
    handle: JoinHandle<()>,
}

impl WorkerHost {
    /// Spawn the event loop for `controller`.
    pub fn spawn(controller: Arc<CacheController>) -> Self {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let handle = tokio::spawn(run(controller, rx));
        Self { tx, handle }
    }

    /// Sender for delivering events from other tasks.
    pub fn sender(&self) -> mpsc::Sender<WorkerEvent> {
        self.tx.clone()
    }

    /// Deliver an event. Returns false if the context has shut down.
    pub async fn deliver(&self, event: WorkerEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }

    /// Intercept a request through the worker. `None` means passthrough or
    /// a terminated context.
    pub async fn fetch(&self, request: Request) -> Option<Response> {
        let (reply, rx) = oneshot::channel();
        if !self.deliver(WorkerEvent::Fetch { request, reply }).await {
            return None;
        }
        rx.await.unwrap_or(None)
    }

    /// Stop accepting events and wait for in-flight handling to finish.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Worker context terminated abnormally");
        }
    }
}

async fn run(controller: Arc<CacheController>, mut rx: mpsc::Receiver<WorkerEvent>) {
    let mut tasks = JoinSet::new();

    while let Some(event) = rx.recv().await {
        match event {
            // The platform serializes lifecycle events; everything else may
            // overlap.
            WorkerEvent::Install => controller.install().await,
            WorkerEvent::Activate => controller.activate().await,
            event => {
                let controller = Arc::clone(&controller);
                tasks.spawn(dispatch(controller, event));

                // Reap whatever already finished so the set does not grow
                // unbounded.
                while let Some(result) = tasks.try_join_next() {
                    if let Err(e) = result {
                        warn!(error = %e, "Worker task failed");
                    }
                }
            }
        }
    }

    // Channel closed: extend the context until outstanding work completes.
    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            warn!(error = %e, "Worker task failed");
        }
    }
    debug!("Worker context drained");
}

async fn dispatch(controller: Arc<CacheController>, event: WorkerEvent) {
    match event {
        WorkerEvent::Install => controller.install().await,
        WorkerEvent::Activate => controller.activate().await,
        WorkerEvent::Fetch { request, reply } => {
            let response = controller.handle_fetch(&request).await;
            if reply.send(response).is_err() {
                debug!(url = %request.url, "Fetch caller went away before reply");
            }
        }
        WorkerEvent::Push { payload } => {
            controller.handle_push(payload.as_deref()).await;
        }
        WorkerEvent::NotificationClick { notification } => {
            controller.handle_notification_click(&notification).await
        }
        WorkerEvent::Sync { tag } => controller.handle_sync(&tag).await,
    }
}

// ============================================================================
// Tests
// ============================================================================

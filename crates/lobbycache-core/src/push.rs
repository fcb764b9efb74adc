//! Push payloads and notification display.
//!
//! A push message carries an optional JSON payload with `title`, `body`,
//! and `url` fields. Anything absent or malformed degrades to the defaults;
//! push handling never fails.

use serde::Deserialize;
use tracing::info;

/// Default notification title.
pub const APP_NAME: &str = "BiHunters";

/// Body used when a push carries no message.
const DEFAULT_BODY: &str = "A new party is waiting for you.";

/// Icon and badge shown on notifications.
const NOTIFICATION_ICON: &str = "/icon-192.png";

/// Vibration pattern for incoming notifications, in milliseconds.
const VIBRATION_PATTERN: [u32; 3] = [100, 50, 100];

/// Optional fields of a push message payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub url: Option<String>,
}

impl PushPayload {
    /// Parse a raw payload, defaulting on absent or malformed data.
    pub fn parse(raw: Option<&[u8]>) -> Self {
        raw.and_then(|bytes| serde_json::from_slice(bytes).ok())
            .unwrap_or_default()
    }
}

/// A notification ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    /// Target opened when the notification is clicked.
    pub url: String,
}

impl Notification {
    pub fn from_payload(payload: PushPayload) -> Self {
        Self {
            title: payload.title.unwrap_or_else(|| APP_NAME.to_string()),
            body: payload.body.unwrap_or_else(|| DEFAULT_BODY.to_string()),
            icon: NOTIFICATION_ICON.to_string(),
            badge: NOTIFICATION_ICON.to_string(),
            vibrate: VIBRATION_PATTERN.to_vec(),
            url: payload.url.unwrap_or_else(|| "/".to_string()),
        }
    }
}

/// Display seam for system notifications.
pub trait NotificationSink: Send + Sync {
    fn show(&self, notification: Notification);
}

/// Sink that reports notifications through tracing.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn show(&self, notification: Notification) {
        info!(title = %notification.title, url = %notification.url, "Notification displayed");
    }
}


// ============================================================================
// Tests
// ============================================================================

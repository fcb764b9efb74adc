use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Classification of a fetched response.
///
/// Opaque responses come back from cross-origin no-cors requests: their
/// status and headers cannot be inspected, only stored and replayed as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseKind {
    Basic,
    Opaque,
}

/// A response as moved through the interception path and stored in buckets.
///
/// Header names are kept lowercase so lookups match regardless of the
/// casing the origin server used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub kind: ResponseKind,
}

impl Response {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body,
            kind: ResponseKind::Basic,
        }
    }

    /// An opaque snapshot: status reads 0 and the payload is never inspected.
    pub fn opaque(body: Vec<u8>) -> Self {
        Self {
            status: 0,
            headers: HashMap::new(),
            body,
            kind: ResponseKind::Opaque,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn is_opaque(&self) -> bool {
        self.kind == ResponseKind::Opaque
    }

    /// Success in the `response.ok` sense; always false for opaque responses.
    pub fn is_ok(&self) -> bool {
        self.kind == ResponseKind::Basic && (200..300).contains(&self.status)
    }

    /// Whether the cache-first path may store this response. Opaque
    /// responses cannot be verified but are still worth replaying offline.
    pub fn is_cacheable(&self) -> bool {
        self.is_ok() || self.is_opaque()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body as text, for inspection and logging.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

//! Request classification and the two caching strategies.
//!
//! Classification is a pure function over method, scheme, and origin so it
//! can be tested without the event host. The strategies consult cache and
//! network in opposite orders and degrade to synthesized offline responses
//! instead of failing; no path here returns an error.

use tracing::{debug, warn};
use url::Url;

use crate::cache::Bucket;
use crate::fetch::Fetcher;
use crate::models::{Request, Response};

/// Requests from browser extensions are never intercepted.
const BLOCKED_SCHEME: &str = "chrome-extension";

/// Cross-origin hosts served cache-first alongside same-origin assets.
const FONT_HOSTS: [&str; 2] = ["fonts.googleapis.com", "fonts.gstatic.com"];

/// Fixed page served when a cache-first request cannot be satisfied at all.
const OFFLINE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>BiHunters — Offline</title></head>
<body style="margin:0;display:flex;align-items:center;justify-content:center;height:100vh;
             background:#060709;font-family:monospace;color:#c8a84b;text-align:center;">
  <div>
    <div style="font-size:3rem;margin-bottom:1rem;">◈</div>
    <h1 style="letter-spacing:.2em;margin:0">BIHUNTERS</h1>
    <p style="color:#4a5560;letter-spacing:.15em;margin-top:.5rem">YOU ARE OFFLINE</p>
    <p style="color:#4a5560;font-size:.75rem;margin-top:2rem">Reconnect to browse lobbies</p>
  </div>
</body>
</html>"#;

/// Fixed body served when a network-first request has no fallback.
const OFFLINE_JSON: &str = r#"{"error":"offline"}"#;

/// Which of cache and network is consulted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
}

/// Routing decision for an incoming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    Handle(Strategy),
    /// Let the platform handle the request natively.
    Passthrough,
}

/// Classify a request against the worker scope.
///
/// Non-GET requests and extension-scheme requests pass through; same-origin
/// requests and known font hosts are cache-first; every other origin is
/// network-first.
pub fn classify(request: &Request, scope: &Url) -> Routing {
    if !request.is_get() {
        return Routing::Passthrough;
    }
    if request.url.scheme() == BLOCKED_SCHEME {
        return Routing::Passthrough;
    }

    let same_origin = request.url.origin() == scope.origin();
    let font_host = request
        .url
        .host_str()
        .is_some_and(|host| FONT_HOSTS.contains(&host));

    if same_origin || font_host {
        Routing::Handle(Strategy::CacheFirst)
    } else {
        Routing::Handle(Strategy::NetworkFirst)
    }
}

/// Serve from the bucket, then the network, then the offline page.
///
/// Successful and opaque network responses are stored before being returned.
pub async fn cache_first(bucket: &Bucket, fetcher: &dyn Fetcher, request: &Request) -> Response {
    match bucket.match_request(request.cache_key()) {
        Ok(Some(stored)) => return stored.into_response(),
        Ok(None) => {}
        Err(e) => warn!(url = %request.url, error = %e, "Cache lookup failed"),
    }

    match fetcher.fetch(request).await {
        Ok(response) => {
            if response.is_cacheable() {
                if let Err(e) = bucket.put(request.cache_key(), &response) {
                    warn!(url = %request.url, error = %e, "Failed to cache response");
                }
            }
            response
        }
        Err(e) => {
            debug!(url = %request.url, error = %e, "Network unreachable, serving offline page");
            offline_page()
        }
    }
}

/// Prefer the network, falling back to any cached copy, then the offline
/// JSON body.
///
/// Only verifiably successful responses are stored; opaque and error
/// responses are returned without touching the bucket.
pub async fn network_first(bucket: &Bucket, fetcher: &dyn Fetcher, request: &Request) -> Response {
    match fetcher.fetch(request).await {
        Ok(response) => {
            if response.is_ok() {
                if let Err(e) = bucket.put(request.cache_key(), &response) {
                    warn!(url = %request.url, error = %e, "Failed to cache response");
                }
            }
            response
        }
        Err(e) => {
            debug!(url = %request.url, error = %e, "Network unreachable, trying cache");
            match bucket.match_request(request.cache_key()) {
                Ok(Some(stored)) => stored.into_response(),
                Ok(None) => offline_json(),
                Err(err) => {
                    warn!(url = %request.url, error = %err, "Cache lookup failed");
                    offline_json()
                }
            }
        }
    }
}

/// The synthesized offline HTML page.
pub fn offline_page() -> Response {
    Response::new(200, OFFLINE_PAGE.as_bytes().to_vec()).with_header("Content-Type", "text/html")
}

/// The synthesized offline JSON error body.
pub fn offline_json() -> Response {
    Response::new(200, OFFLINE_JSON.as_bytes().to_vec())
        .with_header("Content-Type", "application/json")
}

// ============================================================================
// Tests
// ============================================================================

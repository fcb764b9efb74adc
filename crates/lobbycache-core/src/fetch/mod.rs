//! Network access for the cache controller.
//!
//! This module provides the `Fetcher` trait the strategies and the sync
//! queue talk to, and the reqwest-backed `HttpFetcher` used in production.
//! Opacity is decided here, at the CORS boundary: a no-cors request to a
//! foreign origin comes back as an opaque response.

pub mod client;
pub mod error;

pub use client::{Fetcher, HttpFetcher};
pub use error::FetchError;

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{FetchError, Fetcher};
    use crate::models::{Request, Response};

    /// Fetcher that serves scripted responses and records every request URL.
    ///
    /// Anything not scripted fails as if the network were down.
    #[derive(Default)]
    pub(crate) struct ScriptedFetcher {
        responses: Mutex<HashMap<String, Response>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn respond(&self, url: &str, response: Response) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), response);
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
            self.calls
                .lock()
                .unwrap()
                .push(request.url.as_str().to_string());
            self.responses
                .lock()
                .unwrap()
                .get(request.url.as_str())
                .cloned()
                .ok_or_else(|| FetchError::Failed(format!("no route to {}", request.url)))
        }
    }
}

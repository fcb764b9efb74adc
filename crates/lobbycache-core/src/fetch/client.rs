use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::FetchError;
use crate::models::{FetchMode, Method, Request, Response};

/// HTTP request timeout in seconds.
/// Platform-default behavior; there is no per-request timeout policy.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Network seam for the cache controller.
///
/// Strategies, install precaching, and sync replay all reach the network
/// through this trait so they can be exercised against scripted responses.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

/// Fetcher backed by reqwest.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    scope: Url,
}

impl HttpFetcher {
    /// Create a fetcher for a worker controlling `scope`.
    pub fn new(scope: Url) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, scope })
    }

    fn reqwest_method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
            Method::Options => reqwest::Method::OPTIONS,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let mut builder = self
            .client
            .request(Self::reqwest_method(request.method), request.url.clone());
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder.send().await?;

        let cross_origin = request.url.origin() != self.scope.origin();
        let opaque = request.mode == FetchMode::NoCors && cross_origin;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        if opaque {
            // Status and headers are hidden from the caller; the payload is
            // kept so it can be replayed offline.
            return Ok(Response::opaque(body));
        }

        let mut out = Response::new(status, body);
        out.headers = headers;
        Ok(out)
    }
}

use serde::{Deserialize, Serialize};
use url::Url;

/// HTTP request method.
///
/// Only `Get` requests are intercepted and cached; everything else passes
/// through to the platform untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
        }
    }

    pub fn is_get(&self) -> bool {
        matches!(self, Method::Get)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request mode controlling how cross-origin responses come back.
///
/// A `NoCors` request to a foreign origin yields an opaque response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    #[default]
    Cors,
    NoCors,
}

/// An outgoing request as seen by the fetch-interception path.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub mode: FetchMode,
    pub body: Vec<u8>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            mode: FetchMode::Cors,
            body: Vec::new(),
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::Get, url)
    }

    /// Cross-origin request that tolerates an opaque response (font fetches).
    pub fn no_cors(url: Url) -> Self {
        Self {
            mode: FetchMode::NoCors,
            ..Self::new(Method::Get, url)
        }
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Identity under which GET responses are stored in a bucket.
    pub fn cache_key(&self) -> &str {
        self.url.as_str()
    }

    pub fn is_get(&self) -> bool {
        self.method.is_get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_is_get() {
        assert!(Method::Get.is_get());
        assert!(!Method::Post.is_get());
    }

    #[test]
    fn test_cache_key_is_full_url() {
        let request = Request::get(Url::parse("https://play.bihunters.io/css/styles.css").unwrap());
        assert_eq!(
            request.cache_key(),
            "https://play.bihunters.io/css/styles.css"
        );
    }

    #[test]
    fn test_no_cors_mode() {
        let request = Request::no_cors(Url::parse("https://fonts.gstatic.com/font.woff2").unwrap());
        assert_eq!(request.mode, FetchMode::NoCors);
        assert!(request.is_get());
    }
}

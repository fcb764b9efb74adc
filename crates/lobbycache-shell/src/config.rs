//! Static API configuration for page-level services.
//!
//! Built once at startup from the process environment and read-only
//! afterwards. There is no validation and no reload; the cache controller
//! never reads this, only page-level code does.

use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::Result;

/// Application name used for cache directory paths
const APP_NAME: &str = "lobbycache";

/// News API base URL.
const NEWS_BASE_URL: &str = "https://newsapi.org/v2";

/// Environment variable holding the news API key.
const NEWS_API_KEY_ENV: &str = "NEWS_API_KEY";

/// Same-origin proxy path used for news requests when proxying is on.
const NEWS_PROXY_URL: &str = "/api/news";

/// REST Countries base URL.
const RESTCOUNTRIES_BASE_URL: &str = "https://restcountries.com/v3.1";

/// Settings block for the news service.
#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub base_url: String,
    /// Sourced from the environment; `None` when unset.
    pub api_key: Option<String>,
    pub use_proxy: bool,
    pub proxy_url: String,
}

/// Settings block for the country lookup service.
#[derive(Debug, Clone)]
pub struct RestCountriesConfig {
    pub base_url: String,
}

/// Process-wide service configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub news: NewsConfig,
    pub restcountries: RestCountriesConfig,
}

impl ApiConfig {
    fn from_env() -> Self {
        Self {
            news: NewsConfig {
                base_url: NEWS_BASE_URL.to_string(),
                api_key: std::env::var(NEWS_API_KEY_ENV).ok(),
                use_proxy: true,
                proxy_url: NEWS_PROXY_URL.to_string(),
            },
            restcountries: RestCountriesConfig {
                base_url: RESTCOUNTRIES_BASE_URL.to_string(),
            },
        }
    }
}

/// The configuration, built on first access.
pub fn api_config() -> &'static ApiConfig {
    static CONFIG: OnceLock<ApiConfig> = OnceLock::new();
    CONFIG.get_or_init(ApiConfig::from_env)
}

/// Directory holding the bucket store and the sync queue.
pub fn cache_dir() -> Result<PathBuf> {
    let cache_dir =
        dirs::cache_dir().ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
    Ok(cache_dir.join(APP_NAME))
}

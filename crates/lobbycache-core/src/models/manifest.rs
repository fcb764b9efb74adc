/// Same-origin shell assets cached on every install.
const PRECACHE_ASSETS: [&str; 7] = [
    "/",
    "/index.html",
    "/css/styles.css",
    "/js/app.js",
    "/manifest.json",
    "/icons/icon-192.png",
    "/icons/icon-512.png",
];

/// Cross-origin font stylesheets fetched with no-cors requests.
const PRECACHE_FONTS: [&str; 1] = [
    "https://fonts.googleapis.com/css2?family=Bebas+Neue&family=Share+Tech+Mono&family=Rajdhani:wght@300;400;600;700&display=swap",
];

/// The fixed lists of assets fetched and stored at install time.
///
/// Assets are same-origin paths resolved against the worker scope; fonts are
/// absolute cross-origin URLs. The manifest is fixed at build time and
/// re-read on every install, never persisted.
#[derive(Debug, Clone)]
pub struct PrecacheManifest {
    pub assets: Vec<String>,
    pub fonts: Vec<String>,
}

impl Default for PrecacheManifest {
    fn default() -> Self {
        Self {
            assets: PRECACHE_ASSETS.iter().map(|s| s.to_string()).collect(),
            fonts: PRECACHE_FONTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PrecacheManifest {
    /// Manifest with nothing to precache.
    pub fn empty() -> Self {
        Self {
            assets: Vec::new(),
            fonts: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_assets_are_same_origin_paths() {
        let manifest = PrecacheManifest::default();
        assert!(!manifest.assets.is_empty());
        assert!(manifest.assets.iter().all(|asset| asset.starts_with('/')));
    }

    #[test]
    fn test_default_fonts_are_absolute_urls() {
        let manifest = PrecacheManifest::default();
        assert!(manifest
            .fonts
            .iter()
            .all(|font| font.starts_with("https://")));
    }
}

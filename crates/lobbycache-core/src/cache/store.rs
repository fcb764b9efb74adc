use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Response, ResponseKind};

/// A response snapshot as it sits in a bucket file.
///
/// Immutable once written; a re-fetch overwrites the whole entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    #[serde(with = "crate::models::encoding::base64_bytes")]
    pub body: Vec<u8>,
    pub kind: ResponseKind,
    pub cached_at: DateTime<Utc>,
}

impl StoredResponse {
    pub fn snapshot(response: &Response) -> Self {
        Self {
            status: response.status,
            headers: response.headers.clone(),
            body: response.body.clone(),
            kind: response.kind,
            cached_at: Utc::now(),
        }
    }

    pub fn into_response(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
            kind: self.kind,
        }
    }
}

/// Directory-backed store of named cache buckets.
pub struct BucketStore {
    dir: PathBuf,
}

impl BucketStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create bucket directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Handle to a bucket without touching the filesystem.
    pub fn bucket(&self, name: &str) -> Bucket {
        Bucket {
            name: name.to_string(),
            path: self.bucket_path(name),
        }
    }

    /// Open a bucket, creating its file if absent.
    pub fn open(&self, name: &str) -> Result<Bucket> {
        let bucket = self.bucket(name);
        if !bucket.path.exists() {
            bucket.save_entries(&HashMap::new())?;
        }
        Ok(bucket)
    }

    /// Names of every bucket currently on disk, sorted.
    pub fn names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read bucket directory: {}", self.dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete a bucket and all its snapshots. Returns false if it did not
    /// exist.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let path = self.bucket_path(name);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)
            .with_context(|| format!("Failed to delete cache bucket: {}", name))?;
        Ok(true)
    }

    fn bucket_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

/// A single named cache bucket: request URL → stored response snapshot.
///
/// Operations read and write the backing file per call; concurrent writes to
/// the same key are idempotent overwrites (last write wins).
pub struct Bucket {
    name: String,
    path: PathBuf,
}

impl Bucket {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the snapshot stored under `key`.
    pub fn match_request(&self, key: &str) -> Result<Option<StoredResponse>> {
        Ok(self.load_entries()?.remove(key))
    }

    /// Store a snapshot of `response` under `key`, overwriting wholesale.
    pub fn put(&self, key: &str, response: &Response) -> Result<()> {
        let mut entries = self.load_entries()?;
        entries.insert(key.to_string(), StoredResponse::snapshot(response));
        self.save_entries(&entries)
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.load_entries()?.contains_key(key))
    }

    /// Stored request URLs, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.load_entries()?.into_keys().collect();
        keys.sort();
        Ok(keys)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.load_entries()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.load_entries()?.is_empty())
    }

    fn load_entries(&self) -> Result<HashMap<String, StoredResponse>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read cache bucket: {}", self.name))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache bucket: {}", self.name))
    }

    fn save_entries(&self, entries: &HashMap<String, StoredResponse>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write cache bucket: {}", self.name))
    }
}

// ============================================================================
// Tests
// ============================================================================

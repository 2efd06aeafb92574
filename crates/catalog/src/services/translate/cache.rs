//! On-disk cache of completion results.
//!
//! Entries are keyed by the SHA-256 of the request (kind, model and both
//! prompts), so a rerun only pays for prompts it has not seen. The file is a
//! flat JSON object loaded once and saved once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::formats::FormatError;
use crate::openai::CompletionRequest;

/// Default cache file, relative to the working directory.
pub const DEFAULT_CACHE_PATH: &str = ".translation_cache.json";

/// Completion results keyed by request hash.
#[derive(Debug, Default)]
pub struct TranslationCache {
    path: Option<PathBuf>,
    entries: Mutex<HashMap<String, String>>,
}

impl TranslationCache {
    /// A cache that is never persisted.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the cache stored at `path`.
    ///
    /// A missing file starts an empty cache; an unreadable one is logged and
    /// replaced on save.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable translation cache");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        debug!(path = %path.display(), entries = entries.len(), "Loaded translation cache");

        Self {
            path: Some(path),
            entries: Mutex::new(entries),
        }
    }

    /// Where the cache is saved, if anywhere.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of cached results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Cached result for a request.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Store a result.
    pub fn insert(&self, key: String, value: String) {
        self.lock().insert(key, value);
    }

    /// Write the cache back to its file (no-op for in-memory caches).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<(), FormatError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let text = serde_json::to_string_pretty(&*self.lock())?;
        std::fs::write(path, text).map_err(|source| FormatError::Io {
            path: path.clone(),
            source,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cache key for one request to `model`.
#[must_use]
pub fn cache_key(kind: &str, model: &str, request: &CompletionRequest) -> String {
    // Keys in sorted order so the hash does not depend on map ordering.
    let key = json!({
        "m": model,
        "sys": request.system,
        "t": kind,
        "usr": request.user,
    });
    hex::encode(Sha256::digest(key.to_string().as_bytes()))
}

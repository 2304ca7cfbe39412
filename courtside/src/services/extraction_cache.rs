use lru::LruCache;
use serde::Deserialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Fields the language model pulled out of a question, before validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtractedFields {
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub stat_type: Option<String>,
}

/// Thread-safe LRU cache of model extractions, keyed by a hash of the
/// question text.
#[derive(Clone)]
pub struct ExtractionCache {
    cache: Arc<Mutex<LruCache<String, ExtractedFields>>>,
}

impl ExtractionCache {
    /// A zero capacity is raised to one entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    pub fn get(&self, key: &str) -> Option<ExtractedFields> {
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.get(key).cloned()
    }

    /// Least recently used entry is evicted at capacity.
    pub fn put(&self, key: String, value: ExtractedFields) {
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.put(key, value);
    }

    /// Stable hex key for a question. Surrounding whitespace is ignored.
    pub fn generate_key(&self, text: &str) -> String {
        let mut hasher = DefaultHasher::new();
        text.trim().as_bytes().hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

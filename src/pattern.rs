use crate::errors::UpgradeError;
use lru::LruCache;
use regex::Regex;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Cache of compiled regular expressions keyed by their source text.
///
/// Rule-derived patterns are rebuilt for every file, so compiling each one
/// once per run matters on large trees.
#[derive(Clone)]
pub struct PatternCache {
    cache: Arc<Mutex<LruCache<String, Regex>>>,
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Fetch a compiled pattern, compiling and caching it on a miss.
    pub fn get_or_compile(&self, pattern: &str) -> Result<Regex, UpgradeError> {
        {
            let mut cache = self.lock();
            if let Some(regex) = cache.get(pattern) {
                return Ok(regex.clone());
            }
        }

        let regex = Regex::new(pattern)?;

        {
            let mut cache = self.lock();
            cache.put(pattern.to_string(), regex.clone());
        }

        Ok(regex)
    }

    /// Pattern matching `word` as a whole word.
    pub fn whole_word(&self, word: &str) -> Result<Regex, UpgradeError> {
        self.get_or_compile(&format!(r"\b{}\b", regex::escape(word)))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, Regex>> {
        // A poisoned cache still holds valid compiled patterns.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

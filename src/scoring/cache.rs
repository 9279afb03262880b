// Score cache — memoizes (industry, content) -> final score.
//
// Backed by a bounded moka cache, so it's safe to share across worker
// threads and won't grow without limit over a long batch run. Content is
// keyed by its blake3 hash rather than the text itself.

use moka::sync::Cache;

use crate::taxonomy::models::PerformanceSettings;

type CacheKey = (String, String);

pub struct ScoreCache {
    inner: Option<Cache<CacheKey, f64>>,
}

impl ScoreCache {
    /// Enabled cache holding at most `capacity` scores.
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Some(Cache::new(capacity)),
        }
    }

    /// Pass-through cache: every lookup recomputes.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn from_settings(settings: &PerformanceSettings) -> Self {
        if settings.cache_enabled {
            Self::new(settings.cache_capacity)
        } else {
            Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Return the cached score for this pair, computing and storing it on
    /// a miss.
    pub fn get_or_compute<F>(&self, content: &str, industry_id: &str, compute: F) -> f64
    where
        F: FnOnce() -> f64,
    {
        match &self.inner {
            Some(cache) => {
                let key = (industry_id.to_string(), content_hash(content));
                cache.get_with(key, compute)
            }
            None => compute(),
        }
    }

    /// Approximate number of cached scores.
    pub fn entry_count(&self) -> u64 {
        match &self.inner {
            Some(cache) => {
                cache.run_pending_tasks();
                cache.entry_count()
            }
            None => 0,
        }
    }

    pub fn clear(&self) {
        if let Some(cache) = &self.inner {
            cache.invalidate_all();
        }
    }
}

/// Stable hex digest of the content.
pub fn content_hash(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

//! Process-local TTL cache
//!
//! Keyed by strings derived from operation + parameters (e.g.
//! `files_{folder}_{page_size}_{token}`), so a mutation can drop every
//! cached read touching a folder with one substring invalidation.
//!
//! There is no size bound or eviction beyond the TTL: the working set is
//! one user's folder listings, which is small. That is a documented scaling
//! limit, not an oversight.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

/// Default entry lifetime (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A mutex-guarded key-value cache with per-entry expiration.
///
/// Expired entries are logically absent: `get` never returns them and
/// removes them lazily when it observes them.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, (V, Instant)>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value if it is younger than the TTL.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");

        match entries.get(key) {
            Some((value, inserted_at)) if inserted_at.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or overwrite, resetting the entry's age.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(key.into(), (value, Instant::now()));
    }

    /// Remove every key containing `pattern`; with `None`, clear everything.
    pub fn invalidate(&self, pattern: Option<&str>) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");

        match pattern {
            Some(pattern) => {
                let before = entries.len();
                entries.retain(|key, _| !key.contains(pattern));
                debug!(
                    pattern = pattern,
                    removed = before - entries.len(),
                    "Invalidated cache entries"
                );
            }
            None => {
                debug!(removed = entries.len(), "Cleared cache");
                entries.clear();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

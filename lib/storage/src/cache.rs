use ahash::AHashMap;
use async_trait::async_trait;
use craftrec_core::{KeyValueCache, Result};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Writes between two sweeps of expired entries
pub const DEFAULT_PURGE_INTERVAL: usize = 256;

struct Entry<V> {
    value: V,
    /// `None` when the TTL is too long to represent
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Process-wide TTL map. Expired entries are dropped on read, and every
/// `purge_interval` writes the whole map is swept.
pub struct TtlCache<V> {
    entries: RwLock<AHashMap<String, Entry<V>>>,
    writes: AtomicUsize,
    purge_interval: usize,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TtlCache<V> {
    pub fn new() -> Self {
        Self::with_purge_interval(DEFAULT_PURGE_INTERVAL)
    }

    pub fn with_purge_interval(purge_interval: usize) -> Self {
        Self {
            entries: RwLock::new(AHashMap::new()),
            writes: AtomicUsize::new(0),
            purge_interval: purge_interval.max(1),
        }
    }

    /// Entries currently held, expired or not
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        before - entries.len()
    }
}

#[async_trait]
impl<V> KeyValueCache<V> for TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<V>> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(e) if e.is_live(now) => return Ok(Some(e.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // Expired: drop it unless a writer refreshed it meanwhile
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|e| !e.is_live(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: V, ttl: Duration) -> Result<()> {
        let expires_at = Instant::now().checked_add(ttl);
        self.entries.write().insert(key.to_string(), Entry { value, expires_at });

        let writes = self.writes.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        if writes % self.purge_interval == 0 {
            let purged = self.purge_expired();
            if purged > 0 {
                debug!(purged, "expired cache entries swept");
            }
        }
        Ok(())
    }

    async fn clear(&self) -> Result<usize> {
        let mut entries = self.entries.write();
        let count = entries.len();
        entries.clear();
        Ok(count)
    }
}

use std::sync::Arc;

use dashmap::DashMap;
use jiff::{SignedDuration, Timestamp};

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

#[derive(Clone, Debug)]
struct Entry<V> {
    value: V,
    expires_at: Timestamp,
}

/// In-process key/value store whose entries expire after a TTL.
///
/// Expired entries are only evicted when they are next read; there is no
/// background sweep and no capacity bound. Concurrent writers race and the
/// last `set` wins.
pub struct Cache<V> {
    entries: DashMap<String, Entry<V>>,
    default_ttl: SignedDuration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> Cache<V> {
    pub fn new(default_ttl_minutes: i64) -> Self {
        Self::with_clock(default_ttl_minutes, Arc::new(SystemClock))
    }

    pub fn with_clock(default_ttl_minutes: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl: SignedDuration::from_secs(default_ttl_minutes.saturating_mul(60)),
            clock,
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let expired = match self.entries.get(key) {
            Some(entry) if now < entry.expires_at => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, entry| now >= entry.expires_at);
        }
        None
    }

    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_for(key, value, self.default_ttl);
    }

    pub fn set_for(&self, key: impl Into<String>, value: V, ttl: SignedDuration) {
        let expires_at = self.clock.now().checked_add(ttl).unwrap_or(Timestamp::MAX);
        self.entries.insert(key.into(), Entry { value, expires_at });
    }

    pub fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

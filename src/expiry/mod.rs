//! Shared expiry primitives for the limiter and cache stores.
//!
//! Both components keep lazily-created entries in a map and treat an entry
//! as absent once its deadline has passed, whether or not the periodic
//! sweep has removed it yet. `ExpiringMap` centralizes that check so the
//! two stores cannot drift apart on expiry semantics.
//!
//! The map itself is not thread-safe: each owner wraps it in its own lock
//! and performs every check-then-act sequence under a single acquisition.

use std::borrow::Borrow;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

/// Implemented by entry types that become logically absent after a deadline.
pub trait Expire {
    fn is_expired(&self, now: Instant) -> bool;
}

/// A `HashMap` wrapper that hides expired entries from reads.
///
/// Expired entries stay physically present until `purge_expired` (the
/// periodic sweep) or an overwriting access removes them; `len` counts
/// physical entries.
#[derive(Debug)]
pub struct ExpiringMap<K, V> {
    inner: HashMap<K, V>,
}

impl<K, V> Default for ExpiringMap<K, V> {
    fn default() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }
}

impl<K, V> ExpiringMap<K, V>
where
    K: Eq + Hash,
    V: Expire,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physical entries, live or expired.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the live entry for `key`, hiding expired ones.
    pub fn get<Q>(&self, key: &Q, now: Instant) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.inner.get(key).filter(|entry| !entry.is_expired(now))
    }

    pub fn get_mut<Q>(&mut self, key: &Q, now: Instant) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.inner
            .get_mut(key)
            .filter(|entry| !entry.is_expired(now))
    }

    /// Physical presence check, ignoring expiry.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.inner.contains_key(key)
    }

    /// Returns the live entry for `key`, creating one with `fresh` if the
    /// slot is vacant or holds an expired entry. Expired entries are
    /// replaced wholesale, never mutated back to life.
    pub fn upsert(&mut self, key: K, now: Instant, fresh: impl FnOnce() -> V) -> &mut V {
        match self.inner.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(fresh());
                }
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(fresh()),
        }
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.inner.insert(key, value)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.inner.remove(key)
    }

    /// Drops every expired entry and reports how many were removed.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.inner.len();
        self.inner.retain(|_, entry| !entry.is_expired(now));
        before - self.inner.len()
    }

    pub fn retain(&mut self, keep: impl FnMut(&K, &mut V) -> bool) {
        self.inner.retain(keep);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.inner.iter()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Ticket {
        dies_at: Instant,
    }

    impl Expire for Ticket {
        fn is_expired(&self, now: Instant) -> bool {
            now >= self.dies_at
        }
    }

    fn ticket(now: Instant, lives: Duration) -> Ticket {
        Ticket {
            dies_at: now + lives,
        }
    }

    #[test]
    fn get_hides_expired_entries() {
        let now = Instant::now();
        let mut map: ExpiringMap<String, Ticket> = ExpiringMap::new();
        map.insert("a".to_string(), ticket(now, Duration::from_secs(10)));

        assert!(map.get("a", now).is_some());
        assert!(map.get("a", now + Duration::from_secs(10)).is_none());
        // Still physically present until purged.
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("a"));
    }

    #[test]
    fn upsert_replaces_expired_entry() {
        let now = Instant::now();
        let mut map: ExpiringMap<String, Ticket> = ExpiringMap::new();
        map.insert("a".to_string(), ticket(now, Duration::from_secs(1)));

        let later = now + Duration::from_secs(5);
        let entry = map.upsert("a".to_string(), later, || {
            ticket(later, Duration::from_secs(1))
        });
        assert!(!entry.is_expired(later));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn upsert_keeps_live_entry() {
        let now = Instant::now();
        let mut map: ExpiringMap<String, Ticket> = ExpiringMap::new();
        map.insert("a".to_string(), ticket(now, Duration::from_secs(10)));
        let original_deadline = now + Duration::from_secs(10);

        let entry = map.upsert("a".to_string(), now, || {
            ticket(now, Duration::from_secs(99))
        });
        assert_eq!(entry.dies_at, original_deadline);
    }

    #[test]
    fn purge_removes_only_expired() {
        let now = Instant::now();
        let mut map: ExpiringMap<String, Ticket> = ExpiringMap::new();
        map.insert("old".to_string(), ticket(now, Duration::from_secs(1)));
        map.insert("new".to_string(), ticket(now, Duration::from_secs(60)));

        let removed = map.purge_expired(now + Duration::from_secs(2));
        assert_eq!(removed, 1);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("new"));
    }
}

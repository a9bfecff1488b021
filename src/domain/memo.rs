//! Keyed memoisation for fetch results.
//!
//! Entries live for the lifetime of the cache; nothing expires on its own and
//! [`MemoCache::clear`] is the only eviction. Failed computations are never stored,
//! so the next call retries.

use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct MemoCache<K, V> {
    entries: RefCell<BTreeMap<K, V>>,
}

impl<K: Ord + Clone, V: Clone> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: Clone> MemoCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn put(&self, key: K, value: V) {
        self.entries.borrow_mut().insert(key, value);
    }

    /// Returns the stored value for `key`, or runs `compute` and stores its
    /// result if it succeeds.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        // no borrow is held while computing, so `compute` may use the cache too
        let value = compute()?;
        self.put(key, value.clone());
        Ok(value)
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn computes_once_per_key() {
        let cache: MemoCache<String, u32> = MemoCache::new();
        let calls = Cell::new(0);
        let compute = || -> Result<u32, String> {
            calls.set(calls.get() + 1);
            Ok(7)
        };

        assert_eq!(cache.get_or_try_insert_with("a".into(), compute), Ok(7));
        assert_eq!(cache.get_or_try_insert_with("a".into(), compute), Ok(7));
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_are_not_stored() {
        let cache: MemoCache<u8, u32> = MemoCache::new();
        let r: Result<u32, &str> = cache.get_or_try_insert_with(1, || Err("timeout"));
        assert_eq!(r, Err("timeout"));
        assert!(cache.is_empty());

        let r: Result<u32, &str> = cache.get_or_try_insert_with(1, || Ok(3));
        assert_eq!(r, Ok(3));
        assert_eq!(cache.get(&1), Some(3));
    }

    #[test]
    fn clear_drops_everything() {
        let cache: MemoCache<u8, &str> = MemoCache::new();
        cache.put(1, "x");
        cache.put(2, "y");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);
    }
}

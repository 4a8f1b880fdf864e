use std::hash::{Hash, BuildHasher};
use std::ops::Deref;
use std::collections::hash_map::RandomState;

use indexmap::{IndexMap, map::Entry};

/// A map which evicts its least recently used entries once it exceeds its capacity
#[derive(Clone, Debug)]
pub struct LruCache<K: Eq + Hash, V, S: BuildHasher = RandomState> {
    capacity: usize,
    map: IndexMap<K, V, S>
}
impl<K: Eq + Hash, V> LruCache<K, V> {
    /// Create a cache holding at most `capacity` entries, which is always at least one
    #[inline]
    pub fn new(capacity: usize) -> LruCache<K, V> {
        let capacity = capacity.max(1);
        LruCache { capacity, map: IndexMap::with_capacity(capacity) }
    }
}
impl<K: Eq + Hash, V, S: BuildHasher> LruCache<K, V, S> {
    fn cleanup(&mut self) {
        if self.map.len() <= self.capacity { return }
        // The least recently used entries are at the front
        let needed_removed = self.map.len() - self.capacity;
        let mut index = 0;
        self.map.retain(|_, _| {
            let should_retain = index >= needed_removed;
            index += 1;
            should_retain
        });
        assert!(self.map.len() <= self.capacity);
    }
    /// Lookup the value, marking it as the most recently used
    pub fn get_refresh(&mut self, key: &K) -> Option<&V> {
        let (_, key, value) = self.map.shift_remove_full(key)?;
        let (index, _) = self.map.insert_full(key, value);
        self.map.get_index(index).map(|(_, value)| value)
    }
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (old, cleanup) = match self.map.entry(key) {
            Entry::Occupied(mut entry) => (Some(entry.insert(value)), false),
            Entry::Vacant(entry) => {
                entry.insert(value);
                (None, true)
            }
        };
        if cleanup {
            self.cleanup()
        }
        old
    }
}
impl<K: Eq + Hash, V, S: BuildHasher> Deref for LruCache<K, V, S> {
    type Target = IndexMap<K, V, S>;

    #[inline(always)]
    fn deref(&self) -> &IndexMap<K, V, S> {
        &self.map
    }
}

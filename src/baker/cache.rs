//! Memoizing single-flight cache.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, OnceLock};

/// Computes each key at most once per cache lifetime.
///
/// Concurrent callers for a key that is being computed block until the
/// first caller finishes and then share its result. The map lock is only
/// held while looking up the per-key cell, so distinct keys compute in
/// parallel. A computation must not request its own key.
pub struct SingleFlight<K, V> {
    cells: Mutex<HashMap<K, Arc<OnceLock<V>>>>,
}

impl<K, V> Default for SingleFlight<K, V> {
    fn default() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash, V: Clone> SingleFlight<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, computing it with `compute` if absent.
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        let cell = {
            let mut cells = self.cells.lock();
            Arc::clone(cells.entry(key).or_default())
        };
        cell.get_or_init(compute).clone()
    }

    /// The value for `key` if it has finished computing.
    pub fn get(&self, key: &K) -> Option<V> {
        let cell = self.cells.lock().get(key).cloned()?;
        cell.get().cloned()
    }

    /// Number of keys requested so far.
    pub fn len(&self) -> usize {
        self.cells.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

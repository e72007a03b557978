//! Tracking of states that already received a full search budget.
//!
//! Undo followed by replaying the same moves brings the game back to states
//! the engine has searched before. Checking this set first keeps every state
//! at one budget's worth of search, however often it is revisited.

use std::collections::HashSet;
use std::hash::Hash;

#[derive(Clone, Debug)]
pub struct ReachedSet<K> {
    keys: HashSet<K>,
}

impl<K: Eq + Hash> Default for ReachedSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> ReachedSet<K> {
    pub fn new() -> Self {
        Self {
            keys: HashSet::new(),
        }
    }

    /// Record `key`. Returns false if it was already present.
    pub fn insert(&mut self, key: K) -> bool {
        self.keys.insert(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

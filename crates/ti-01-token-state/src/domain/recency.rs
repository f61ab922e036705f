//! # Bounded Recency Set
//!
//! Fixed-capacity, insertion-ordered memory of recently seen keys. The
//! pipeline uses it to skip transactions and blocks it has already handled.
//!
//! ## Structure
//!
//! A `HashSet` answers membership in O(1); a `VecDeque` records insertion
//! order so the oldest key can be evicted in O(1).
//!
//! ## Invariants
//!
//! - `set` and `order` hold exactly the same keys.
//! - After `push` returns, `len() <= max_size`.
//! - Eviction is FIFO by first insertion. Re-pushing a member does not
//!   refresh its position.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

/// Bounded, FIFO-evicting set of recently seen keys.
#[derive(Debug, Clone)]
pub struct BoundedRecencySet<K> {
    max_size: usize,
    set: HashSet<K>,
    order: VecDeque<K>,
}

impl<K> BoundedRecencySet<K>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty set that retains at most `max_size` keys.
    ///
    /// A capacity of zero is allowed; every pushed key is evicted
    /// immediately.
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            set: HashSet::with_capacity(max_size.min(PREALLOCATE_LIMIT)),
            order: VecDeque::with_capacity(max_size.min(PREALLOCATE_LIMIT)),
        }
    }

    /// Record `key` as seen.
    ///
    /// Returns `true` if the key was not already a member. Pushing a member
    /// again is a no-op. If the insert takes the set past capacity, the
    /// oldest key is evicted.
    pub fn push(&mut self, key: K) -> bool {
        if !self.set.insert(key.clone()) {
            return false;
        }
        self.order.push_back(key);

        if self.set.len() > self.max_size {
            self.shift();
        }
        true
    }

    /// Whether `key` is currently a member.
    pub fn has(&self, key: &K) -> bool {
        self.set.contains(key)
    }

    /// Remove and return the oldest key, or `None` when empty.
    pub fn shift(&mut self) -> Option<K> {
        let oldest = self.order.pop_front()?;
        self.set.remove(&oldest);
        Some(oldest)
    }

    /// Number of keys currently retained.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Capacity fixed at construction.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Drop every key.
    pub fn clear(&mut self) {
        self.set.clear();
        self.order.clear();
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        self.order.iter()
    }
}

/// Upper bound on up-front allocation; larger sets grow on demand.
const PREALLOCATE_LIMIT: usize = 4096;

//! # Ownership Registry
//!
//! Maps each live token output to the token it carries, so the pipeline can
//! answer "is this input a token output, and which token" without a store
//! round trip.
//!
//! ## Invariants
//!
//! - An outpoint maps to at most one token id.
//! - The registry only exposes map operations. Adding created outputs and
//!   removing spent ones is the pipeline's job.
//!
//! ## Sharing
//!
//! There is exactly one registry per pipeline. The coordinator constructs an
//! [`OwnershipHandle`] and hands clones to every component that needs it;
//! all clones see the same state.

use parking_lot::Mutex;
use shared_types::{OutPoint, TokenId};
use std::collections::HashMap;
use std::sync::Arc;

/// Outpoint → token id map.
#[derive(Debug, Clone, Default)]
pub struct OwnershipRegistry {
    owners: HashMap<OutPoint, TokenId>,
}

impl OwnershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `outpoint` as carrying `token_id`. Returns the previous owner.
    pub fn set(&mut self, outpoint: OutPoint, token_id: TokenId) -> Option<TokenId> {
        self.owners.insert(outpoint, token_id)
    }

    /// Token carried by `outpoint`, if it is a tracked token output.
    pub fn get(&self, outpoint: &OutPoint) -> Option<TokenId> {
        self.owners.get(outpoint).copied()
    }

    /// Forget `outpoint`. Returns the token it carried.
    pub fn delete(&mut self, outpoint: &OutPoint) -> Option<TokenId> {
        self.owners.remove(outpoint)
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.owners.contains_key(outpoint)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn clear(&mut self) {
        self.owners.clear();
    }

    /// Outpoints currently carrying `token_id`, in no particular order.
    pub fn outputs_of<'a>(
        &'a self,
        token_id: &'a TokenId,
    ) -> impl Iterator<Item = &'a OutPoint> + 'a {
        self.owners
            .iter()
            .filter(move |(_, owner)| *owner == token_id)
            .map(|(outpoint, _)| outpoint)
    }
}

/// Shared handle to the pipeline's single [`OwnershipRegistry`].
///
/// Cloning is cheap and yields a handle to the same registry. The lock only
/// makes the handle `Send + Sync`; callers are still expected to serialize
/// read-modify-write sequences for a given outpoint (see [`Self::with`]).
#[derive(Debug, Clone, Default)]
pub struct OwnershipHandle {
    inner: Arc<Mutex<OwnershipRegistry>>,
}

impl OwnershipHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing registry, e.g. one rebuilt from persistence.
    pub fn from_registry(registry: OwnershipRegistry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    pub fn set(&self, outpoint: OutPoint, token_id: TokenId) -> Option<TokenId> {
        self.inner.lock().set(outpoint, token_id)
    }

    pub fn get(&self, outpoint: &OutPoint) -> Option<TokenId> {
        self.inner.lock().get(outpoint)
    }

    pub fn delete(&self, outpoint: &OutPoint) -> Option<TokenId> {
        self.inner.lock().delete(outpoint)
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.inner.lock().contains(outpoint)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Run `f` against the registry under a single lock acquisition.
    pub fn with<R>(&self, f: impl FnOnce(&mut OwnershipRegistry) -> R) -> R {
        let mut registry = self.inner.lock();
        f(&mut *registry)
    }

    /// Whether both handles refer to the same registry.
    pub fn same_as(&self, other: &OwnershipHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

//! # Component — Per-Type Storage Keyed by Owning Entity
//!
//! A component is any `'static + Send + Sync` value attached to exactly one
//! entity. Components don't carry their own runtime type info or an embedded
//! id field: the [`ComponentStore`] records the owner next to each value.
//!
//! ## Layout
//!
//! ```text
//! ComponentStore<Health>
//!   owners: [e4,  e1,  e9 ]      ← owner of data[i]
//!   data:   [h4,  h1,  h9 ]      ← dense, cache-friendly
//!   index:  {e4→0, e1→1, e9→2}   ← O(1) existence / lookup
//! ```
//!
//! Insertion appends. Erasure swap-removes and patches the moved entry's
//! index, so data stays dense.
//!
//! ## Type Erasure
//!
//! The scene holds one store per component type in a single map. Each store
//! is boxed as `dyn ErasedStore`, which exposes the operations that don't need
//! `T` (erase an entity, existence check, clear) and a downcast hook for the
//! typed ones.
//!
//! Stores never touch signatures or system membership. That bookkeeping is
//! the scene's job.

use std::any::Any;
use std::collections::HashMap;

use super::entity::EntityId;

/// Marker for types that can be stored as components.
///
/// Blanket-implemented for every `'static + Send + Sync` type.
pub trait Component: 'static + Send + Sync {}

impl<T: 'static + Send + Sync> Component for T {}

/// All live instances of one component type, addressable by owning entity.
pub struct ComponentStore<T: Component> {
    owners: Vec<EntityId>,
    data: Vec<T>,
    index: HashMap<EntityId, usize>,
}

impl<T: Component> ComponentStore<T> {
    pub fn new() -> Self {
        Self {
            owners: Vec::new(),
            data: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Attach `component` to `owner`.
    ///
    /// Returns `false` without overwriting if `owner` already has one.
    pub fn insert(&mut self, owner: EntityId, component: T) -> bool {
        if self.index.contains_key(&owner) {
            return false;
        }
        self.index.insert(owner, self.data.len());
        self.owners.push(owner);
        self.data.push(component);
        true
    }

    /// Get the component owned by `owner`.
    pub fn get(&self, owner: EntityId) -> Option<&T> {
        self.index.get(&owner).map(|&i| &self.data[i])
    }

    /// Get the component owned by `owner`, mutably.
    pub fn get_mut(&mut self, owner: EntityId) -> Option<&mut T> {
        match self.index.get(&owner) {
            Some(&i) => Some(&mut self.data[i]),
            None => None,
        }
    }

    /// Detach and return the component owned by `owner`. No-op if absent.
    pub fn erase(&mut self, owner: EntityId) -> Option<T> {
        let row = self.index.remove(&owner)?;
        self.owners.swap_remove(row);
        let removed = self.data.swap_remove(row);
        // The last entry moved into `row`.
        if let Some(&moved) = self.owners.get(row) {
            self.index.insert(moved, row);
        }
        Some(removed)
    }

    pub fn contains(&self, owner: EntityId) -> bool {
        self.index.contains_key(&owner)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate `(owner, component)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.owners.iter().copied().zip(self.data.iter())
    }

    /// Iterate `(owner, component)` pairs mutably, in storage order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.owners.iter().copied().zip(self.data.iter_mut())
    }

    pub fn clear(&mut self) {
        self.owners.clear();
        self.data.clear();
        self.index.clear();
    }
}

impl<T: Component> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The `T`-independent face of a [`ComponentStore`].
pub(crate) trait ErasedStore: Send + Sync {
    /// Remove `owner`'s component if present. Returns `true` if one was removed.
    fn erase_entity(&mut self, owner: EntityId) -> bool;
    fn clear(&mut self);
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStore for ComponentStore<T> {
    fn erase_entity(&mut self, owner: EntityId) -> bool {
        self.erase(owner).is_some()
    }

    fn clear(&mut self) {
        ComponentStore::clear(self)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

//! # Entity Ids — Lightweight Identifiers for Scene Objects
//!
//! An [`EntityId`] is just a number. The [`Scene`](super::scene::Scene) maps
//! ids to their hierarchy node, signature, and components.
//!
//! ## Design: A Bounded FIFO Pool
//!
//! Ids are 1-based. Zero is reserved as [`EntityId::INVALID`] and is never
//! handed out, so a zeroed field always reads as "no entity".
//!
//! The pool is filled with every id in `1..=capacity` up front. Allocation pops
//! the front of the queue, release pushes to the back:
//!
//! ```text
//! free_list: [1, 2, 3, 4, 5]    ← fresh pool (capacity 5)
//! allocate → 1, allocate → 2
//! free_list: [3, 4, 5]
//! release(1)
//! free_list: [3, 4, 5, 1]       ← 1 comes back only after 3, 4 and 5
//! ```
//!
//! An id is never returned twice while it is live. Because released ids go to
//! the back, a recycled id also takes as long as possible to reappear, which
//! makes stale ids held by careless callers easier to notice.
//!
//! ## Comparison
//!
//! - **hecs / bevy_ecs**: generational indices; stale handles are detected.
//! - **arbor**: plain ids, bounded capacity, releases are checked so a double
//!   release can never put an id into the pool twice.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};

/// A lightweight handle to an entity in a [`Scene`](super::scene::Scene).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u32);

impl EntityId {
    /// The "no entity" sentinel. Never a live id.
    pub const INVALID: Self = Self(0);

    /// Wrap a raw id. `0` yields [`EntityId::INVALID`].
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// `false` only for the sentinel.
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Entity({})", self.0)
        } else {
            write!(f, "Entity(INVALID)")
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Manages entity id allocation and recycling.
pub struct EntityAllocator {
    /// Ids available for allocation, front first.
    free_list: VecDeque<EntityId>,
    /// `allocated[id]` is `true` while `id` is live. Slot 0 is the sentinel.
    allocated: Vec<bool>,
    capacity: usize,
}

impl EntityAllocator {
    /// Create a pool holding every id in `1..=capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            free_list: (1..=capacity as u32).map(EntityId).collect(),
            allocated: vec![false; capacity + 1],
            capacity,
        }
    }

    /// Take the front of the free list.
    pub fn try_allocate(&mut self) -> Result<EntityId> {
        let id = self.free_list.pop_front().ok_or(SceneError::PoolExhausted {
            capacity: self.capacity,
        })?;
        self.allocated[id.index()] = true;
        Ok(id)
    }

    /// Take the front of the free list.
    ///
    /// # Panics
    ///
    /// Panics if every id is in use.
    pub fn allocate(&mut self) -> EntityId {
        self.try_allocate().unwrap_or_else(|e| panic!("{e}"))
    }

    /// Return `id` to the back of the free list.
    pub fn try_release(&mut self, id: EntityId) -> Result<()> {
        if !self.is_allocated(id) {
            return Err(SceneError::InvalidRelease(id));
        }
        self.allocated[id.index()] = false;
        self.free_list.push_back(id);
        Ok(())
    }

    /// Return `id` to the back of the free list.
    ///
    /// # Panics
    ///
    /// Panics if `id` is the sentinel, out of range, or not currently
    /// allocated.
    pub fn release(&mut self, id: EntityId) {
        self.try_release(id).unwrap_or_else(|e| panic!("{e}"));
    }

    /// Check whether `id` is currently handed out.
    pub fn is_allocated(&self, id: EntityId) -> bool {
        id.is_valid() && self.allocated.get(id.index()).copied().unwrap_or(false)
    }

    /// `true` if `id` could ever be handed out by this pool.
    pub fn in_range(&self, id: EntityId) -> bool {
        id.is_valid() && id.index() <= self.capacity
    }

    /// Returns the number of currently live ids.
    pub fn alive_count(&self) -> usize {
        self.capacity - self.free_list.len()
    }

    /// Returns the number of ids waiting in the free list.
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_sequential_from_one() {
        let mut alloc = EntityAllocator::new(4);
        assert_eq!(alloc.allocate(), EntityId::new(1));
        assert_eq!(alloc.allocate(), EntityId::new(2));
        assert_eq!(alloc.alive_count(), 2);
        assert_eq!(alloc.free_count(), 2);
    }

    #[test]
    fn released_id_goes_to_the_back() {
        let mut alloc = EntityAllocator::new(3);
        let e1 = alloc.allocate();
        alloc.release(e1);
        assert_eq!(alloc.allocate(), EntityId::new(2));
        assert_eq!(alloc.allocate(), EntityId::new(3));
        assert_eq!(alloc.allocate(), e1);
    }

    #[test]
    fn exhausted_pool_is_an_error() {
        let mut alloc = EntityAllocator::new(1);
        alloc.allocate();
        assert_eq!(
            alloc.try_allocate(),
            Err(SceneError::PoolExhausted { capacity: 1 })
        );
    }

    #[test]
    #[should_panic(expected = "entity pool exhausted")]
    fn exhausted_pool_panics() {
        let mut alloc = EntityAllocator::new(0);
        alloc.allocate();
    }

    #[test]
    fn double_release_is_rejected() {
        let mut alloc = EntityAllocator::new(2);
        let e = alloc.allocate();
        alloc.release(e);
        assert_eq!(alloc.try_release(e), Err(SceneError::InvalidRelease(e)));
        assert_eq!(alloc.free_count(), 2);
    }

    #[test]
    #[should_panic(expected = "not currently allocated")]
    fn releasing_sentinel_panics() {
        let mut alloc = EntityAllocator::new(2);
        alloc.release(EntityId::INVALID);
    }

    #[test]
    fn out_of_range_is_never_allocated() {
        let alloc = EntityAllocator::new(2);
        assert!(!alloc.is_allocated(EntityId::new(99)));
        assert!(!alloc.in_range(EntityId::new(3)));
        assert!(alloc.in_range(EntityId::new(2)));
        assert!(!alloc.in_range(EntityId::INVALID));
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", EntityId::new(7)), "Entity(7)");
        assert_eq!(format!("{:?}", EntityId::INVALID), "Entity(INVALID)");
    }
}

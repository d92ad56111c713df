//! # Entity/Component/System Runtime with a Transform Hierarchy
//!
//! Entities are plain ids. Each one owns a node in the transform hierarchy and
//! any number of components (at most one per type). Systems declare which
//! component types they care about and are handed the matching ids every
//! frame.
//!
//! ## Module Overview
//!
//! - [`entity`] — `EntityId` and the bounded FIFO id pool
//! - [`registry`] — per-scene component and system type ids
//! - [`component`] — dense per-type storage keyed by owning entity
//! - [`signature`] — component-type sets and the membership test
//! - [`system`] — the `System` trait and per-system bookkeeping
//! - [`hierarchy`] — parent/child links, local and global transforms
//! - [`scene`] — the owner of all of the above, and the frame loop

pub mod component;
pub mod entity;
pub mod hierarchy;
pub mod registry;
pub mod scene;
pub mod signature;
pub mod system;

pub use component::{Component, ComponentStore};
pub use entity::{EntityAllocator, EntityId};
pub use hierarchy::{Entity, Hierarchy};
pub use registry::{ComponentTypeId, SystemTypeId, TypeRegistry};
pub use scene::{EntityMut, Scene};
pub use signature::{Signature, SystemSignature, belongs_to};
pub use system::System;

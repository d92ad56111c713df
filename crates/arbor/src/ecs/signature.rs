//! # Signatures — Which Components an Entity Has, Which a System Wants
//!
//! Every live entity owns one [`Signature`]: the set of component type ids
//! currently attached to it. A system declares its interest with a
//! [`SystemSignature`] built from two requirement lists:
//!
//! - `require_all` — the entity must have every listed type.
//! - `require_one` — the entity must have at least one listed type. An empty
//!   list disables this check.
//!
//! ```text
//! system:  all = {A, B}   one = {C, D}
//! {A, B, C}  → belongs
//! {A, C}     → no (missing B)
//! {A, B}     → no (neither C nor D)
//! ```

use std::any::TypeId;
use std::collections::BTreeSet;

use super::registry::{ComponentTypeId, TypeRegistry};

/// A set of component type ids. Order-irrelevant, duplicates collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature(BTreeSet<ComponentTypeId>);

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `id` was not already present.
    pub fn insert(&mut self, id: ComponentTypeId) -> bool {
        self.0.insert(id)
    }

    /// Returns `true` if `id` was present.
    pub fn remove(&mut self, id: ComponentTypeId) -> bool {
        self.0.remove(&id)
    }

    pub fn contains(&self, id: ComponentTypeId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.0.iter().copied()
    }

    /// At least one shared id.
    pub fn intersects(&self, other: &Signature) -> bool {
        !self.0.is_disjoint(&other.0)
    }

    /// Every id of `other` is present in `self`.
    pub fn contains_all(&self, other: &Signature) -> bool {
        self.0.is_superset(&other.0)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<ComponentTypeId> for Signature {
    fn from_iter<I: IntoIterator<Item = ComponentTypeId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Decide whether an entity with signature `entity` is of interest to a
/// system requiring all of `require_all` and at least one of `require_one`.
pub fn belongs_to(entity: &Signature, require_all: &Signature, require_one: &Signature) -> bool {
    if !require_one.is_empty() && !entity.intersects(require_one) {
        return false;
    }
    entity.contains_all(require_all)
}

/// The component types a system is interested in, before the scene has
/// assigned ids to them.
///
/// ```ignore
/// fn signature(&self) -> SystemSignature {
///     SystemSignature::new()
///         .require_all::<Transform>()
///         .require_one::<Camera>()
///         .require_one::<Light>()
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SystemSignature {
    all: Vec<(TypeId, &'static str)>,
    one: Vec<(TypeId, &'static str)>,
}

impl SystemSignature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities must have a `T`.
    pub fn require_all<T: 'static>(mut self) -> Self {
        self.all.push((TypeId::of::<T>(), std::any::type_name::<T>()));
        self
    }

    /// Entities must have at least one of the types added this way.
    pub fn require_one<T: 'static>(mut self) -> Self {
        self.one.push((TypeId::of::<T>(), std::any::type_name::<T>()));
        self
    }

    /// Map both lists to component type ids, registering unseen types.
    pub(crate) fn resolve(&self, registry: &mut TypeRegistry) -> (Signature, Signature) {
        let all = self
            .all
            .iter()
            .map(|&(tid, name)| registry.component_id_of(tid, name))
            .collect();
        let one = self
            .one
            .iter()
            .map(|&(tid, name)| registry.component_id_of(tid, name))
            .collect();
        (all, one)
    }
}

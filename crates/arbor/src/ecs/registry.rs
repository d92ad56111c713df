//! # Type Registry — Stable Ids for Component and System Types
//!
//! Component and system types are keyed by small integers rather than by
//! [`TypeId`] directly. Each [`Scene`](super::scene::Scene) owns one registry,
//! so two scenes (or two tests) never share counters.
//!
//! Ids are handed out from a monotonically increasing counter the first time
//! a type is seen, and never reused. Every id keeps the type's name, so the
//! mapping can be listed for debugging:
//!
//! ```text
//! components: TypeId(Camera) → ComponentTypeId(0) "Camera"
//!             TypeId(Light)  → ComponentTypeId(1) "Light"
//! systems:    TypeId(Render) → SystemTypeId(0)    "RenderSystem"
//! ```
//!
//! Call [`Scene::register_component`](super::scene::Scene::register_component)
//! at startup to pin component ids to a fixed order independent of which type
//! happens to be attached first.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Identifies a component type within one scene.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize)]
pub struct ComponentTypeId(u32);

/// Identifies a system type within one scene.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize)]
pub struct SystemTypeId(u32);

impl ComponentTypeId {
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl SystemTypeId {
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl fmt::Display for SystemTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// One counter per kind of type.
#[derive(Default)]
struct IdTable {
    by_type: HashMap<TypeId, u32>,
    names: Vec<&'static str>,
}

impl IdTable {
    fn get_or_insert(&mut self, type_id: TypeId, name: &'static str) -> u32 {
        if let Some(&id) = self.by_type.get(&type_id) {
            return id;
        }
        let id = self.names.len() as u32;
        self.by_type.insert(type_id, id);
        self.names.push(name);
        id
    }

    fn get(&self, type_id: &TypeId) -> Option<u32> {
        self.by_type.get(type_id).copied()
    }

    fn name(&self, id: u32) -> Option<&'static str> {
        self.names.get(id as usize).copied()
    }
}

/// Assigns [`ComponentTypeId`]s and [`SystemTypeId`]s.
#[derive(Default)]
pub struct TypeRegistry {
    components: IdTable,
    systems: IdTable,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `T`, assigning the next one if `T` is new.
    pub fn component_id<T: 'static>(&mut self) -> ComponentTypeId {
        self.component_id_of(TypeId::of::<T>(), std::any::type_name::<T>())
    }

    /// Untyped form of [`component_id`](Self::component_id), for signatures
    /// that only carry a [`TypeId`].
    pub fn component_id_of(&mut self, type_id: TypeId, name: &'static str) -> ComponentTypeId {
        ComponentTypeId(self.components.get_or_insert(type_id, name))
    }

    /// Returns the id of `T` without assigning one.
    pub fn lookup_component<T: 'static>(&self) -> Option<ComponentTypeId> {
        self.components.get(&TypeId::of::<T>()).map(ComponentTypeId)
    }

    /// Returns the id of `T`, assigning the next one if `T` is new.
    pub fn system_id<T: 'static>(&mut self) -> SystemTypeId {
        SystemTypeId(
            self.systems
                .get_or_insert(TypeId::of::<T>(), std::any::type_name::<T>()),
        )
    }

    /// Returns the id of `T` without assigning one.
    pub fn lookup_system<T: 'static>(&self) -> Option<SystemTypeId> {
        self.systems.get(&TypeId::of::<T>()).map(SystemTypeId)
    }

    /// Short type name of a registered component, e.g. `Camera`.
    pub fn component_name(&self, id: ComponentTypeId) -> Option<String> {
        self.components.name(id.0).map(short_type_name)
    }

    /// Short type name of a registered system.
    pub fn system_name(&self, id: SystemTypeId) -> Option<String> {
        self.systems.name(id.0).map(short_type_name)
    }

    /// Number of component types seen so far.
    pub fn component_count(&self) -> usize {
        self.components.names.len()
    }

    /// All known component types in id order.
    pub fn components(&self) -> impl Iterator<Item = (ComponentTypeId, String)> + '_ {
        self.components
            .names
            .iter()
            .enumerate()
            .map(|(i, name)| (ComponentTypeId(i as u32), short_type_name(name)))
    }
}

/// Strip module paths from a type name, keeping generic arguments readable
/// (`my_game::Health` → `Health`, `Vec<my_game::Tag>` → `Vec<Tag>`).
pub(crate) fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    for (i, c) in full.char_indices() {
        if matches!(c, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&') {
            out.push_str(last_path_segment(&full[segment_start..i]));
            out.push(c);
            segment_start = i + c.len_utf8();
        }
    }
    out.push_str(last_path_segment(&full[segment_start..]));
    out
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;
    struct Sys;

    #[test]
    fn ids_follow_first_use_order() {
        let mut reg = TypeRegistry::new();
        let b = reg.component_id::<B>();
        let a = reg.component_id::<A>();
        assert_eq!(b.raw(), 0);
        assert_eq!(a.raw(), 1);
        assert_eq!(reg.component_id::<B>(), b);
        assert_eq!(reg.component_count(), 2);
    }

    #[test]
    fn lookup_does_not_assign() {
        let mut reg = TypeRegistry::new();
        assert_eq!(reg.lookup_component::<A>(), None);
        assert_eq!(reg.component_count(), 0);
        let a = reg.component_id::<A>();
        assert_eq!(reg.lookup_component::<A>(), Some(a));
    }

    #[test]
    fn component_and_system_counters_are_independent() {
        let mut reg = TypeRegistry::new();
        reg.component_id::<A>();
        reg.component_id::<B>();
        assert_eq!(reg.system_id::<Sys>().raw(), 0);
        assert_eq!(reg.lookup_system::<Sys>().map(SystemTypeId::raw), Some(0));
    }

    #[test]
    fn names_are_short() {
        let mut reg = TypeRegistry::new();
        let a = reg.component_id::<A>();
        assert_eq!(reg.component_name(a).as_deref(), Some("A"));
        let listed: Vec<_> = reg.components().collect();
        assert_eq!(listed, vec![(a, "A".to_string())]);
    }

    #[test]
    fn short_type_name_keeps_generics() {
        assert_eq!(short_type_name("my_game::Health"), "Health");
        assert_eq!(
            short_type_name("alloc::vec::Vec<my_game::Tag>"),
            "Vec<Tag>"
        );
        assert_eq!(
            short_type_name("std::collections::HashMap<u32, my_game::Tag>"),
            "HashMap<u32, Tag>"
        );
    }
}

//! # Scene — The Owner of Entities, Components, and Systems
//!
//! A [`Scene`] is the single owner of everything in the runtime:
//!
//! ```text
//! Scene
//!  ├─ allocator     EntityId pool (FIFO free-list)
//!  ├─ hierarchy     Entity nodes: parent/children, local + global transforms
//!  ├─ signatures    EntityId → {ComponentTypeId}
//!  ├─ stores        ComponentTypeId → Box<dyn ErasedStore>
//!  ├─ systems       SystemTypeId → SystemSlot { signatures, entity set, Box<dyn System> }
//!  └─ registry      TypeId → ComponentTypeId / SystemTypeId
//! ```
//!
//! External code never touches storage directly. Every structural change goes
//! through the scene so three invariants always hold:
//!
//! - an entity's signature lists exactly the component types in the stores,
//! - every system's entity set matches the signatures,
//! - parent and child links agree in both directions.
//!
//! ## Frame
//!
//! ```text
//! update(dt)
//!   time.advance(dt)
//!   Pass A  hierarchy.recompute_local_axes()
//!   Pass B  hierarchy.rebuild()
//!   for phase in [pre_update, update, late_update]:
//!       for system in registration order:
//!           system.phase(scene, snapshot of its entity set, dt)
//! ```
//!
//! ## Errors
//!
//! Misuse (dead ids, missing components, duplicate systems, exhausted pool)
//! panics with the matching [`SceneError`] message. Each panicking operation
//! has a `try_` form that returns the error instead. Every check runs before
//! the first write, so a failed call leaves the scene untouched.
//!
//! ## Comparison
//!
//! - **bevy_ecs**: archetype tables, systems are functions with typed queries,
//!   scheduling is data-driven.
//! - **arbor**: one dense store per component type, systems are trait objects
//!   that receive a list of matching ids and look components up by id.

use std::any::type_name;
use std::collections::{BTreeMap, BTreeSet, HashMap};
#[cfg(feature = "diagnostics")]
use std::time::Instant;

use crate::config::SceneConfig;
#[cfg(feature = "diagnostics")]
use crate::diag::{DiagSnapshot, EntityPoolSnapshot, FrameBudgetSnapshot, FrameStats, SystemTimingSnapshot};
use crate::error::{ReparentError, Result, SceneError};
use crate::math::{Quat, Transform, Vec3};
use crate::time::Time;

use super::component::{Component, ComponentStore, ErasedStore};
use super::entity::{EntityAllocator, EntityId};
use super::hierarchy::{Entity, Hierarchy};
use super::registry::{short_type_name, ComponentTypeId, SystemTypeId, TypeRegistry};
use super::signature::Signature;
use super::system::{Phase, System, SystemSlot};

/// Owns every entity, component store and system, and drives the frame.
pub struct Scene {
    config: SceneConfig,
    allocator: EntityAllocator,
    hierarchy: Hierarchy,
    signatures: HashMap<EntityId, Signature>,
    stores: HashMap<ComponentTypeId, Box<dyn ErasedStore>>,
    /// Keyed by id, so iteration follows registration order.
    systems: BTreeMap<SystemTypeId, SystemSlot>,
    registry: TypeRegistry,
    active_camera: Option<EntityId>,
    time: Time,
    started: bool,
    #[cfg(feature = "diagnostics")]
    stats: FrameStats,
}

impl Scene {
    /// Create a scene with the default capacities.
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create a scene with custom capacities.
    ///
    /// # Panics
    ///
    /// Panics if the config is invalid (see [`SceneConfig::validate`]).
    pub fn with_config(config: SceneConfig) -> Self {
        Self::try_with_config(config).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_with_config(config: SceneConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            allocator: EntityAllocator::new(config.max_entities),
            hierarchy: Hierarchy::new(),
            signatures: HashMap::new(),
            stores: HashMap::new(),
            systems: BTreeMap::new(),
            registry: TypeRegistry::new(),
            active_camera: None,
            time: Time::new(),
            started: false,
            #[cfg(feature = "diagnostics")]
            stats: FrameStats::default(),
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Read-only view of every entity node.
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    // ── Entity Lifecycle ─────────────────────────────────────────────

    /// Create a root entity with an identity transform and no components.
    ///
    /// # Panics
    ///
    /// Panics if the entity pool is exhausted.
    pub fn add_new_entity(&mut self) -> EntityMut<'_> {
        self.try_add_new_entity().unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_add_new_entity(&mut self) -> Result<EntityMut<'_>> {
        let id = self.allocator.try_allocate()?;
        self.signatures.insert(id, Signature::new());
        self.hierarchy.insert(id);
        self.recheck_membership(id);
        #[cfg(feature = "diagnostics")]
        {
            self.stats.spawned += 1;
        }
        log::debug!("entity {id} created");
        Ok(EntityMut { scene: self, id })
    }

    /// `true` if `id` names a live entity.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.signatures.contains_key(&id)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.signatures.len()
    }

    /// Live entity ids in ascending order.
    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.hierarchy.iter().map(Entity::id)
    }

    /// Returns an error unless `id` is in range and alive.
    fn check_alive(&self, id: EntityId) -> Result<()> {
        if !self.allocator.in_range(id) {
            return Err(SceneError::EntityOutOfRange {
                id,
                max: self.config.max_entities,
            });
        }
        if !self.is_alive(id) {
            return Err(SceneError::EntityNotFound(id));
        }
        Ok(())
    }

    fn expect_alive(&self, id: EntityId) {
        self.check_alive(id).unwrap_or_else(|e| panic!("{e}"));
    }

    /// The entity node for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range or not alive.
    pub fn entity(&self, id: EntityId) -> &Entity {
        self.try_entity(id).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_entity(&self, id: EntityId) -> Result<&Entity> {
        self.check_alive(id)?;
        self.hierarchy.get(id).ok_or(SceneError::EntityNotFound(id))
    }

    /// The entity node for `id`, or `None` if it isn't alive.
    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.hierarchy.get(id)
    }

    /// A mutable handle for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range or not alive.
    pub fn entity_mut(&mut self, id: EntityId) -> EntityMut<'_> {
        self.expect_alive(id);
        EntityMut { scene: self, id }
    }

    /// First entity (lowest id) with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.hierarchy.iter().find(|e| e.name() == name).map(Entity::id)
    }

    /// Like [`find_by_name`](Self::find_by_name), but panics if nothing matches.
    pub fn named(&self, name: &str) -> EntityId {
        self.find_by_name(name)
            .unwrap_or_else(|| panic!("no entity named {name:?}"))
    }

    /// Destroy `id` and its whole subtree. Returns how many entities were
    /// destroyed.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range or not alive.
    pub fn destroy_entity(&mut self, id: EntityId) -> usize {
        self.try_destroy_entity(id).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_destroy_entity(&mut self, id: EntityId) -> Result<usize> {
        self.check_alive(id)?;
        let doomed = self.hierarchy.subtree_children_first(id);
        for &e in &doomed {
            self.despawn_one(e)?;
        }
        log::debug!("entity {id} destroyed ({} total)", doomed.len());
        Ok(doomed.len())
    }

    /// Remove one entity from every table. Children must already be gone.
    fn despawn_one(&mut self, id: EntityId) -> Result<()> {
        if self.active_camera == Some(id) {
            self.active_camera = None;
            log::info!("active camera {id} destroyed; no camera is active");
        }
        self.hierarchy.remove(id);
        for store in self.stores.values_mut() {
            if store.erase_entity(id) {
                log::trace!("entity {id} -= {}", short_type_name(store.type_name()));
            }
        }
        for slot in self.systems.values_mut() {
            slot.entities.remove(&id);
        }
        self.signatures.remove(&id);
        self.allocator.try_release(id)?;
        #[cfg(feature = "diagnostics")]
        {
            self.stats.despawned += 1;
        }
        Ok(())
    }

    /// Drop every entity and component and hand out ids from 1 again.
    fn clear_entities(&mut self) {
        let removed = self.signatures.len();
        for store in self.stores.values_mut() {
            store.clear();
        }
        for slot in self.systems.values_mut() {
            slot.entities.clear();
        }
        self.signatures.clear();
        self.hierarchy.clear();
        self.allocator = EntityAllocator::new(self.config.max_entities);
        self.active_camera = None;
        #[cfg(feature = "diagnostics")]
        {
            self.stats.despawned += removed as u32;
        }
        log::debug!("cleared {removed} entities");
    }

    // ── Components ───────────────────────────────────────────────────

    /// Assign `T` its component id now, so ids don't depend on which type is
    /// attached first.
    pub fn register_component<T: Component>(&mut self) -> ComponentTypeId {
        let id = self.registry.component_id::<T>();
        self.store_entry::<T>();
        id
    }

    fn store_entry<T: Component>(&mut self) -> &mut ComponentStore<T> {
        let id = self.registry.component_id::<T>();
        let store = self
            .stores
            .entry(id)
            .or_insert_with(|| Box::new(ComponentStore::<T>::new()));
        match store.as_any_mut().downcast_mut::<ComponentStore<T>>() {
            Some(store) => store,
            None => unreachable!("store {id} does not hold {}", type_name::<T>()),
        }
    }

    /// All `T` components, or `None` if `T` was never registered.
    pub fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        let id = self.registry.lookup_component::<T>()?;
        self.stores.get(&id)?.as_any().downcast_ref::<ComponentStore<T>>()
    }

    pub fn store_mut<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        let id = self.registry.lookup_component::<T>()?;
        self.stores
            .get_mut(&id)?
            .as_any_mut()
            .downcast_mut::<ComponentStore<T>>()
    }

    /// Attach `component` to `id`. Returns `false` (keeping the existing
    /// value) if the entity already has a `T`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not alive or the entity is at the component limit.
    pub fn add_component<T: Component>(&mut self, id: EntityId, component: T) -> bool {
        self.try_add_component(id, component)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_add_component<T: Component>(&mut self, id: EntityId, component: T) -> Result<bool> {
        self.check_alive(id)?;
        let type_id = self.registry.component_id::<T>();
        let signature = &self.signatures[&id];
        let max = self.config.max_components_per_entity;
        if !signature.contains(type_id) && signature.len() >= max {
            return Err(SceneError::ComponentLimit { id, max });
        }

        let inserted = self.store_entry::<T>().insert(id, component);
        if let Some(signature) = self.signatures.get_mut(&id) {
            signature.insert(type_id);
        }
        self.recheck_membership(id);
        log::trace!("entity {id} += {}", short_type_name(type_name::<T>()));
        Ok(inserted)
    }

    /// Detach and return `id`'s `T`. A missing component is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not alive.
    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> Option<T> {
        self.try_remove_component(id).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_remove_component<T: Component>(&mut self, id: EntityId) -> Result<Option<T>> {
        self.check_alive(id)?;
        let removed = match self.registry.lookup_component::<T>() {
            Some(type_id) => {
                if let Some(signature) = self.signatures.get_mut(&id) {
                    signature.remove(type_id);
                }
                self.store_mut::<T>().and_then(|store| store.erase(id))
            }
            None => None,
        };
        self.recheck_membership(id);
        if removed.is_some() {
            log::trace!("entity {id} -= {}", short_type_name(type_name::<T>()));
        }
        Ok(removed)
    }

    /// # Panics
    ///
    /// Panics if `id` is not alive.
    pub fn has_component<T: Component>(&self, id: EntityId) -> bool {
        self.expect_alive(id);
        self.registry
            .lookup_component::<T>()
            .is_some_and(|type_id| self.signatures[&id].contains(type_id))
    }

    /// `id`'s `T`, or `None` if it has none.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not alive.
    pub fn get_component<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.expect_alive(id);
        self.store::<T>()?.get(id)
    }

    pub fn get_component_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.expect_alive(id);
        self.store_mut::<T>()?.get_mut(id)
    }

    /// `id`'s `T`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not alive or has no `T`.
    pub fn component<T: Component>(&self, id: EntityId) -> &T {
        self.try_component(id).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_component<T: Component>(&self, id: EntityId) -> Result<&T> {
        self.check_alive(id)?;
        self.store::<T>()
            .and_then(|store| store.get(id))
            .ok_or(SceneError::ComponentMissing {
                id,
                component: type_name::<T>(),
            })
    }

    /// `id`'s `T`, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not alive or has no `T`.
    pub fn component_mut<T: Component>(&mut self, id: EntityId) -> &mut T {
        self.try_component_mut(id).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_component_mut<T: Component>(&mut self, id: EntityId) -> Result<&mut T> {
        self.check_alive(id)?;
        self.store_mut::<T>()
            .and_then(|store| store.get_mut(id))
            .ok_or(SceneError::ComponentMissing {
                id,
                component: type_name::<T>(),
            })
    }

    /// The component types attached to `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not alive.
    pub fn signature(&self, id: EntityId) -> &Signature {
        self.expect_alive(id);
        &self.signatures[&id]
    }

    /// Re-test `id` against every system and fix up their entity sets.
    fn recheck_membership(&mut self, id: EntityId) {
        let Some(signature) = self.signatures.get(&id) else {
            return;
        };
        for slot in self.systems.values_mut() {
            slot.recheck(id, signature);
        }
    }

    // ── Systems ──────────────────────────────────────────────────────

    /// Register a default-constructed `S`.
    ///
    /// # Panics
    ///
    /// Panics if `S` is already registered.
    pub fn register_system<S: System + Default>(&mut self) -> SystemTypeId {
        self.add_system(S::default())
    }

    /// Register `system`. Its entity set is filled from the current
    /// signatures, and it is started right away if the scene already started.
    ///
    /// # Panics
    ///
    /// Panics if a system of the same type is already registered.
    pub fn add_system<S: System>(&mut self, system: S) -> SystemTypeId {
        self.try_add_system(system).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_add_system<S: System>(&mut self, system: S) -> Result<SystemTypeId> {
        let id = self.registry.system_id::<S>();
        if self.systems.contains_key(&id) {
            return Err(SceneError::SystemAlreadyRegistered(type_name::<S>()));
        }

        let signatures = system.signature().resolve(&mut self.registry);
        let name = short_type_name(type_name::<S>());
        let mut slot = SystemSlot::new(id, name, signatures, Box::new(system));
        for (&entity, signature) in &self.signatures {
            slot.recheck(entity, signature);
        }
        log::info!(
            "system {} registered as {} ({} entities)",
            slot.name,
            slot.id,
            slot.entities.len()
        );
        self.systems.insert(id, slot);

        if self.started {
            self.start_system(id);
        }
        Ok(id)
    }

    /// Remove `S`, calling its `destroy` hook if it had been started, and
    /// return it.
    ///
    /// # Panics
    ///
    /// Panics if `S` isn't registered or is currently running.
    pub fn unregister_system<S: System>(&mut self) -> Box<S> {
        self.try_unregister_system::<S>()
            .unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_unregister_system<S: System>(&mut self) -> Result<Box<S>> {
        let name = type_name::<S>();
        let id = self
            .registry
            .lookup_system::<S>()
            .filter(|id| self.systems.contains_key(id))
            .ok_or(SceneError::SystemNotRegistered(name))?;
        if self.systems[&id].system.is_none() {
            return Err(SceneError::SystemBusy(name));
        }

        let slot = self
            .systems
            .remove(&id)
            .ok_or(SceneError::SystemNotRegistered(name))?;
        let mut system = slot.system.ok_or(SceneError::SystemBusy(name))?;
        if slot.started {
            system.destroy(self);
        }
        log::info!("system {} unregistered", slot.name);
        system
            .into_any()
            .downcast::<S>()
            .map_err(|_| SceneError::SystemNotRegistered(name))
    }

    /// The registered `S`, or `None` if it isn't registered or is running.
    pub fn system<S: System>(&self) -> Option<&S> {
        let id = self.registry.lookup_system::<S>()?;
        self.systems.get(&id)?.downcast_ref::<S>()
    }

    pub fn system_mut<S: System>(&mut self) -> Option<&mut S> {
        let id = self.registry.lookup_system::<S>()?;
        self.systems.get_mut(&id)?.downcast_mut::<S>()
    }

    pub fn has_system<S: System>(&self) -> bool {
        self.registry
            .lookup_system::<S>()
            .is_some_and(|id| self.systems.contains_key(&id))
    }

    /// Entities currently matching `S`'s signature, or `None` if `S` isn't
    /// registered.
    pub fn system_entities<S: System>(&self) -> Option<&BTreeSet<EntityId>> {
        let id = self.registry.lookup_system::<S>()?;
        Some(&self.systems.get(&id)?.entities)
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Take system `id` out of its slot, run `f`, and put it back if the slot
    /// still exists. `None` if there is no such system or it is already out.
    fn with_system<R>(
        &mut self,
        id: SystemTypeId,
        f: impl FnOnce(&mut Box<dyn System>, &mut Scene) -> R,
    ) -> Option<R> {
        let mut system = self.systems.get_mut(&id)?.system.take()?;
        let result = f(&mut system, self);
        if let Some(slot) = self.systems.get_mut(&id) {
            slot.system = Some(system);
        }
        Some(result)
    }

    fn start_system(&mut self, id: SystemTypeId) {
        match self.systems.get_mut(&id) {
            Some(slot) if !slot.started => slot.started = true,
            _ => return,
        }
        self.with_system(id, |system, scene| system.start(scene));
    }

    // ── Frame ────────────────────────────────────────────────────────

    /// Call `start` on every system that hasn't started yet. Systems
    /// registered afterwards start on registration.
    pub fn start(&mut self) {
        self.started = true;
        let ids: Vec<SystemTypeId> = self.systems.keys().copied().collect();
        for id in ids {
            self.start_system(id);
        }
        log::info!("scene started with {} systems", self.systems.len());
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Run one frame with a caller-supplied delta in seconds.
    pub fn update(&mut self, dt: f32) {
        self.time.advance(dt);
        self.run_frame(self.time.delta_secs());
    }

    /// Run one frame, measuring the delta from the wall clock.
    pub fn tick(&mut self) {
        let dt = self.time.tick();
        self.run_frame(dt);
    }

    fn run_frame(&mut self, dt: f32) {
        self.rebuild_hierarchy();

        let ids: Vec<SystemTypeId> = self.systems.keys().copied().collect();
        #[cfg(feature = "diagnostics")]
        {
            for slot in self.systems.values_mut() {
                slot.frame_us = 0.0;
            }
        }

        for phase in Phase::FRAME {
            for &id in &ids {
                #[cfg(feature = "diagnostics")]
                let start = Instant::now();

                self.with_system(id, |system, scene| {
                    let entities = scene
                        .systems
                        .get(&id)
                        .map(SystemSlot::snapshot)
                        .unwrap_or_default();
                    phase.run(system, scene, &entities, dt);
                });

                #[cfg(feature = "diagnostics")]
                {
                    if let Some(slot) = self.systems.get_mut(&id) {
                        slot.frame_us += start.elapsed().as_secs_f64() * 1_000_000.0;
                    }
                }
            }
        }
    }

    /// Pass A then Pass B, without running systems. Returns how many entities
    /// had their globals recomputed.
    pub fn rebuild_hierarchy(&mut self) -> usize {
        #[cfg(feature = "diagnostics")]
        let start = Instant::now();

        self.hierarchy.recompute_local_axes();
        let recomputed = self.hierarchy.rebuild();

        #[cfg(feature = "diagnostics")]
        {
            self.stats.hierarchy_us = start.elapsed().as_secs_f64() * 1_000_000.0;
            self.stats.recomputed_nodes = recomputed;
        }
        recomputed
    }

    /// Destroy every entity, clear the active camera and the clock, and reset
    /// every system. Systems stay registered.
    pub fn reset(&mut self) {
        self.clear_entities();
        self.time.reset();
        for slot in self.systems.values_mut() {
            if let Some(system) = slot.system.as_mut() {
                system.reset();
            }
        }
        log::info!("scene reset");
    }

    /// Destroy every entity, call `destroy` on every started system, and
    /// unregister all systems.
    pub fn shutdown(&mut self) {
        self.clear_entities();
        let ids: Vec<SystemTypeId> = self.systems.keys().copied().collect();
        for id in ids {
            let started = self.systems.get(&id).is_some_and(|slot| slot.started);
            if started {
                self.with_system(id, |system, scene| system.destroy(scene));
            }
            if let Some(slot) = self.systems.remove(&id) {
                if slot.system.is_none() {
                    log::warn!("system {} removed while running", slot.name);
                }
            }
        }
        self.started = false;
        log::info!("scene shut down");
    }

    // ── Transforms ───────────────────────────────────────────────────

    /// # Panics
    ///
    /// Panics if `id` is not alive.
    pub fn set_global_position(&mut self, id: EntityId, position: Vec3) {
        self.expect_alive(id);
        self.hierarchy.set_global_position(id, position);
    }

    pub fn set_global_rotation(&mut self, id: EntityId, rotation: Quat) {
        self.expect_alive(id);
        self.hierarchy.set_global_rotation(id, rotation);
    }

    pub fn set_global_scale(&mut self, id: EntityId, scale: Vec3) {
        self.expect_alive(id);
        self.hierarchy.set_global_scale(id, scale);
    }

    /// Make `child` the last child of `parent`, keeping its world pose.
    /// Refusals (self, cycle, duplicate) are logged and change nothing.
    ///
    /// # Panics
    ///
    /// Panics if either entity is not alive.
    pub fn assign_child(&mut self, parent: EntityId, child: EntityId) -> std::result::Result<(), ReparentError> {
        self.expect_alive(parent);
        self.expect_alive(child);
        self.hierarchy.assign_child(parent, child)
    }

    /// Turn `child` into a root, keeping its world pose. Returns `false` if it
    /// already was one.
    pub fn detach(&mut self, child: EntityId) -> bool {
        self.expect_alive(child);
        self.hierarchy.detach(child)
    }

    /// Root entities as of the last rebuild.
    pub fn hierarchy_roots(&self) -> &[EntityId] {
        self.hierarchy.roots()
    }

    // ── Active Camera ────────────────────────────────────────────────

    /// Mark `id` as the active camera. Returns `false` (and logs) if `id`
    /// isn't alive.
    pub fn set_active_camera(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            log::warn!("cannot make entity {id} the active camera: not alive");
            return false;
        }
        self.active_camera = Some(id);
        true
    }

    pub fn clear_active_camera(&mut self) {
        self.active_camera = None;
    }

    pub fn active_camera(&self) -> Option<EntityId> {
        self.active_camera
    }

    // ── Diagnostics ──────────────────────────────────────────────────

    /// Metrics for the last frame. Resets the spawn/despawn counters.
    #[cfg(feature = "diagnostics")]
    pub fn diagnostics_snapshot(&mut self) -> DiagSnapshot {
        let systems: Vec<SystemTimingSnapshot> = self
            .systems
            .values()
            .map(|slot| SystemTimingSnapshot {
                name: slot.name.clone(),
                entity_count: slot.entities.len(),
                duration_us: slot.frame_us,
            })
            .collect();
        let systems_us = systems.iter().map(|s| s.duration_us).sum();

        let snapshot = DiagSnapshot {
            frame_count: self.time.frame_count(),
            fps: self.time.fps(),
            delta_ms: self.time.delta_secs() * 1000.0,
            entity_count: self.entity_count(),
            root_count: self.hierarchy.roots().len(),
            component_type_count: self.registry.component_count(),
            entity_pool: EntityPoolSnapshot {
                total_slots: self.allocator.capacity(),
                free_count: self.allocator.free_count(),
                alive_count: self.allocator.alive_count(),
                spawned_this_frame: self.stats.spawned,
                despawned_this_frame: self.stats.despawned,
            },
            systems,
            frame_budget: FrameBudgetSnapshot {
                hierarchy_us: self.stats.hierarchy_us,
                systems_us,
                recomputed_nodes: self.stats.recomputed_nodes,
            },
        };
        self.stats.reset_counts();
        snapshot
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        if self.started && !std::thread::panicking() {
            self.shutdown();
        }
    }
}

// ── EntityMut ───────────────────────────────────────────────────────

/// A mutable handle to one live entity, borrowed from its [`Scene`].
///
/// Setters return `&mut Self` so they chain:
///
/// ```ignore
/// let sun = scene
///     .add_new_entity()
///     .set_name("Sun")
///     .set_local_scale(Vec3::splat(4.0))
///     .insert(Mass(1.0e6))
///     .id();
/// ```
pub struct EntityMut<'a> {
    scene: &'a mut Scene,
    id: EntityId,
}

impl EntityMut<'_> {
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The hierarchy node.
    pub fn get(&self) -> &Entity {
        self.scene.entity(self.id)
    }

    pub fn name(&self) -> &str {
        self.get().name()
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.scene.hierarchy.set_name(self.id, name.into());
        self
    }

    // ── Local transform ──

    pub fn set_local_position(&mut self, position: Vec3) -> &mut Self {
        self.scene.hierarchy.set_local_position(self.id, position);
        self
    }

    pub fn set_local_rotation(&mut self, rotation: Quat) -> &mut Self {
        self.scene.hierarchy.set_local_rotation(self.id, rotation);
        self
    }

    pub fn set_local_scale(&mut self, scale: Vec3) -> &mut Self {
        self.scene.hierarchy.set_local_scale(self.id, scale);
        self
    }

    pub fn set_local_transform(&mut self, transform: Transform) -> &mut Self {
        self.scene.hierarchy.set_local_transform(self.id, transform);
        self
    }

    // ── Global transform ──

    pub fn set_global_position(&mut self, position: Vec3) -> &mut Self {
        self.scene.hierarchy.set_global_position(self.id, position);
        self
    }

    pub fn set_global_rotation(&mut self, rotation: Quat) -> &mut Self {
        self.scene.hierarchy.set_global_rotation(self.id, rotation);
        self
    }

    pub fn set_global_scale(&mut self, scale: Vec3) -> &mut Self {
        self.scene.hierarchy.set_global_scale(self.id, scale);
        self
    }

    // ── Components ──

    /// Attach `component`, keeping any existing `T`.
    ///
    /// # Panics
    ///
    /// Panics if the entity is at the component limit.
    pub fn insert<T: Component>(&mut self, component: T) -> &mut Self {
        self.scene.add_component(self.id, component);
        self
    }

    pub fn remove<T: Component>(&mut self) -> Option<T> {
        self.scene.remove_component::<T>(self.id)
    }

    pub fn has<T: Component>(&self) -> bool {
        self.scene.has_component::<T>(self.id)
    }

    pub fn component<T: Component>(&self) -> Option<&T> {
        self.scene.get_component::<T>(self.id)
    }

    pub fn component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.scene.get_component_mut::<T>(self.id)
    }

    // ── Hierarchy ──

    /// Attach `child` under this entity, keeping its world pose.
    pub fn add_child(&mut self, child: EntityId) -> std::result::Result<&mut Self, ReparentError> {
        self.scene.assign_child(self.id, child)?;
        Ok(self)
    }

    /// Destroy this entity and its subtree. Returns how many were destroyed.
    pub fn destroy(self) -> usize {
        self.scene.destroy_entity(self.id)
    }
}

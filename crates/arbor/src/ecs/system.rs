//! # System — Per-Frame Logic Over a Signature-Matched Entity Set
//!
//! A system declares which entities it cares about through a
//! [`SystemSignature`], and the [`Scene`] keeps the matching id-set up to date
//! every time a component is attached or detached. Each frame the scene calls
//! every system's [`pre_update`](System::pre_update), then every
//! [`update`](System::update), then every [`late_update`](System::late_update).
//!
//! ## Borrowing
//!
//! A system needs `&mut Scene` to read and write components, but the scene
//! also owns the system. The scene resolves this with the extract/reinsert
//! pattern: the boxed system is taken out of its slot for the duration of the
//! call and put back afterwards.
//!
//! ```text
//! slot.system.take()  → call system.update(scene, &snapshot, dt) → slot.system = Some(..)
//! ```
//!
//! While a system runs it is invisible to
//! [`Scene::system`](super::scene::Scene::system) and cannot be unregistered.
//!
//! The entity list passed in is a snapshot taken right before the call.
//! Adding or removing components (or destroying entities) mid-call updates the
//! live set, not the snapshot, so a system must check
//! [`Scene::is_alive`](super::scene::Scene::is_alive) before touching an
//! entity it may have destroyed itself.

use std::any::Any;
use std::collections::BTreeSet;

use super::entity::EntityId;
use super::registry::SystemTypeId;
use super::scene::Scene;
use super::signature::{Signature, SystemSignature};

/// Upcast helper so boxed systems can be downcast to their concrete type.
///
/// Blanket-implemented; never implement it by hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Logic that runs once per frame over the entities matching its signature.
///
/// Only [`signature`](Self::signature) and [`update`](Self::update) are
/// required; every other hook defaults to doing nothing.
pub trait System: AsAny {
    /// The component types this system is interested in. Called once, at
    /// registration.
    fn signature(&self) -> SystemSignature;

    /// Called once, from [`Scene::start`](super::scene::Scene::start) or on
    /// registration into an already-started scene.
    fn start(&mut self, _scene: &mut Scene) {}

    /// Refresh read-only state before any system updates.
    fn pre_update(&mut self, _scene: &mut Scene, _entities: &[EntityId], _dt: f32) {}

    fn update(&mut self, scene: &mut Scene, entities: &[EntityId], dt: f32);

    /// Runs after every system's `update`.
    fn late_update(&mut self, _scene: &mut Scene, _entities: &[EntityId], _dt: f32) {}

    /// Release resources. Called on unregistration and scene shutdown, only
    /// for systems that were started.
    fn destroy(&mut self, _scene: &mut Scene) {}

    /// Reset internal state. Called by [`Scene::reset`](super::scene::Scene::reset).
    fn reset(&mut self) {}
}

/// Which per-frame hook to run.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Phase {
    PreUpdate,
    Update,
    LateUpdate,
}

impl Phase {
    pub(crate) const FRAME: [Phase; 3] = [Phase::PreUpdate, Phase::Update, Phase::LateUpdate];

    pub(crate) fn run(self, system: &mut Box<dyn System>, scene: &mut Scene, entities: &[EntityId], dt: f32) {
        match self {
            Phase::PreUpdate => system.pre_update(scene, entities, dt),
            Phase::Update => system.update(scene, entities, dt),
            Phase::LateUpdate => system.late_update(scene, entities, dt),
        }
    }
}

/// A registered system plus the bookkeeping the scene keeps for it.
pub(crate) struct SystemSlot {
    pub id: SystemTypeId,
    pub name: String,
    pub require_all: Signature,
    pub require_one: Signature,
    /// Entities currently matching both signatures.
    pub entities: BTreeSet<EntityId>,
    /// `None` while the system is executing.
    pub system: Option<Box<dyn System>>,
    pub started: bool,
    /// Time spent in this system's hooks during the last frame.
    #[cfg(feature = "diagnostics")]
    pub frame_us: f64,
}

impl SystemSlot {
    pub fn new(
        id: SystemTypeId,
        name: String,
        (require_all, require_one): (Signature, Signature),
        system: Box<dyn System>,
    ) -> Self {
        Self {
            id,
            name,
            require_all,
            require_one,
            entities: BTreeSet::new(),
            system: Some(system),
            started: false,
            #[cfg(feature = "diagnostics")]
            frame_us: 0.0,
        }
    }

    /// Add `entity` if `signature` satisfies this system, remove it otherwise.
    pub fn recheck(&mut self, entity: EntityId, signature: &Signature) {
        if super::signature::belongs_to(signature, &self.require_all, &self.require_one) {
            self.entities.insert(entity);
        } else {
            self.entities.remove(&entity);
        }
    }

    pub fn snapshot(&self) -> Vec<EntityId> {
        self.entities.iter().copied().collect()
    }

    /// Borrow the boxed system as its concrete type.
    pub fn downcast_ref<S: System>(&self) -> Option<&S> {
        self.system.as_deref()?.as_any().downcast_ref::<S>()
    }

    pub fn downcast_mut<S: System>(&mut self) -> Option<&mut S> {
        self.system.as_deref_mut()?.as_any_mut().downcast_mut::<S>()
    }
}

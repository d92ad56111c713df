//! # Scene Snapshots — Saving and Restoring the Entity Tree
//!
//! A [`SceneSnapshot`] records every live entity's id, name, parent and world
//! pose, plus the active camera. Component data is not captured: components
//! are arbitrary user types, and serializing them is up to the caller.
//!
//! Restoring rebuilds the tree parent-first, so each entity's world pose can
//! be applied before it is attached to its (already placed) parent:
//!
//! ```text
//! snapshot:  [#4 "Sun" ─ #9 "Earth" ─ #12 "Moon"]
//! restore:   reset → create "Sun" (#1), set pose
//!                  → create "Earth" (#2), set pose, attach to #1
//!                  → create "Moon" (#3), set pose, attach to #2
//! returns:   {4→1, 9→2, 12→3}
//! ```
//!
//! Ids are not preserved; use the returned map to translate any ids stored
//! elsewhere.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::ecs::{EntityId, Scene};
use crate::error::{Result, SceneError};
use crate::math::{Quat, Vec3};

/// One entity as captured by [`Scene::snapshot`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EntityRecord {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<EntityId>,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

/// The entity tree of a scene at one point in time.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SceneSnapshot {
    pub entities: Vec<EntityRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_camera: Option<EntityId>,
}

impl SceneSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Records ordered so every parent comes before its children. Records
    /// whose parent chain never reaches a root are dropped.
    fn parent_first(&self) -> Vec<&EntityRecord> {
        let known: HashSet<EntityId> = self.entities.iter().map(|r| r.id).collect();
        let mut children: HashMap<EntityId, Vec<&EntityRecord>> = HashMap::new();
        let mut queue: VecDeque<&EntityRecord> = VecDeque::new();
        for record in &self.entities {
            match record.parent.filter(|p| known.contains(p)) {
                Some(parent) => children.entry(parent).or_default().push(record),
                None => queue.push_back(record),
            }
        }

        let mut ordered = Vec::with_capacity(self.entities.len());
        while let Some(record) = queue.pop_front() {
            ordered.push(record);
            if let Some(kids) = children.remove(&record.id) {
                queue.extend(kids);
            }
        }
        ordered
    }
}

impl Scene {
    /// Capture the entity tree. Records are in id order; globals are the
    /// cached values, so call after a frame (or a rebuild) for fresh poses.
    pub fn snapshot(&self) -> SceneSnapshot {
        let entities = self
            .hierarchy()
            .iter()
            .map(|e| EntityRecord {
                id: e.id(),
                name: e.name().to_string(),
                parent: e.parent(),
                position: e.position(),
                rotation: e.rotation(),
                scale: e.scale(),
            })
            .collect();
        SceneSnapshot {
            entities,
            active_camera: self.active_camera(),
        }
    }

    /// Replace the scene's entities with the snapshot's. Systems stay
    /// registered (and are reset). Returns the old → new id map.
    ///
    /// # Panics
    ///
    /// Panics if the snapshot holds more entities than the scene can.
    pub fn restore(&mut self, snapshot: &SceneSnapshot) -> HashMap<EntityId, EntityId> {
        self.try_restore(snapshot).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Like [`Scene::restore`], but a snapshot that does not fit is refused
    /// with [`SceneError::PoolExhausted`] and the scene is left untouched.
    pub fn try_restore(&mut self, snapshot: &SceneSnapshot) -> Result<HashMap<EntityId, EntityId>> {
        let ordered = snapshot.parent_first();
        let capacity = self.config().max_entities;
        if ordered.len() > capacity {
            return Err(SceneError::PoolExhausted { capacity });
        }
        self.reset();

        if ordered.len() < snapshot.entities.len() {
            log::warn!(
                "snapshot has {} entities outside any tree; skipped",
                snapshot.entities.len() - ordered.len()
            );
        }

        let mut remap = HashMap::with_capacity(ordered.len());
        for record in ordered {
            let id = self
                .try_add_new_entity()?
                .set_name(record.name.clone())
                .set_global_position(record.position)
                .set_global_rotation(record.rotation)
                .set_global_scale(record.scale)
                .id();
            if let Some(parent) = record.parent.and_then(|p| remap.get(&p).copied()) {
                // `id` is a fresh root, so this is never refused.
                let _ = self.assign_child(parent, id);
            }
            remap.insert(record.id, id);
        }

        if let Some(camera) = snapshot.active_camera {
            match remap.get(&camera) {
                Some(&id) => {
                    self.set_active_camera(id);
                }
                None => log::warn!("snapshot camera {camera} was not restored"),
            }
        }
        log::info!("restored {} entities from snapshot", remap.len());
        Ok(remap)
    }
}

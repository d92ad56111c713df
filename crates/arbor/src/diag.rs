//! Per-frame scene diagnostics.
//!
//! Enabled by the `diagnostics` feature flag (on by default). While active, the
//! [`Scene`](crate::ecs::Scene) times the hierarchy passes and every system
//! hook, and counts entities created and destroyed since the last snapshot.
//! [`Scene::diagnostics_snapshot`](crate::ecs::Scene::diagnostics_snapshot)
//! packages the numbers as a [`DiagSnapshot`] and resets the counters.
//!
//! The snapshot serializes to JSON for tooling:
//!
//! ```text
//! { "frame_count": 120, "fps": 59.8, "entity_count": 42, "root_count": 3,
//!   "entity_pool": { "total_slots": 5000, "free_count": 4958, ... },
//!   "systems": [ { "name": "Orbit", "entity_count": 8, "duration_us": 3.1 } ],
//!   "frame_budget": { "hierarchy_us": 12.0, "systems_us": 3.1 } }
//! ```

use serde::Serialize;

// ── Snapshot types (wire format) ────────────────────────────────────────

/// One frame's worth of scene metrics.
#[derive(Serialize, Clone, Debug)]
pub struct DiagSnapshot {
    pub frame_count: u64,
    pub fps: f32,
    pub delta_ms: f32,
    pub entity_count: usize,
    pub root_count: usize,
    pub component_type_count: usize,
    pub entity_pool: EntityPoolSnapshot,
    pub systems: Vec<SystemTimingSnapshot>,
    pub frame_budget: FrameBudgetSnapshot,
}

impl DiagSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct EntityPoolSnapshot {
    pub total_slots: usize,
    pub free_count: usize,
    pub alive_count: usize,
    pub spawned_this_frame: u32,
    pub despawned_this_frame: u32,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SystemTimingSnapshot {
    pub name: String,
    /// Entities currently matching the system's signature.
    pub entity_count: usize,
    /// Time spent in the system's hooks during the last frame.
    pub duration_us: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct FrameBudgetSnapshot {
    /// Pass A + Pass B.
    pub hierarchy_us: f64,
    pub systems_us: f64,
    /// Nodes whose globals were recomputed by the last rebuild.
    pub recomputed_nodes: usize,
}

// ── Internal counters ───────────────────────────────────────────────────

/// Counters the scene accumulates between snapshots.
#[derive(Default, Clone, Debug)]
pub(crate) struct FrameStats {
    pub spawned: u32,
    pub despawned: u32,
    pub hierarchy_us: f64,
    pub recomputed_nodes: usize,
}

impl FrameStats {
    /// Clear the spawn/despawn counters. Timings describe the last frame and
    /// are overwritten by the next one.
    pub fn reset_counts(&mut self) {
        self.spawned = 0;
        self.despawned = 0;
    }
}

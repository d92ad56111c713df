//! # Arbor — Scene Runtime for Hierarchical 3D Worlds
//!
//! An entity/component/system core with parent-relative transforms. A
//! [`Scene`](ecs::Scene) owns every entity, component and system; each frame it
//! turns local transforms into world transforms and then runs the systems.
//!
//! Start with `use arbor::prelude::*` and build a [`Scene`](ecs::Scene).
//!
//! ```ignore
//! let mut scene = Scene::new();
//! let sun = scene.add_new_entity().set_name("Sun").id();
//! let earth = scene
//!     .add_new_entity()
//!     .set_local_position(Vec3::new(10.0, 0.0, 0.0))
//!     .id();
//! scene.assign_child(sun, earth)?;
//! scene.update(1.0 / 60.0);
//! ```

pub mod config;
pub mod ecs;
pub mod error;
pub mod math;
pub mod prelude;
pub mod snapshot;
pub mod time;

#[cfg(feature = "diagnostics")]
pub mod diag;

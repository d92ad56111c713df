//! Common imports: `use arbor::prelude::*;`

pub use crate::config::SceneConfig;
pub use crate::ecs::{
    Component, ComponentStore, Entity, EntityId, EntityMut, Scene, System, SystemSignature,
};
pub use crate::error::{ReparentError, SceneError};
pub use crate::math::{Basis, Quat, Transform, Vec3};
pub use crate::snapshot::SceneSnapshot;
pub use crate::time::Time;

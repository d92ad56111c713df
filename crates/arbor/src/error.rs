//! # Error Types
//!
//! Two families of failure:
//!
//! - [`SceneError`] — a logic error in calling code (out-of-range id, missing
//!   entity, exhausted pool, duplicate system). The panicking API surfaces these
//!   as panics carrying the error's message; every such call also has a `try_`
//!   form returning the error instead.
//! - [`ReparentError`] — a refused re-parent. Logged, returned, and leaves the
//!   hierarchy untouched.

use thiserror::Error;

use crate::ecs::entity::EntityId;

/// Errors raised by [`Scene`](crate::ecs::Scene) and its building blocks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The id is the invalid sentinel or larger than the configured capacity.
    #[error("entity id {id} out of range (max {max})")]
    EntityOutOfRange { id: EntityId, max: usize },

    /// The id is in range but no live entity owns it.
    #[error("entity {0} does not exist")]
    EntityNotFound(EntityId),

    /// Every id in the pool is in use.
    #[error("entity pool exhausted ({capacity} live entities)")]
    PoolExhausted { capacity: usize },

    /// An id was handed back to the allocator without being allocated.
    #[error("cannot release entity id {0}: not currently allocated")]
    InvalidRelease(EntityId),

    /// The entity already carries the maximum number of components.
    #[error("entity {id} reached the component limit ({max})")]
    ComponentLimit { id: EntityId, max: usize },

    /// The entity has no component of the requested type.
    #[error("entity {id} has no `{component}` component")]
    ComponentMissing { id: EntityId, component: &'static str },

    #[error("system `{0}` already registered")]
    SystemAlreadyRegistered(&'static str),

    #[error("system `{0}` not registered")]
    SystemNotRegistered(&'static str),

    /// The system is executing and its instance is checked out of the scene.
    #[error("system `{0}` is running")]
    SystemBusy(&'static str),

    /// Parent/child links disagree with each other.
    #[error("hierarchy inconsistent: {0}")]
    InconsistentHierarchy(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Reasons a re-parent request is refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReparentError {
    #[error("entity {0} cannot be its own parent")]
    SelfParent(EntityId),

    /// The would-be child is an ancestor of the would-be parent.
    #[error("entity {child} is an ancestor of entity {parent}")]
    WouldCycle { parent: EntityId, child: EntityId },

    #[error("entity {child} is already a child of entity {parent}")]
    AlreadyChild { parent: EntityId, child: EntityId },
}

pub type Result<T, E = SceneError> = std::result::Result<T, E>;

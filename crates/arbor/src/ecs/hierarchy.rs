//! # Entity Hierarchies — Parent/Child Relationships and Transform Propagation
//!
//! Every entity is a node in a forest owned by [`Hierarchy`]. Nodes refer to
//! each other by [`EntityId`], never by reference, so the arena is the single
//! owner and cycle checks are a plain walk over ids.
//!
//! Each node stores two transforms:
//!
//! - **local** — position, rotation and scale relative to the parent's frame
//!   (or the world frame for roots). This is what callers normally edit.
//! - **global** — the cached world-space result, plus the world-space basis
//!   (`forward`/`up`/`left`).
//!
//! ## Per-Frame Update
//!
//! ```text
//! Pass A  recompute_local_axes   every node:  orientation = parent_orientation ⊗ local_rotation
//!                                             axes        = orientation · world axes
//! Pass B  rebuild                BFS from roots, flag = parent_flag || node.dirty
//!                                flag set:    position = M_world⁻¹ · M_parent · local + parent_position
//!                                             rotation = parent_orientation ⊗ local_rotation
//!                                             scale    = parent_scale × local_scale
//!                                             dirty    = false
//!                                flag clear:  cached globals untouched
//! ```
//!
//! Pass A visits every node because a node's orientation depends on its whole
//! ancestor chain. Pass B only rewrites dirty subtrees.
//!
//! ## Global Setters
//!
//! [`Hierarchy::set_global_position`] and friends write the global cache
//! immediately (so reads before the next rebuild see the new value) and
//! back-solve the local value against the parent's current state, so the next
//! rebuild reproduces the same global value.
//!
//! Position and scale are solved against the parent's cached globals (the
//! last rebuilt state, plus any global setter applied to the parent since).
//! Rotation is solved against the composed chain of ancestor local rotations,
//! which is exactly what Pass B multiplies by.
//!
//! ## Comparison
//!
//! - **bevy_transform**: `GlobalTransform = parent_global * local` as affine
//!   matrices; change detection decides what to propagate.
//! - **arbor**: positions go through explicit basis matrices and never pick up
//!   parent scale; a per-node dirty flag decides what to propagate.

use std::collections::VecDeque;

use crate::error::{ReparentError, SceneError};
use crate::math::{Basis, Mat4, Quat, Transform, Vec3};

use super::entity::EntityId;

/// One node of the hierarchy: identity, relations, and transforms.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    name: String,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
    local: Transform,
    global: Transform,
    /// World orientation composed from local rotations (Pass A).
    orientation: Quat,
    axes: Basis,
    dirty: bool,
}

impl Entity {
    fn new(id: EntityId) -> Self {
        Self {
            id,
            name: format!("Entity {id}"),
            parent: None,
            children: Vec::new(),
            local: Transform::IDENTITY,
            global: Transform::IDENTITY,
            orientation: Quat::IDENTITY,
            axes: Basis::WORLD,
            dirty: true,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Children in attachment order.
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    // ── Global (world-space, cached) ─────────────────────────────────

    /// World-space position.
    pub fn position(&self) -> Vec3 {
        self.global.translation
    }

    /// World-space rotation.
    pub fn rotation(&self) -> Quat {
        self.global.rotation
    }

    /// World-space scale.
    pub fn scale(&self) -> Vec3 {
        self.global.scale
    }

    /// World-space rotation as `(x, y, z)` Euler angles in radians.
    pub fn euler_angles(&self) -> Vec3 {
        let (x, y, z) = self.global.rotation.to_euler(glam::EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    pub fn global_transform(&self) -> Transform {
        self.global
    }

    /// Translation · rotation · scale of the cached world transform.
    pub fn model_matrix(&self) -> Mat4 {
        self.global.matrix()
    }

    // ── Local (parent-relative) ──────────────────────────────────────

    pub fn local_position(&self) -> Vec3 {
        self.local.translation
    }

    pub fn local_rotation(&self) -> Quat {
        self.local.rotation
    }

    pub fn local_scale(&self) -> Vec3 {
        self.local.scale
    }

    pub fn local_transform(&self) -> Transform {
        self.local
    }

    // ── Basis ────────────────────────────────────────────────────────

    /// World-space forward axis, as of the last axis refresh.
    pub fn forward(&self) -> Vec3 {
        self.axes.forward
    }

    pub fn up(&self) -> Vec3 {
        self.axes.up
    }

    pub fn left(&self) -> Vec3 {
        self.axes.left
    }

    pub fn axes(&self) -> Basis {
        self.axes
    }

    /// `true` if the cached globals are stale relative to the local transform.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Arena of [`Entity`] nodes indexed by [`EntityId`].
#[derive(Default)]
pub struct Hierarchy {
    /// `nodes[id]` holds the node for `id`. Slot 0 stays empty.
    nodes: Vec<Option<Entity>>,
    len: usize,
    /// Parent-less entities as of the last [`rebuild`](Self::rebuild), in id order.
    roots: Vec<EntityId>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Node Management ──────────────────────────────────────────────

    /// Create a root node with an identity transform.
    ///
    /// # Panics
    ///
    /// Panics if `id` is the sentinel or already present.
    pub(crate) fn insert(&mut self, id: EntityId) -> &mut Entity {
        assert!(id.is_valid(), "cannot insert the invalid entity id");
        let index = id.index();
        if index >= self.nodes.len() {
            self.nodes.resize_with(index + 1, || None);
        }
        let slot = &mut self.nodes[index];
        assert!(slot.is_none(), "entity {id} already exists in the hierarchy");
        self.len += 1;
        slot.insert(Entity::new(id))
    }

    /// Remove a node, severing it from its parent. Any children left behind
    /// become roots.
    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let mut node = self.nodes.get_mut(id.index())?.take()?;
        self.len -= 1;
        if let Some(parent) = node.parent.take() {
            if let Some(parent_node) = self.get_mut(parent) {
                parent_node.children.retain(|&c| c != id);
            }
        }
        for child in node.children.drain(..) {
            if let Some(child_node) = self.get_mut(child) {
                child_node.parent = None;
                child_node.dirty = true;
            }
        }
        self.roots.retain(|&r| r != id);
        Some(node)
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.len = 0;
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.nodes.get(id.index())?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.nodes.get_mut(id.index())?.as_mut()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.nodes.iter().flatten()
    }

    /// Root entities as of the last rebuild.
    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    /// Parent-less entities right now, in id order.
    pub fn current_roots(&self) -> Vec<EntityId> {
        self.iter().filter(|e| e.is_root()).map(|e| e.id).collect()
    }

    fn node(&self, id: EntityId) -> &Entity {
        self.get(id)
            .unwrap_or_else(|| panic!("{}", SceneError::EntityNotFound(id)))
    }

    fn node_mut(&mut self, id: EntityId) -> &mut Entity {
        self.get_mut(id)
            .unwrap_or_else(|| panic!("{}", SceneError::EntityNotFound(id)))
    }

    pub(crate) fn set_name(&mut self, id: EntityId, name: String) {
        self.node_mut(id).name = name;
    }

    // ── Traversal ────────────────────────────────────────────────────

    /// `true` if `ancestor` appears on the parent chain above `id`.
    pub fn is_ancestor(&self, ancestor: EntityId, id: EntityId) -> bool {
        let mut current = self.get(id).and_then(|e| e.parent);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.get(p).and_then(|e| e.parent);
        }
        false
    }

    /// `id` and all its descendants, ordered so every node comes after all
    /// of its descendants (safe destruction order).
    pub fn subtree_children_first(&self, id: EntityId) -> Vec<EntityId> {
        let mut pending = vec![id];
        let mut visited = Vec::new();
        while let Some(current) = pending.pop() {
            visited.push(current);
            if let Some(node) = self.get(current) {
                pending.extend_from_slice(&node.children);
            }
        }
        visited.reverse();
        visited
    }

    // ── Parent Queries ───────────────────────────────────────────────

    /// Composed local rotations of every ancestor, root first.
    pub fn parent_orientation(&self, id: EntityId) -> Quat {
        let mut chain = Vec::new();
        let mut current = self.node(id).parent;
        while let Some(p) = current {
            let node = self.node(p);
            chain.push(node.local.rotation);
            current = node.parent;
        }
        chain
            .into_iter()
            .rev()
            .fold(Quat::IDENTITY, |q, local| q * local)
    }

    /// World-space axes of the parent, computed from the rotation chain.
    pub fn parent_axes(&self, id: EntityId) -> Basis {
        match self.node(id).parent {
            Some(p) => Basis::from_rotation(self.parent_orientation(p) * self.node(p).local.rotation),
            None => Basis::WORLD,
        }
    }

    /// Cached world position of the parent (origin for roots).
    pub fn parent_position(&self, id: EntityId) -> Vec3 {
        self.node(id)
            .parent
            .map_or(Vec3::ZERO, |p| self.node(p).global.translation)
    }

    /// Cached world scale of the parent (one for roots).
    pub fn parent_scale(&self, id: EntityId) -> Vec3 {
        self.node(id)
            .parent
            .map_or(Vec3::ONE, |p| self.node(p).global.scale)
    }

    /// Convert a position relative to `id`'s parent into world space.
    pub fn local_to_global(&self, id: EntityId, local: Vec3) -> Vec3 {
        self.parent_axes(id)
            .local_to_global(self.parent_position(id), local)
    }

    /// Convert a world-space position into one relative to `id`'s parent.
    pub fn global_to_local(&self, id: EntityId, global: Vec3) -> Vec3 {
        self.parent_axes(id)
            .global_to_local(self.parent_position(id), global)
    }

    /// Recompute `id`'s axes from its current rotation chain.
    fn refresh_axes(&mut self, id: EntityId) {
        let orientation = self.parent_orientation(id) * self.node(id).local.rotation;
        let node = self.node_mut(id);
        node.orientation = orientation;
        node.axes = Basis::from_rotation(orientation);
    }

    // ── Local Setters ────────────────────────────────────────────────

    pub fn set_local_position(&mut self, id: EntityId, position: Vec3) {
        let node = self.node_mut(id);
        node.local.translation = position;
        node.dirty = true;
    }

    pub fn set_local_rotation(&mut self, id: EntityId, rotation: Quat) {
        let node = self.node_mut(id);
        node.local.rotation = rotation;
        node.dirty = true;
    }

    pub fn set_local_scale(&mut self, id: EntityId, scale: Vec3) {
        let node = self.node_mut(id);
        node.local.scale = scale;
        node.dirty = true;
    }

    pub fn set_local_transform(&mut self, id: EntityId, transform: Transform) {
        let node = self.node_mut(id);
        node.local = transform;
        node.dirty = true;
    }

    // ── Global Setters ───────────────────────────────────────────────

    /// Write the world position now and derive the matching local position.
    pub fn set_global_position(&mut self, id: EntityId, position: Vec3) {
        let local = self.global_to_local(id, position);
        if let Some(p) = self.node(id).parent {
            self.refresh_axes(p);
        }
        let node = self.node_mut(id);
        node.global.translation = position;
        node.local.translation = local;
        node.dirty = true;
    }

    /// Write the world rotation now and derive the matching local rotation.
    pub fn set_global_rotation(&mut self, id: EntityId, rotation: Quat) {
        let parent_orientation = self.parent_orientation(id);
        let node = self.node_mut(id);
        node.global.rotation = rotation;
        node.local.rotation = parent_orientation.inverse() * rotation;
        node.dirty = true;
        self.refresh_axes(id);
    }

    /// Write the world scale now and derive the matching local scale.
    pub fn set_global_scale(&mut self, id: EntityId, scale: Vec3) {
        let parent_scale = self.parent_scale(id);
        let node = self.node_mut(id);
        node.local.scale = scale / parent_scale;
        node.global.scale = scale;
        node.dirty = true;
    }

    /// Re-apply the cached world pose through the global setters, so the
    /// local values match the current parent.
    fn reassert_global_pose(&mut self, id: EntityId) {
        let global = self.node(id).global;
        self.set_global_position(id, global.translation);
        self.set_global_rotation(id, global.rotation);
        self.set_global_scale(id, global.scale);
    }

    // ── Re-parenting ─────────────────────────────────────────────────

    /// Make `child` the last child of `parent`, preserving `child`'s world
    /// pose.
    ///
    /// Refused (logged, nothing changes) if `child` is `parent`, an ancestor
    /// of `parent`, or already a child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either entity doesn't exist, or if `child`'s current parent
    /// doesn't list it as a child.
    pub fn assign_child(&mut self, parent: EntityId, child: EntityId) -> Result<(), ReparentError> {
        self.node(parent);
        let old_parent = self.node(child).parent;

        let refused = if parent == child {
            Some(ReparentError::SelfParent(child))
        } else if self.is_ancestor(child, parent) {
            Some(ReparentError::WouldCycle { parent, child })
        } else if self.node(parent).children.contains(&child) {
            Some(ReparentError::AlreadyChild { parent, child })
        } else {
            None
        };
        if let Some(err) = refused {
            log::warn!("assign_child refused: {err}");
            return Err(err);
        }

        if let Some(old) = old_parent {
            self.unlink(old, child);
        }
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
        self.reassert_global_pose(child);
        log::trace!("entity {child} attached to {parent}");
        Ok(())
    }

    /// Turn `child` into a root, preserving its world pose. Returns `false` if
    /// it already was one.
    pub fn detach(&mut self, child: EntityId) -> bool {
        let Some(old) = self.node(child).parent else {
            return false;
        };
        self.unlink(old, child);
        self.node_mut(child).parent = None;
        self.reassert_global_pose(child);
        true
    }

    /// Remove `child` from `parent`'s child list.
    fn unlink(&mut self, parent: EntityId, child: EntityId) {
        let siblings = &mut self.node_mut(parent).children;
        let Some(pos) = siblings.iter().position(|&c| c == child) else {
            panic!(
                "{}",
                SceneError::InconsistentHierarchy(format!(
                    "entity {child} is not a child of its parent {parent}"
                ))
            );
        };
        siblings.remove(pos);
    }

    // ── Per-Frame Passes ─────────────────────────────────────────────

    /// Pass A: refresh every node's orientation and axes from the local
    /// rotation chain.
    pub fn recompute_local_axes(&mut self) {
        let mut queue: VecDeque<(EntityId, Quat)> = self
            .current_roots()
            .into_iter()
            .map(|root| (root, Quat::IDENTITY))
            .collect();

        while let Some((id, parent_orientation)) = queue.pop_front() {
            let node = self.node_mut(id);
            node.orientation = parent_orientation * node.local.rotation;
            node.axes = Basis::from_rotation(node.orientation);
            let orientation = node.orientation;
            for &child in &node.children {
                queue.push_back((child, orientation));
            }
        }
    }

    /// Pass B: recompute the root list and rewrite the cached globals of
    /// every dirty subtree. Returns how many nodes were recomputed.
    pub fn rebuild(&mut self) -> usize {
        self.roots = self.current_roots();

        let mut queue: VecDeque<(EntityId, bool)> = self
            .roots
            .iter()
            .map(|&root| (root, self.node(root).dirty))
            .collect();
        let mut recomputed = 0;

        while let Some((id, dirty)) = queue.pop_front() {
            let node = self.node(id);
            for &child in &node.children {
                queue.push_back((child, dirty || self.node(child).dirty));
            }
            if !dirty {
                continue;
            }

            let (axes, origin, parent_orientation, parent_scale) = match node.parent {
                Some(p) => {
                    let parent = self.node(p);
                    (parent.axes, parent.global.translation, parent.orientation, parent.global.scale)
                }
                None => (Basis::WORLD, Vec3::ZERO, Quat::IDENTITY, Vec3::ONE),
            };
            let local = node.local;
            let node = self.node_mut(id);
            node.global.translation = axes.local_to_global(origin, local.translation);
            node.global.rotation = parent_orientation * local.rotation;
            node.global.scale = parent_scale * local.scale;
            node.dirty = false;
            recomputed += 1;
        }

        log::trace!("hierarchy rebuild: {recomputed} of {} entities recomputed", self.len);
        recomputed
    }

    /// Verify parent/child links agree and contain no cycle.
    pub fn check_consistency(&self) -> Result<(), SceneError> {
        let broken = |msg: String| Err(SceneError::InconsistentHierarchy(msg));
        for node in self.iter() {
            if let Some(p) = node.parent {
                let Some(parent) = self.get(p) else {
                    return broken(format!("entity {} has missing parent {p}", node.id));
                };
                let listed = parent.children.iter().filter(|&&c| c == node.id).count();
                if listed != 1 {
                    return broken(format!(
                        "entity {} listed {listed} times by its parent {p}",
                        node.id
                    ));
                }
            }
            for &c in &node.children {
                if self.get(c).and_then(|child| child.parent) != Some(node.id) {
                    return broken(format!("child {c} of {} points elsewhere", node.id));
                }
            }
            if self.is_ancestor(node.id, node.id) {
                return broken(format!("entity {} is its own ancestor", node.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    fn id(n: u32) -> EntityId {
        EntityId::new(n)
    }

    fn with_nodes(n: u32) -> Hierarchy {
        let mut h = Hierarchy::new();
        for i in 1..=n {
            h.insert(id(i));
        }
        h
    }

    fn frame(h: &mut Hierarchy) -> usize {
        h.recompute_local_axes();
        h.rebuild()
    }

    #[test]
    fn new_node_is_dirty_identity_root() {
        let h = with_nodes(1);
        let e = h.get(id(1)).unwrap();
        assert!(e.is_root());
        assert!(e.is_dirty());
        assert_eq!(e.local_transform(), Transform::IDENTITY);
        assert_eq!(e.name(), "Entity 1");
    }

    #[test]
    fn child_inherits_parent_translation() {
        let mut h = with_nodes(2);
        h.set_local_position(id(1), Vec3::new(100.0, 0.0, 0.0));
        frame(&mut h);
        h.assign_child(id(1), id(2)).unwrap();
        h.set_local_position(id(2), Vec3::new(10.0, 0.0, 0.0));
        frame(&mut h);
        assert!(h.get(id(2)).unwrap().position().abs_diff_eq(Vec3::new(110.0, 0.0, 0.0), 1e-4));
    }

    #[test]
    fn child_position_follows_parent_rotation() {
        let mut h = with_nodes(2);
        h.assign_child(id(1), id(2)).unwrap();
        h.set_local_position(id(2), Vec3::new(1.0, 0.0, 0.0));
        h.set_local_rotation(id(1), Quat::from_rotation_y(FRAC_PI_2));
        frame(&mut h);

        let child = h.get(id(2)).unwrap();
        assert!(child.position().abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
        assert!(child.rotation().abs_diff_eq(Quat::from_rotation_y(FRAC_PI_2), 1e-6));
        assert!(child.left().abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn position_ignores_parent_scale() {
        let mut h = with_nodes(2);
        h.set_local_scale(id(1), Vec3::splat(3.0));
        h.assign_child(id(1), id(2)).unwrap();
        h.set_local_position(id(2), Vec3::new(1.0, 0.0, 0.0));
        h.set_local_scale(id(2), Vec3::splat(2.0));
        frame(&mut h);

        let child = h.get(id(2)).unwrap();
        assert!(child.position().abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-6));
        assert!(child.scale().abs_diff_eq(Vec3::splat(6.0), 1e-6));
    }

    #[test]
    fn deep_chain_accumulates() {
        let mut h = with_nodes(3);
        h.assign_child(id(1), id(2)).unwrap();
        h.assign_child(id(2), id(3)).unwrap();
        for (n, x) in [(1, 1.0), (2, 2.0), (3, 3.0)] {
            h.set_local_position(id(n), Vec3::new(x, 0.0, 0.0));
        }
        frame(&mut h);
        assert!(h.get(id(3)).unwrap().position().abs_diff_eq(Vec3::new(6.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn clean_subtrees_are_skipped() {
        let mut h = with_nodes(4);
        h.assign_child(id(1), id(2)).unwrap();
        h.assign_child(id(3), id(4)).unwrap();
        assert_eq!(frame(&mut h), 4);
        assert_eq!(frame(&mut h), 0);

        h.set_local_rotation(id(1), Quat::from_rotation_z(0.3));
        assert_eq!(frame(&mut h), 2);
    }

    #[test]
    fn global_setters_are_visible_before_rebuild() {
        let mut h = with_nodes(2);
        h.set_local_position(id(1), Vec3::new(5.0, 0.0, 0.0));
        frame(&mut h);
        h.assign_child(id(1), id(2)).unwrap();

        h.set_global_position(id(2), Vec3::new(7.0, 1.0, 0.0));
        assert_eq!(h.get(id(2)).unwrap().position(), Vec3::new(7.0, 1.0, 0.0));
        assert!(h.get(id(2)).unwrap().local_position().abs_diff_eq(Vec3::new(2.0, 1.0, 0.0), 1e-6));

        frame(&mut h);
        assert!(h.get(id(2)).unwrap().position().abs_diff_eq(Vec3::new(7.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn global_scale_divides_by_parent_scale() {
        let mut h = with_nodes(2);
        h.set_local_scale(id(1), Vec3::new(2.0, 4.0, 1.0));
        frame(&mut h);
        h.assign_child(id(1), id(2)).unwrap();
        h.set_global_scale(id(2), Vec3::new(1.0, 1.0, 3.0));
        assert!(h.get(id(2)).unwrap().local_scale().abs_diff_eq(Vec3::new(0.5, 0.25, 3.0), 1e-6));
    }

    #[test]
    fn global_rotation_back_solves_against_chain() {
        let mut h = with_nodes(2);
        h.set_local_rotation(id(1), Quat::from_rotation_x(0.7));
        h.assign_child(id(1), id(2)).unwrap();
        let target = Quat::from_rotation_y(1.1);
        h.set_global_rotation(id(2), target);
        frame(&mut h);
        assert!(h.get(id(2)).unwrap().rotation().abs_diff_eq(target, 1e-5));
    }

    #[test]
    fn self_parent_is_refused() {
        let mut h = with_nodes(1);
        assert_eq!(h.assign_child(id(1), id(1)), Err(ReparentError::SelfParent(id(1))));
        assert!(h.get(id(1)).unwrap().children().is_empty());
    }

    #[test]
    fn cycle_is_refused_without_change() {
        let mut h = with_nodes(3);
        h.assign_child(id(1), id(2)).unwrap();
        h.assign_child(id(2), id(3)).unwrap();

        assert_eq!(
            h.assign_child(id(3), id(1)),
            Err(ReparentError::WouldCycle { parent: id(3), child: id(1) })
        );
        assert_eq!(h.get(id(1)).unwrap().parent(), None);
        assert_eq!(h.get(id(3)).unwrap().children(), &[] as &[EntityId]);
        h.check_consistency().unwrap();
    }

    #[test]
    fn duplicate_child_is_refused() {
        let mut h = with_nodes(2);
        h.assign_child(id(1), id(2)).unwrap();
        assert_eq!(
            h.assign_child(id(1), id(2)),
            Err(ReparentError::AlreadyChild { parent: id(1), child: id(2) })
        );
        assert_eq!(h.get(id(1)).unwrap().children(), &[id(2)]);
    }

    #[test]
    fn reparent_moves_between_child_lists() {
        let mut h = with_nodes(3);
        h.assign_child(id(1), id(3)).unwrap();
        h.assign_child(id(2), id(3)).unwrap();
        assert!(h.get(id(1)).unwrap().children().is_empty());
        assert_eq!(h.get(id(2)).unwrap().children(), &[id(3)]);
        assert_eq!(h.get(id(3)).unwrap().parent(), Some(id(2)));
        h.check_consistency().unwrap();
    }

    #[test]
    #[should_panic(expected = "not a child of its parent")]
    fn inconsistent_parent_link_panics() {
        let mut h = with_nodes(3);
        h.assign_child(id(1), id(3)).unwrap();
        h.get_mut(id(1)).unwrap().children.clear();
        let _ = h.assign_child(id(2), id(3));
    }

    #[test]
    fn detach_preserves_world_position() {
        let mut h = with_nodes(2);
        h.set_local_position(id(1), Vec3::new(3.0, 0.0, 0.0));
        h.set_local_rotation(id(1), Quat::from_rotation_y(FRAC_PI_2));
        h.assign_child(id(1), id(2)).unwrap();
        h.set_local_position(id(2), Vec3::new(1.0, 0.0, 0.0));
        frame(&mut h);
        let before = h.get(id(2)).unwrap().position();

        assert!(h.detach(id(2)));
        assert!(!h.detach(id(2)));
        frame(&mut h);
        assert!(h.get(id(2)).unwrap().position().abs_diff_eq(before, 1e-5));
        assert_eq!(h.roots(), &[id(1), id(2)]);
    }

    #[test]
    fn subtree_lists_children_before_parents() {
        let mut h = with_nodes(4);
        h.assign_child(id(1), id(2)).unwrap();
        h.assign_child(id(2), id(3)).unwrap();
        h.assign_child(id(1), id(4)).unwrap();

        let order = h.subtree_children_first(id(1));
        assert_eq!(order.len(), 4);
        let pos = |n: u32| order.iter().position(|&e| e == id(n)).unwrap();
        assert!(pos(3) < pos(2));
        assert!(pos(2) < pos(1));
        assert!(pos(4) < pos(1));
    }

    #[test]
    fn remove_orphans_children() {
        let mut h = with_nodes(3);
        h.assign_child(id(1), id(2)).unwrap();
        h.assign_child(id(2), id(3)).unwrap();
        h.remove(id(2));
        assert!(h.get(id(1)).unwrap().children().is_empty());
        assert!(h.get(id(3)).unwrap().is_root());
        assert_eq!(h.len(), 2);
        h.check_consistency().unwrap();
    }

    #[test]
    fn roots_are_recomputed_by_rebuild() {
        let mut h = with_nodes(3);
        h.assign_child(id(2), id(3)).unwrap();
        assert!(h.roots().is_empty());
        frame(&mut h);
        assert_eq!(h.roots(), &[id(1), id(2)]);
    }
}

//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. [`Transform`] holds position, rotation, and scale;
//! [`Basis`] holds the three orthonormal axes an entity is oriented along.
//!
//! ## World Axes
//!
//! ```text
//!        up (+Y)
//!         │
//!         │
//!         └──── left (+X)
//!        ╱
//!   forward (+Z)
//! ```
//!
//! Positions are converted between a parent's frame and the world frame
//! through explicit basis matrices, `M_parent` and `M_world`, rather than a
//! chain of 4x4 model matrices. Scale never enters the position conversion.

use serde::{Deserialize, Serialize};

pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

/// A 3D transform: position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform (origin, no rotation, uniform scale of 1).
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a transform at the given position.
    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: Vec3::new(x, y, z),
            ..Self::IDENTITY
        }
    }

    /// Return a copy with the given rotation.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Return a copy with uniform scale applied.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Compute the 4x4 model matrix (translation · rotation · scale).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Three orthonormal axes describing an orientation in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Basis {
    pub forward: Vec3,
    pub up: Vec3,
    pub left: Vec3,
}

impl Basis {
    /// The world frame.
    pub const WORLD: Self = Self {
        forward: Vec3::Z,
        up: Vec3::Y,
        left: Vec3::X,
    };

    /// Rotate the world axes by `orientation`.
    pub fn from_rotation(orientation: Quat) -> Self {
        Self {
            forward: orientation * Self::WORLD.forward,
            up: orientation * Self::WORLD.up,
            left: orientation * Self::WORLD.left,
        }
    }

    /// Basis matrix with columns `(left, up, forward)`.
    pub fn matrix(&self) -> Mat3 {
        Mat3::from_cols(self.left, self.up, self.forward)
    }

    /// Convert a position expressed in this basis (with its origin at
    /// `origin`) into world space: `M_world⁻¹ · M_self · local + origin`.
    pub fn local_to_global(&self, origin: Vec3, local: Vec3) -> Vec3 {
        Self::WORLD.matrix().inverse() * self.matrix() * local + origin
    }

    /// Inverse of [`local_to_global`](Self::local_to_global):
    /// `M_self⁻¹ · M_world · (global - origin)`.
    pub fn global_to_local(&self, origin: Vec3, global: Vec3) -> Vec3 {
        self.matrix().inverse() * Self::WORLD.matrix() * (global - origin)
    }
}

impl Default for Basis {
    fn default() -> Self {
        Self::WORLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_basis_conversion_is_translation_only() {
        let p = Basis::WORLD.local_to_global(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 0.0, 0.0));
        assert!(p.abs_diff_eq(Vec3::new(5.0, 2.0, 3.0), 1e-6));
    }

    #[test]
    fn rotated_basis_round_trips_positions() {
        let basis = Basis::from_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let origin = Vec3::new(10.0, 0.0, 0.0);
        let global = Vec3::new(3.0, -1.0, 7.5);
        let local = basis.global_to_local(origin, global);
        assert!(basis.local_to_global(origin, local).abs_diff_eq(global, 1e-5));
    }

    #[test]
    fn quarter_turn_maps_left_axis_to_negative_forward() {
        let basis = Basis::from_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        assert!(basis.left.abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(basis.forward.abs_diff_eq(Vec3::X, 1e-6));
        assert!(basis.up.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn model_matrix_composes_trs() {
        let t = Transform::from_xyz(1.0, 2.0, 3.0).with_scale(2.0);
        let m = t.matrix();
        assert!(m.transform_point3(Vec3::X).abs_diff_eq(Vec3::new(3.0, 2.0, 3.0), 1e-6));
    }
}

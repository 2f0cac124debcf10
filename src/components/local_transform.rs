use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A node's transform relative to its parent.
///
/// Mutating a transform never touches the rest of the tree directly: the node
/// is marked changed and its subtree is recomputed on the next update pass,
/// so the matrices a renderer observes only ever change between frames.
#[derive(Clone, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct LocalTransform {
    /// The translation of the node
    pub translation: Vec3,
    /// The point, relative to the node's origin, that rotation and scale are
    /// applied about
    pub center: Vec3,
    /// The rotation of the node
    pub rotation: Quat,
    /// The non-uniform scale of the node
    pub scale: Vec3,
    /// The axes the scale is applied along
    pub scale_orientation: Quat,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            center: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            scale_orientation: Quat::IDENTITY,
        }
    }
}

impl LocalTransform {
    /// Create a transform that only translates.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Create a transform that rotates about `center`.
    pub fn from_rotation_about(rotation: Quat, center: Vec3) -> Self {
        Self {
            rotation,
            center,
            ..Default::default()
        }
    }

    /// Compose the transform into a single affine matrix.
    ///
    /// The scale is applied along the axes given by `scale_orientation`, and
    /// rotation and scale both happen about `center`:
    /// `T * C * R * SR * S * SR⁻¹ * C⁻¹`.
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_translation(self.translation + self.center)
            * Affine3A::from_quat(self.rotation)
            * Affine3A::from_quat(self.scale_orientation)
            * Affine3A::from_scale(self.scale)
            * Affine3A::from_quat(self.scale_orientation.inverse())
            * Affine3A::from_translation(-self.center)
    }
}

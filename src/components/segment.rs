use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::Displacer;

/// A rigid body part between joints.
///
/// The mass properties are carried for physics and balance systems and are
/// not consumed by deformation. Displacers owned by the segment morph the
/// shared skin (see [`Displacer`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Total mass in kilograms; zero means unspecified
    pub mass: f32,
    /// Centre of mass, relative to the node's origin
    pub center_of_mass: Vec3,
    /// Row-major 3×3 moment of inertia tensor about the centre of mass
    pub moments_of_inertia: [f32; 9],
    /// Morph targets applied to the shared skin in bind-pose space
    pub displacers: Vec<Displacer>,
}

impl Default for Segment {
    fn default() -> Self {
        Self {
            mass: 0.0,
            center_of_mass: Vec3::ZERO,
            moments_of_inertia: [0.0; 9],
            displacers: Vec::new(),
        }
    }
}

impl Segment {
    /// Create a segment carrying the given displacers.
    pub fn with_displacers(displacers: Vec<Displacer>) -> Self {
        Self {
            displacers,
            ..Default::default()
        }
    }
}

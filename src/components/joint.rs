use glam::Quat;
use serde::{Deserialize, Serialize};

/// One joint's influence over a single skin vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkinWeight {
    /// Index into the skin's coordinate buffer
    pub vertex: u32,
    /// Strength of the influence; the weights across all of a vertex's
    /// joints conventionally sum to one
    pub weight: f32,
}

/// A bone-like pivot in the skeleton.
///
/// The weight list drives deformation; the articulation limits are carried
/// for animation and IK systems and are not consumed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    /// The vertices this joint deforms, with their blend weights
    pub skin_weights: Vec<SkinWeight>,
    /// Lower rotation limit about each axis, in radians; empty means unlimited
    pub lower_limit: Vec<f32>,
    /// Upper rotation limit about each axis, in radians; empty means unlimited
    pub upper_limit: Vec<f32>,
    /// Per-axis willingness to rotate, each in `[0, 1]`
    pub stiffness: Vec<f32>,
    /// Orientation of the frame the limits are expressed in
    pub limit_orientation: Quat,
}

impl Default for Joint {
    fn default() -> Self {
        Self {
            skin_weights: Vec::new(),
            lower_limit: Vec::new(),
            upper_limit: Vec::new(),
            stiffness: Vec::new(),
            limit_orientation: Quat::IDENTITY,
        }
    }
}

impl Joint {
    /// Create a joint with the given weight list and no articulation limits.
    pub fn with_weights(skin_weights: Vec<SkinWeight>) -> Self {
        Self {
            skin_weights,
            ..Default::default()
        }
    }
}

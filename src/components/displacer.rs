use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A sparse morph target: per-vertex offsets applied to the skin in
/// bind-pose space, before joint blending.
///
/// Typically used for features a skeleton cannot express, such as facial
/// expressions on a head segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Displacer {
    /// Name used to address the displacer, e.g. `"smile"`
    pub name: String,
    /// Indices into the skin's coordinate buffer
    pub coord_index: Vec<u32>,
    /// One bind-pose-space offset per entry in `coord_index`
    pub displacements: Vec<Vec3>,
    /// Scale applied to every offset; zero leaves the skin untouched
    pub weight: f32,
}

impl Displacer {
    /// Create a displacer with a weight of zero.
    pub fn new(name: impl Into<String>, coord_index: Vec<u32>, displacements: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            coord_index,
            displacements,
            weight: 0.0,
        }
    }
}

//! Plain data carried by skeleton nodes and the humanoid root.

/// Axis-aligned bounding volume for a segment
pub mod bounds;
/// Named per-vertex displacement applied to a segment's skin
pub mod displacer;
/// World-space transform accumulated for a skeleton node
pub mod global_transform;
/// A skeleton joint and its per-vertex skin weights
pub mod joint;
/// Parent-relative transform of a skeleton node
pub mod local_transform;
/// A skeleton segment carrying geometry and displacers
pub mod segment;
/// An attachment point at the edge of the skeleton
pub mod site;

pub use bounds::Bounds;
pub use displacer::Displacer;
pub use global_transform::GlobalTransform;
pub use joint::{Joint, SkinWeight};
pub use local_transform::LocalTransform;
pub use segment::Segment;
pub use site::Site;

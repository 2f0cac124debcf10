use glam::Vec3;
use serde::{Deserialize, Serialize};

/// The bounding volume a renderer may use to cull a node's subtree.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Bounds {
    /// No explicit bounds; the node is treated as unbounded for culling
    #[default]
    Unbounded,
    /// An explicit axis-aligned box
    Aabb {
        /// Centre of the box, relative to the node's origin
        center: Vec3,
        /// Half the box extent along each axis
        half_extents: Vec3,
    },
}

/// The legacy field value meaning "no explicit bounds".
const UNBOUNDED_SENTINEL: Vec3 = Vec3::new(-1.0, -1.0, 0.0);

impl Bounds {
    /// Interpret the legacy center/half-size field pair.
    ///
    /// Scene formats encode "no explicit bounds" as a half-size of
    /// `(-1, -1, 0)`; that sentinel never appears in the stored
    /// representation.
    pub fn from_center_half_size(center: Vec3, half_size: Vec3) -> Bounds {
        if half_size == UNBOUNDED_SENTINEL {
            Bounds::Unbounded
        } else {
            Bounds::Aabb {
                center,
                half_extents: half_size,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::vec3;

    use super::*;

    #[test]
    pub fn test_sentinel_means_unbounded() {
        let bounds = Bounds::from_center_half_size(vec3(1.0, 2.0, 3.0), vec3(-1.0, -1.0, 0.0));
        assert_eq!(bounds, Bounds::Unbounded);
    }

    #[test]
    pub fn test_explicit_box() {
        let bounds = Bounds::from_center_half_size(vec3(0.0, 1.0, 0.0), vec3(0.5, 1.0, 0.25));
        assert_eq!(
            bounds,
            Bounds::Aabb {
                center: vec3(0.0, 1.0, 0.0),
                half_extents: vec3(0.5, 1.0, 0.25),
            }
        );
    }
}

use glam::Affine3A;

use crate::skeleton::{NodeId, Skeleton};

/// Transform propagation system
/// Walks every skeleton root top-down and recomposes the global matrix of
/// each subtree whose inputs changed since the last pass. Subtrees with no
/// changed ancestor and no changed local transform are skipped at the cost
/// of one flag check per node.
pub fn update_skeleton_system(
    skeleton: &mut Skeleton,
    parent_global: Affine3A,
    parent_changed: bool,
) {
    let roots = skeleton.roots().to_vec();
    update_subtrees_system(skeleton, &roots, parent_global, parent_changed);
}

/// Propagate a set of subtrees with the same pass semantics as the skeleton
/// roots. Used for subtrees that hang directly off the humanoid, such as its
/// standalone sites.
pub fn update_subtrees_system(
    skeleton: &mut Skeleton,
    ids: &[NodeId],
    parent_global: Affine3A,
    parent_changed: bool,
) {
    for &id in ids {
        update_node(skeleton, id, &parent_global, parent_changed);
    }
}

// Pre-order: a node's global matrix is recomposed before any of its children
// read it.
fn update_node(skeleton: &mut Skeleton, id: NodeId, parent_global: &Affine3A, parent_changed: bool) {
    let node = skeleton.index_mut(id);
    let changed = node.local_changed || parent_changed;
    if changed {
        node.global_transform.0 = *parent_global * node.local_transform.to_affine();
        node.local_changed = false;
    }
    node.global_changed = changed;
    let global = node.global_transform.0;

    for child in skeleton.index(id).children.clone() {
        update_node(skeleton, child, &global, changed);
    }
}

use glam::Vec3;
use itertools::izip;

use crate::{
    skeleton::{NodeId, NodeKind, Skeleton},
    skin::{BlendStrategy, Skin},
    MarrowError, MarrowResult,
};

/// Skin deformation system
/// Rebuilds the output coordinate/normal buffers from the current joint
/// matrices and the per-joint weight lists. Must run strictly after
/// transform propagation has completed for every root: it consumes the
/// per-node changed flags the propagation pass leaves behind.
pub fn skinning_system(skeleton: &Skeleton, skin: &mut Skin) -> MarrowResult<()> {
    let attached = skeleton.pre_order();

    mark_dirty_vertices(skeleton, &attached, skin)?;
    reset_dirty_slots(skin);
    accumulate(skeleton, &attached, skin)?;
    if skin.config.normalize_normals {
        renormalize(skin);
    }

    // The mask is consumed; the next pass starts clean.
    skin.dirty.iter_mut().for_each(|dirty| *dirty = false);
    Ok(())
}

// A vertex is rebuilt when any joint weighting it moved this pass. Displacer
// edits mark their vertices directly when the morph buffer changes.
fn mark_dirty_vertices(
    skeleton: &Skeleton,
    attached: &[NodeId],
    skin: &mut Skin,
) -> MarrowResult<()> {
    match skin.config.strategy {
        BlendStrategy::SpaceOptimized => skin.dirty.iter_mut().for_each(|dirty| *dirty = true),
        BlendStrategy::SpeedOptimized => {
            let vertex_count = skin.bind_coords.len();
            for &id in attached {
                let node = skeleton.index(id);
                if !node.global_changed() {
                    continue;
                }
                let NodeKind::Joint(joint) = &node.kind else {
                    continue;
                };
                for entry in &joint.skin_weights {
                    let vertex = entry.vertex as usize;
                    *skin
                        .dirty
                        .get_mut(vertex)
                        .ok_or_else(|| MarrowError::WeightVertexOutOfRange {
                            joint: node.name.clone(),
                            vertex,
                            vertex_count,
                        })? = true;
                }
            }
        }
    }
    Ok(())
}

// Dirty slots restart from zero so contributions can be summed; a dirty
// vertex no joint weights is carried straight through from the morph buffer.
fn reset_dirty_slots(skin: &mut Skin) {
    let Skin {
        dirty,
        influences,
        morph_coords,
        output_coords,
        output_normals,
        bind_normals,
        ..
    } = skin;

    for (dirty, influences, morph, out) in izip!(
        dirty.iter(),
        influences.iter(),
        morph_coords.iter(),
        output_coords.iter_mut()
    ) {
        if *dirty {
            *out = if *influences == 0 { *morph } else { Vec3::ZERO };
        }
    }

    if let (Some(output_normals), Some(bind_normals)) = (output_normals, bind_normals) {
        for (dirty, influences, bind, out) in izip!(
            dirty.iter(),
            influences.iter(),
            bind_normals.iter(),
            output_normals.iter_mut()
        ) {
            if *dirty {
                *out = if *influences == 0 { *bind } else { Vec3::ZERO };
            }
        }
    }
}

// Every attached joint contributes to every dirty vertex it weights, whether
// or not the joint itself moved: a dirty slot was zeroed and needs the full
// sum rebuilt. Coordinates take the whole affine; normals take only its
// upper 3×3, with no renormalization (see `SkinConfig`).
fn accumulate(
    skeleton: &Skeleton,
    attached: &[NodeId],
    skin: &mut Skin,
) -> MarrowResult<()> {
    let vertex_count = skin.bind_coords.len();

    for &id in attached {
        let node = skeleton.index(id);
        let NodeKind::Joint(joint) = &node.kind else {
            continue;
        };
        let global = node.global_transform.0;
        for entry in &joint.skin_weights {
            let vertex = entry.vertex as usize;
            if vertex >= vertex_count {
                return Err(MarrowError::WeightVertexOutOfRange {
                    joint: node.name.clone(),
                    vertex,
                    vertex_count,
                });
            }
            if !skin.dirty[vertex] {
                continue;
            }
            skin.output_coords[vertex] +=
                global.transform_point3(skin.morph_coords[vertex]) * entry.weight;
        }
    }

    if let (Some(output_normals), Some(bind_normals)) = (&mut skin.output_normals, &skin.bind_normals)
    {
        for &id in attached {
            let node = skeleton.index(id);
            let NodeKind::Joint(joint) = &node.kind else {
                continue;
            };
            let global = node.global_transform.0;
            for entry in &joint.skin_weights {
                let vertex = entry.vertex as usize;
                if !skin.dirty[vertex] {
                    continue;
                }
                output_normals[vertex] +=
                    global.transform_vector3(bind_normals[vertex]) * entry.weight;
            }
        }
    }

    Ok(())
}

fn renormalize(skin: &mut Skin) {
    let Skin {
        dirty,
        output_normals,
        ..
    } = skin;
    if let Some(output_normals) = output_normals {
        for (dirty, normal) in izip!(dirty.iter(), output_normals.iter_mut()) {
            if *dirty {
                *normal = normal.normalize_or_zero();
            }
        }
    }
}

use glam::Vec3;

use crate::{
    components::{Bounds, GlobalTransform, LocalTransform},
    skeleton::{NodeId, NodeKind, Skeleton},
    skin::{Skin, SkinConfig},
    systems::{
        skinning::skinning_system,
        update_skeleton::{update_skeleton_system, update_subtrees_system},
    },
    MarrowError, MarrowResult,
};

/// The root of an animated character.
///
/// A `Humanoid` owns the skeleton tree, the bound skin and the whole-body
/// transform, and drives one update tick in the required order: transform
/// propagation for every root, then skin deformation.
/// **IMPORTANT**: call [`Humanoid::update_mesh`] each tick, and
/// [`crate::schedule_functions::end_frame`] between ticks.
pub struct Humanoid {
    /// Name of the character
    pub name: String,
    /// Version of the humanoid definition the character was authored against
    pub version: String,
    /// Free-form metadata strings, e.g. authoring notes
    pub info: Vec<String>,
    local_transform: LocalTransform,
    local_changed: bool,
    bounds: Bounds,
    skeleton: Skeleton,
    skin: Option<Skin>,
    sites: Vec<NodeId>,
}

impl Humanoid {
    /// Create a humanoid with an empty skeleton and no skin.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: String::new(),
            info: Vec::new(),
            local_transform: LocalTransform::default(),
            local_changed: true,
            bounds: Bounds::default(),
            skeleton: Skeleton::new(),
            skin: None,
            sites: Vec::new(),
        }
    }

    /// The skeleton tree.
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// The skeleton tree, for building and posing.
    pub fn skeleton_mut(&mut self) -> &mut Skeleton {
        &mut self.skeleton
    }

    /// The whole-body transform.
    pub fn local_transform(&self) -> LocalTransform {
        self.local_transform
    }

    /// Set the whole-body transform. Takes effect at the next update tick.
    pub fn set_local_transform(&mut self, local_transform: LocalTransform) {
        self.local_transform = local_transform;
        self.local_changed = true;
    }

    /// The bounding volume for the whole character.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Set the bounding volume for the whole character.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    /// The standalone site list.
    pub fn sites(&self) -> &[NodeId] {
        &self.sites
    }

    /// Replace the standalone site list. Every entry must be a site node.
    ///
    /// Sites that are not attached under a skeleton root are propagated
    /// directly from the whole-body transform each tick.
    pub fn set_sites(&mut self, sites: Vec<NodeId>) -> MarrowResult<()> {
        for &site in &sites {
            let node = self.skeleton.node(site)?;
            if !matches!(node.kind, NodeKind::Site(_)) {
                return Err(MarrowError::WrongNodeKind {
                    expected: "Site",
                    found: node.kind.name(),
                });
            }
        }
        self.sites = sites;
        Ok(())
    }

    /// Bind the skin: install the bind pose and validate every joint weight
    /// list and displacer against it.
    ///
    /// Binding replaces any previously bound skin wholesale, and marks every
    /// vertex for rebuild so the first tick produces fully populated output
    /// buffers. The character never becomes runnable with an invalid weight
    /// table: a bad entry fails here, before any tick can run.
    pub fn bind_skin(
        &mut self,
        coords: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        config: SkinConfig,
    ) -> MarrowResult<()> {
        let mut skin = Skin::new(coords, normals, config)?;
        let vertex_count = skin.vertex_count();

        // Weights and displacers are static data: validate them wherever they
        // live in the arena, attached or not, so a later attachment cannot
        // smuggle in a bad table.
        for (_, node) in self.skeleton.iter() {
            match &node.kind {
                NodeKind::Joint(joint) => {
                    for entry in &joint.skin_weights {
                        let vertex = entry.vertex as usize;
                        if vertex >= vertex_count {
                            return Err(MarrowError::WeightVertexOutOfRange {
                                joint: node.name.clone(),
                                vertex,
                                vertex_count,
                            });
                        }
                    }
                }
                NodeKind::Segment(segment) => {
                    for displacer in &segment.displacers {
                        if displacer.coord_index.len() != displacer.displacements.len() {
                            return Err(MarrowError::DisplacerCountMismatch {
                                displacer: displacer.name.clone(),
                                indices: displacer.coord_index.len(),
                                offsets: displacer.displacements.len(),
                            });
                        }
                        for &index in &displacer.coord_index {
                            let vertex = index as usize;
                            if vertex >= vertex_count {
                                return Err(MarrowError::DisplacerVertexOutOfRange {
                                    displacer: displacer.name.clone(),
                                    vertex,
                                    vertex_count,
                                });
                            }
                        }
                    }
                }
                NodeKind::Site(_) => {}
            }
        }

        // Influence counts cover the joints the update pass will visit.
        for id in self.skeleton.pre_order() {
            if let NodeKind::Joint(joint) = &self.skeleton.index(id).kind {
                for entry in &joint.skin_weights {
                    skin.influences[entry.vertex as usize] += 1;
                }
            }
        }

        // Fold the current displacer weights into the morph buffer.
        for (_, node) in self.skeleton.iter() {
            if let NodeKind::Segment(segment) = &node.kind {
                for displacer in &segment.displacers {
                    for (&index, offset) in
                        displacer.coord_index.iter().zip(&displacer.displacements)
                    {
                        skin.morph_coords[index as usize] += *offset * displacer.weight;
                    }
                }
            }
        }

        println!(
            "[MARROW_SKIN] Bound skin: {} vertices, normals: {}",
            vertex_count,
            skin.bind_normals().is_some()
        );
        self.skin = Some(skin);
        Ok(())
    }

    /// The bound skin, if any.
    pub fn skin(&self) -> Option<&Skin> {
        self.skin.as_ref()
    }

    /// Set the weight of one of a segment's displacers.
    ///
    /// Updates the morph buffer for the affected vertices and marks them for
    /// rebuild at the next tick. Setting the current value is a no-op.
    pub fn set_displacer_weight(
        &mut self,
        segment: NodeId,
        displacer: usize,
        weight: f32,
    ) -> MarrowResult<()> {
        let node = self.skeleton.node_mut(segment)?;
        let segment = match &mut node.kind {
            NodeKind::Segment(segment) => segment,
            other => {
                return Err(MarrowError::WrongNodeKind {
                    expected: "Segment",
                    found: other.name(),
                })
            }
        };
        let displacer = segment
            .displacers
            .get_mut(displacer)
            .ok_or(MarrowError::UnknownDisplacer { index: displacer })?;

        // A segment attached after binding has not been validated yet; check
        // before touching anything so a bad displacer cannot half-apply.
        if let Some(skin) = &self.skin {
            let vertex_count = skin.vertex_count();
            if displacer.coord_index.len() != displacer.displacements.len() {
                return Err(MarrowError::DisplacerCountMismatch {
                    displacer: displacer.name.clone(),
                    indices: displacer.coord_index.len(),
                    offsets: displacer.displacements.len(),
                });
            }
            for &index in &displacer.coord_index {
                let vertex = index as usize;
                if vertex >= vertex_count {
                    return Err(MarrowError::DisplacerVertexOutOfRange {
                        displacer: displacer.name.clone(),
                        vertex,
                        vertex_count,
                    });
                }
            }
        }

        let delta = weight - displacer.weight;
        displacer.weight = weight;
        if delta == 0.0 {
            return Ok(());
        }

        if let Some(skin) = &mut self.skin {
            for (&index, offset) in displacer.coord_index.iter().zip(&displacer.displacements) {
                let vertex = index as usize;
                skin.morph_coords[vertex] += *offset * delta;
                skin.dirty[vertex] = true;
            }
        }
        Ok(())
    }

    /// Run one update tick: propagate transforms top-down for every skeleton
    /// root and standalone site, then rebuild the deformed skin buffers.
    ///
    /// Deformation runs strictly after propagation has completed for the
    /// whole tree, never interleaved.
    pub fn update_mesh(&mut self) -> MarrowResult<()> {
        let parent_changed = self.local_changed;
        self.local_changed = false;
        let parent_global = self.local_transform.to_affine();

        update_skeleton_system(&mut self.skeleton, parent_global, parent_changed);

        let standalone: Vec<NodeId> = self
            .sites
            .iter()
            .copied()
            .filter(|&site| self.skeleton.index(site).parent.is_none())
            .collect();
        update_subtrees_system(&mut self.skeleton, &standalone, parent_global, parent_changed);

        if let Some(skin) = &mut self.skin {
            skinning_system(&self.skeleton, skin)?;
        }
        Ok(())
    }

    /// A node's placement in world space, as of the last completed tick.
    pub fn global_transform(&self, id: NodeId) -> MarrowResult<GlobalTransform> {
        self.skeleton.global_transform(id)
    }

    /// The deformed coordinates, if a skin is bound.
    pub fn output_coords(&self) -> Option<&[Vec3]> {
        self.skin.as_ref().map(|skin| skin.output_coords())
    }

    /// The deformed normals, if a skin with normals is bound.
    pub fn output_normals(&self) -> Option<&[Vec3]> {
        self.skin.as_ref().and_then(|skin| skin.output_normals())
    }

    /// Attach or detach the character from an active render loop.
    pub fn set_live(&mut self, live: bool) {
        if live != self.skeleton.is_live() {
            println!(
                "[MARROW_HUMANOID] '{}' is now {}",
                self.name,
                if live { "live" } else { "detached" }
            );
        }
        self.skeleton.set_live(live);
    }

    /// Whether topology mutations are queued awaiting
    /// [`crate::schedule_functions::end_frame`].
    pub fn needs_sync(&self) -> bool {
        self.skeleton.needs_sync()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{vec3, Affine3A, Quat, Vec3};
    use serde::Deserialize;

    use crate::components::{Displacer, Joint, LocalTransform, Segment, SkinWeight};

    use super::*;

    #[test]
    pub fn test_whole_body_transform_premultiplies_every_root() {
        let mut humanoid = Humanoid::new("dummy");
        let skeleton = humanoid.skeleton_mut();
        let left = skeleton.add_joint("left", Joint::default());
        let right = skeleton.add_joint("right", Joint::default());
        skeleton
            .set_translation(right, vec3(0.0, 1.0, 0.0))
            .unwrap();
        skeleton.set_roots(vec![left, right]).unwrap();

        humanoid.set_local_transform(LocalTransform::from_translation(vec3(5.0, 0.0, 0.0)));
        humanoid.update_mesh().unwrap();

        assert_relative_eq!(
            humanoid.global_transform(left).unwrap().0,
            Affine3A::from_translation(vec3(5.0, 0.0, 0.0))
        );
        assert_relative_eq!(
            humanoid.global_transform(right).unwrap().0,
            Affine3A::from_translation(vec3(5.0, 1.0, 0.0))
        );
    }

    #[test]
    pub fn test_bad_weight_table_is_rejected_at_bind() {
        let mut humanoid = Humanoid::new("dummy");
        let root = humanoid.skeleton_mut().add_joint(
            "root",
            Joint::with_weights(vec![SkinWeight {
                vertex: 3,
                weight: 1.0,
            }]),
        );
        humanoid.skeleton_mut().set_roots(vec![root]).unwrap();

        let result = humanoid.bind_skin(vec![Vec3::ZERO], None, SkinConfig::default());
        assert!(matches!(
            result,
            Err(MarrowError::WeightVertexOutOfRange {
                vertex: 3,
                vertex_count: 1,
                ..
            })
        ));
        assert!(humanoid.skin().is_none());
    }

    #[test]
    pub fn test_bad_displacer_is_rejected_at_bind() {
        let mut humanoid = Humanoid::new("dummy");
        let skeleton = humanoid.skeleton_mut();
        let root = skeleton.add_joint("root", Joint::default());
        let face = skeleton.add_segment(
            "face",
            Segment::with_displacers(vec![Displacer::new(
                "smile",
                vec![9],
                vec![vec3(0.0, 1.0, 0.0)],
            )]),
        );
        skeleton.add_child(root, face).unwrap();
        skeleton.set_roots(vec![root]).unwrap();

        let result = humanoid.bind_skin(vec![Vec3::ZERO], None, SkinConfig::default());
        assert!(matches!(
            result,
            Err(MarrowError::DisplacerVertexOutOfRange {
                vertex: 9,
                vertex_count: 1,
                ..
            })
        ));
    }

    #[test]
    pub fn test_displacer_morphs_before_skinning() {
        let mut humanoid = Humanoid::new("dummy");
        let skeleton = humanoid.skeleton_mut();
        let root = skeleton.add_joint(
            "root",
            Joint::with_weights(vec![SkinWeight {
                vertex: 0,
                weight: 1.0,
            }]),
        );
        let face = skeleton.add_segment(
            "face",
            Segment::with_displacers(vec![Displacer::new(
                "smile",
                vec![0],
                vec![vec3(0.0, 1.0, 0.0)],
            )]),
        );
        skeleton.add_child(root, face).unwrap();
        skeleton.set_roots(vec![root]).unwrap();
        skeleton.set_translation(root, vec3(1.0, 0.0, 0.0)).unwrap();

        humanoid
            .bind_skin(vec![Vec3::ZERO], None, SkinConfig::default())
            .unwrap();
        humanoid.update_mesh().unwrap();
        assert_relative_eq!(
            humanoid.output_coords().unwrap()[0],
            vec3(1.0, 0.0, 0.0)
        );

        // The offset is applied in bind-pose space, then carried through the
        // joint transform.
        humanoid.set_displacer_weight(face, 0, 0.5).unwrap();
        humanoid.update_mesh().unwrap();
        assert_relative_eq!(
            humanoid.output_coords().unwrap()[0],
            vec3(1.0, 0.5, 0.0)
        );

        // Winding the weight back restores the undisplaced result.
        humanoid.set_displacer_weight(face, 0, 0.0).unwrap();
        humanoid.update_mesh().unwrap();
        assert_relative_eq!(
            humanoid.output_coords().unwrap()[0],
            vec3(1.0, 0.0, 0.0)
        );
    }

    #[test]
    pub fn test_displacer_moves_unweighted_vertices() {
        let mut humanoid = Humanoid::new("dummy");
        let skeleton = humanoid.skeleton_mut();
        let root = skeleton.add_joint("root", Joint::default());
        let face = skeleton.add_segment(
            "face",
            Segment::with_displacers(vec![Displacer::new(
                "brow",
                vec![0],
                vec![vec3(0.0, 0.0, 1.0)],
            )]),
        );
        skeleton.add_child(root, face).unwrap();
        skeleton.set_roots(vec![root]).unwrap();

        humanoid
            .bind_skin(vec![vec3(0.5, 0.5, 0.0)], None, SkinConfig::default())
            .unwrap();
        humanoid.update_mesh().unwrap();
        assert_eq!(humanoid.output_coords().unwrap()[0], vec3(0.5, 0.5, 0.0));

        humanoid.set_displacer_weight(face, 0, 2.0).unwrap();
        humanoid.update_mesh().unwrap();
        assert_eq!(humanoid.output_coords().unwrap()[0], vec3(0.5, 0.5, 2.0));
    }

    #[test]
    pub fn test_sites_follow_the_whole_body_transform() {
        let mut humanoid = Humanoid::new("dummy");
        let skeleton = humanoid.skeleton_mut();
        let root = skeleton.add_joint("root", Joint::default());
        let viewpoint = skeleton.add_site("viewpoint", Default::default());
        skeleton
            .set_translation(viewpoint, vec3(0.0, 1.6, 0.0))
            .unwrap();
        skeleton.set_roots(vec![root]).unwrap();
        humanoid.set_sites(vec![viewpoint]).unwrap();

        humanoid.set_local_transform(LocalTransform {
            rotation: Quat::from_rotation_y(std::f32::consts::PI),
            ..Default::default()
        });
        humanoid.update_mesh().unwrap();

        assert_relative_eq!(
            humanoid
                .global_transform(viewpoint)
                .unwrap()
                .0
                .transform_point3(Vec3::ZERO),
            vec3(0.0, 1.6, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    pub fn test_sites_list_rejects_other_kinds() {
        let mut humanoid = Humanoid::new("dummy");
        let root = humanoid.skeleton_mut().add_joint("root", Joint::default());
        assert!(matches!(
            humanoid.set_sites(vec![root]),
            Err(MarrowError::WrongNodeKind {
                expected: "Site",
                found: "Joint"
            })
        ));
    }

    // Skeleton descriptions arrive through the embedder's own serialization;
    // the components all derive serde so a loader can lift them straight out
    // of its documents.
    #[test]
    pub fn test_build_from_description() {
        #[derive(Deserialize)]
        struct JointDesc {
            name: String,
            parent: Option<String>,
            #[serde(default)]
            transform: LocalTransform,
            #[serde(default)]
            weights: Vec<SkinWeight>,
        }

        let description = r#"[
            {
                "name": "hip",
                "parent": null,
                "weights": [{ "vertex": 0, "weight": 0.5 }]
            },
            {
                "name": "knee",
                "parent": "hip",
                "transform": {
                    "translation": [1.0, 0.0, 0.0],
                    "center": [0.0, 0.0, 0.0],
                    "rotation": [0.0, 0.0, 0.0, 1.0],
                    "scale": [1.0, 1.0, 1.0],
                    "scale_orientation": [0.0, 0.0, 0.0, 1.0]
                },
                "weights": [{ "vertex": 0, "weight": 0.5 }]
            }
        ]"#;
        let descriptions: Vec<JointDesc> = serde_json::from_str(description).unwrap();

        let mut humanoid = Humanoid::new("dummy");
        let skeleton = humanoid.skeleton_mut();
        let mut roots = Vec::new();
        for desc in &descriptions {
            let id = skeleton.add_joint(desc.name.as_str(), Joint::with_weights(desc.weights.clone()));
            skeleton.set_local_transform(id, desc.transform).unwrap();
            match &desc.parent {
                Some(parent) => {
                    let parent = skeleton.find(parent).unwrap();
                    skeleton.add_child(parent, id).unwrap();
                }
                None => roots.push(id),
            }
        }
        skeleton.set_roots(roots).unwrap();

        humanoid
            .bind_skin(vec![Vec3::ZERO], None, SkinConfig::default())
            .unwrap();
        humanoid.update_mesh().unwrap();

        assert_eq!(humanoid.output_coords().unwrap()[0], vec3(0.5, 0.0, 0.0));
    }
}

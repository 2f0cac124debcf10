//! The deformable skin: bind-pose buffers in, blended buffers out.
//!
//! The skin is bound once (see [`crate::Humanoid::bind_skin`]) and owns the
//! output buffers the rendering adapter re-uploads after each completed
//! update tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{MarrowError, MarrowResult};

/// How the deformation pass trades memory for work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendStrategy {
    /// Keep per-vertex bookkeeping between passes and rebuild only the
    /// vertices influenced by a joint that moved
    #[default]
    SpeedOptimized,
    /// Carry no bookkeeping between passes and rebuild every vertex each
    /// pass
    SpaceOptimized,
}

/// Configuration applied when binding a skin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SkinConfig {
    /// The blending strategy
    pub strategy: BlendStrategy,
    /// Renormalize blended normals after accumulation.
    ///
    /// Off by default: linear-blend skinning shortens blended normals, and
    /// the engine passes them through untouched unless asked otherwise.
    pub normalize_normals: bool,
}

/// The bound skin.
///
/// Bind-pose buffers are read-only after binding; the morph buffer tracks
/// displacer offsets on top of the bind pose; the output buffers are
/// rewritten by the deformation pass and read by the rendering adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct Skin {
    pub(crate) config: SkinConfig,
    pub(crate) bind_coords: Vec<Vec3>,
    pub(crate) bind_normals: Option<Vec<Vec3>>,
    // Bind pose plus weighted displacer offsets.
    pub(crate) morph_coords: Vec<Vec3>,
    pub(crate) output_coords: Vec<Vec3>,
    pub(crate) output_normals: Option<Vec<Vec3>>,
    // Number of joints weighting each vertex, fixed at bind time.
    pub(crate) influences: Vec<u32>,
    // Vertices to rebuild on the next pass.
    pub(crate) dirty: Vec<bool>,
}

impl Skin {
    pub(crate) fn new(
        coords: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        config: SkinConfig,
    ) -> MarrowResult<Self> {
        if let Some(normals) = &normals {
            if normals.len() != coords.len() {
                return Err(MarrowError::NormalCountMismatch {
                    coords: coords.len(),
                    normals: normals.len(),
                });
            }
        }

        let vertex_count = coords.len();
        Ok(Self {
            config,
            morph_coords: coords.clone(),
            output_coords: vec![Vec3::ZERO; vertex_count],
            output_normals: normals.as_ref().map(|_| vec![Vec3::ZERO; vertex_count]),
            influences: vec![0; vertex_count],
            // Everything is rebuilt on the first pass.
            dirty: vec![true; vertex_count],
            bind_coords: coords,
            bind_normals: normals,
        })
    }

    /// The configuration the skin was bound with.
    pub fn config(&self) -> SkinConfig {
        self.config
    }

    /// Number of vertices in the skin.
    pub fn vertex_count(&self) -> usize {
        self.bind_coords.len()
    }

    /// The undeformed bind-pose coordinates.
    pub fn bind_coords(&self) -> &[Vec3] {
        &self.bind_coords
    }

    /// The undeformed bind-pose normals, if the skin was bound with normals.
    pub fn bind_normals(&self) -> Option<&[Vec3]> {
        self.bind_normals.as_deref()
    }

    /// The deformed coordinates, as of the last completed update tick.
    pub fn output_coords(&self) -> &[Vec3] {
        &self.output_coords
    }

    /// The deformed normals, if the skin was bound with normals.
    pub fn output_normals(&self) -> Option<&[Vec3]> {
        self.output_normals.as_deref()
    }
}

//! Per-vertex bone bindings: weight extraction and normalization

use bytemuck::{Pod, Zeroable};

use super::catalog::BoneCatalog;
use crate::core::{Error, Result};
use crate::model::source::SourceBone;

/// Maximum number of bones influencing one vertex
pub const MAX_BONE_INFLUENCE: usize = 4;

/// Bone id stored in an unused influence slot
pub const NO_BONE: i32 = -1;

/// Up to four `(bone id, weight)` influences of one vertex.
///
/// Unused slots hold `(NO_BONE, 0.0)`. A slot counts as free while its
/// weight is zero.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexBoneBinding {
    pub bone_ids: [i32; MAX_BONE_INFLUENCE],
    pub weights: [f32; MAX_BONE_INFLUENCE],
}

impl Default for VertexBoneBinding {
    fn default() -> Self {
        Self::unbound()
    }
}

impl VertexBoneBinding {
    /// All slots empty
    pub const fn unbound() -> Self {
        Self {
            bone_ids: [NO_BONE; MAX_BONE_INFLUENCE],
            weights: [0.0; MAX_BONE_INFLUENCE],
        }
    }

    /// Fill the first free slot. Returns false when all slots are taken.
    pub fn add_influence(&mut self, bone_id: i32, weight: f32) -> bool {
        match self.weights.iter().position(|&w| w == 0.0) {
            Some(slot) => {
                self.bone_ids[slot] = bone_id;
                self.weights[slot] = weight;
                true
            }
            None => false,
        }
    }

    /// Sum of all slot weights
    pub fn weight_sum(&self) -> f32 {
        self.weights.iter().sum()
    }

    /// Number of slots carrying a bone
    pub fn influence_count(&self) -> usize {
        self.bone_ids.iter().filter(|&&id| id != NO_BONE).count()
    }

    /// True if any bone influences this vertex
    pub fn is_skinned(&self) -> bool {
        self.weight_sum() > 0.0
    }

    /// Scale weights so they total 1.0. Unskinned vertices keep all-zero weights.
    pub fn normalize(&mut self) {
        let total = self.weight_sum();
        if total > 0.0 {
            for weight in &mut self.weights {
                *weight /= total;
            }
        }
    }
}

/// Summary of one extraction pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WeightStats {
    /// Influences written into a slot
    pub assigned: usize,
    /// Influences lost because the vertex already had four
    pub dropped: usize,
    /// Vertices left without any influence
    pub unskinned_vertices: usize,
}

/// Build normalized bone bindings for a mesh with `vertex_count` vertices.
///
/// Bone ids resolve through `catalog`, registering new names in order of
/// appearance. Influences past the fourth per vertex are dropped in
/// encounter order, not by weight. Non-positive and non-finite weights are
/// ignored.
pub fn extract_bone_weights(
    bones: &[SourceBone],
    vertex_count: usize,
    catalog: &mut BoneCatalog,
) -> Result<(Vec<VertexBoneBinding>, WeightStats)> {
    let mut bindings = vec![VertexBoneBinding::unbound(); vertex_count];
    let mut stats = WeightStats::default();

    // Every bone is validated before any name reaches the catalog
    for bone in bones {
        if let Some(bad) = bone.weights.iter().find(|w| w.vertex_id >= vertex_count) {
            return Err(Error::VertexIndexOutOfRange {
                bone: bone.name.clone(),
                vertex: bad.vertex_id,
                vertex_count,
            });
        }
    }

    for bone in bones {
        let bone_id = catalog.resolve_skinned(&bone.name, bone.offset_matrix) as i32;

        for influence in &bone.weights {
            if !influence.weight.is_finite() || influence.weight <= 0.0 {
                continue;
            }
            if bindings[influence.vertex_id].add_influence(bone_id, influence.weight) {
                stats.assigned += 1;
            } else {
                stats.dropped += 1;
            }
        }
    }

    for binding in &mut bindings {
        binding.normalize();
        if !binding.is_skinned() {
            stats.unskinned_vertices += 1;
        }
    }

    if stats.dropped > 0 {
        log::warn!(
            "Dropped {} bone influences beyond {} per vertex",
            stats.dropped,
            MAX_BONE_INFLUENCE
        );
    }

    Ok((bindings, stats))
}

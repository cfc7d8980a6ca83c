//! Model loading: meshes with bone bindings, the shared bone catalog and clips

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec2, Vec3};

use super::source::{SourceMesh, SourceNode, SourceScene};
use crate::animation::{
    extract_bone_weights, AnimationClip, Animator, BoneCatalog, VertexBoneBinding, WeightStats,
    MAX_BONE_INFLUENCE,
};
use crate::core::{AnimationConfig, Error, Result};

/// Vertex layout consumed by the skinning shader
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SkinnedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
    pub bone_ids: [i32; MAX_BONE_INFLUENCE],
    pub weights: [f32; MAX_BONE_INFLUENCE],
}

impl SkinnedVertex {
    pub fn binding(&self) -> VertexBoneBinding {
        VertexBoneBinding {
            bone_ids: self.bone_ids,
            weights: self.weights,
        }
    }
}

/// A loaded mesh
#[derive(Clone, Debug)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<SkinnedVertex>,
    pub indices: Vec<u32>,
    pub weight_stats: WeightStats,
}

/// A loaded model: meshes, the frozen bone catalog and its clips.
///
/// Catalog and clips are shared read-only with every animator created
/// from the model.
#[derive(Clone, Debug)]
pub struct Model {
    meshes: Vec<Mesh>,
    catalog: Arc<BoneCatalog>,
    clips: Vec<Arc<AnimationClip>>,
    global_inverse: Mat4,
    config: AnimationConfig,
}

impl Model {
    /// Build a model from a parsed scene.
    ///
    /// Meshes are processed depth-first in node order, so bone ids follow
    /// first sighting in that order; clips are built afterwards against the
    /// same catalog. Fails without side effects on malformed input.
    pub fn load(scene: &SourceScene, config: &AnimationConfig) -> Result<Self> {
        if scene.incomplete {
            return Err(Error::IncompleteScene);
        }
        let root = scene.root.as_ref().ok_or(Error::MissingRootNode)?;

        let mut catalog = BoneCatalog::new();
        let mut meshes = Vec::new();

        let mut stack: Vec<(&SourceNode, Mat4)> = vec![(root, Mat4::IDENTITY)];
        while let Some((node, parent_transform)) = stack.pop() {
            let accumulated = parent_transform * node.transform;

            for &mesh_index in &node.meshes {
                let source = scene.meshes.get(mesh_index).ok_or_else(|| Error::MeshIndexOutOfRange {
                    node: node.name.clone(),
                    mesh: mesh_index,
                    mesh_count: scene.meshes.len(),
                })?;
                let transform = config.bake_node_transforms.then_some(accumulated);
                meshes.push(process_mesh(source, transform, &mut catalog)?);
            }

            for child in node.children.iter().rev() {
                stack.push((child, accumulated));
            }
        }

        let mut clips = Vec::with_capacity(scene.animations.len());
        for animation in &scene.animations {
            let clip = AnimationClip::from_source(animation, root, &mut catalog, config)?;
            clips.push(Arc::new(clip));
        }

        if catalog.len() > config.max_bones {
            log::warn!(
                "Model has {} bones but animators only output {}",
                catalog.len(),
                config.max_bones
            );
        }

        let global_inverse = invert_or_identity(root.transform);

        log::info!(
            "Loaded model '{}': {} meshes, {} bones, {} clips",
            root.name,
            meshes.len(),
            catalog.len(),
            clips.len()
        );

        Ok(Self {
            meshes,
            catalog: Arc::new(catalog),
            clips,
            global_inverse,
            config: config.clone(),
        })
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn catalog(&self) -> &Arc<BoneCatalog> {
        &self.catalog
    }

    pub fn clips(&self) -> &[Arc<AnimationClip>] {
        &self.clips
    }

    /// Find a clip by name
    pub fn clip(&self, name: &str) -> Option<&Arc<AnimationClip>> {
        self.clips.iter().find(|clip| clip.name() == name)
    }

    /// Inverse of the root node transform
    pub fn global_inverse(&self) -> Mat4 {
        self.global_inverse
    }

    /// An idle animator wired to this model
    pub fn animator(&self) -> Animator {
        Animator::new(Arc::clone(&self.catalog), self.global_inverse, &self.config)
    }

    /// An animator playing the named clip
    pub fn animator_for(&self, clip_name: &str) -> Option<Animator> {
        let clip = self.clip(clip_name)?;
        let mut animator = self.animator();
        animator.play(Arc::clone(clip));
        Some(animator)
    }
}

fn process_mesh(source: &SourceMesh, transform: Option<Mat4>, catalog: &mut BoneCatalog) -> Result<Mesh> {
    let vertex_count = source.vertex_count();

    let indices: Vec<u32> = source.faces.iter().flatten().copied().collect();
    if let Some(&bad) = indices.iter().find(|&&index| index as usize >= vertex_count) {
        return Err(Error::FaceIndexOutOfRange {
            mesh: source.name.clone(),
            index: bad,
            vertex_count,
        });
    }

    let (bindings, weight_stats) = extract_bone_weights(&source.bones, vertex_count, catalog)?;

    let point = |p: Vec3| transform.map_or(p, |m| m.transform_point3(p));
    let normal_matrix = transform.map(Mat3::from_mat4);
    let direction = |d: Vec3| normal_matrix.map_or(d, |m| (m * d).normalize_or_zero());
    let attribute = |values: &[Vec3], i: usize| values.get(i).copied().unwrap_or(Vec3::ZERO);

    let vertices = bindings
        .iter()
        .enumerate()
        .map(|(i, binding)| SkinnedVertex {
            position: point(source.positions[i]).to_array(),
            normal: direction(attribute(&source.normals, i)).to_array(),
            tex_coords: source.tex_coords.get(i).copied().unwrap_or(Vec2::ZERO).to_array(),
            tangent: direction(attribute(&source.tangents, i)).to_array(),
            bitangent: direction(attribute(&source.bitangents, i)).to_array(),
            bone_ids: binding.bone_ids,
            weights: binding.weights,
        })
        .collect();

    log::debug!(
        "Mesh '{}': {} vertices, {} indices, {} bones, {} unskinned vertices",
        source.name,
        vertex_count,
        indices.len(),
        source.bones.len(),
        weight_stats.unskinned_vertices
    );

    Ok(Mesh {
        name: source.name.clone(),
        vertices,
        indices,
        weight_stats,
    })
}

fn invert_or_identity(matrix: Mat4) -> Mat4 {
    let determinant = matrix.determinant();
    if determinant.is_finite() && determinant.abs() > f32::EPSILON {
        matrix.inverse()
    } else {
        log::warn!("Root transform is not invertible, using identity as global inverse");
        Mat4::IDENTITY
    }
}

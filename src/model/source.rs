//! Parsed scene input: the hierarchy, meshes and clips handed over by an importer.
//!
//! These mirror what a model importer produces after parsing a file. They
//! derive serde so test fixtures and the inspector can store scenes as JSON.

use std::path::Path;

use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::Result;

/// One `(vertex, weight)` influence of a bone
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VertexWeight {
    pub vertex_id: usize,
    pub weight: f32,
}

impl VertexWeight {
    pub fn new(vertex_id: usize, weight: f32) -> Self {
        Self { vertex_id, weight }
    }
}

/// A bone as listed by a mesh
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceBone {
    pub name: String,
    /// Inverse bind transform
    #[serde(default)]
    pub offset_matrix: Mat4,
    #[serde(default)]
    pub weights: Vec<VertexWeight>,
}

impl SourceBone {
    pub fn new(name: impl Into<String>, offset_matrix: Mat4, weights: Vec<VertexWeight>) -> Self {
        Self {
            name: name.into(),
            offset_matrix,
            weights,
        }
    }
}

/// Raw mesh data. Attribute arrays other than `positions` may be empty.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub tangents: Vec<Vec3>,
    pub bitangents: Vec<Vec3>,
    /// Polygon index lists, flattened in order at load
    pub faces: Vec<Vec<u32>>,
    pub bones: Vec<SourceBone>,
}

impl SourceMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// A node of the scene hierarchy
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceNode {
    pub name: String,
    /// Transform relative to the parent node
    #[serde(default)]
    pub transform: Mat4,
    /// Indices into `SourceScene::meshes`
    #[serde(default)]
    pub meshes: Vec<usize>,
    #[serde(default)]
    pub children: Vec<SourceNode>,
}

impl SourceNode {
    pub fn new(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform,
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: SourceNode) -> Self {
        self.children.push(child);
        self
    }

    /// Builder-style mesh reference
    pub fn with_mesh(mut self, mesh: usize) -> Self {
        self.meshes.push(mesh);
        self
    }

    /// Number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SourceNode::node_count).sum::<usize>()
    }
}

/// A timed vector key (position or scale)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VectorKey {
    pub time: f32,
    pub value: Vec3,
}

impl VectorKey {
    pub fn new(time: f32, value: Vec3) -> Self {
        Self { time, value }
    }
}

/// A timed rotation key
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuatKey {
    pub time: f32,
    pub value: Quat,
}

impl QuatKey {
    pub fn new(time: f32, value: Quat) -> Self {
        Self { time, value }
    }
}

/// Keyframes for one animated node. Key times are in ticks.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceChannel {
    pub node_name: String,
    pub position_keys: Vec<VectorKey>,
    pub rotation_keys: Vec<QuatKey>,
    pub scaling_keys: Vec<VectorKey>,
}

impl SourceChannel {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            ..Default::default()
        }
    }
}

/// A raw animation clip
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceAnimation {
    pub name: String,
    /// Length in ticks
    pub duration: f32,
    /// 0 means unspecified
    pub ticks_per_second: f32,
    pub channels: Vec<SourceChannel>,
}

/// A whole parsed model
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceScene {
    /// Set by importers that could not read the whole file
    pub incomplete: bool,
    pub root: Option<SourceNode>,
    pub meshes: Vec<SourceMesh>,
    pub animations: Vec<SourceAnimation>,
}

impl SourceScene {
    /// Parse from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Save to a JSON file (pretty printed)
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }
}

//! Error types for the Bonework animation core

use thiserror::Error;

/// Main error type for model loading and animation construction
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scene has no root node")]
    MissingRootNode,

    #[error("Scene is flagged as incomplete")]
    IncompleteScene,

    #[error("Node '{node}' references mesh {mesh}, but the scene only has {mesh_count} meshes")]
    MeshIndexOutOfRange {
        node: String,
        mesh: usize,
        mesh_count: usize,
    },

    #[error("Bone '{bone}' weights vertex {vertex}, but the mesh only has {vertex_count} vertices")]
    VertexIndexOutOfRange {
        bone: String,
        vertex: usize,
        vertex_count: usize,
    },

    #[error("Mesh '{mesh}' face index {index} is out of range for {vertex_count} vertices")]
    FaceIndexOutOfRange {
        mesh: String,
        index: u32,
        vertex_count: usize,
    },

    #[error("Invalid keyframes in track '{track}': {reason}")]
    InvalidKeyframes { track: String, reason: String },

    #[error("Animation error: {0}")]
    Animation(String),
}

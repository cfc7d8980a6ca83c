//! Model input types and loading

pub mod source;
pub mod loader;

pub use source::{
    QuatKey, SourceAnimation, SourceBone, SourceChannel, SourceMesh, SourceNode, SourceScene,
    VectorKey, VertexWeight,
};
pub use loader::{Mesh, Model, SkinnedVertex};

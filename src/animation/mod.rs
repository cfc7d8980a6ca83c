//! Skeletal animation system

pub mod catalog;
pub mod skinning;
pub mod track;
pub mod hierarchy;
pub mod clip;
pub mod animator;
pub mod gpu;

pub use catalog::{BoneCatalog, BoneInfo};
pub use skinning::{extract_bone_weights, VertexBoneBinding, WeightStats, MAX_BONE_INFLUENCE, NO_BONE};
pub use track::{Bone, Interpolate, Keyframe, KeyframeTrack};
pub use hierarchy::{NodeData, NodeTree};
pub use clip::AnimationClip;
pub use animator::{update_all, Animator, PlaybackState};
pub use gpu::GpuBoneMatrix;

//! Bonework - skeletal animation core
//!
//! Turns a parsed scene (node hierarchy, per-mesh bone weights, keyframed
//! channels) into per-frame bone matrix palettes for GPU skinning.

pub mod core;
pub mod animation;
pub mod model;

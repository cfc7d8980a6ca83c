//! Runtime animation playback producing final bone matrices

use std::sync::Arc;

use glam::Mat4;
use rayon::prelude::*;

use super::catalog::BoneCatalog;
use super::clip::AnimationClip;
use super::gpu::{self, GpuBoneMatrix};
use crate::core::AnimationConfig;

/// Whether an animator has a clip bound
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// No clip; updates leave the matrices untouched
    Idle,
    /// A clip is bound and time advances on every update
    Playing,
}

/// Per-instance clip player.
///
/// Observes a shared clip and bone catalog (both read-only after load) and
/// owns its playback time and output palette. The palette has a fixed
/// capacity; entries for bones not visited keep their previous value,
/// identity before the first update.
#[derive(Clone, Debug)]
pub struct Animator {
    clip: Option<Arc<AnimationClip>>,
    catalog: Arc<BoneCatalog>,
    global_inverse: Mat4,
    /// Playback position in ticks
    current_time: f32,
    reset_time_on_play: bool,
    /// Catalog id for each node of the bound clip's hierarchy
    node_bone_ids: Vec<Option<usize>>,
    world_transforms: Vec<Mat4>,
    final_bone_matrices: Vec<Mat4>,
}

impl Animator {
    /// Create an idle animator
    pub fn new(catalog: Arc<BoneCatalog>, global_inverse: Mat4, config: &AnimationConfig) -> Self {
        Self {
            clip: None,
            catalog,
            global_inverse,
            current_time: 0.0,
            reset_time_on_play: config.reset_time_on_play,
            node_bone_ids: Vec::new(),
            world_transforms: Vec::new(),
            final_bone_matrices: vec![Mat4::IDENTITY; config.max_bones],
        }
    }

    /// Create an animator already playing `clip`
    pub fn with_clip(
        clip: Arc<AnimationClip>,
        catalog: Arc<BoneCatalog>,
        global_inverse: Mat4,
        config: &AnimationConfig,
    ) -> Self {
        let mut animator = Self::new(catalog, global_inverse, config);
        animator.play(clip);
        animator
    }

    /// Bind `clip`, rewinding to time 0 unless the config disabled it
    pub fn play(&mut self, clip: Arc<AnimationClip>) {
        if self.reset_time_on_play {
            self.current_time = 0.0;
        }
        self.bind(clip);
    }

    /// Bind `clip`, keeping the current time
    pub fn bind(&mut self, clip: Arc<AnimationClip>) {
        let capacity = self.final_bone_matrices.len();
        self.node_bone_ids = clip
            .hierarchy()
            .nodes()
            .iter()
            .map(|node| self.catalog.find(&node.name))
            .collect();

        let overflow = self
            .node_bone_ids
            .iter()
            .flatten()
            .filter(|&&id| id >= capacity)
            .count();
        if overflow > 0 {
            log::warn!(
                "Clip '{}': {} bones have ids beyond the {} matrix capacity and will not be written",
                clip.name(),
                overflow,
                capacity
            );
        }

        self.clip = Some(clip);
    }

    /// Unbind the clip, returning to idle. Matrices and time are kept.
    pub fn stop(&mut self) -> Option<Arc<AnimationClip>> {
        self.node_bone_ids.clear();
        self.clip.take()
    }

    pub fn state(&self) -> PlaybackState {
        if self.clip.is_some() {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    pub fn clip(&self) -> Option<&Arc<AnimationClip>> {
        self.clip.as_ref()
    }

    /// Playback position in ticks
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// Jump to a position in ticks. Takes effect at the next update.
    pub fn set_time(&mut self, time: f32) {
        self.current_time = time;
    }

    pub fn global_inverse(&self) -> Mat4 {
        self.global_inverse
    }

    /// Number of matrices in the output palette
    pub fn capacity(&self) -> usize {
        self.final_bone_matrices.len()
    }

    /// Advance playback by `delta_time` seconds and recompute the palette.
    ///
    /// Time advances by `ticks_per_second * delta_time` and wraps into
    /// `[0, duration)`. The hierarchy root is parented to `parent_transform`.
    pub fn update(&mut self, delta_time: f32, parent_transform: Mat4) {
        let Some(clip) = self.clip.as_deref() else {
            return;
        };

        self.current_time += clip.ticks_per_second() * delta_time;
        self.current_time = wrap_time(self.current_time, clip.duration());
        let time = self.current_time;

        clip.hierarchy().calculate_world_transforms(
            parent_transform,
            |index, node| match clip.node_track(index) {
                Some(bone) => bone.interpolate(time),
                None => node.transform,
            },
            &mut self.world_transforms,
        );

        for (world, bone_id) in self.world_transforms.iter().zip(&self.node_bone_ids) {
            let Some(id) = *bone_id else {
                continue;
            };
            if let Some(slot) = self.final_bone_matrices.get_mut(id) {
                *slot = self.global_inverse * *world * self.catalog.offset_matrix(id);
            }
        }
    }

    /// The output palette, indexed by bone id
    pub fn final_bone_matrices(&self) -> &[Mat4] {
        &self.final_bone_matrices
    }

    /// The output palette packed for GPU upload
    pub fn gpu_matrices(&self) -> Vec<GpuBoneMatrix> {
        gpu::pack_matrices(&self.final_bone_matrices)
    }
}

/// Wrap `time` into `[0, duration)`. Degenerate durations pin time to 0.
fn wrap_time(time: f32, duration: f32) -> f32 {
    if !(duration.is_finite() && duration > 0.0) || !time.is_finite() {
        return 0.0;
    }
    let wrapped = time.rem_euclid(duration);
    // rem_euclid can round up to `duration` for tiny negative inputs
    if wrapped >= duration { 0.0 } else { wrapped }
}

/// Update independent animators in parallel
pub fn update_all(animators: &mut [Animator], delta_time: f32, parent_transform: Mat4) {
    animators
        .par_iter_mut()
        .for_each(|animator| animator.update(delta_time, parent_transform));
}

//! Keyframe tracks and per-joint bone animation

use glam::{Mat4, Quat, Vec3};

use crate::core::{Error, Result};
use crate::model::source::SourceChannel;

/// Segments shorter than this are treated as zero-length
const MIN_SEGMENT_LENGTH: f32 = 1e-6;

/// Values that can be blended between two keyframes
pub trait Interpolate: Copy {
    /// Blend from `start` to `end` by `t` in [0, 1]
    fn interpolate(start: Self, end: Self, t: f32) -> Self;
}

impl Interpolate for Vec3 {
    fn interpolate(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}

impl Interpolate for Quat {
    /// Shortest-path spherical interpolation
    fn interpolate(start: Self, end: Self, t: f32) -> Self {
        start.slerp(end, t)
    }
}

/// A single timed sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe<T> {
    pub time: f32,
    pub value: T,
}

impl<T> Keyframe<T> {
    pub fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// Samples of one transform component, strictly increasing in time
#[derive(Clone, Debug)]
pub struct KeyframeTrack<T> {
    keys: Vec<Keyframe<T>>,
}

impl<T> Default for KeyframeTrack<T> {
    fn default() -> Self {
        Self { keys: Vec::new() }
    }
}

impl<T: Interpolate> KeyframeTrack<T> {
    /// Create a track, rejecting non-finite or non-increasing times.
    ///
    /// `label` names the track in the error.
    pub fn new(label: &str, keys: Vec<Keyframe<T>>) -> Result<Self> {
        if let Some(key) = keys.iter().find(|k| !k.time.is_finite()) {
            return Err(Error::InvalidKeyframes {
                track: label.to_string(),
                reason: format!("non-finite key time {}", key.time),
            });
        }
        if let Some(pair) = keys.windows(2).find(|pair| pair[1].time <= pair[0].time) {
            return Err(Error::InvalidKeyframes {
                track: label.to_string(),
                reason: format!(
                    "key times must increase, got {} then {}",
                    pair[0].time, pair[1].time
                ),
            });
        }
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[Keyframe<T>] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Time of the last key, or 0 for an empty track
    pub fn end_time(&self) -> f32 {
        self.keys.last().map(|k| k.time).unwrap_or(0.0)
    }

    /// Left index of the segment containing `time`.
    ///
    /// Scans left to right for the first key whose successor lies after
    /// `time`; times past the last interior key clamp to the final segment.
    fn segment_index(&self, time: f32) -> usize {
        let last_segment = self.keys.len().saturating_sub(2);
        (0..last_segment)
            .find(|&i| time < self.keys[i + 1].time)
            .unwrap_or(last_segment)
    }

    /// Blend factor of `time` within the segment starting at `index`,
    /// clamped to [0, 1]. Zero-length or missing segments yield 0.
    fn segment_factor(&self, index: usize, time: f32) -> f32 {
        let (Some(start), Some(end)) = (self.keys.get(index), self.keys.get(index + 1)) else {
            return 0.0;
        };
        let start = start.time;
        let length = end.time - start;
        if length <= MIN_SEGMENT_LENGTH {
            return 0.0;
        }
        ((time - start) / length).clamp(0.0, 1.0)
    }

    /// Interpolated value at `time`, or `None` for an empty track.
    /// A single key is returned as-is for any time.
    pub fn sample(&self, time: f32) -> Option<T> {
        match self.keys.as_slice() {
            [] => None,
            [only] => Some(only.value),
            _ => {
                let index = self.segment_index(time);
                let t = self.segment_factor(index, time);
                Some(T::interpolate(self.keys[index].value, self.keys[index + 1].value, t))
            }
        }
    }
}

/// Animation track for one skeletal joint within a clip.
///
/// Position, rotation and scale each run on their own time axis. An empty
/// component track leaves that component at rest (no translation, no
/// rotation, unit scale).
#[derive(Clone, Debug)]
pub struct Bone {
    name: String,
    id: usize,
    positions: KeyframeTrack<Vec3>,
    rotations: KeyframeTrack<Quat>,
    scales: KeyframeTrack<Vec3>,
}

impl Bone {
    pub fn new(
        name: impl Into<String>,
        id: usize,
        positions: KeyframeTrack<Vec3>,
        rotations: KeyframeTrack<Quat>,
        scales: KeyframeTrack<Vec3>,
    ) -> Self {
        Self {
            name: name.into(),
            id,
            positions,
            rotations,
            scales,
        }
    }

    /// Build from a source channel. Rotation keys are normalized.
    pub fn from_channel(channel: &SourceChannel, id: usize) -> Result<Self> {
        let name = &channel.node_name;

        let positions = KeyframeTrack::new(
            &format!("{}/position", name),
            channel
                .position_keys
                .iter()
                .map(|k| Keyframe::new(k.time, k.value))
                .collect(),
        )?;

        let mut rotation_keys = Vec::with_capacity(channel.rotation_keys.len());
        for key in &channel.rotation_keys {
            let rotation = normalize_rotation(key.value).ok_or_else(|| Error::InvalidKeyframes {
                track: format!("{}/rotation", name),
                reason: format!("degenerate quaternion at time {}", key.time),
            })?;
            rotation_keys.push(Keyframe::new(key.time, rotation));
        }
        let rotations = KeyframeTrack::new(&format!("{}/rotation", name), rotation_keys)?;

        let scales = KeyframeTrack::new(
            &format!("{}/scale", name),
            channel
                .scaling_keys
                .iter()
                .map(|k| Keyframe::new(k.time, k.value))
                .collect(),
        )?;

        Ok(Self::new(name.clone(), id, positions, rotations, scales))
    }

    /// Same tracks under a different bone id
    pub(crate) fn with_id(mut self, id: usize) -> Self {
        self.id = id;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Catalog id of this bone
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn positions(&self) -> &KeyframeTrack<Vec3> {
        &self.positions
    }

    pub fn rotations(&self) -> &KeyframeTrack<Quat> {
        &self.rotations
    }

    pub fn scales(&self) -> &KeyframeTrack<Vec3> {
        &self.scales
    }

    pub fn interpolate_position(&self, time: f32) -> Vec3 {
        self.positions.sample(time).unwrap_or(Vec3::ZERO)
    }

    pub fn interpolate_rotation(&self, time: f32) -> Quat {
        self.rotations.sample(time).unwrap_or(Quat::IDENTITY)
    }

    pub fn interpolate_scale(&self, time: f32) -> Vec3 {
        self.scales.sample(time).unwrap_or(Vec3::ONE)
    }

    /// Local transform at `time`, composed as translation * rotation * scale
    pub fn interpolate(&self, time: f32) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.interpolate_scale(time),
            self.interpolate_rotation(time),
            self.interpolate_position(time),
        )
    }

    /// Time of the latest key across all three tracks
    pub fn end_time(&self) -> f32 {
        self.positions
            .end_time()
            .max(self.rotations.end_time())
            .max(self.scales.end_time())
    }
}

/// `Quat::normalize` that rejects zero-length and non-finite input
fn normalize_rotation(rotation: Quat) -> Option<Quat> {
    let length = rotation.length();
    if length.is_finite() && length > 1e-8 {
        Some(rotation / length)
    } else {
        None
    }
}

//! Animation clips: bone tracks plus an owned copy of the node hierarchy

use std::collections::HashMap;

use super::catalog::BoneCatalog;
use super::hierarchy::NodeTree;
use super::track::Bone;
use crate::core::{AnimationConfig, Result};
use crate::model::source::{SourceAnimation, SourceNode};

/// A named animation, immutable once built.
///
/// Only animated nodes have a `Bone` track; every node of the model's
/// hierarchy is present in `hierarchy` whether animated or not.
#[derive(Clone, Debug)]
pub struct AnimationClip {
    name: String,
    /// Length in ticks
    duration: f32,
    ticks_per_second: f32,
    bones: Vec<Bone>,
    bone_lookup: HashMap<String, usize>,
    hierarchy: NodeTree,
    /// Track index for each hierarchy node, parallel to `hierarchy`
    node_tracks: Vec<Option<usize>>,
}

impl AnimationClip {
    /// Build a clip from a raw animation and the model's root node.
    ///
    /// Channel targets resolve through `catalog`; names it has not seen yet
    /// are registered there, so mesh and animation ids share one space.
    pub fn from_source(
        animation: &SourceAnimation,
        root: &SourceNode,
        catalog: &mut BoneCatalog,
        config: &AnimationConfig,
    ) -> Result<Self> {
        let ticks_per_second = config.ticks_per_second_or_default(animation.ticks_per_second);

        let mut bones: Vec<Bone> = Vec::with_capacity(animation.channels.len());
        let mut bone_lookup = HashMap::with_capacity(animation.channels.len());

        // Every channel is validated before any name reaches the catalog
        let built = animation
            .channels
            .iter()
            .map(|channel| Bone::from_channel(channel, 0))
            .collect::<Result<Vec<_>>>()?;

        for (channel, bone) in animation.channels.iter().zip(built) {
            let bone = bone.with_id(catalog.resolve_animated(&channel.node_name));

            match bone_lookup.get(&channel.node_name) {
                Some(&existing) => {
                    log::warn!(
                        "Clip '{}' has several channels for '{}', keeping the last",
                        animation.name,
                        channel.node_name
                    );
                    bones[existing] = bone;
                }
                None => {
                    bone_lookup.insert(channel.node_name.clone(), bones.len());
                    bones.push(bone);
                }
            }
        }

        let hierarchy = NodeTree::copy_from(root);
        let node_tracks: Vec<Option<usize>> = hierarchy
            .nodes()
            .iter()
            .map(|node| bone_lookup.get(&node.name).copied())
            .collect();

        let bound = node_tracks.iter().flatten().count();
        if bound < bones.len() {
            log::warn!(
                "Clip '{}': {} of {} channels target nodes missing from the hierarchy",
                animation.name,
                bones.len() - bound,
                bones.len()
            );
        }

        log::debug!(
            "Built clip '{}': {} ticks at {} ticks/s, {} tracks, {} nodes",
            animation.name,
            animation.duration,
            ticks_per_second,
            bones.len(),
            hierarchy.len()
        );

        Ok(Self {
            name: animation.name.clone(),
            duration: animation.duration,
            ticks_per_second,
            bones,
            bone_lookup,
            hierarchy,
            node_tracks,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length in ticks
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }

    /// Length in seconds
    pub fn duration_seconds(&self) -> f32 {
        self.duration / self.ticks_per_second
    }

    /// Track for an animated node, if any
    pub fn find_bone(&self, name: &str) -> Option<&Bone> {
        self.bone_lookup.get(name).map(|&index| &self.bones[index])
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn hierarchy(&self) -> &NodeTree {
        &self.hierarchy
    }

    /// Track for the hierarchy node at `node_index`
    pub fn node_track(&self, node_index: usize) -> Option<&Bone> {
        self.node_tracks
            .get(node_index)
            .copied()
            .flatten()
            .map(|index| &self.bones[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use crate::model::source::{QuatKey, SourceChannel, VectorKey};
    use glam::{Mat4, Quat, Vec3};

    fn skeleton() -> SourceNode {
        SourceNode::new("Root", Mat4::IDENTITY).with_child(
            SourceNode::new("Hips", Mat4::from_translation(Vec3::Y))
                .with_child(SourceNode::new("Spine", Mat4::from_translation(Vec3::Y))),
        )
    }

    fn channel(name: &str) -> SourceChannel {
        let mut channel = SourceChannel::new(name);
        channel.position_keys = vec![
            VectorKey::new(0.0, Vec3::ZERO),
            VectorKey::new(10.0, Vec3::X),
        ];
        channel.rotation_keys = vec![QuatKey::new(0.0, Quat::IDENTITY)];
        channel
    }

    fn animation(ticks_per_second: f32, channels: Vec<SourceChannel>) -> SourceAnimation {
        SourceAnimation {
            name: "walk".into(),
            duration: 10.0,
            ticks_per_second,
            channels,
        }
    }

    #[test]
    fn test_copies_timing() {
        let mut catalog = BoneCatalog::new();
        let clip = AnimationClip::from_source(
            &animation(30.0, vec![channel("Hips")]),
            &skeleton(),
            &mut catalog,
            &AnimationConfig::default(),
        )
        .unwrap();

        assert_eq!(clip.name(), "walk");
        assert_eq!(clip.duration(), 10.0);
        assert_eq!(clip.ticks_per_second(), 30.0);
        assert!((clip.duration_seconds() - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_default_ticks_per_second() {
        let mut catalog = BoneCatalog::new();
        let clip = AnimationClip::from_source(
            &animation(0.0, vec![]),
            &skeleton(),
            &mut catalog,
            &AnimationConfig::default(),
        )
        .unwrap();

        assert_eq!(clip.ticks_per_second(), 25.0);
    }

    #[test]
    fn test_channels_reuse_catalog_ids() {
        crate::core::logging::try_init_for_tests();
        let mut catalog = BoneCatalog::new();
        catalog.resolve_skinned("Spine", Mat4::IDENTITY);
        catalog.resolve_skinned("Hips", Mat4::IDENTITY);

        let clip = AnimationClip::from_source(
            &animation(25.0, vec![channel("Hips"), channel("Spine"), channel("Tail")]),
            &skeleton(),
            &mut catalog,
            &AnimationConfig::default(),
        )
        .unwrap();

        assert_eq!(clip.find_bone("Spine").unwrap().id(), 0);
        assert_eq!(clip.find_bone("Hips").unwrap().id(), 1);
        // Animation-only bone gets the next id
        assert_eq!(clip.find_bone("Tail").unwrap().id(), 2);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_hierarchy_is_total() {
        let mut catalog = BoneCatalog::new();
        let clip = AnimationClip::from_source(
            &animation(25.0, vec![channel("Spine")]),
            &skeleton(),
            &mut catalog,
            &AnimationConfig::default(),
        )
        .unwrap();

        assert_eq!(clip.hierarchy().len(), 3);
        assert!(clip.node_track(0).is_none());
        assert!(clip.node_track(1).is_none());
        assert_eq!(clip.node_track(2).unwrap().name(), "Spine");
        assert!(clip.find_bone("Root").is_none());
    }

    #[test]
    fn test_duplicate_channel_keeps_last() {
        crate::core::logging::try_init_for_tests();
        let mut catalog = BoneCatalog::new();
        let mut second = channel("Hips");
        second.position_keys = vec![VectorKey::new(0.0, Vec3::new(0.0, 0.0, 9.0))];

        let clip = AnimationClip::from_source(
            &animation(25.0, vec![channel("Hips"), second]),
            &skeleton(),
            &mut catalog,
            &AnimationConfig::default(),
        )
        .unwrap();

        assert_eq!(clip.bones().len(), 1);
        assert_eq!(
            clip.find_bone("Hips").unwrap().interpolate_position(5.0),
            Vec3::new(0.0, 0.0, 9.0)
        );
    }

    #[test]
    fn test_invalid_keyframes_fail_construction() {
        let mut catalog = BoneCatalog::new();
        let mut bad = channel("Hips");
        bad.position_keys = vec![
            VectorKey::new(1.0, Vec3::ZERO),
            VectorKey::new(1.0, Vec3::X),
        ];

        let result = AnimationClip::from_source(
            &animation(25.0, vec![bad]),
            &skeleton(),
            &mut catalog,
            &AnimationConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_channel_leaves_catalog_untouched() {
        let mut catalog = BoneCatalog::new();
        catalog.resolve_skinned("Spine", Mat4::IDENTITY);

        let mut bad = channel("Head");
        bad.rotation_keys = vec![
            QuatKey::new(2.0, Quat::IDENTITY),
            QuatKey::new(1.0, Quat::IDENTITY),
        ];

        let result = AnimationClip::from_source(
            &animation(25.0, vec![channel("Hips"), bad]),
            &skeleton(),
            &mut catalog,
            &AnimationConfig::default(),
        );
        assert!(matches!(result, Err(Error::InvalidKeyframes { .. })));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.find("Hips"), None);
    }

    #[test]
    fn test_clips_own_independent_hierarchies() {
        let mut catalog = BoneCatalog::new();
        let mut root = skeleton();
        let config = AnimationConfig::default();

        let first = AnimationClip::from_source(&animation(25.0, vec![]), &root, &mut catalog, &config).unwrap();
        root.children.clear();
        let second = AnimationClip::from_source(&animation(25.0, vec![]), &root, &mut catalog, &config).unwrap();

        assert_eq!(first.hierarchy().len(), 3);
        assert_eq!(second.hierarchy().len(), 1);
    }
}

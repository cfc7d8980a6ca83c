//! Global bone registry shared by every mesh and clip of a model

use glam::Mat4;
use std::collections::HashMap;

/// Per-bone data indexed by catalog id
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneInfo {
    /// Inverse bind transform: mesh space to bone space in bind pose
    pub offset_matrix: Mat4,
    /// False while the bone is only known from an animation channel
    pub skinned: bool,
}

impl BoneInfo {
    /// A bone seen in mesh weight data
    pub fn new(offset_matrix: Mat4) -> Self {
        Self {
            offset_matrix,
            skinned: true,
        }
    }

    /// A bone only driven by animation; no mesh binds to it yet
    pub fn animated_only() -> Self {
        Self {
            offset_matrix: Mat4::IDENTITY,
            skinned: false,
        }
    }
}

/// Bone name to dense id mapping, plus the parallel `BoneInfo` list.
///
/// Ids are assigned in order of first sighting and never reused. Mesh
/// weights and animation channels resolve through the same catalog so both
/// agree on the id space.
#[derive(Clone, Debug, Default)]
pub struct BoneCatalog {
    names: Vec<String>,
    infos: Vec<BoneInfo>,
    ids: HashMap<String, usize>,
}

impl BoneCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a bone found in mesh weight data.
    ///
    /// New names get the next id and keep `offset_matrix`. A name first
    /// registered by an animation channel gets its real offset here.
    pub fn resolve_skinned(&mut self, name: &str, offset_matrix: Mat4) -> usize {
        if let Some(&id) = self.ids.get(name) {
            let info = &mut self.infos[id];
            if !info.skinned {
                *info = BoneInfo::new(offset_matrix);
                log::debug!("Bone '{}' (id {}) now bound to mesh weights", name, id);
            }
            return id;
        }
        self.insert(name, BoneInfo::new(offset_matrix))
    }

    /// Resolve a bone named by an animation channel, registering it with an
    /// identity offset if no mesh has seen it.
    pub fn resolve_animated(&mut self, name: &str) -> usize {
        match self.ids.get(name) {
            Some(&id) => id,
            None => self.insert(name, BoneInfo::animated_only()),
        }
    }

    fn insert(&mut self, name: &str, info: BoneInfo) -> usize {
        let id = self.infos.len();
        self.ids.insert(name.to_string(), id);
        self.names.push(name.to_string());
        self.infos.push(info);
        log::debug!("Registered bone '{}' as id {}", name, id);
        id
    }

    /// Number of registered bones
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Find a bone id by name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.ids.get(name).copied()
    }

    /// Get bone info by id
    pub fn info(&self, id: usize) -> Option<&BoneInfo> {
        self.infos.get(id)
    }

    /// Get the offset matrix for a bone, identity for unknown ids
    pub fn offset_matrix(&self, id: usize) -> Mat4 {
        self.infos
            .get(id)
            .map(|info| info.offset_matrix)
            .unwrap_or(Mat4::IDENTITY)
    }

    /// Get a bone name by id
    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// All infos, indexed by id
    pub fn infos(&self) -> &[BoneInfo] {
        &self.infos
    }

    /// Iterate `(id, name)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().enumerate().map(|(id, name)| (id, name.as_str()))
    }
}

//! Runtime configuration for model loading and playback.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::types::Result;

/// Default capacity of an animator's output matrix array
pub const DEFAULT_MAX_BONES: usize = 200;

/// Ticks per second substituted when a clip does not specify one
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

/// Loader and animator settings. Every field is optional in JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Number of matrices each animator outputs (the GPU palette size).
    pub max_bones: usize,
    /// Used when a source clip reports zero or no ticks per second.
    pub default_ticks_per_second: f32,
    /// Bake accumulated node transforms into mesh vertices at load time.
    pub bake_node_transforms: bool,
    /// Rewind to time 0 whenever `Animator::play` binds a clip.
    pub reset_time_on_play: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            max_bones: DEFAULT_MAX_BONES,
            default_ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            bake_node_transforms: true,
            reset_time_on_play: true,
        }
    }
}

impl AnimationConfig {
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

    /// Ticks per second for a clip, falling back to the default for 0 or
    /// non-finite values.
    pub fn ticks_per_second_or_default(&self, ticks_per_second: f32) -> f32 {
        if ticks_per_second.is_finite() && ticks_per_second > 0.0 {
            ticks_per_second
        } else {
            self.default_ticks_per_second
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;

    #[test]
    fn test_default_config() {
        let config = AnimationConfig::default();
        assert_eq!(config.max_bones, 200);
        assert_eq!(config.default_ticks_per_second, 25.0);
        assert!(config.bake_node_transforms);
        assert!(config.reset_time_on_play);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AnimationConfig::from_json_str(r#"{ "max_bones": 64 }"#).unwrap();
        assert_eq!(config.max_bones, 64);
        assert_eq!(config.default_ticks_per_second, 25.0);
        assert!(config.bake_node_transforms);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let result = AnimationConfig::from_json_str("{ max_bones: ");
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_ticks_per_second_fallback() {
        let config = AnimationConfig::default();
        assert_eq!(config.ticks_per_second_or_default(0.0), 25.0);
        assert_eq!(config.ticks_per_second_or_default(-3.0), 25.0);
        assert_eq!(config.ticks_per_second_or_default(f32::NAN), 25.0);
        assert_eq!(config.ticks_per_second_or_default(30.0), 30.0);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("animation.json");

        let config = AnimationConfig {
            max_bones: 128,
            reset_time_on_play: false,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = AnimationConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = AnimationConfig::load(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}

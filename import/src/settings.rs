//! Import settings, loadable from a TOML file.

use std::path::Path;

use meshforge_core::animation::AnimationRepeatMode;
use meshforge_core::material::ModelMaterial;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Export type producing a [`Model`](meshforge_core::model::Model).
pub const EXPORT_MODEL: &str = "model";
/// Export type producing an [`AnimationClip`](meshforge_core::animation::AnimationClip).
pub const EXPORT_ANIMATION: &str = "animation";

/// Every option of an import command.
///
/// Missing TOML keys fall back to [`Default`].
///
/// ```toml
/// export_type = "model"
/// compact = true
/// preserved_nodes = ["head", "weapon_socket"]
/// allow_32bit_index = false
/// scale_import = 0.01
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// `"model"` or `"animation"`; any other value fails the import.
    pub export_type: String,
    /// Tag applied to textures referenced by the model.
    pub texture_tag: Option<String>,
    /// Request adjacent-edge-normal tessellation (not supported).
    pub tessellation_aen: bool,
    /// Effect used for materials the source leaves unassigned.
    pub effect_name: Option<String>,
    pub animation_repeat_mode: AnimationRepeatMode,
    /// Materials appended to the model's material list.
    pub materials: Vec<ModelMaterial>,
    /// Merge meshes and prune unused nodes.
    pub compact: bool,
    /// Names of nodes to keep as distinct attachment points.
    pub preserved_nodes: Vec<String>,
    pub allow_32bit_index: bool,
    pub allow_unsigned_blend_indices: bool,
    /// Uniform scale applied to the model on load.
    pub scale_import: f32,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            export_type: EXPORT_MODEL.into(),
            texture_tag: None,
            tessellation_aen: false,
            effect_name: None,
            animation_repeat_mode: AnimationRepeatMode::default(),
            materials: Vec::new(),
            compact: true,
            preserved_nodes: Vec::new(),
            allow_32bit_index: false,
            allow_unsigned_blend_indices: false,
            scale_import: 1.0,
        }
    }
}

impl ImportSettings {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, SettingsError> {
        toml::from_str(text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }
}

//! Material declaration, instance and model-material entry types.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::parameters::ParameterCollection;

/// Alpha rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AlphaMode {
    /// Fully opaque (alpha ignored).
    #[default]
    Opaque,
    /// Alpha masking with cutoff threshold.
    Mask {
        /// Cutoff value (0.0-1.0). Fragments with alpha below this are discarded.
        cutoff: f32,
    },
    /// Full alpha blending.
    Blend,
}

/// Material declaration: the effect to render with and its default values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub name: Option<String>,
    /// Effect (shader) name.
    pub effect: Option<String>,
    pub alpha_mode: AlphaMode,
    pub parameters: ParameterCollection,
}

impl Material {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the material name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the effect name.
    #[must_use]
    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = Some(effect.into());
        self
    }

    /// Set the alpha mode.
    #[must_use]
    pub fn with_alpha_mode(mut self, alpha_mode: AlphaMode) -> Self {
        self.alpha_mode = alpha_mode;
        self
    }
}

/// A material bound to a model, with per-use shadow options.
///
/// Models reference instances by index into their material list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialInstance {
    /// The declaration; `None` when it failed to resolve.
    pub material: Option<Arc<Material>>,
    pub is_shadow_caster: bool,
    pub is_shadow_receiver: bool,
}

impl MaterialInstance {
    /// Instance of `material` that casts and receives shadows.
    pub fn new(material: Arc<Material>) -> Self {
        Self {
            material: Some(material),
            is_shadow_caster: true,
            is_shadow_receiver: true,
        }
    }

    /// Set the shadow options.
    #[must_use]
    pub fn with_shadows(mut self, caster: bool, receiver: bool) -> Self {
        self.is_shadow_caster = caster;
        self.is_shadow_receiver = receiver;
        self
    }

    /// Whether both instances agree on casting and receiving shadows.
    pub fn same_shadow_options(&self, other: &Self) -> bool {
        self.is_shadow_caster == other.is_shadow_caster
            && self.is_shadow_receiver == other.is_shadow_receiver
    }
}

impl Default for MaterialInstance {
    fn default() -> Self {
        Self {
            material: None,
            is_shadow_caster: true,
            is_shadow_receiver: true,
        }
    }
}

/// Named material entry supplied with import settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMaterial {
    pub name: String,
    #[serde(default)]
    pub instance: Option<Arc<MaterialInstance>>,
}

impl ModelMaterial {
    /// The instance, if it is present and resolves to a material.
    pub fn resolved(&self) -> Option<&Arc<MaterialInstance>> {
        self.instance.as_ref().filter(|i| i.material.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_defaults_cast_and_receive() {
        let instance = MaterialInstance::new(Arc::new(Material::new().with_name("stone")));
        assert!(instance.is_shadow_caster);
        assert!(instance.is_shadow_receiver);
    }

    #[test]
    fn shadow_options_compare_flags_only() {
        let a = MaterialInstance::new(Arc::new(Material::new().with_effect("lit")));
        let b = MaterialInstance::new(Arc::new(Material::new().with_effect("unlit")));
        assert!(a.same_shadow_options(&b));
        assert!(!a.same_shadow_options(&b.clone().with_shadows(false, true)));
    }

    #[test]
    fn model_material_resolution() {
        let unresolved = ModelMaterial {
            name: "missing".into(),
            instance: Some(Arc::new(MaterialInstance::default())),
        };
        let absent = ModelMaterial {
            name: "absent".into(),
            instance: None,
        };
        let ok = ModelMaterial {
            name: "ok".into(),
            instance: Some(Arc::new(MaterialInstance::new(Arc::new(Material::new())))),
        };
        assert!(unresolved.resolved().is_none());
        assert!(absent.resolved().is_none());
        assert!(ok.resolved().is_some());
    }
}

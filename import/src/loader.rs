//! Source loaders.
//!
//! A [`ModelLoader`] turns a source file into a [`Model`] or an
//! [`AnimationClip`]. Loaders return boxed `Send` futures so they can do
//! their I/O on whatever runtime drives the import command.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use meshforge_core::animation::AnimationClip;
use meshforge_core::mesh::{DrawSource, VertexAttributeSemantic};
use meshforge_core::model::{Model, ModelError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::settings::ImportSettings;

/// A boxed, `Send` future returning a `Result`.
pub type LoadFuture<T> = Pin<Box<dyn Future<Output = Result<T, LoadError>> + Send>>;

/// Options forwarded to a loader.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadContext {
    pub source_path: PathBuf,
    /// Uniform scale applied to the root node.
    pub scale_import: f32,
    /// Keep integer blend indices instead of widening them to floats.
    pub allow_unsigned_blend_indices: bool,
    /// Effect given to materials that name none.
    pub effect_name: Option<String>,
    pub texture_tag: Option<String>,
}

impl LoadContext {
    pub fn new(source_path: impl Into<PathBuf>, settings: &ImportSettings) -> Self {
        Self {
            source_path: source_path.into(),
            scale_import: settings.scale_import,
            allow_unsigned_blend_indices: settings.allow_unsigned_blend_indices,
            effect_name: settings.effect_name.clone(),
            texture_tag: settings.texture_tag.clone(),
        }
    }
}

/// Loads models and animation clips from source files.
pub trait ModelLoader: Send + Sync + 'static {
    /// Load the model stored in the source.
    fn load_model(&self, context: &LoadContext) -> LoadFuture<Model>;

    /// Load the animation stored in the source, if it has one.
    fn load_animation(&self, context: &LoadContext) -> LoadFuture<Option<AnimationClip>>;
}

/// Contents of a source file: a model, an animation, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceDocument {
    pub model: Option<Model>,
    pub animation: Option<AnimationClip>,
}

impl SourceDocument {
    /// Parse a RON document.
    pub fn from_ron(text: &str, path: &Path) -> Result<Self, LoadError> {
        ron::from_str(text).map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Serialize as pretty RON.
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    fn into_model(self, context: &LoadContext) -> Result<Model, LoadError> {
        let model = self.model.ok_or_else(|| LoadError::Missing {
            path: context.source_path.clone(),
            what: "model",
        })?;
        prepare_model(model, context)
    }
}

/// Validate a freshly loaded model and apply the load options to it.
pub fn prepare_model(mut model: Model, context: &LoadContext) -> Result<Model, LoadError> {
    let invalid = |source| LoadError::Invalid {
        path: context.source_path.clone(),
        source,
    };
    model.validate().map_err(invalid)?;

    if context.scale_import != 1.0
        && let Some(root) = model.hierarchy.nodes.first_mut()
    {
        for axis in &mut root.transform.scale {
            *axis *= context.scale_import;
        }
    }

    if let Some(effect) = &context.effect_name {
        for instance in &mut model.materials {
            let instance = Arc::make_mut(instance);
            if let Some(material) = &mut instance.material
                && material.effect.is_none()
            {
                Arc::make_mut(material).effect = Some(effect.clone());
            }
        }
    }

    if !context.allow_unsigned_blend_indices {
        widen_blend_indices(&mut model).map_err(invalid)?;
    }

    Ok(model)
}

/// Rewrite integer joint indices as floats in every mesh that has them.
fn widen_blend_indices(model: &mut Model) -> Result<(), ModelError> {
    for (index, mesh) in model.meshes.iter_mut().enumerate() {
        let has_integer_joints = mesh.draw.vertex_buffers.iter().any(|b| {
            b.layout
                .attribute(VertexAttributeSemantic::Joints)
                .is_some_and(|a| a.format.size() != 16)
        });
        if !has_integer_joints {
            continue;
        }

        let mut source =
            DrawSource::from_draw(&mesh.draw, &model.buffers).map_err(|source| ModelError::Mesh {
                mesh: index,
                name: mesh.name.clone(),
                source,
            })?;
        for stream in &mut source.streams {
            stream.widen_to_float4(VertexAttributeSemantic::Joints);
        }
        mesh.draw = source.into_draw_data(&mut model.buffers);
        log::debug!("Widened blend indices of mesh {} to floats", mesh.name);
    }
    Ok(())
}

/// Loads [`SourceDocument`]s stored as RON files on disk.
///
/// I/O is blocking (`std::fs`) inside the returned futures.
#[derive(Debug, Default, Clone)]
pub struct RonModelLoader;

impl RonModelLoader {
    pub fn new() -> Self {
        Self
    }

    fn read(path: &Path) -> Result<SourceDocument, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        SourceDocument::from_ron(&text, path)
    }
}

impl ModelLoader for RonModelLoader {
    fn load_model(&self, context: &LoadContext) -> LoadFuture<Model> {
        let context = context.clone();
        Box::pin(async move { Self::read(&context.source_path)?.into_model(&context) })
    }

    fn load_animation(&self, context: &LoadContext) -> LoadFuture<Option<AnimationClip>> {
        let path = context.source_path.clone();
        Box::pin(async move { Ok(Self::read(&path)?.animation) })
    }
}

/// In-memory loader for tests and embedded sources.
///
/// Thread-safe and mutable while shared.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    documents: Arc<RwLock<HashMap<PathBuf, SourceDocument>>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document under `path`, replacing any previous one.
    pub fn insert(&self, path: impl Into<PathBuf>, document: SourceDocument) {
        self.documents.write().insert(path.into(), document);
    }

    fn get(&self, path: &Path) -> Result<SourceDocument, LoadError> {
        self.documents
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }
}

impl ModelLoader for MemoryLoader {
    fn load_model(&self, context: &LoadContext) -> LoadFuture<Model> {
        let context = context.clone();
        let document = self.get(&context.source_path);
        Box::pin(async move { document?.into_model(&context) })
    }

    fn load_animation(&self, context: &LoadContext) -> LoadFuture<Option<AnimationClip>> {
        let document = self.get(&context.source_path);
        Box::pin(async move { Ok(document?.animation) })
    }
}

//! Persistence of exported assets.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use meshforge_core::animation::AnimationClip;
use meshforge_core::model::Model;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A boxed, `Send` future returning a `Result`.
pub type StoreFuture<T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send>>;

/// An object produced by an import command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExportedAsset {
    Model(Model),
    Animation(AnimationClip),
}

impl ExportedAsset {
    /// Short name of the asset kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Model(_) => "model",
            Self::Animation(_) => "animation",
        }
    }
}

/// Stores exported assets under logical location strings.
pub trait AssetStore: Send + Sync + 'static {
    /// Store `asset` at `location`, replacing anything already there.
    fn save(&self, location: &str, asset: ExportedAsset) -> StoreFuture<()>;
}

/// In-memory store for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    assets: Arc<RwLock<HashMap<String, ExportedAsset>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asset stored at `location`, if any.
    pub fn get(&self, location: &str) -> Option<ExportedAsset> {
        self.assets.read().get(location).cloned()
    }

    pub fn len(&self) -> usize {
        self.assets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.read().is_empty()
    }
}

impl AssetStore for MemoryStore {
    fn save(&self, location: &str, asset: ExportedAsset) -> StoreFuture<()> {
        let assets = self.assets.clone();
        let location = location.to_owned();
        Box::pin(async move {
            assets.write().insert(location, asset);
            Ok(())
        })
    }
}

/// Writes assets as pretty RON files below a root directory.
///
/// `location` is a relative path with `/` separators; `.ron` is appended.
/// I/O is blocking (`std::fs`) inside the returned futures.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory does not need to exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File that `location` is written to.
    pub fn resolve(&self, location: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(location);
        let safe = !location.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StoreError::InvalidLocation(location.to_owned()));
        }
        Ok(self.root.join(relative).with_extension("ron"))
    }
}

impl AssetStore for FileStore {
    fn save(&self, location: &str, asset: ExportedAsset) -> StoreFuture<()> {
        let path = self.resolve(location);
        let location = location.to_owned();
        Box::pin(async move {
            let path = path?;
            let text = ron::ser::to_string_pretty(&asset, ron::ser::PrettyConfig::default())
                .map_err(|e| StoreError::Serialize {
                    location,
                    message: e.to_string(),
                })?;
            let io = |source| StoreError::Io {
                path: path.clone(),
                source,
            };
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(io)?;
            }
            std::fs::write(&path, text).map_err(io)?;
            log::debug!("Wrote {}", path.display());
            Ok(())
        })
    }
}

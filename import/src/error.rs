use std::path::PathBuf;

use meshforge_core::compute::Cancelled;
use meshforge_core::mesh::MeshError;
use meshforge_core::model::ModelError;
use meshforge_core::scene::HierarchyError;

/// Errors raised by a [`ModelLoader`](crate::loader::ModelLoader).
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("{path} contains no {what}")]
    Missing { path: PathBuf, what: &'static str },
    #[error("{path} is not a valid model: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ModelError,
    },
}

/// Errors raised by an [`AssetStore`](crate::store::AssetStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize {location}: {message}")]
    Serialize { location: String, message: String },
    #[error("invalid location {0:?}")]
    InvalidLocation(String),
}

/// Errors raised by the compaction passes.
#[derive(Debug, thiserror::Error)]
pub enum CompactError {
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
    #[error("mesh {name}: {source}")]
    Mesh {
        name: String,
        #[source]
        source: MeshError,
    },
    #[error("failed to pack shared buffers: {0}")]
    Pack(#[source] MeshError),
}

impl CompactError {
    pub(crate) fn mesh(name: &str) -> impl FnOnce(MeshError) -> Self + '_ {
        move |source| Self::Mesh {
            name: name.to_owned(),
            source,
        }
    }
}

/// Errors raised while loading [`ImportSettings`](crate::settings::ImportSettings).
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Any failure of one import command.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("unknown export type [{0}]")]
    UnknownExportType(String),
    #[error("{0} unsupported feature request(s)")]
    UnsupportedFeatures(usize),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Compact(#[from] CompactError),
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    #[error("import task panicked: {0}")]
    Panicked(String),
    #[error("failed to serialize command identity: {0}")]
    Identity(#[from] ron::Error),
}

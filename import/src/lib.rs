//! # meshforge import
//!
//! Turns a source model into a compact exported asset: meshes sharing a
//! material under the same attachment point are merged, every mesh's data
//! is packed into one vertex and one index buffer, unused nodes are pruned
//! and bounding volumes are recomputed.
//!
//! ## Overview
//!
//! - [`ImportModelCommand`] - One import, run with [`ImportModelCommand::execute`]
//! - [`ImportSettings`] - Command options, loadable from TOML
//! - [`ModelLoader`] / [`AssetStore`] - Where sources come from and results go
//! - [`compact`] - The individual compaction passes
//! - [`process_model`] - The full model pipeline without I/O
//!
//! ## Example
//!
//! ```ignore
//! use meshforge_import::{CommandContext, FileStore, ImportModelCommand, RonModelLoader};
//!
//! let context = CommandContext::new(Arc::new(RonModelLoader::new()), Arc::new(FileStore::new("out")));
//! let mut command = ImportModelCommand::new("tree.ron", "models/tree", ImportSettings::default());
//! let status = command.execute(&context).await;
//! ```

mod args;
mod command;
pub mod compact;
mod error;
mod loader;
mod pipeline;
mod settings;
mod store;

pub use args::ImportArgs;
pub use command::{
    CommandContext, CommandState, ExportKind, ImportModelCommand, ResultStatus, import_gate,
    panic_payload_to_string,
};
pub use error::{CompactError, ImportError, LoadError, SettingsError, StoreError};
pub use loader::{
    LoadContext, LoadFuture, MemoryLoader, ModelLoader, RonModelLoader, SourceDocument,
    prepare_model,
};
pub use pipeline::{apply_materials, check_unsupported_features, process_model};
pub use settings::{EXPORT_ANIMATION, EXPORT_MODEL, ImportSettings};
pub use store::{AssetStore, ExportedAsset, FileStore, MemoryStore, StoreFuture};

/// Import library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

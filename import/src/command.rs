//! The import command: one source file in, one exported asset out.

use std::any::Any;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use meshforge_core::compute::{AdmissionGate, CancellationToken, Cancelled};
use serde::{Deserialize, Serialize};

use crate::error::ImportError;
use crate::loader::{LoadContext, ModelLoader};
use crate::pipeline::process_model;
use crate::settings::{EXPORT_ANIMATION, EXPORT_MODEL, ImportSettings};
use crate::store::{AssetStore, ExportedAsset};

/// Admits one import at a time across the process; the native loaders
/// behind [`ModelLoader`] are not assumed to be reentrant.
static IMPORT_GATE: LazyLock<AdmissionGate> = LazyLock::new(|| AdmissionGate::new(1));

/// The process-wide gate every [`ImportModelCommand`] passes through.
pub fn import_gate() -> &'static AdmissionGate {
    &IMPORT_GATE
}

/// Outcome of [`ImportModelCommand::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    Successful,
    Failed,
    /// Cancelled while waiting for admission.
    Cancelled,
}

/// Lifecycle of a command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommandState {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// What an import produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Model,
    Animation,
}

impl FromStr for ExportKind {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            EXPORT_MODEL => Ok(Self::Model),
            EXPORT_ANIMATION => Ok(Self::Animation),
            other => Err(ImportError::UnknownExportType(other.to_owned())),
        }
    }
}

/// Collaborators a command runs against.
#[derive(Clone)]
pub struct CommandContext {
    pub loader: Arc<dyn ModelLoader>,
    pub store: Arc<dyn AssetStore>,
    /// Observed while waiting for admission.
    pub cancellation: CancellationToken,
}

impl CommandContext {
    pub fn new(loader: Arc<dyn ModelLoader>, store: Arc<dyn AssetStore>) -> Self {
        Self {
            loader,
            store,
            cancellation: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }
}

/// Imports one source file and stores the result under `location`.
///
/// # Example
///
/// ```ignore
/// let mut command = ImportModelCommand::new("props/crate.ron", "models/crate", settings);
/// let context = CommandContext::new(Arc::new(RonModelLoader::new()), Arc::new(store));
/// assert_eq!(command.execute(&context).await, ResultStatus::Successful);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportModelCommand {
    pub source_path: PathBuf,
    pub location: String,
    pub settings: ImportSettings,
    #[serde(skip)]
    state: CommandState,
}

impl ImportModelCommand {
    pub fn new(
        source_path: impl Into<PathBuf>,
        location: impl Into<String>,
        settings: ImportSettings,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            location: location.into(),
            settings,
            state: CommandState::Idle,
        }
    }

    pub fn state(&self) -> CommandState {
        self.state
    }

    /// Files the command reads: exactly its source.
    pub fn input_files(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.source_path.as_path())
    }

    /// Cache identity over the source path, the location and every setting.
    pub fn identity_hash(&self) -> Result<blake3::Hash, ImportError> {
        let text = ron::to_string(self)?;
        Ok(blake3::hash(text.as_bytes()))
    }

    /// Run the command to completion.
    ///
    /// Errors and panics are logged with the command's source, export type
    /// and location and turned into [`ResultStatus::Failed`]; nothing is
    /// stored on failure.
    pub async fn execute(&mut self, context: &CommandContext) -> ResultStatus {
        self.state = CommandState::Running;
        log::info!(
            "Importing {} as {} to {}",
            self.source_path.display(),
            self.settings.export_type,
            self.location
        );

        match self.run(context).await {
            Ok(()) => {
                self.state = CommandState::Succeeded;
                log::info!("Imported {} to {}", self.source_path.display(), self.location);
                ResultStatus::Successful
            }
            Err(ImportError::Cancelled(_)) => {
                self.state = CommandState::Failed;
                log::warn!(
                    "Import of {} to {} cancelled before it started",
                    self.source_path.display(),
                    self.location
                );
                ResultStatus::Cancelled
            }
            Err(err) => {
                self.state = CommandState::Failed;
                log::error!(
                    "Failed to import {} (export type {}) to {}: {err}",
                    self.source_path.display(),
                    self.settings.export_type,
                    self.location
                );
                ResultStatus::Failed
            }
        }
    }

    async fn run(&self, context: &CommandContext) -> Result<(), ImportError> {
        let kind: ExportKind = self.settings.export_type.parse()?;
        let permit = import_gate().acquire(&context.cancellation).await?;

        let job = ImportJob {
            load: LoadContext::new(&self.source_path, &self.settings),
            location: self.location.clone(),
            settings: self.settings.clone(),
            loader: Arc::clone(&context.loader),
            store: Arc::clone(&context.store),
        };
        // The job owns the permit, so admission is held until it really ends
        // even if this future is dropped.
        let handle = tokio::spawn(async move {
            let _permit = permit;
            job.run(kind).await
        });

        match handle.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => Err(ImportError::Panicked(panic_payload_to_string(
                &*err.into_panic(),
            ))),
            Err(_) => Err(ImportError::Cancelled(Cancelled)),
        }
    }
}

/// The admitted part of a command, owned by its task.
struct ImportJob {
    load: LoadContext,
    location: String,
    settings: ImportSettings,
    loader: Arc<dyn ModelLoader>,
    store: Arc<dyn AssetStore>,
}

impl ImportJob {
    async fn run(self, kind: ExportKind) -> Result<(), ImportError> {
        let asset = match kind {
            ExportKind::Model => {
                let model = self.loader.load_model(&self.load).await?;
                ExportedAsset::Model(process_model(model, &self.settings)?)
            }
            ExportKind::Animation => {
                let Some(mut clip) = self.loader.load_animation(&self.load).await? else {
                    log::info!(
                        "{} contains no animation, nothing exported",
                        self.load.source_path.display()
                    );
                    return Ok(());
                };
                if clip.duration.is_zero() {
                    log::warn!("Animation {} has zero duration, exporting it as is", clip.name);
                } else {
                    clip.repeat_mode = self.settings.animation_repeat_mode;
                    let removed = clip.optimize();
                    log::debug!("Removed {removed} redundant keyframes from {}", clip.name);
                }
                ExportedAsset::Animation(clip)
            }
        };

        log::debug!("Saving {} to {}", asset.kind(), self.location);
        self.store.save(&self.location, asset).await?;
        Ok(())
    }
}

/// Message carried by a panic payload, if it is a string.
pub fn panic_payload_to_string(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

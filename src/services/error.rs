use crate::models::TaskSlot;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that terminate an operation.
///
/// The display text is the cause shown to the user. None of these is retried
/// automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("Failed to load {path}: {cause}")]
    LoadFailure { path: Utf8PathBuf, cause: String },

    #[error("Failed to export to {path}: {cause}")]
    ExportFailure { path: Utf8PathBuf, cause: String },

    #[error("Please load the main email list first.")]
    EmptyMainList,

    #[error("Please provide emails to remove (paste or load a file).")]
    EmptyRemovalSet,

    #[error("No result to export. Run separation first.")]
    NoResult,

    #[error("{0} is already running")]
    SlotBusy(TaskSlot),

    #[error("{slot} worker stopped unexpectedly: {cause}")]
    WorkerFailed { slot: TaskSlot, cause: String },
}

impl TaskError {
    pub(crate) fn load(path: impl Into<Utf8PathBuf>, cause: impl ToString) -> Self {
        TaskError::LoadFailure {
            path: path.into(),
            cause: cause.to_string(),
        }
    }

    pub(crate) fn export(path: impl Into<Utf8PathBuf>, cause: impl ToString) -> Self {
        TaskError::ExportFailure {
            path: path.into(),
            cause: cause.to_string(),
        }
    }
}

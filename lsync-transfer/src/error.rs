//! Error types for lsync-transfer.

use std::path::PathBuf;

use thiserror::Error;

use lsync_canvas::CanvasError;
use lsync_core::{ConfigError, TreeError};

/// All errors that can arise from transfer planning and orchestration.
#[derive(Debug, Error)]
pub enum TransferError {
    /// An error from server configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An error from sync-tree discovery.
    #[error("sync tree error: {0}")]
    Tree(#[from] TreeError),

    /// An error from the progress canvas.
    #[error("canvas error: {0}")]
    Canvas(#[from] CanvasError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON error in the history log.
    #[error("history log JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A transfer subprocess could not be started at all.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The requested path does not live under the sync root.
    #[error("path {path} is outside the sync root")]
    OutsideSyncRoot { path: PathBuf },
}

/// Convenience constructor for [`TransferError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> TransferError {
    TransferError::Io {
        path: path.into(),
        source,
    }
}

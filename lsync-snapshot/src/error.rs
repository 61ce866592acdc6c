//! Error types for lsync-snapshot.

use std::path::PathBuf;

use thiserror::Error;

use lsync_core::{RepoName, TreeError};

use crate::views::GitView;

/// All errors that can arise from snapshot capture and reading.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// An error from sync-tree discovery.
    #[error("sync tree error: {0}")]
    Tree(#[from] TreeError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON error reading or writing the worktree map.
    #[error("worktree map JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The repository has no cache subdirectory at all.
    #[error("unknown repository '{repo}': no cached metadata directory")]
    UnknownRepo { repo: RepoName },

    /// The repository is known but this view was never captured.
    #[error("view '{view}' was never collected for repository '{repo}'")]
    NeverCollected { repo: RepoName, view: GitView },
}

/// Convenience constructor for [`SnapshotError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SnapshotError {
    SnapshotError::Io {
        path: path.into(),
        source,
    }
}

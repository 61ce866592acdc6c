//! Error types for lsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from sync-tree discovery.
#[derive(Debug, Error)]
pub enum TreeError {
    /// No ancestor of the start directory matched the marker set.
    #[error("sync root not found above {start}")]
    RootNotFound { start: PathBuf },

    /// Underlying I/O failure, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`TreeError::Io`].
pub(crate) fn tree_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> TreeError {
    TreeError::Io {
        path: path.into(),
        source,
    }
}

/// All errors that can arise from server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file did not exist at the expected path.
    #[error("config file not found at {path}")]
    NotFound { path: PathBuf },

    /// YAML parse error on load — includes file path context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `dirs::home_dir()` returned `None` — cannot locate `~/.lsync.yaml`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The requested server (cluster) name is not in the config.
    #[error("unknown server '{name}'; configured servers: {}", .known.join(", "))]
    UnknownServer { name: String, known: Vec<String> },
}

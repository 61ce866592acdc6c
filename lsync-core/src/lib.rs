//! lsync core library — domain types, sync-tree discovery, server config.
//!
//! Public API surface:
//! - [`types`] — newtypes and the worktree map
//! - [`error`] — [`TreeError`], [`ConfigError`]
//! - [`tree`] — [`SyncTree`]: root walk, sync dirs, worktree discovery
//! - [`config`] — `~/.lsync.yaml` load / server resolution

pub mod config;
pub mod error;
pub mod tree;
pub mod types;

pub use config::{ServerMap, ServerTarget};
pub use error::{ConfigError, TreeError};
pub use tree::{SyncTree, GIT_META_DIR_NAME};
pub use types::{RepoName, WorktreeEntry, WorktreeMap};

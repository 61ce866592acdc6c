//! # lsync-snapshot
//!
//! Point-in-time, plain-text capture of git views (`log`, `status`, `diff`,
//! …) into a cache directory that is itself synchronized, so remote hosts
//! without `.git` directories get read-only git introspection from ordinary
//! files.
//!
//! The write side ([`Collector`]) runs where git lives; the read side
//! ([`Reader`]) runs anywhere the cache directory has been rsynced to. The
//! cache is replaced wholesale on every run — remote state is only as fresh
//! as the last completed synchronization.

pub mod collector;
pub mod error;
pub mod reader;
pub mod views;

pub use collector::{CollectReport, CollectedRepo, Collector, DEFAULT_LOG_LIMIT};
pub use error::SnapshotError;
pub use reader::Reader;
pub use views::{GitView, WORKTREE_MAP_FILE};

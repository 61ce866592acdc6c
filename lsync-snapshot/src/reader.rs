//! Snapshot reading — the offline side of the cache protocol.
//!
//! Runs on remote hosts where neither git nor the `.git` directories exist;
//! everything is served from the rsynced cache files.

use std::path::PathBuf;

use lsync_core::{RepoName, SyncTree, WorktreeMap};

use crate::error::{io_err, SnapshotError};
use crate::views::{GitView, WORKTREE_MAP_FILE};

/// Read-only view over a cache directory.
#[derive(Debug)]
pub struct Reader {
    meta_dir: PathBuf,
}

impl Reader {
    /// Resolve the cache directory from the sync tree.
    pub fn new(tree: &SyncTree) -> Result<Self, SnapshotError> {
        Ok(Self {
            meta_dir: tree.git_meta_dir()?,
        })
    }

    /// Read from an explicit cache directory.
    pub fn at(meta_dir: PathBuf) -> Self {
        Self { meta_dir }
    }

    /// Names of all repositories with a captured history file — the
    /// universe addressable by the remote viewer.
    pub fn list_repos(&self) -> Result<Vec<RepoName>, SnapshotError> {
        if !self.meta_dir.is_dir() {
            return Ok(vec![]);
        }
        let mut repos: Vec<RepoName> = std::fs::read_dir(&self.meta_dir)
            .map_err(|e| io_err(&self.meta_dir, e))?
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_type().map(|t| t.is_dir()).unwrap_or(false)
                    && e.path().join(GitView::Log.file_name()).exists()
            })
            .map(|e| RepoName::from(e.file_name().to_string_lossy().into_owned()))
            .collect();
        repos.sort();
        Ok(repos)
    }

    /// Read a captured view, byte-for-byte as git printed it.
    pub fn read_view(&self, repo: &RepoName, view: GitView) -> Result<String, SnapshotError> {
        let repo_dir = self.meta_dir.join(repo.as_str());
        if !repo_dir.is_dir() {
            return Err(SnapshotError::UnknownRepo { repo: repo.clone() });
        }
        let path = repo_dir.join(view.file_name());
        if !path.exists() {
            return Err(SnapshotError::NeverCollected {
                repo: repo.clone(),
                view,
            });
        }
        std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))
    }

    /// The worktree map, or empty if it was never written.
    pub fn read_worktree_map(&self) -> Result<WorktreeMap, SnapshotError> {
        let path = self.meta_dir.join(WORKTREE_MAP_FILE);
        if !path.exists() {
            return Ok(WorktreeMap::new());
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        Ok(serde_json::from_str(&contents)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Snapshot capture — the write side of the cache protocol.

use std::path::PathBuf;
use std::process::Command;

use lsync_core::{RepoName, SyncTree, WorktreeMap};

use crate::error::{io_err, SnapshotError};
use crate::views::{GitView, WORKTREE_MAP_FILE};

/// Default entry limit for the single-branch history capture.
pub const DEFAULT_LOG_LIMIT: usize = 200;

/// One repository that was captured in this run.
#[derive(Debug, Clone)]
pub struct CollectedRepo {
    pub name: RepoName,
    /// Cache subdirectory, relative to the sync root (for display).
    pub cache_dir: PathBuf,
}

/// Outcome of [`Collector::collect_all`].
#[derive(Debug, Default)]
pub struct CollectReport {
    pub repos: Vec<CollectedRepo>,
    /// Repositories that failed capture and were skipped.
    pub skipped: Vec<RepoName>,
    pub worktree_map_written: bool,
}

/// Captures every [`GitView`] for every version-controlled sync directory.
///
/// Prior snapshot files are overwritten unconditionally; there is no merge.
#[derive(Debug)]
pub struct Collector<'a> {
    tree: &'a SyncTree,
    log_limit: usize,
}

impl<'a> Collector<'a> {
    pub fn new(tree: &'a SyncTree) -> Self {
        Self {
            tree,
            log_limit: DEFAULT_LOG_LIMIT,
        }
    }

    pub fn with_log_limit(tree: &'a SyncTree, log_limit: usize) -> Self {
        Self { tree, log_limit }
    }

    /// Capture all views for one repository.
    ///
    /// Returns `Ok(None)` when the directory is not version-controlled.
    /// A failing git command still produces a file: whatever the command
    /// printed on stdout is the captured view, exactly as an engineer
    /// running it locally would have seen.
    pub fn collect_repo(&self, repo: &RepoName) -> Result<Option<CollectedRepo>, SnapshotError> {
        let root = self.tree.sync_root()?;
        let repo_dir = root.join(repo.as_str());
        if !SyncTree::is_git_repo(&repo_dir) {
            return Ok(None);
        }

        let out_dir = root
            .join(lsync_core::GIT_META_DIR_NAME)
            .join(repo.as_str());
        std::fs::create_dir_all(&out_dir).map_err(|e| io_err(&out_dir, e))?;

        for view in GitView::ALL {
            let output = Command::new("git")
                .args(view.args(self.log_limit))
                .current_dir(&repo_dir)
                .output()
                .map_err(|e| io_err(&repo_dir, e))?;
            let path = out_dir.join(view.file_name());
            std::fs::write(&path, &output.stdout).map_err(|e| io_err(&path, e))?;
            tracing::debug!("captured {view} for {repo}");
        }

        let cache_dir = out_dir
            .strip_prefix(&root)
            .map(PathBuf::from)
            .unwrap_or(out_dir);
        Ok(Some(CollectedRepo {
            name: repo.clone(),
            cache_dir,
        }))
    }

    /// Capture every repository, then persist the worktree map.
    ///
    /// Per-repository failures are isolated: a broken repo is recorded in
    /// `skipped` and does not abort the rest of the run.
    pub fn collect_all(&self) -> Result<CollectReport, SnapshotError> {
        let mut report = CollectReport::default();
        for repo in self.tree.repo_dirs()? {
            match self.collect_repo(&repo) {
                Ok(Some(collected)) => report.repos.push(collected),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!("snapshot capture failed for {repo}: {err}");
                    report.skipped.push(repo);
                }
            }
        }

        let map = self.tree.discover_worktrees()?;
        if !map.is_empty() {
            write_worktree_map_at(&self.tree.git_meta_dir()?, &map)?;
            report.worktree_map_written = true;
        }
        Ok(report)
    }
}

/// Write the worktree map at the top of the cache directory.
pub fn write_worktree_map_at(meta_dir: &std::path::Path, map: &WorktreeMap) -> Result<(), SnapshotError> {
    std::fs::create_dir_all(meta_dir).map_err(|e| io_err(meta_dir, e))?;
    let path = meta_dir.join(WORKTREE_MAP_FILE);
    let json = serde_json::to_string_pretty(map)?;
    std::fs::write(&path, format!("{json}\n")).map_err(|e| io_err(&path, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Reader;
    use lsync_core::WorktreeEntry;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn make_root(tmp: &TempDir) -> PathBuf {
        let root = tmp.path().join("common_sync");
        fs::create_dir_all(&root).expect("mkdir root");
        root
    }

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn init_repo(dir: &Path) {
        let output = Command::new("git")
            .args(["init", "-q"])
            .current_dir(dir)
            .output()
            .expect("git init");
        assert!(output.status.success());
    }

    #[test]
    fn collect_skips_non_git_directories() {
        let _ = env_logger::builder().is_test(true).try_init();
        let tmp = TempDir::new().unwrap();
        let root = make_root(&tmp);
        fs::create_dir_all(root.join("toolbox")).unwrap();

        let tree = SyncTree::with_start(&root);
        let collected = Collector::new(&tree)
            .collect_repo(&RepoName::from("toolbox"))
            .expect("collect");
        assert!(collected.is_none());
    }

    #[test]
    fn collect_writes_every_view_file() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let root = make_root(&tmp);
        let repo = root.join("toolbox");
        fs::create_dir_all(&repo).unwrap();
        init_repo(&repo);
        fs::write(repo.join("tool.py"), "print('hi')\n").unwrap();

        let tree = SyncTree::with_start(&root);
        let collected = Collector::new(&tree)
            .collect_repo(&RepoName::from("toolbox"))
            .expect("collect")
            .expect("is a repo");
        assert_eq!(collected.cache_dir, PathBuf::from("commit_msg/toolbox"));

        let cache = root.join("commit_msg/toolbox");
        for view in GitView::ALL {
            assert!(cache.join(view.file_name()).exists(), "{view} missing");
        }
    }

    #[test]
    fn collect_twice_is_byte_identical() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let root = make_root(&tmp);
        let repo = root.join("scripts");
        fs::create_dir_all(&repo).unwrap();
        init_repo(&repo);
        fs::write(repo.join("run.sh"), "echo run\n").unwrap();

        let tree = SyncTree::with_start(&root);
        let collector = Collector::new(&tree);
        collector.collect_all().expect("first collect");
        let cache = root.join("commit_msg/scripts");
        let first: Vec<Vec<u8>> = GitView::ALL
            .iter()
            .map(|v| fs::read(cache.join(v.file_name())).unwrap())
            .collect();

        collector.collect_all().expect("second collect");
        let second: Vec<Vec<u8>> = GitView::ALL
            .iter()
            .map(|v| fs::read(cache.join(v.file_name())).unwrap())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn captured_views_read_back_byte_exact() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let root = make_root(&tmp);
        let repo = root.join("toolbox");
        fs::create_dir_all(&repo).unwrap();
        init_repo(&repo);
        fs::write(repo.join("tool.py"), "print('hi')\n").unwrap();

        let tree = SyncTree::with_start(&root);
        Collector::new(&tree).collect_all().expect("collect");

        let reader = Reader::new(&tree).expect("reader");
        let status = reader
            .read_view(&RepoName::from("toolbox"), GitView::Status)
            .expect("read status");
        let on_disk =
            fs::read_to_string(root.join("commit_msg/toolbox/status.txt")).unwrap();
        assert_eq!(status, on_disk);
        // color is forced even without a tty
        assert!(status.contains('\u{1b}'), "expected escape codes: {status:?}");
    }

    #[test]
    fn worktree_map_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let meta_dir = tmp.path().join("commit_msg");

        let mut map = WorktreeMap::new();
        map.insert(
            RepoName::from("toolbox"),
            vec![
                WorktreeEntry {
                    name: "toolbox-wip".into(),
                    branch: "wip".into(),
                    head: "abc1234".into(),
                },
                WorktreeEntry {
                    name: "toolbox-spike".into(),
                    branch: "(detached)".into(),
                    head: "def5678".into(),
                },
            ],
        );
        write_worktree_map_at(&meta_dir, &map).expect("write");

        let read = Reader::at(meta_dir).read_worktree_map().expect("read");
        assert_eq!(read, map);
    }
}

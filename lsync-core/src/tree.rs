//! Sync-tree discovery.
//!
//! The sync root is the nearest ancestor directory whose name is in the
//! marker set. It is re-resolved on every access — the working directory can
//! differ between commands, so nothing here caches the resolved root, only
//! the start directory the walk begins from.
//!
//! # Layout
//!
//! ```text
//! <root>/                    (directory named in MARKER_DIRS)
//!   scripts/                 (base sync dir, usually a git repo)
//!   toolbox/
//!   toolbox-wip/             (linked worktree of toolbox/)
//!   commit_msg/              (snapshot cache, see lsync-snapshot)
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::TreeError;
use crate::types::{RepoName, WorktreeEntry, WorktreeMap};

/// Directory names that mark a sync root.
const MARKER_DIRS: &[&str] = &["common_sync"];

/// Primary repositories, synced first and in this order.
const BASE_SYNC_DIRS: &[&str] = &["scripts", "toolbox", "notebooks"];

/// Snapshot cache directory name under the sync root.
pub const GIT_META_DIR_NAME: &str = "commit_msg";

/// Comma-separated extra sync directories, appended after discovered
/// worktrees.
pub const EXTRA_SYNC_DIRS_ENV: &str = "LSYNC_EXTRA_SYNC_DIRS";

/// Split a comma-separated directory list, dropping empty segments.
pub fn split_dir_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

/// Handle on the sync tree, anchored at a start directory.
#[derive(Debug, Clone)]
pub struct SyncTree {
    start: PathBuf,
}

impl SyncTree {
    /// Anchor at the current working directory.
    pub fn from_cwd() -> Result<Self, TreeError> {
        let start = std::env::current_dir()
            .map_err(|e| crate::error::tree_io_err(PathBuf::from("."), e))?;
        Ok(Self { start })
    }

    /// Anchor at an explicit start directory. Tests always use this form.
    pub fn with_start(start: impl Into<PathBuf>) -> Self {
        Self {
            start: start.into(),
        }
    }

    /// Walk upward from the start directory (then from its canonicalized
    /// form) until a marker directory is found.
    pub fn sync_root(&self) -> Result<PathBuf, TreeError> {
        let canonical = self.start.canonicalize().unwrap_or_else(|_| self.start.clone());
        for start in [&self.start, &canonical] {
            let mut dir = start.as_path();
            loop {
                if let Some(name) = dir.file_name().and_then(|n| n.to_str()) {
                    if MARKER_DIRS.contains(&name) {
                        return Ok(dir.to_path_buf());
                    }
                }
                match dir.parent() {
                    Some(parent) => dir = parent,
                    None => break,
                }
            }
        }
        Err(TreeError::RootNotFound {
            start: self.start.clone(),
        })
    }

    /// `<root>/commit_msg`.
    pub fn git_meta_dir(&self) -> Result<PathBuf, TreeError> {
        Ok(self.sync_root()?.join(GIT_META_DIR_NAME))
    }

    /// The stable base list of primary sync directories.
    pub fn base_sync_dirs() -> &'static [&'static str] {
        BASE_SYNC_DIRS
    }

    /// Ordered sync directory names: base list, then discovered worktrees
    /// not already present, then entries from [`EXTRA_SYNC_DIRS_ENV`].
    /// The order governs transfer order and display order.
    pub fn sync_dirs(&self) -> Result<Vec<String>, TreeError> {
        let extra = std::env::var(EXTRA_SYNC_DIRS_ENV).ok();
        self.sync_dirs_with_extra(extra.as_deref())
    }

    fn sync_dirs_with_extra(&self, extra: Option<&str>) -> Result<Vec<String>, TreeError> {
        let mut dirs: Vec<String> = BASE_SYNC_DIRS.iter().map(|d| d.to_string()).collect();
        for entries in self.discover_worktrees()?.values() {
            for entry in entries {
                if !dirs.contains(&entry.name) {
                    dirs.push(entry.name.clone());
                }
            }
        }
        if let Some(raw) = extra {
            for dir in split_dir_list(raw) {
                if !dirs.contains(&dir) {
                    dirs.push(dir);
                }
            }
        }
        Ok(dirs)
    }

    /// Sync directories that are version-controlled. A `.git` *file* counts:
    /// linked worktrees carry one instead of a directory.
    pub fn repo_dirs(&self) -> Result<Vec<RepoName>, TreeError> {
        let root = self.sync_root()?;
        Ok(self
            .sync_dirs()?
            .into_iter()
            .filter(|d| Self::is_git_repo(&root.join(d)))
            .map(RepoName::from)
            .collect())
    }

    pub fn is_git_repo(path: &Path) -> bool {
        path.is_dir() && path.join(".git").exists()
    }

    /// Query each base repository for its linked worktrees.
    ///
    /// Entries whose directory does not exist under the sync root are
    /// dropped. A repository where the listing or parse fails contributes
    /// nothing; discovery continues with the rest.
    pub fn discover_worktrees(&self) -> Result<WorktreeMap, TreeError> {
        let root = self.sync_root()?;
        let mut map = WorktreeMap::new();
        for base in BASE_SYNC_DIRS {
            let repo_dir = root.join(base);
            if !Self::is_git_repo(&repo_dir) {
                continue;
            }
            let output = match Command::new("git")
                .args(["worktree", "list", "--porcelain"])
                .current_dir(&repo_dir)
                .output()
            {
                Ok(output) if output.status.success() => output,
                _ => continue,
            };
            let text = String::from_utf8_lossy(&output.stdout);
            // The first block is the primary checkout itself.
            let entries: Vec<WorktreeEntry> = parse_worktree_porcelain(&text)
                .into_iter()
                .skip(1)
                .filter_map(|wt| wt.into_entry())
                .filter(|entry| root.join(&entry.name).is_dir())
                .collect();
            if !entries.is_empty() {
                map.insert(RepoName::from(*base), entries);
            }
        }
        Ok(map)
    }

    /// Which collected repository is the start directory inside of, if any.
    ///
    /// Only repositories with a populated cache subdirectory are considered,
    /// since this runs on remotes where the dirs themselves have no `.git`.
    pub fn detect_repo(&self) -> Option<RepoName> {
        let root = self.sync_root().ok()?;
        let meta_dir = root.join(GIT_META_DIR_NAME);
        if !meta_dir.is_dir() {
            return None;
        }
        let known: BTreeSet<String> = std::fs::read_dir(&meta_dir)
            .ok()?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();

        let canonical = self.start.canonicalize().unwrap_or_else(|_| self.start.clone());
        for start in [&self.start, &canonical] {
            let mut dir = start.as_path();
            while dir != root && dir.parent().is_some() {
                if let Some(name) = dir.file_name().and_then(|n| n.to_str()) {
                    if known.contains(name) && dir.parent() == Some(root.as_path()) {
                        return Some(RepoName::from(name));
                    }
                }
                dir = dir.parent()?;
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Porcelain parsing
// ---------------------------------------------------------------------------

/// One block of `git worktree list --porcelain` output.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedWorktree {
    path: PathBuf,
    head: String,
    branch: Option<String>,
}

impl ParsedWorktree {
    fn into_entry(self) -> Option<WorktreeEntry> {
        let name = self.path.file_name()?.to_string_lossy().into_owned();
        let head: String = self.head.chars().take(7).collect();
        Some(WorktreeEntry {
            name,
            branch: self
                .branch
                .unwrap_or_else(|| "(detached)".to_string()),
            head,
        })
    }
}

/// Parse the line-oriented porcelain format: blocks of `worktree <path>`,
/// `HEAD <sha>`, `branch <ref>` (or `detached`), separated by blank lines.
fn parse_worktree_porcelain(output: &str) -> Vec<ParsedWorktree> {
    let mut worktrees = Vec::new();
    let mut path: Option<PathBuf> = None;
    let mut head = String::new();
    let mut branch: Option<String> = None;

    let mut flush = |path: &mut Option<PathBuf>, head: &mut String, branch: &mut Option<String>| {
        if let Some(p) = path.take() {
            worktrees.push(ParsedWorktree {
                path: p,
                head: std::mem::take(head),
                branch: branch.take(),
            });
        }
        head.clear();
    };

    for line in output.lines() {
        if let Some(rest) = line.strip_prefix("worktree ") {
            flush(&mut path, &mut head, &mut branch);
            path = Some(PathBuf::from(rest));
        } else if let Some(rest) = line.strip_prefix("HEAD ") {
            head = rest.to_string();
        } else if let Some(rest) = line.strip_prefix("branch ") {
            branch = Some(
                rest.strip_prefix("refs/heads/")
                    .unwrap_or(rest)
                    .to_string(),
            );
        }
    }
    flush(&mut path, &mut head, &mut branch);
    worktrees
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn make_root(tmp: &TempDir) -> PathBuf {
        let root = tmp.path().join("common_sync");
        fs::create_dir_all(&root).expect("mkdir root");
        root
    }

    #[rstest]
    #[case::from_root_itself("")]
    #[case::one_level("toolbox")]
    #[case::nested("toolbox/src/deep")]
    fn sync_root_found_walking_up(#[case] below: &str) {
        let tmp = TempDir::new().unwrap();
        let root = make_root(&tmp);
        let start = root.join(below);
        fs::create_dir_all(&start).unwrap();

        let tree = SyncTree::with_start(&start);
        assert_eq!(tree.sync_root().expect("root"), root);
    }

    #[test]
    fn sync_root_not_found_errors() {
        let tmp = TempDir::new().unwrap();
        let tree = SyncTree::with_start(tmp.path());
        let err = tree.sync_root().unwrap_err();
        assert!(matches!(err, TreeError::RootNotFound { .. }));
    }

    #[test]
    fn git_meta_dir_is_under_root() {
        let tmp = TempDir::new().unwrap();
        let root = make_root(&tmp);
        let tree = SyncTree::with_start(&root);
        assert_eq!(tree.git_meta_dir().unwrap(), root.join("commit_msg"));
    }

    #[test]
    fn sync_dirs_base_then_extra() {
        let tmp = TempDir::new().unwrap();
        let root = make_root(&tmp);
        let tree = SyncTree::with_start(&root);

        let dirs = tree
            .sync_dirs_with_extra(Some("experiments, scripts,,data"))
            .expect("sync dirs");
        assert_eq!(
            dirs,
            vec!["scripts", "toolbox", "notebooks", "experiments", "data"]
        );
    }

    #[test]
    fn split_dir_list_drops_empty_segments() {
        assert_eq!(split_dir_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(split_dir_list("").is_empty());
    }

    #[test]
    fn repo_dirs_filters_non_git() {
        let tmp = TempDir::new().unwrap();
        let root = make_root(&tmp);
        fs::create_dir_all(root.join("scripts/.git")).unwrap();
        fs::create_dir_all(root.join("toolbox")).unwrap();

        let tree = SyncTree::with_start(&root);
        assert_eq!(tree.repo_dirs().unwrap(), vec![RepoName::from("scripts")]);
    }

    #[test]
    fn git_file_counts_as_repo() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("wt");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(".git"), "gitdir: /somewhere/else\n").unwrap();
        assert!(SyncTree::is_git_repo(&dir));
    }

    #[test]
    fn parse_porcelain_blocks() {
        let output = "\
worktree /home/u/common_sync/toolbox
HEAD 0123456789abcdef0123456789abcdef01234567
branch refs/heads/main

worktree /home/u/common_sync/toolbox-wip
HEAD fedcba9876543210fedcba9876543210fedcba98
branch refs/heads/wip

worktree /home/u/common_sync/toolbox-spike
HEAD 1111111222222333334444455555666667777788
detached
";
        let parsed = parse_worktree_porcelain(output);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].branch.as_deref(), Some("main"));
        assert_eq!(parsed[1].path.file_name().unwrap(), "toolbox-wip");
        assert_eq!(parsed[2].branch, None);

        let entry = parsed[1].clone().into_entry().expect("entry");
        assert_eq!(entry.name, "toolbox-wip");
        assert_eq!(entry.branch, "wip");
        assert_eq!(entry.head, "fedcba9");
    }

    #[test]
    fn parse_porcelain_detached_entry() {
        let parsed = parse_worktree_porcelain(
            "worktree /x/spike\nHEAD abcdef0123456789\ndetached\n",
        );
        let entry = parsed[0].clone().into_entry().expect("entry");
        assert_eq!(entry.branch, "(detached)");
    }

    #[test]
    fn parse_porcelain_empty_output() {
        assert!(parse_worktree_porcelain("").is_empty());
    }

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args([
                "-c",
                "user.name=lsync-tests",
                "-c",
                "user.email=lsync@tests.invalid",
            ])
            .args(args)
            .current_dir(dir)
            .output()
            .expect("run git");
        assert!(
            status.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&status.stderr)
        );
    }

    #[test]
    fn discover_worktrees_groups_by_base_repo() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let root = make_root(&tmp);
        let repo = root.join("toolbox");
        fs::create_dir_all(&repo).unwrap();
        git(&repo, &["init", "-q"]);
        git(&repo, &["commit", "--allow-empty", "-q", "-m", "init"]);
        git(
            &repo,
            &["worktree", "add", "-q", "../toolbox-wip", "-b", "wip"],
        );

        let tree = SyncTree::with_start(&root);
        let map = tree.discover_worktrees().expect("discover");
        let entries = &map[&RepoName::from("toolbox")];
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "toolbox-wip");
        assert_eq!(entries[0].branch, "wip");
        assert_eq!(entries[0].head.len(), 7);

        let dirs = tree.sync_dirs_with_extra(None).expect("sync dirs");
        assert_eq!(dirs, vec!["scripts", "toolbox", "notebooks", "toolbox-wip"]);
    }

    #[test]
    fn discover_worktrees_drops_deleted_directories() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        let root = make_root(&tmp);
        let repo = root.join("toolbox");
        fs::create_dir_all(&repo).unwrap();
        git(&repo, &["init", "-q"]);
        git(&repo, &["commit", "--allow-empty", "-q", "-m", "init"]);
        git(
            &repo,
            &["worktree", "add", "-q", "../toolbox-wip", "-b", "wip"],
        );
        fs::remove_dir_all(root.join("toolbox-wip")).unwrap();

        let tree = SyncTree::with_start(&root);
        let map = tree.discover_worktrees().expect("discover");
        assert!(
            !map.contains_key(&RepoName::from("toolbox")),
            "stale worktree must be dropped, not errored"
        );
    }

    #[test]
    fn detect_repo_from_subdirectory() {
        let tmp = TempDir::new().unwrap();
        let root = make_root(&tmp);
        fs::create_dir_all(root.join("commit_msg/toolbox")).unwrap();
        let inside = root.join("toolbox/src");
        fs::create_dir_all(&inside).unwrap();

        let tree = SyncTree::with_start(&inside);
        assert_eq!(tree.detect_repo(), Some(RepoName::from("toolbox")));
    }

    #[test]
    fn detect_repo_outside_any_repo() {
        let tmp = TempDir::new().unwrap();
        let root = make_root(&tmp);
        fs::create_dir_all(root.join("commit_msg/toolbox")).unwrap();
        let elsewhere = root.join("scratch");
        fs::create_dir_all(&elsewhere).unwrap();

        let tree = SyncTree::with_start(&elsewhere);
        assert_eq!(tree.detect_repo(), None);
    }
}

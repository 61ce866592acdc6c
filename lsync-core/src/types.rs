//! Domain types for the lsync tree and snapshot protocol.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem
//! paths. Everything that crosses the on-disk protocol boundary
//! (`worktrees.json`) is serializable via serde.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name of a synchronized repository directory, relative to
/// the sync root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RepoName(pub String);

impl RepoName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepoName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepoName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Worktrees
// ---------------------------------------------------------------------------

/// One auxiliary checkout of a repository, as recorded in `worktrees.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeEntry {
    /// Directory name relative to the sync root.
    pub name: String,
    /// Checked-out branch, or `(detached)`.
    pub branch: String,
    /// Abbreviated HEAD commit.
    pub head: String,
}

/// Repository name → its worktree entries, in discovery order.
pub type WorktreeMap = BTreeMap<RepoName, Vec<WorktreeEntry>>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_name_display() {
        assert_eq!(RepoName::from("toolbox").to_string(), "toolbox");
        assert_eq!(RepoName::from(String::from("scripts")).as_str(), "scripts");
    }

    #[test]
    fn repo_name_equality() {
        assert_eq!(RepoName::from("x"), RepoName::from(String::from("x")));
    }

    #[test]
    fn worktree_map_serializes_as_plain_object() {
        let mut map = WorktreeMap::new();
        map.insert(
            RepoName::from("toolbox"),
            vec![WorktreeEntry {
                name: "toolbox-wip".to_string(),
                branch: "wip".to_string(),
                head: "abc1234".to_string(),
            }],
        );
        let json = serde_json::to_string(&map).expect("serialize");
        assert!(json.starts_with(r#"{"toolbox":"#), "got: {json}");
    }
}

//! The fixed set of captured git views.
//!
//! Adding a view is a data change here, not a control-flow change anywhere
//! else: the collector iterates [`GitView::ALL`] and the reader addresses
//! views by name.

use std::fmt;

/// Worktree map file name at the top of the cache directory.
pub const WORKTREE_MAP_FILE: &str = "worktrees.json";

// Color is forced on (--color=always / %C() format) so the cached files
// render with the same coloring as native git when viewed through a pager.
const LOG_FORMAT: &str = "%C(yellow)%h%C(reset) \
                          %C(green)%an%C(reset) \
                          %C(blue)%ad%C(reset) \
                          %s\
                          %C(auto)%d%C(reset)";

/// One captured git view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitView {
    /// Current-branch history, limited to the most recent N entries.
    Log,
    /// All-branches graph history, unlimited.
    LogAll,
    Status,
    Branch,
    DiffStat,
    Diff,
}

impl GitView {
    pub const ALL: [GitView; 6] = [
        GitView::Log,
        GitView::LogAll,
        GitView::Status,
        GitView::Branch,
        GitView::DiffStat,
        GitView::Diff,
    ];

    /// View name, as used in file names and CLI messages.
    pub fn name(self) -> &'static str {
        match self {
            GitView::Log => "log",
            GitView::LogAll => "log_all",
            GitView::Status => "status",
            GitView::Branch => "branch",
            GitView::DiffStat => "diff_stat",
            GitView::Diff => "diff",
        }
    }

    /// Capture file name under the per-repository cache subdirectory.
    pub fn file_name(self) -> String {
        format!("{}.txt", self.name())
    }

    /// Whether this is a history view (log variants).
    pub fn is_history(self) -> bool {
        matches!(self, GitView::Log | GitView::LogAll)
    }

    /// Git arguments for this view. The entry limit applies to the
    /// single-branch history only; the graph variant is unlimited.
    pub fn args(self, log_limit: usize) -> Vec<String> {
        let pretty = format!("--pretty=format:{LOG_FORMAT}");
        match self {
            GitView::Log => vec![
                "log".into(),
                "--color=always".into(),
                pretty,
                format!("-{log_limit}"),
            ],
            GitView::LogAll => vec![
                "log".into(),
                "--all".into(),
                "--graph".into(),
                "--color=always".into(),
                pretty,
            ],
            GitView::Status => vec![
                "-c".into(),
                "color.status=always".into(),
                "status".into(),
            ],
            GitView::Branch => vec!["branch".into(), "-vv".into(), "--color=always".into()],
            GitView::DiffStat => vec!["diff".into(), "--stat".into(), "--color=always".into()],
            GitView::Diff => vec!["diff".into(), "--color=always".into()],
        }
    }
}

impl fmt::Display for GitView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

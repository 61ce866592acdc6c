//! `rgit status-all` — compact per-repo summary built from cached views.

use std::sync::OnceLock;

use anyhow::Result;
use regex::Regex;

use lsync_snapshot::{GitView, Reader};

fn ansi_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid regex"))
}

pub fn strip_ansi(text: &str) -> String {
    ansi_re().replace_all(text, "").into_owned()
}

/// Status lines bucketed by section, original colored lines preserved.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StatusBuckets {
    pub staged: Vec<String>,
    pub unstaged: Vec<String>,
    pub untracked: Vec<String>,
}

impl StatusBuckets {
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty() && self.untracked.is_empty()
    }
}

#[derive(Clone, Copy)]
enum Section {
    None,
    Staged,
    Unstaged,
    Untracked,
}

/// Parse `git status` output into staged / unstaged / untracked buckets.
pub fn parse_status_lines(status: &str) -> StatusBuckets {
    let mut buckets = StatusBuckets::default();
    let mut section = Section::None;

    for line in status.lines() {
        let plain = strip_ansi(line);
        if plain.contains("Changes to be committed") {
            section = Section::Staged;
        } else if plain.contains("Changes not staged for commit") {
            section = Section::Unstaged;
        } else if plain.contains("Untracked files") {
            section = Section::Untracked;
        } else if plain.starts_with('\t') {
            match section {
                Section::Staged => buckets.staged.push(line.to_string()),
                Section::Unstaged => buckets.unstaged.push(line.to_string()),
                Section::Untracked => buckets.untracked.push(line.to_string()),
                Section::None => {}
            }
        }
    }
    buckets
}

/// Build the full status-all report over every cached repo.
pub fn status_all(reader: &Reader) -> Result<String> {
    let repos = reader.list_repos()?;
    if repos.is_empty() {
        return Ok("No repos found in commit_msg/.\n".to_string());
    }

    let mut out: Vec<String> = Vec::new();
    for repo in repos {
        out.push(format!("\n{}", "=".repeat(60)));
        out.push(format!("  {repo}"));
        out.push("=".repeat(60));

        // Current branch: first line starting with '*'.
        let branch = reader.read_view(&repo, GitView::Branch)?;
        if let Some(line) = branch
            .lines()
            .find(|line| strip_ansi(line).starts_with('*'))
        {
            out.push(format!("  Branch: {}", line.trim()));
        }

        let status = reader.read_view(&repo, GitView::Status)?;
        let buckets = parse_status_lines(&status);
        for (label, lines) in [
            ("Staged", &buckets.staged),
            ("Unstaged", &buckets.unstaged),
            ("Untracked", &buckets.untracked),
        ] {
            if !lines.is_empty() {
                out.push(format!("  {label}:"));
                for line in lines {
                    out.push(format!("  {line}"));
                }
            }
        }
        if buckets.is_empty() {
            if let Some(last) = status.trim().lines().last() {
                out.push(format!("  Status: {}", last.trim()));
            }
        }

        // Diff stat summary: the "N files changed, ..." tail line.
        let diff_stat = reader.read_view(&repo, GitView::DiffStat)?;
        if let Some(last) = diff_stat.trim().lines().last() {
            if !last.trim().is_empty() {
                out.push(format!("  Diff:   {}", last.trim()));
            }
        }

        // Latest commit: first non-graph line from the log.
        let log = reader.read_view(&repo, GitView::Log)?;
        if let Some(line) = log.lines().find(|line| {
            !strip_ansi(line)
                .trim()
                .trim_start_matches(['*', '|', '/', '\\', ' '])
                .is_empty()
        }) {
            out.push(format!("  Latest: {}", line.trim()));
        }
    }

    Ok(format!("{}\n", out.join("\n")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! rgit — read-only git metadata viewer for remote servers.
//!
//! # Usage
//!
//! ```text
//! rgit list                  # list available repos
//! rgit log                   # show commit log (auto-detect repo from cwd)
//! rgit log toolbox -n 30     # show the first 30 log lines for toolbox
//! rgit log-all               # show the all-branches graph log
//! rgit status | branch | diff | diff-stat
//! rgit status-all            # compact summary for all repos
//! rgit worktree list         # show the cached worktree map
//! rgit worktree switch NAME  # activate a synced worktree
//! ```
//!
//! Everything is served from the rsynced `commit_msg/` cache; no live git
//! and no network access are required.

mod pager;
mod summary;

use anyhow::{bail, ensure, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use lsync_core::{RepoName, SyncTree, WorktreeEntry};
use lsync_snapshot::{GitView, Reader};

/// Command to run inside a worktree on `worktree switch` (via `sh -c`).
const WORKTREE_INSTALL_CMD_ENV: &str = "LSYNC_WORKTREE_INSTALL_CMD";

#[derive(Parser, Debug)]
#[command(
    name = "rgit",
    version,
    about = "Read-only git metadata viewer for remote servers",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all repos with cached git metadata.
    List,

    /// Show the commit log for a repo.
    Log {
        /// Repository name (auto-detected from cwd if omitted).
        repo: Option<String>,
        /// Show only the first N lines (0 = all).
        #[arg(short = 'n', default_value_t = 0)]
        lines: usize,
    },

    /// Show the all-branches graph log for a repo.
    LogAll {
        repo: Option<String>,
    },

    /// Show the git status for a repo.
    Status {
        repo: Option<String>,
    },

    /// Show branch info for a repo.
    Branch {
        repo: Option<String>,
    },

    /// Show git diff --stat for a repo.
    DiffStat {
        repo: Option<String>,
    },

    /// Show the full git diff for a repo.
    Diff {
        repo: Option<String>,
    },

    /// Show a compact status summary for all repos.
    StatusAll,

    /// Inspect or activate synced worktrees.
    Worktree {
        #[command(subcommand)]
        command: WorktreeCommand,
    },
}

#[derive(Subcommand, Debug)]
enum WorktreeCommand {
    /// Show the cached worktree map.
    List {
        /// Limit to one repository.
        repo: Option<String>,
    },
    /// Verify a synced worktree and run the configured install command in it.
    Switch {
        /// Worktree directory name.
        name: String,
        /// Repository the worktree belongs to (searched if omitted).
        #[arg(long)]
        repo: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let tree = SyncTree::from_cwd()?;
    let reader = Reader::new(&tree)?;

    match cli.command {
        Command::List => list_repos(&reader),
        Command::Log { repo, lines } => {
            let repo = resolve_repo(&tree, repo)?;
            let content = read_view(&reader, &repo, GitView::Log)?;
            if lines > 0 {
                let head: Vec<&str> = content.lines().take(lines).collect();
                pager::page(&format!("{}\n", head.join("\n")));
            } else {
                pager::page(&content);
            }
            Ok(())
        }
        Command::LogAll { repo } => show(&tree, &reader, repo, GitView::LogAll),
        Command::Status { repo } => show(&tree, &reader, repo, GitView::Status),
        Command::Branch { repo } => show(&tree, &reader, repo, GitView::Branch),
        Command::DiffStat { repo } => show(&tree, &reader, repo, GitView::DiffStat),
        Command::Diff { repo } => show(&tree, &reader, repo, GitView::Diff),
        Command::StatusAll => {
            let content = summary::status_all(&reader)?;
            pager::page(&content);
            Ok(())
        }
        Command::Worktree { command } => match command {
            WorktreeCommand::List { repo } => worktree_list(&reader, repo),
            WorktreeCommand::Switch { name, repo } => worktree_switch(&tree, &reader, &name, repo),
        },
    }
}

fn resolve_repo(tree: &SyncTree, repo: Option<String>) -> Result<RepoName> {
    if let Some(name) = repo {
        return Ok(RepoName::from(name));
    }
    tree.detect_repo().context(
        "cannot detect repo from current directory; \
         specify a repo name explicitly, or cd into a repo",
    )
}

fn read_view(reader: &Reader, repo: &RepoName, view: GitView) -> Result<String> {
    Ok(reader.read_view(repo, view)?)
}

fn show(tree: &SyncTree, reader: &Reader, repo: Option<String>, view: GitView) -> Result<()> {
    let repo = resolve_repo(tree, repo)?;
    pager::page(&read_view(reader, &repo, view)?);
    Ok(())
}

fn list_repos(reader: &Reader) -> Result<()> {
    let repos = reader.list_repos()?;
    if repos.is_empty() {
        println!("No repos found in commit_msg/.");
        return Ok(());
    }
    let mut lines = vec!["Available repos:".to_string()];
    for repo in repos {
        lines.push(format!("  - {repo}"));
    }
    pager::page(&format!("{}\n", lines.join("\n")));
    Ok(())
}

#[derive(Tabled)]
struct WorktreeRow {
    #[tabled(rename = "repo")]
    repo: String,
    #[tabled(rename = "worktree")]
    name: String,
    #[tabled(rename = "branch")]
    branch: String,
    #[tabled(rename = "head")]
    head: String,
}

fn worktree_list(reader: &Reader, repo: Option<String>) -> Result<()> {
    let map = reader.read_worktree_map()?;
    let rows: Vec<WorktreeRow> = map
        .iter()
        .filter(|(name, _)| repo.as_deref().map_or(true, |want| name.as_str() == want))
        .flat_map(|(name, entries)| {
            entries.iter().map(move |entry| WorktreeRow {
                repo: name.to_string(),
                name: entry.name.clone(),
                branch: entry.branch.clone(),
                head: entry.head.clone(),
            })
        })
        .collect();

    if rows.is_empty() {
        println!("No worktrees recorded in the cached map.");
        return Ok(());
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    pager::page(&format!("{table}\n"));
    Ok(())
}

fn worktree_switch(
    tree: &SyncTree,
    reader: &Reader,
    name: &str,
    repo: Option<String>,
) -> Result<()> {
    let map = reader.read_worktree_map()?;
    let candidates: Vec<(&RepoName, &WorktreeEntry)> = map
        .iter()
        .filter(|(r, _)| repo.as_deref().map_or(true, |want| r.as_str() == want))
        .flat_map(|(r, entries)| entries.iter().map(move |e| (r, e)))
        .filter(|(_, entry)| entry.name == name)
        .collect();

    let (repo_name, entry) = match candidates.as_slice() {
        [] => bail!("no worktree named '{name}' in the cached map (was it synced?)"),
        [one] => *one,
        many => {
            let repos: Vec<String> = many.iter().map(|(r, _)| r.to_string()).collect();
            bail!(
                "worktree '{name}' is ambiguous across repos: {}; pass --repo",
                repos.join(", ")
            );
        }
    };

    let dir = tree.sync_root()?.join(&entry.name);
    ensure!(
        dir.is_dir(),
        "worktree directory {} is missing on this host",
        dir.display()
    );
    println!(
        "{} {} [{}] ({} @ {})",
        "✓".green(),
        entry.name,
        repo_name,
        entry.branch,
        entry.head
    );

    if let Ok(install_cmd) = std::env::var(WORKTREE_INSTALL_CMD_ENV) {
        if !install_cmd.trim().is_empty() {
            println!("  {}", format!("$ {install_cmd}").dimmed());
            let status = std::process::Command::new("sh")
                .arg("-c")
                .arg(&install_cmd)
                .current_dir(&dir)
                .status()
                .with_context(|| format!("failed to run `{install_cmd}`"))?;
            if !status.success() {
                std::process::exit(status.code().unwrap_or(1));
            }
        }
    }
    Ok(())
}

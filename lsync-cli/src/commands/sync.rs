//! The full sync flow: plan → snapshot → confirm → run → record.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use lsync_canvas::canvas::clear_screen;
use lsync_canvas::{style, CanvasSession};
use lsync_core::{config, SyncTree};
use lsync_snapshot::{CollectReport, Collector, WORKTREE_MAP_FILE};
use lsync_transfer::{
    history, orchestrator, plan as planner, HistoryEntry, SyncPlan, TransferOutcome,
};

/// Arguments for `lsync`.
#[derive(Parser, Debug)]
#[command(
    name = "lsync",
    version,
    about = "Synchronize the working tree to remote hosts over rsync",
    long_about = None,
)]
pub struct SyncArgs {
    /// Server (cluster) name from the config file.
    #[arg(short = 'n', long)]
    pub server: String,

    /// Sync only this file or directory instead of the whole tree.
    #[arg(short = 'f', long)]
    pub file_or_path: Option<String>,

    /// Mirror deletions on the destination hosts.
    #[arg(short = 'd', long)]
    pub delete: bool,

    /// Also transfer .git history.
    #[arg(short = 'g', long)]
    pub git: bool,

    /// Config file path (default: ~/.lsync.yaml).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let config_path = match &self.config {
            Some(path) => path.clone(),
            None => config::default_path()?,
        };
        let servers = config::load_at(&config_path)
            .with_context(|| format!("failed to load config from {}", config_path.display()))?;

        let tree = SyncTree::from_cwd()?;
        let ctx = planner::PlanContext::resolve(&tree, &home)?;
        let opts = planner::PlanOptions {
            file_or_path: self.file_or_path.clone(),
            delete: self.delete,
            git_repo: self.git,
        };
        // Unknown server fails here — nothing has been spawned or written.
        let plan = planner::plan(&self.server, &servers, &ctx, &opts)?;

        let mut stdout = io::stdout();
        clear_screen(&mut stdout)?;

        if plan.delete {
            println!("{}", style::warn_banner("Delete mode enabled"));
            println!();
        }
        print_last_log(&home)?;
        print_plan(&plan);

        collect_snapshots(&tree)?;

        for command in &plan.commands {
            println!();
            println!("  {}", style::dim(&format!("$ {}", command.command_line())));
        }

        confirm()?;
        clear_screen(&mut stdout)?;
        println!(
            "{}",
            style::section_header(&format!(
                "Syncing {} -> {}",
                plan.relative_path.display(),
                plan.hosts.join(", ")
            ))
        );

        let outcomes = {
            let mut session = CanvasSession::stdout(plan.commands.len(), "Rsync")?;
            orchestrator::run_transfers(&plan.commands, &mut session)?
        };
        // the canvas session is closed before any failure report prints
        let failed: Vec<&TransferOutcome> = outcomes.iter().filter(|o| !o.success).collect();
        for outcome in &failed {
            println!("{}", style::fail_block(&outcome.command_line));
            println!("{}", style::red(outcome.stderr.trim_end()));
        }

        history::append_at(
            &home,
            &HistoryEntry::new(&plan.relative_path, &plan.hosts, plan.delete, plan.git_repo),
        )?;
        if let Some(last) = history::read_last_at(&home)? {
            println!(
                "{} Done  {}  {} -> {}",
                style::green("✓"),
                style::dim(&last.now_str),
                last.path,
                last.hosts.join(", ")
            );
        }

        if !failed.is_empty() {
            bail!("{} of {} transfers failed", failed.len(), outcomes.len());
        }
        Ok(())
    }
}

fn print_last_log(home: &std::path::Path) -> Result<()> {
    match history::read_last_at(home)? {
        Some(last) => {
            println!("{}", style::section_header("Last Sync"));
            println!(
                "  {}  {} -> {}",
                style::dim(&last.now_str),
                last.path,
                last.hosts.join(", ")
            );
        }
        None => println!("{}", style::dim("  No previous sync log")),
    }
    Ok(())
}

fn print_plan(plan: &SyncPlan) {
    println!("{}", style::section_header("Sync Plan"));
    println!(
        "  Source:  {}",
        style::bold(&plan.relative_path.display().to_string())
    );
    println!("  Target:  {}", style::format_hosts(&plan.hosts));
    if plan.delete {
        println!("  Delete:  {}", style::yellow("Yes"));
    }
    if plan.git_repo {
        println!("  Git:     Yes");
    }
    if !plan.nda_dirs.is_empty() {
        println!("  {}: {}", style::yellow("NDA"), plan.nda_dirs.join(", "));
    }
}

/// Run the snapshot collection and report it — every run ships current git
/// state even when `.git` itself is not transferred.
fn collect_snapshots(tree: &SyncTree) -> Result<CollectReport> {
    println!();
    println!("{}", style::section_header("Git Metadata"));
    let report = Collector::new(tree).collect_all()?;
    for repo in &report.repos {
        println!(
            "  {} {:<12} -> {}",
            style::green("✓"),
            repo.name,
            repo.cache_dir.display()
        );
    }
    for repo in &report.skipped {
        println!("  {} {repo}: capture failed, skipped", style::yellow("!"));
    }
    if report.worktree_map_written {
        println!("  {} {}", style::green("✓"), WORKTREE_MAP_FILE);
    }
    Ok(report)
}

/// The manual gate before anything destructive or multi-host runs.
fn confirm() -> Result<()> {
    print!("\n  {}", style::dim("⏎  Press Enter to continue..."));
    io::stdout().flush()?;
    let mut ack = String::new();
    io::stdin()
        .read_line(&mut ack)
        .context("failed to read confirmation")?;
    Ok(())
}

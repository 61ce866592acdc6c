//! Transfer planning — one rsync command per destination host.

use std::path::{Path, PathBuf};

use lsync_core::tree::split_dir_list;
use lsync_core::{config, ServerMap, GIT_META_DIR_NAME};

use crate::error::{io_err, TransferError};

/// Reserved server-name suffix for access-restricted destinations.
pub const NDA_SUFFIX: &str = "-nda";

/// Comma-separated directory names only transferred to `-nda` servers.
pub const NDA_DIRS_ENV: &str = "LSYNC_NDA_DIRS";

/// Toolbox-wide rsync ignore file under the user's home directory.
pub const TOOLBOX_IGNORE_FILE: &str = ".lsyncignore";

const DEFAULT_IGNORE: &str = include_str!("lsyncignore.default");

/// `<home>/.lsyncignore`.
pub fn toolbox_ignore_path_at(home: &Path) -> PathBuf {
    home.join(TOOLBOX_IGNORE_FILE)
}

/// Materialize the default ignore file if the user has none yet.
pub fn ensure_toolbox_ignore_at(home: &Path) -> Result<PathBuf, TransferError> {
    let path = toolbox_ignore_path_at(home);
    if !path.exists() {
        std::fs::write(&path, DEFAULT_IGNORE).map_err(|e| io_err(&path, e))?;
        tracing::info!("wrote default ignore file to {}", path.display());
    }
    Ok(path)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// One planned transfer subprocess, bound to one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCommand {
    pub host: String,
    pub program: String,
    pub args: Vec<String>,
}

impl TransferCommand {
    /// Shell-style rendering for display and failure reports.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

// ---------------------------------------------------------------------------
// Plan inputs
// ---------------------------------------------------------------------------

/// Everything the planner needs from the environment, resolved up front so
/// that [`plan`] itself is a pure function.
#[derive(Debug, Clone)]
pub struct PlanContext {
    pub sync_root: PathBuf,
    pub sync_dirs: Vec<String>,
    pub cwd: PathBuf,
    /// Candidate NDA directory names (from [`NDA_DIRS_ENV`]).
    pub nda_dirs: Vec<String>,
    pub toolbox_ignore: PathBuf,
}

impl PlanContext {
    /// Resolve from the live tree and environment.
    pub fn resolve(tree: &lsync_core::SyncTree, home: &Path) -> Result<Self, TransferError> {
        let cwd = std::env::current_dir().map_err(|e| io_err(PathBuf::from("."), e))?;
        let nda_dirs = std::env::var(NDA_DIRS_ENV)
            .map(|raw| split_dir_list(&raw))
            .unwrap_or_default();
        Ok(Self {
            sync_root: tree.sync_root()?,
            sync_dirs: tree.sync_dirs()?,
            cwd,
            nda_dirs,
            toolbox_ignore: ensure_toolbox_ignore_at(home)?,
        })
    }
}

/// Per-invocation flags.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Sub-path to transfer instead of the whole sync root.
    pub file_or_path: Option<String>,
    /// Mirror deletions on the destination.
    pub delete: bool,
    /// Transfer `.git` directories too.
    pub git_repo: bool,
}

/// An immutable plan: exactly one transfer command per destination host.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub server: String,
    pub hosts: Vec<String>,
    pub local_dir: PathBuf,
    pub remote_dir: PathBuf,
    /// Position of the transferred unit relative to the sync root's parent.
    pub relative_path: PathBuf,
    pub delete: bool,
    pub git_repo: bool,
    pub local_ignore: Option<PathBuf>,
    /// NDA directories actually included (present on disk, `-nda` server).
    pub nda_dirs: Vec<String>,
    pub commands: Vec<TransferCommand>,
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Build the plan for `server`.
///
/// With no sub-path the transferred unit is the entire sync root: sources
/// are the existing sync directories and the destination is
/// `host:<base>/<rootname>/`. With a sub-path, the unit is that path and
/// its position relative to the sync root's parent is preserved under the
/// server's base directory.
///
/// The snapshot cache directory, if present, is always appended so remote
/// introspection stays current.
pub fn plan(
    server: &str,
    servers: &ServerMap,
    ctx: &PlanContext,
    opts: &PlanOptions,
) -> Result<SyncPlan, TransferError> {
    let target = config::resolve(servers, server)?;
    let root_parent = ctx
        .sync_root
        .parent()
        .unwrap_or(ctx.sync_root.as_path())
        .to_path_buf();

    let (local_dir, unit_is_dir) = match &opts.file_or_path {
        None => (ctx.sync_root.clone(), true),
        Some(sub) => {
            let path = ctx.cwd.join(sub);
            let is_dir = path.is_dir();
            (path, is_dir)
        }
    };
    let relative_path = local_dir
        .strip_prefix(&root_parent)
        .map_err(|_| TransferError::OutsideSyncRoot {
            path: local_dir.clone(),
        })?
        .to_path_buf();
    let remote_dir = target.base_dir.join(&relative_path);

    // Transfer set: the unit itself (or the root's member dirs), then NDA
    // directories for restricted servers, then the snapshot cache.
    let mut sources: Vec<String> = Vec::new();
    if opts.file_or_path.is_none() {
        for dir in &ctx.sync_dirs {
            let path = ctx.sync_root.join(dir);
            if path.exists() {
                sources.push(path.display().to_string());
            }
        }
    } else {
        sources.push(source_arg(&local_dir, unit_is_dir));
    }

    let mut nda_included = Vec::new();
    if server.ends_with(NDA_SUFFIX) {
        for dir in &ctx.nda_dirs {
            let path = ctx.sync_root.join(dir);
            if path.exists() {
                sources.push(path.display().to_string());
                nda_included.push(dir.clone());
            }
        }
    }

    let meta_dir = ctx.sync_root.join(GIT_META_DIR_NAME);
    if meta_dir.is_dir() {
        sources.push(meta_dir.display().to_string());
    }

    let local_ignore = probe_gitignore(&local_dir);

    let mut commands = Vec::with_capacity(target.hosts.len());
    for host in &target.hosts {
        let mut args: Vec<String> = vec!["-ah".into()];
        if opts.delete {
            args.push("--delete".into());
        }
        args.push("--info=progress2".into());
        if let Some(ignore) = &local_ignore {
            args.push(format!("--exclude-from={}", ignore.display()));
        }
        args.push(format!("--exclude-from={}", ctx.toolbox_ignore.display()));
        if !opts.git_repo {
            args.push("--exclude=.git".into());
        }
        args.extend(sources.iter().cloned());
        args.push(format!("{host}:{}", dest_arg(&remote_dir, unit_is_dir)));
        commands.push(TransferCommand {
            host: host.clone(),
            program: "rsync".into(),
            args,
        });
    }

    Ok(SyncPlan {
        server: server.to_string(),
        hosts: target.hosts.clone(),
        local_dir,
        remote_dir,
        relative_path,
        delete: opts.delete,
        git_repo: opts.git_repo,
        local_ignore,
        nda_dirs: nda_included,
        commands,
    })
}

/// The transferred unit's own ignore file, if present.
fn probe_gitignore(local_dir: &Path) -> Option<PathBuf> {
    let path = local_dir.join(".gitignore");
    path.exists().then_some(path)
}

/// Directory sources get a trailing separator so their *contents* land
/// under the destination; file sources do not.
fn source_arg(path: &Path, is_dir: bool) -> String {
    if is_dir {
        format!("{}/", path.display())
    } else {
        path.display().to_string()
    }
}

fn dest_arg(remote_dir: &Path, is_dir: bool) -> String {
    if is_dir {
        format!("{}/", remote_dir.display())
    } else {
        remote_dir.display().to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

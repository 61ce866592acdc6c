//! Sync history — append-only JSONL at `~/.lsync.log`.
//!
//! One JSON object per line: `{now_str, path, hosts, delete, git_repo}`.
//! No rotation and no locking; overlapping invocations can interleave
//! whole lines, which is why [`read_last_at`] skips lines that do not
//! parse instead of failing the run.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::{io_err, TransferError};

/// History file name under the user's home directory.
pub const HISTORY_FILE: &str = ".lsync.log";

/// One completed synchronization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub now_str: String,
    pub path: String,
    pub hosts: Vec<String>,
    pub delete: bool,
    pub git_repo: bool,
}

impl HistoryEntry {
    /// Stamp a new entry with the current local time.
    pub fn new(path: &Path, hosts: &[String], delete: bool, git_repo: bool) -> Self {
        Self {
            now_str: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            path: path.display().to_string(),
            hosts: hosts.to_vec(),
            delete,
            git_repo,
        }
    }
}

/// `<home>/.lsync.log`.
pub fn history_path_at(home: &Path) -> PathBuf {
    home.join(HISTORY_FILE)
}

/// Append one entry.
pub fn append_at(home: &Path, entry: &HistoryEntry) -> Result<(), TransferError> {
    let path = history_path_at(home);
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| io_err(&path, e))?;
    let line = serde_json::to_string(entry)?;
    writeln!(file, "{line}").map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// Most recent entry, or `None` for an empty or absent log.
pub fn read_last_at(home: &Path) -> Result<Option<HistoryEntry>, TransferError> {
    let path = history_path_at(home);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    for line in contents.lines().rev() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<HistoryEntry>(line) {
            Ok(entry) => return Ok(Some(entry)),
            Err(err) => {
                tracing::debug!("skipping unparseable history line: {err}");
            }
        }
    }
    Ok(None)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

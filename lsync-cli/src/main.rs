//! lsync — multi-host working-tree synchronization over rsync.
//!
//! # Usage
//!
//! ```text
//! lsync --server <name> [--file-or-path <path>] [--delete] [--git] [--config <path>]
//! ```
//!
//! Resolves the sync root from the current directory, snapshots git state
//! into the cache directory, then runs one rsync per destination host with
//! a live per-host progress display. The read-only counterpart for remote
//! hosts is the `rgit` binary.

mod commands;

use anyhow::Result;
use clap::Parser;

use commands::sync::SyncArgs;

fn main() -> Result<()> {
    env_logger::init();
    let args = SyncArgs::parse();
    args.run()
}

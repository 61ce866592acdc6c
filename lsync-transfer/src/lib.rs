//! # lsync-transfer
//!
//! Transfer planning and orchestration: turn one sync request into one
//! rsync command per destination host, run them concurrently while driving
//! the shared progress canvas, and record completed runs in the history log.

pub mod error;
pub mod history;
pub mod orchestrator;
pub mod plan;

pub use error::TransferError;
pub use history::HistoryEntry;
pub use orchestrator::{run_transfers, TransferOutcome};
pub use plan::{plan, PlanContext, PlanOptions, SyncPlan, TransferCommand, NDA_DIRS_ENV};

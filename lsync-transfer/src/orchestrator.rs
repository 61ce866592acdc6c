//! Concurrent transfer orchestration.
//!
//! One OS process per transfer command. Each process gets a supervisor
//! thread that forwards its stdout one byte at a time and, after exit, a
//! terminal outcome — all over a single channel whose sole consumer drives
//! the canvas. The terminal therefore has exactly one writer, and every
//! failure is linked back into the orchestrator's control flow instead of
//! dying inside a watcher thread.

use std::io::{ErrorKind, Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Sender};
use std::thread;

use lsync_canvas::Canvas;

use crate::error::TransferError;
use crate::plan::TransferCommand;

/// Terminal state of one transfer process.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    /// Screen-line index: the command's position in the host list.
    pub index: usize,
    pub host: String,
    pub command_line: String,
    pub success: bool,
    pub stderr: String,
}

enum TransferEvent {
    Output { index: usize, byte: u8 },
    Exited(TransferOutcome),
}

/// Run all planned commands concurrently, rendering each process's output
/// on its own canvas line until every process has exited.
///
/// Individual failures do not stop siblings; every spawned process runs to
/// completion and is reaped before this returns. The caller inspects the
/// outcomes to decide overall success.
pub fn run_transfers<W: Write>(
    commands: &[TransferCommand],
    canvas: &mut Canvas<W>,
) -> Result<Vec<TransferOutcome>, TransferError> {
    let mut children: Vec<Child> = Vec::with_capacity(commands.len());
    for command in commands {
        match spawn(command) {
            Ok(child) => children.push(child),
            Err(err) => {
                // Nothing may keep running if the run itself cannot start.
                for child in &mut children {
                    let _ = child.kill();
                    let _ = child.wait();
                }
                return Err(err);
            }
        }
    }

    let (tx, rx) = mpsc::channel::<TransferEvent>();
    let mut supervisors = Vec::with_capacity(children.len());
    for (index, child) in children.into_iter().enumerate() {
        let tx = tx.clone();
        let host = commands[index].host.clone();
        let command_line = commands[index].command_line();
        supervisors.push(thread::spawn(move || {
            supervise(index, host, command_line, child, tx);
        }));
    }
    drop(tx);

    let mut outcomes: Vec<Option<TransferOutcome>> = commands.iter().map(|_| None).collect();
    let mut remaining = commands.len();
    while remaining > 0 {
        let Ok(event) = rx.recv() else {
            break;
        };
        match event {
            TransferEvent::Output { index, byte } => {
                canvas.update_char(index, byte as char)?;
            }
            TransferEvent::Exited(outcome) => {
                tracing::debug!(
                    "transfer to {} exited (success: {})",
                    outcome.host,
                    outcome.success
                );
                let index = outcome.index;
                outcomes[index] = Some(outcome);
                remaining -= 1;
            }
        }
    }
    for supervisor in supervisors {
        let _ = supervisor.join();
    }

    Ok(outcomes
        .into_iter()
        .enumerate()
        .map(|(index, outcome)| {
            outcome.unwrap_or_else(|| TransferOutcome {
                index,
                host: commands[index].host.clone(),
                command_line: commands[index].command_line(),
                success: false,
                stderr: "transfer supervisor exited without reporting".to_string(),
            })
        })
        .collect())
}

fn spawn(command: &TransferCommand) -> Result<Child, TransferError> {
    Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| TransferError::Spawn {
            command: command.command_line(),
            source: e,
        })
}

/// Forward stdout bytes, then report the exit outcome. Runs on its own
/// thread; all sends go to the single consumer loop.
fn supervise(
    index: usize,
    host: String,
    command_line: String,
    mut child: Child,
    tx: Sender<TransferEvent>,
) {
    if let Some(mut stdout) = child.stdout.take() {
        let mut buf = [0u8; 1];
        loop {
            match stdout.read(&mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    if tx.send(TransferEvent::Output { index, byte: buf[0] }).is_err() {
                        break;
                    }
                }
                Err(ref err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
    }

    let mut stderr = String::new();
    if let Some(mut pipe) = child.stderr.take() {
        let _ = pipe.read_to_string(&mut stderr);
    }
    let success = child.wait().map(|status| status.success()).unwrap_or(false);

    let _ = tx.send(TransferEvent::Exited(TransferOutcome {
        index,
        host,
        command_line,
        success,
        stderr,
    }));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

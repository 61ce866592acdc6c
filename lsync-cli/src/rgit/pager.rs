//! Pager helper for displaying content through `less`.

use std::io::{self, IsTerminal, Write};
use std::process::{Command, Stdio};

// -F  quit if one screen
// -R  raw control characters (preserves ANSI colors)
// -X  don't clear screen on exit
const DEFAULT_PAGER: &str = "less -FRX";

/// Display `content` through a pager, like `git log` does.
///
/// Respects the `PAGER` environment variable. Falls back to direct stdout
/// when not a TTY or when the pager cannot be spawned. Write errors are
/// ignored — the pager quitting early is normal.
pub fn page(content: &str) {
    let mut stdout = io::stdout();
    if !stdout.is_terminal() {
        let _ = stdout.write_all(content.as_bytes());
        return;
    }

    let pager_cmd = std::env::var("PAGER").unwrap_or_else(|_| DEFAULT_PAGER.to_string());
    let spawned = Command::new("sh")
        .arg("-c")
        .arg(&pager_cmd)
        .stdin(Stdio::piped())
        .spawn();
    match spawned {
        Ok(mut child) => {
            if let Some(mut stdin) = child.stdin.take() {
                let _ = stdin.write_all(content.as_bytes());
            }
            let _ = child.wait();
        }
        Err(_) => {
            let _ = stdout.write_all(content.as_bytes());
        }
    }
}

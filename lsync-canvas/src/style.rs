//! Shared terminal styling helpers.

use colored::Colorize;

const HEADER_WIDTH: usize = 40;

/// Render a section header like: `━━ Title ━━━━━━━━━━━━━━━━━━`
pub fn section_header(title: &str) -> String {
    let prefix = format!("━━ {title} ");
    let fill = "━".repeat(HEADER_WIDTH.saturating_sub(prefix.chars().count()));
    format!("{prefix}{fill}").bold().to_string()
}

/// Render a warning line like: `⚠  Delete mode enabled`
pub fn warn_banner(text: &str) -> String {
    format!("⚠  {text}").yellow().bold().to_string()
}

/// Format host(s) for display: join the list, cyan-highlight the result.
pub fn format_hosts(hosts: &[String]) -> String {
    let raw = if hosts.is_empty() {
        "-".to_string()
    } else {
        hosts.join(", ")
    };
    raw.cyan().to_string()
}

/// Render a command line on a red background, for failure reports.
pub fn fail_block(text: &str) -> String {
    text.on_red().to_string()
}

pub fn dim(text: &str) -> String {
    text.dimmed().to_string()
}

pub fn bold(text: &str) -> String {
    text.bold().to_string()
}

pub fn green(text: &str) -> String {
    text.green().to_string()
}

pub fn yellow(text: &str) -> String {
    text.yellow().to_string()
}

pub fn red(text: &str) -> String {
    text.red().to_string()
}

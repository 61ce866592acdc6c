//! Error types for lsync-canvas.

use thiserror::Error;

/// All errors that can arise from canvas rendering.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Failure writing to the underlying terminal.
    #[error("terminal write error: {0}")]
    Io(#[from] std::io::Error),

    /// A stream line index outside the canvas was addressed.
    #[error("line {line} out of range (canvas has {max} lines)")]
    LineOutOfRange { line: usize, max: usize },

    /// `update_line` content must not contain line breaks.
    #[error("line content contains a line break")]
    LineBreakInContent,
}

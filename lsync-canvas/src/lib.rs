//! # lsync-canvas
//!
//! Cursor-addressed terminal renderer for concurrent progress streams, plus
//! the toolbox's shared styling helpers.
//!
//! The canvas maps N output streams onto N fixed screen lines. The
//! underlying terminal only exposes *relative* cursor motion, so the canvas
//! owns the single authoritative virtual cursor position and expresses every
//! move as an offset from it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lsync_canvas::CanvasSession;
//!
//! fn show_progress() -> Result<(), lsync_canvas::CanvasError> {
//!     let mut session = CanvasSession::stdout(2, "Rsync")?;
//!     session.update_char(0, 'x')?;
//!     session.update_line(1, "done")?;
//!     Ok(())
//! } // cursor restored here, even on early return
//! ```

pub mod canvas;
pub mod error;
pub mod style;

pub use canvas::{Canvas, CanvasSession};
pub use error::CanvasError;

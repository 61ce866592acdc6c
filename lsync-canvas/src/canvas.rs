//! The progress canvas and its scoped terminal session.

use std::io::Write;
use std::ops::{Deref, DerefMut};

use crossterm::cursor::{Hide, MoveDown, MoveLeft, MoveRight, MoveTo, MoveUp, Show};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;

use crate::error::CanvasError;

/// Clear the screen and home the cursor.
pub fn clear_screen<W: Write>(out: &mut W) -> Result<(), CanvasError> {
    out.queue(Clear(ClearType::All))?;
    out.queue(MoveTo(0, 0))?;
    out.flush()?;
    Ok(())
}

/// A fixed block of `max_lines` stream lines with one extra header row
/// below. All motion is relative to the tracked virtual cursor; an
/// incorrect running tally would misplace every subsequent write, so the
/// tally is private and every public operation ends parked at the home
/// position `(max_lines, 0)`.
#[derive(Debug)]
pub struct Canvas<W: Write> {
    out: W,
    max_lines: usize,
    cur_line: usize,
    cur_col: usize,
    line_cols: Vec<usize>,
}

impl<W: Write> Canvas<W> {
    /// Build a canvas over `out` and park the cursor at the home row.
    ///
    /// The terminal cursor is assumed to be at the top of a free region of
    /// at least `max_lines + 1` rows.
    pub fn new(out: W, max_lines: usize) -> Result<Self, CanvasError> {
        let mut canvas = Self {
            out,
            max_lines,
            cur_line: 0,
            cur_col: 0,
            line_cols: vec![0; max_lines],
        };
        canvas.reset_pos()?;
        Ok(canvas)
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Feed one character of stream `line`'s output.
    ///
    /// Carriage return and newline reset the line's recorded column — the
    /// stream has begun a new output line. Anything else is emitted at the
    /// line's recorded column, which then advances.
    pub fn update_char(&mut self, line: usize, ch: char) -> Result<(), CanvasError> {
        if line >= self.max_lines {
            return Err(CanvasError::LineOutOfRange {
                line,
                max: self.max_lines,
            });
        }
        if ch == '\n' || ch == '\r' {
            self.line_cols[line] = 0;
        } else {
            self.move_to(line, self.line_cols[line])?;
            self.put_char(ch)?;
            self.line_cols[line] = self.cur_col;
        }
        self.reset_pos()
    }

    /// Overwrite `line` from column zero. `content` must be a single line.
    ///
    /// Unlike [`update_char`](Self::update_char), the header row at index
    /// `max_lines` is addressable here.
    pub fn update_line(&mut self, line: usize, content: &str) -> Result<(), CanvasError> {
        if content.contains('\n') || content.contains('\r') {
            return Err(CanvasError::LineBreakInContent);
        }
        if line > self.max_lines {
            return Err(CanvasError::LineOutOfRange {
                line,
                max: self.max_lines,
            });
        }
        self.move_to(line, 0)?;
        self.out.write_all(content.as_bytes())?;
        self.cur_col += content.chars().count();
        self.reset_pos()
    }

    /// Render the section header on the row below the stream lines.
    pub fn print_desc(&mut self, desc: &str) -> Result<(), CanvasError> {
        let header = crate::style::section_header(desc);
        self.update_line(self.max_lines, &header)
    }

    fn put_char(&mut self, ch: char) -> Result<(), CanvasError> {
        let mut buf = [0u8; 4];
        self.out.write_all(ch.encode_utf8(&mut buf).as_bytes())?;
        self.cur_col += 1;
        Ok(())
    }

    /// Park at the home position below the stream lines.
    fn reset_pos(&mut self) -> Result<(), CanvasError> {
        self.move_to(self.max_lines, 0)?;
        self.out.flush()?;
        Ok(())
    }

    fn move_to(&mut self, line: usize, col: usize) -> Result<(), CanvasError> {
        let dv = line as isize - self.cur_line as isize;
        if dv > 0 {
            self.out.queue(MoveDown(clamp_u16(dv)))?;
        } else if dv < 0 {
            self.out.queue(MoveUp(clamp_u16(-dv)))?;
        }
        self.cur_line = line;

        let dh = col as isize - self.cur_col as isize;
        if dh > 0 {
            self.out.queue(MoveRight(clamp_u16(dh)))?;
        } else if dh < 0 {
            self.out.queue(MoveLeft(clamp_u16(-dh)))?;
        }
        self.cur_col = col;
        Ok(())
    }
}

fn clamp_u16(n: isize) -> u16 {
    n.min(u16::MAX as isize) as u16
}

// ---------------------------------------------------------------------------
// Scoped session
// ---------------------------------------------------------------------------

/// Owns a [`Canvas`] for the duration of one run.
///
/// The cursor is hidden on open and unconditionally restored on drop — the
/// guarantee holds even if the driving loop panics.
#[derive(Debug)]
pub struct CanvasSession<W: Write> {
    canvas: Canvas<W>,
}

impl CanvasSession<std::io::Stdout> {
    /// Session over standard output.
    pub fn stdout(max_lines: usize, desc: &str) -> Result<Self, CanvasError> {
        Self::open(std::io::stdout(), max_lines, desc)
    }
}

impl<W: Write> CanvasSession<W> {
    /// Hide the cursor, build the canvas, render the header row.
    pub fn open(mut out: W, max_lines: usize, desc: &str) -> Result<Self, CanvasError> {
        out.queue(Hide)?;
        out.flush()?;
        let mut canvas = Canvas::new(out, max_lines)?;
        canvas.print_desc(desc)?;
        Ok(Self { canvas })
    }
}

impl<W: Write> Deref for CanvasSession<W> {
    type Target = Canvas<W>;

    fn deref(&self) -> &Self::Target {
        &self.canvas
    }
}

impl<W: Write> DerefMut for CanvasSession<W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.canvas
    }
}

impl<W: Write> Drop for CanvasSession<W> {
    fn drop(&mut self) {
        let _ = self.canvas.out.queue(Show);
        let _ = self.canvas.out.write_all(b"\n");
        let _ = self.canvas.out.flush();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

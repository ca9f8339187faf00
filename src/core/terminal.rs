//! Terminal capability trait.
//!
//! The editing core never concatenates escape strings itself; it drives a
//! backend through this trait. The provided cursor/erase primitives emit
//! VT100 sequences over [`Terminal::write`], so a byte-transport backend
//! only has to supply the transport methods. Test backends override the
//! primitives to record calls instead ([`RecordingTerminal`]).

use crate::error::Result;
use crate::platform::vt100;

/// Byte transport plus cursor/erase primitives for one terminal.
pub trait Terminal {
    /// Write raw bytes to the terminal. Partial writes are the backend's
    /// problem; on success the whole slice reached the transport.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Report whether at least one input byte is available without
    /// consuming it. `timeout_ms` 0 polls, negative blocks.
    fn poll(&mut self, timeout_ms: i32) -> Result<bool>;

    /// Read up to `buf.len()` input bytes, blocking for the first one.
    /// Returns the count actually read; 0 means the stream closed.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Visible width in character cells.
    fn columns(&self) -> u16;

    /// Visible height in rows.
    fn rows(&self) -> u16;

    fn cursor_left(&mut self) -> Result<()> {
        self.write(vt100::CURSOR_LEFT.as_bytes())
    }

    fn cursor_right(&mut self) -> Result<()> {
        self.write(vt100::CURSOR_RIGHT.as_bytes())
    }

    fn save_cursor(&mut self) -> Result<()> {
        self.write(vt100::SAVE_CURSOR.as_bytes())
    }

    fn restore_cursor(&mut self) -> Result<()> {
        self.write(vt100::RESTORE_CURSOR.as_bytes())
    }

    fn clear_screen(&mut self) -> Result<()> {
        self.write(vt100::CLEAR_SCREEN.as_bytes())
    }

    fn clear_to_eol(&mut self) -> Result<()> {
        self.write(vt100::CLEAR_TO_EOL.as_bytes())
    }

    fn clear_line(&mut self) -> Result<()> {
        self.write(vt100::CLEAR_LINE.as_bytes())
    }

    /// Move to column 0 of the current row.
    fn bol(&mut self) -> Result<()> {
        self.write(b"\r")
    }

    /// Move right by `n` cells; a no-op for `n == 0`.
    fn cursor_right_by(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        self.write(vt100::cursor_right_by(n).as_bytes())
    }

    /// Move up by `n` rows; a no-op for `n == 0`. Single-row motion uses
    /// the unparameterized sequence and allocates nothing.
    fn cursor_up(&mut self, n: usize) -> Result<()> {
        match n {
            0 => Ok(()),
            1 => self.write(vt100::CURSOR_UP.as_bytes()),
            _ => self.write(vt100::cursor_up_by(n).as_bytes()),
        }
    }

    /// Position the cursor at column 0 of `row` (1-based).
    fn goto_line(&mut self, row: u16) -> Result<()> {
        self.write(vt100::goto_line(row).as_bytes())
    }

    /// Emit the cursor-position request. The report arrives in-band on the
    /// input stream; see [`Session::query_cursor`](crate::Session::query_cursor).
    fn query_cursor(&mut self) -> Result<()> {
        self.write(vt100::QUERY_CURSOR.as_bytes())
    }
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermOp {
    Bytes(Vec<u8>),
    CursorLeft,
    CursorRight,
    SaveCursor,
    RestoreCursor,
    ClearScreen,
    ClearToEol,
    ClearLine,
    Bol,
    CursorRightBy(usize),
    CursorUp(usize),
    GotoLine(u16),
    QueryCursor,
}

/// In-memory backend that records primitive calls instead of emitting
/// escape sequences, and replays scripted input bytes.
///
/// This is the test double for the whole crate, but it is exported because
/// embedders writing their own redraw assertions need it too.
#[derive(Debug, Default)]
pub struct RecordingTerminal {
    columns: u16,
    rows: u16,
    ops: Vec<TermOp>,
    input: std::collections::VecDeque<u8>,
}

impl RecordingTerminal {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns,
            rows,
            ops: Vec::new(),
            input: std::collections::VecDeque::new(),
        }
    }

    pub fn set_size(&mut self, columns: u16, rows: u16) {
        self.columns = columns;
        self.rows = rows;
    }

    /// Queue bytes for subsequent `read`/`poll` calls.
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    /// All calls recorded so far.
    pub fn ops(&self) -> &[TermOp] {
        &self.ops
    }

    /// Drain the recorded calls, leaving the log empty.
    pub fn take_ops(&mut self) -> Vec<TermOp> {
        std::mem::take(&mut self.ops)
    }

    /// Cursor column implied by the recorded calls, assuming the line
    /// started at column 0 and content bytes are one cell each (CR and
    /// backspace excepted).
    pub fn final_column(&self) -> usize {
        let mut col = 0usize;
        for op in &self.ops {
            match op {
                TermOp::Bytes(bytes) => {
                    for &byte in bytes {
                        match byte {
                            b'\r' => col = 0,
                            0x08 => col = col.saturating_sub(1),
                            _ => col += 1,
                        }
                    }
                }
                TermOp::CursorLeft => col = col.saturating_sub(1),
                TermOp::CursorRight => col += 1,
                TermOp::CursorRightBy(n) => col += n,
                TermOp::Bol | TermOp::ClearScreen | TermOp::GotoLine(_) => col = 0,
                _ => {}
            }
        }
        col
    }

    /// The visible line implied by the recorded calls: content bytes laid
    /// out from column 0, honoring cursor motion and erases.
    pub fn rendered_line(&self) -> String {
        let mut cells: Vec<u8> = Vec::new();
        let mut col = 0usize;
        for op in &self.ops {
            match op {
                TermOp::Bytes(bytes) => {
                    for &byte in bytes {
                        match byte {
                            b'\r' => col = 0,
                            0x08 => col = col.saturating_sub(1),
                            _ => {
                                if col >= cells.len() {
                                    cells.resize(col + 1, b' ');
                                }
                                cells[col] = byte;
                                col += 1;
                            }
                        }
                    }
                }
                TermOp::CursorLeft => col = col.saturating_sub(1),
                TermOp::CursorRight => col += 1,
                TermOp::CursorRightBy(n) => col += n,
                TermOp::Bol | TermOp::GotoLine(_) => col = 0,
                TermOp::ClearScreen => {
                    cells.clear();
                    col = 0;
                }
                TermOp::ClearToEol => cells.truncate(col),
                TermOp::ClearLine => {
                    for cell in cells.iter_mut() {
                        *cell = b' ';
                    }
                }
                _ => {}
            }
        }
        String::from_utf8_lossy(&cells).into_owned()
    }
}

impl Terminal for RecordingTerminal {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.ops.push(TermOp::Bytes(bytes.to_vec()));
        Ok(())
    }

    fn poll(&mut self, _timeout_ms: i32) -> Result<bool> {
        Ok(!self.input.is_empty())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut count = 0;
        while count < buf.len() {
            match self.input.pop_front() {
                Some(byte) => {
                    buf[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }

    fn columns(&self) -> u16 {
        self.columns
    }

    fn rows(&self) -> u16 {
        self.rows
    }

    fn cursor_left(&mut self) -> Result<()> {
        self.ops.push(TermOp::CursorLeft);
        Ok(())
    }

    fn cursor_right(&mut self) -> Result<()> {
        self.ops.push(TermOp::CursorRight);
        Ok(())
    }

    fn save_cursor(&mut self) -> Result<()> {
        self.ops.push(TermOp::SaveCursor);
        Ok(())
    }

    fn restore_cursor(&mut self) -> Result<()> {
        self.ops.push(TermOp::RestoreCursor);
        Ok(())
    }

    fn clear_screen(&mut self) -> Result<()> {
        self.ops.push(TermOp::ClearScreen);
        Ok(())
    }

    fn clear_to_eol(&mut self) -> Result<()> {
        self.ops.push(TermOp::ClearToEol);
        Ok(())
    }

    fn clear_line(&mut self) -> Result<()> {
        self.ops.push(TermOp::ClearLine);
        Ok(())
    }

    fn bol(&mut self) -> Result<()> {
        self.ops.push(TermOp::Bol);
        Ok(())
    }

    fn cursor_right_by(&mut self, n: usize) -> Result<()> {
        if n > 0 {
            self.ops.push(TermOp::CursorRightBy(n));
        }
        Ok(())
    }

    fn cursor_up(&mut self, n: usize) -> Result<()> {
        if n > 0 {
            self.ops.push(TermOp::CursorUp(n));
        }
        Ok(())
    }

    fn goto_line(&mut self, row: u16) -> Result<()> {
        self.ops.push(TermOp::GotoLine(row));
        Ok(())
    }

    fn query_cursor(&mut self) -> Result<()> {
        self.ops.push(TermOp::QueryCursor);
        Ok(())
    }
}

//! VT100 escape-sequence constants.
//!
//! Process-wide, read-only tables used by the provided [`Terminal`]
//! primitives.
//!
//! [`Terminal`]: crate::Terminal

pub const CURSOR_LEFT: &str = "\x1b[D";
pub const CURSOR_RIGHT: &str = "\x1b[C";
pub const CURSOR_UP: &str = "\x1b[A";
pub const SAVE_CURSOR: &str = "\x1b7";
pub const RESTORE_CURSOR: &str = "\x1b8";
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
pub const CLEAR_TO_EOL: &str = "\x1b[K";
pub const CLEAR_LINE: &str = "\x1b[2K";
/// Device Status Report: ask the terminal to report the cursor position.
pub const QUERY_CURSOR: &str = "\x1b[6n";
/// Terminator of the cursor-position report `ESC [ row ; col R`.
pub const CURSOR_REPORT_END: u8 = b'R';

/// Move right by `n` cells.
pub fn cursor_right_by(n: usize) -> String {
    format!("\x1b[{n}C")
}

/// Move up by `n` rows.
pub fn cursor_up_by(n: usize) -> String {
    format!("\x1b[{n}A")
}

/// Position the cursor at column 0 of `row` (1-based).
pub fn goto_line(row: u16) -> String {
    format!("\x1b[{row};0H")
}

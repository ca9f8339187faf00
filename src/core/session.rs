//! Per-connection line-editing session.
//!
//! One `Session` per terminal connection. There is no ambient "current
//! session": the handle is threaded explicitly through every call, and
//! `&mut Session` is what makes buffer mutation, flag updates, and redraw
//! processing strictly sequential.

use std::mem;

use tracing::debug;

use crate::config::EnvConfig;
use crate::core::buffer::TextBuffer;
use crate::core::flags::Redraw;
use crate::core::screen::Screen;
use crate::core::terminal::Terminal;
use crate::error::{Error, Result};
use crate::platform::vt100;
use crate::prompt::PromptFn;

/// Cap on buffered cursor-report bytes; a report that runs past this
/// without its terminator counts as malformed.
const CURSOR_REPORT_CAP: usize = 32;

/// Keys that end [`Session::pause`] when the caller supplies none:
/// ESC, `q`, `Q`.
pub const DEFAULT_PAUSE_KEYS: &[u8] = &[0x1b, b'q', b'Q'];

/// Line-editing state bound to one terminal and one text buffer.
pub struct Session<'buf, T: Terminal> {
    pub(crate) buffer: &'buf mut (dyn TextBuffer + 'buf),
    pub(crate) term: T,
    pub(crate) screen: Screen,
    pub(crate) prompt: Option<PromptFn>,
    pub(crate) prompt_len: usize,
    pub(crate) flags: Redraw,
    pub(crate) debug_redraw: bool,
    yield_io: bool,
    query_retries: usize,
}

impl<'buf, T: Terminal> Session<'buf, T> {
    /// Bind a buffer and a terminal backend, ready for input acquisition.
    ///
    /// Fails with [`Error::TransportUnavailable`] when the backend reports
    /// no usable width. Terminal-mode switching (raw mode etc.) is the
    /// backend's business and must already have happened.
    pub fn attach(buffer: &'buf mut (dyn TextBuffer + 'buf), term: T) -> Result<Self> {
        Self::attach_with_config(buffer, term, EnvConfig::from_env())
    }

    pub fn attach_with_config(
        buffer: &'buf mut (dyn TextBuffer + 'buf),
        term: T,
        config: EnvConfig,
    ) -> Result<Self> {
        if term.columns() == 0 {
            return Err(Error::TransportUnavailable);
        }
        let screen = Screen::detect(&term);
        Ok(Self {
            buffer,
            term,
            screen,
            prompt: None,
            prompt_len: 0,
            flags: Redraw::DISPLAY_PROMPT | Redraw::DISPLAY_LINE,
            debug_redraw: config.debug_redraw,
            yield_io: config.yield_io,
            query_retries: config.query_retries,
        })
    }

    /// Replace the prompt renderer, returning the previous one so nested
    /// prompt contexts can restore it. Marks the prompt for repaint.
    pub fn set_prompt(&mut self, renderer: PromptFn) -> Option<PromptFn> {
        self.flags.insert(Redraw::DISPLAY_PROMPT);
        mem::replace(&mut self.prompt, Some(renderer))
    }

    /// Remove the prompt renderer, returning it.
    pub fn take_prompt(&mut self) -> Option<PromptFn> {
        self.flags.insert(Redraw::DISPLAY_PROMPT);
        self.prompt.take()
    }

    /// Replace the terminal backend, returning the previous one. The
    /// session is immediately ready for input on the new transport.
    pub fn rebind_terminal(&mut self, term: T) -> Result<T> {
        if term.columns() == 0 {
            return Err(Error::TransportUnavailable);
        }
        let previous = mem::replace(&mut self.term, term);
        self.screen.refresh_size(&self.term);
        self.flags.insert(Redraw::CLEAR_LINE);
        Ok(previous)
    }

    /// Cached displayed prompt width, as of the last prompt repaint.
    pub fn prompt_len(&self) -> usize {
        self.prompt_len
    }

    /// Pending redraw obligations.
    pub fn pending(&self) -> Redraw {
        self.flags
    }

    /// Add redraw obligations for the next engine pass.
    pub fn request(&mut self, flags: Redraw) {
        self.flags.insert(flags);
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Re-read terminal dimensions, e.g. after a resize notification.
    pub fn refresh_size(&mut self) {
        self.screen.refresh_size(&self.term);
        self.flags.insert(Redraw::CLEAR_LINE);
    }

    pub fn buffer(&self) -> &dyn TextBuffer {
        &*self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut dyn TextBuffer {
        &mut *self.buffer
    }

    pub fn terminal(&self) -> &T {
        &self.term
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.term
    }

    /// Whether a caller-driven loop should cooperatively yield after each
    /// input cycle. Pure query; never blocks.
    pub fn yield_io(&self) -> bool {
        self.yield_io
    }

    pub fn set_yield_io(&mut self, yield_io: bool) {
        self.yield_io = yield_io;
    }

    /// Non-blocking check for available input.
    pub fn poll(&mut self) -> Result<bool> {
        self.term.poll(0)
    }

    /// Blocking read of up to `buf.len()` bytes. Returns the count
    /// actually read; 0 reports a closed stream.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let count = self.term.read(buf)?;
        if count == 0 {
            debug!("input stream reported EOF");
        }
        Ok(count)
    }

    /// Block until one of `keys` arrives (default ESC/`q`/`Q`), optionally
    /// writing `msg` first. Returns the terminating key, or `None` when
    /// the stream closes before one arrives.
    pub fn pause(&mut self, msg: Option<&str>, keys: Option<&[u8]>) -> Result<Option<char>> {
        if let Some(msg) = msg {
            self.term.write(msg.as_bytes())?;
        }
        let keys = keys.unwrap_or(DEFAULT_PAUSE_KEYS);
        loop {
            let mut byte = [0u8; 1];
            if self.term.read(&mut byte)? == 0 {
                return Ok(None);
            }
            if keys.contains(&byte[0]) {
                return Ok(Some(byte[0] as char));
            }
        }
    }

    /// Ask the terminal where its cursor is.
    ///
    /// Emits the position request, then synchronously consumes input bytes
    /// until the `R` terminator. Malformed or over-long reports are retried
    /// within the configured attempt budget; transport failures propagate
    /// immediately. Must not run while other input consumption is in
    /// flight on this session — `&mut self` is the guard.
    pub fn query_cursor(&mut self) -> Result<(u16, u16)> {
        let attempts = self.query_retries;
        for attempt in 1..=attempts {
            self.term.query_cursor()?;

            let mut report = [0u8; CURSOR_REPORT_CAP];
            let mut used = 0;
            let mut overflow = false;
            loop {
                let mut byte = [0u8; 1];
                if self.term.read(&mut byte)? == 0 {
                    return Err(Error::TransportUnavailable);
                }
                match byte[0] {
                    vt100::CURSOR_REPORT_END => break,
                    0 => continue,
                    other => {
                        if used == report.len() {
                            overflow = true;
                            break;
                        }
                        report[used] = other;
                        used += 1;
                    }
                }
            }

            if !overflow {
                if let Some((row, col)) = parse_cursor_report(&report[..used]) {
                    self.screen.cursor_row = row;
                    self.screen.cursor_col = col;
                    return Ok((row, col));
                }
            }
            debug!(attempt, attempts, "malformed cursor report, retrying");
        }
        Err(Error::CursorQueryFailed { attempts })
    }

    /// Feed raw input text into the editing pipeline.
    ///
    /// Printable bytes are inserted at the point; backspace/DEL delete
    /// backward and raise [`Redraw::DELETE_CHAR`]. CR/LF and other control
    /// bytes are left to the command layer above — line submission is not
    /// this crate's concern.
    pub fn insert_input(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            match byte {
                0x08 | 0x7f => {
                    if self.buffer.delete_backward() {
                        self.flags.insert(Redraw::DELETE_CHAR);
                    }
                }
                0x20..=0x7e | 0x80..=0xff => {
                    self.buffer.insert(byte);
                    self.flags.insert(Redraw::DISPLAY_LINE);
                }
                _ => {}
            }
        }
    }

    /// Move the point one byte left, mirroring the motion on screen.
    pub fn cursor_left(&mut self) -> Result<()> {
        if self.buffer.move_point(-1) > 0 {
            self.term.cursor_left()?;
        }
        Ok(())
    }

    /// Move the point one byte right, mirroring the motion on screen.
    pub fn cursor_right(&mut self) -> Result<()> {
        if self.buffer.move_point(1) > 0 {
            self.term.cursor_right()?;
        }
        Ok(())
    }

    /// Move the terminal cursor up `n` rows.
    pub fn cursor_up(&mut self, n: usize) -> Result<()> {
        self.term.cursor_up(n)
    }

    /// Wipe and repaint the display line.
    pub fn clear_line(&mut self) -> Result<()> {
        self.flags.insert(Redraw::CLEAR_LINE);
        self.display_line()
    }

    /// Clear from the cursor to the end of the line, then repaint.
    pub fn clear_to_eol(&mut self) -> Result<()> {
        self.flags.insert(Redraw::CLEAR_TO_EOL);
        self.display_line()
    }

    /// Clear the screen and repaint prompt and line at the top.
    pub fn clear_screen(&mut self) -> Result<()> {
        self.term.clear_screen()?;
        self.flags.insert(Redraw::DISPLAY_PROMPT);
        self.display_line()
    }

    /// Repaint prompt and buffer content from scratch.
    pub fn redraw_line(&mut self) -> Result<()> {
        self.buffer.move_gap_to_point();
        self.flags.insert(Redraw::CLEAR_LINE);
        self.display_line()
    }

    /// Re-emit the prompt (re-caching its width), then the line.
    pub fn redraw_prompt(&mut self) -> Result<()> {
        self.flags.insert(Redraw::DISPLAY_PROMPT);
        self.display_line()
    }

    /// Repaint prompt and line over whatever is on screen, without wiping
    /// first, and leave storage homed at the point.
    ///
    /// Unlike [`redraw_line`](Self::redraw_line) this overwrites in place,
    /// so the bytes already on screen never flicker away. The engine's
    /// absolute positioning lands on the same column that walking the
    /// cursor back from the end of the painted window would, so the usual
    /// postcondition holds.
    pub fn redisplay_line(&mut self) -> Result<()> {
        self.flags.insert(Redraw::DISPLAY_PROMPT);
        self.display_line()?;
        self.buffer.move_gap_to_point();
        Ok(())
    }
}

/// Parse the body of a cursor-position report, `ESC [ row ; col` with the
/// trailing `R` already consumed. Rows and columns are 1-based; a zero in
/// either field marks the report malformed.
fn parse_cursor_report(bytes: &[u8]) -> Option<(u16, u16)> {
    let start = bytes.windows(2).position(|pair| pair == b"\x1b[")? + 2;
    let body = &bytes[start..];
    let sep = body.iter().position(|&b| b == b';')?;
    let row: u16 = std::str::from_utf8(&body[..sep]).ok()?.parse().ok()?;
    let col: u16 = std::str::from_utf8(&body[sep + 1..]).ok()?.parse().ok()?;
    (row > 0 && col > 0).then_some((row, col))
}

#[cfg(test)]
mod tests {
    use super::{parse_cursor_report, Session};
    use crate::config::EnvConfig;
    use crate::core::buffer::TextBuffer;
    use crate::core::flags::Redraw;
    use crate::core::gapbuf::GapBuffer;
    use crate::core::terminal::{RecordingTerminal, TermOp, Terminal};
    use crate::error::Error;
    use crate::prompt::static_prompt;

    fn session<'buf>(
        buffer: &'buf mut GapBuffer,
        term: RecordingTerminal,
    ) -> Session<'buf, RecordingTerminal> {
        Session::attach_with_config(buffer, term, EnvConfig::default()).expect("attach")
    }

    #[test]
    fn attach_rejects_zero_width_backend() {
        let mut buffer = GapBuffer::new();
        let term = RecordingTerminal::new(0, 24);
        let err = Session::attach_with_config(&mut buffer, term, EnvConfig::default())
            .err()
            .expect("attach must fail");
        assert!(matches!(err, Error::TransportUnavailable));
    }

    #[test]
    fn prompt_replace_returns_previous_for_nesting() {
        let mut buffer = GapBuffer::new();
        let mut session = session(&mut buffer, RecordingTerminal::new(80, 24));

        assert!(session.set_prompt(static_prompt("main> ")).is_none());
        session.redraw_prompt().unwrap();
        assert_eq!(session.prompt_len(), 6);

        // Nested confirmation prompt, then restore.
        let outer = session.set_prompt(static_prompt("ok? ")).expect("outer");
        session.redraw_prompt().unwrap();
        assert_eq!(session.prompt_len(), 4);

        session.set_prompt(outer);
        session.redraw_prompt().unwrap();
        assert_eq!(session.prompt_len(), 6);
    }

    #[test]
    fn insert_pipeline_sets_flags() {
        let mut buffer = GapBuffer::new();
        let mut session = session(&mut buffer, RecordingTerminal::new(80, 24));
        session.flags = Redraw::empty();

        session.insert_input(b"ab");
        assert_eq!(session.buffer().len(), 2);
        assert!(session.pending().contains(Redraw::DISPLAY_LINE));
        assert!(!session.pending().contains(Redraw::DELETE_CHAR));

        session.insert_input(&[0x7f]);
        assert_eq!(session.buffer().len(), 1);
        assert!(session.pending().contains(Redraw::DELETE_CHAR));
    }

    #[test]
    fn backspace_on_empty_buffer_raises_nothing() {
        let mut buffer = GapBuffer::new();
        let mut session = session(&mut buffer, RecordingTerminal::new(80, 24));
        session.flags = Redraw::empty();

        session.insert_input(&[0x08]);
        assert!(session.pending().is_empty());
    }

    #[test]
    fn newline_and_control_bytes_pass_through_untouched() {
        let mut buffer = GapBuffer::new();
        let mut session = session(&mut buffer, RecordingTerminal::new(80, 24));
        session.insert_input(b"a\r\nb\x01");
        assert_eq!(session.buffer().len(), 2);
    }

    #[test]
    fn cursor_motion_mirrors_buffer_point() {
        let mut buffer = GapBuffer::from_bytes(b"abc");
        let mut session = session(&mut buffer, RecordingTerminal::new(80, 24));

        session.cursor_left().unwrap();
        session.cursor_left().unwrap();
        session.cursor_right().unwrap();
        assert_eq!(session.buffer().point(), 2);
        assert_eq!(
            session.terminal().ops(),
            &[TermOp::CursorLeft, TermOp::CursorLeft, TermOp::CursorRight]
        );
    }

    #[test]
    fn cursor_motion_stops_at_the_edges() {
        let mut buffer = GapBuffer::from_bytes(b"a");
        let mut session = session(&mut buffer, RecordingTerminal::new(80, 24));
        session.cursor_right().unwrap();
        assert!(session.terminal().ops().is_empty());

        session.cursor_left().unwrap();
        session.cursor_left().unwrap();
        assert_eq!(session.terminal().ops(), &[TermOp::CursorLeft]);
    }

    #[test]
    fn pause_returns_the_terminating_key() {
        let mut buffer = GapBuffer::new();
        let mut term = RecordingTerminal::new(80, 24);
        term.push_input(b"xyq");
        let mut session = session(&mut buffer, term);

        let key = session.pause(Some("-- more --"), None).unwrap();
        assert_eq!(key, Some('q'));
        assert_eq!(
            session.terminal().ops()[0],
            TermOp::Bytes(b"-- more --".to_vec())
        );
    }

    #[test]
    fn pause_honors_caller_keys_and_eof() {
        let mut buffer = GapBuffer::new();
        let mut term = RecordingTerminal::new(80, 24);
        term.push_input(b"qqz");
        let mut session = session(&mut buffer, term);

        let key = session.pause(None, Some(b"z")).unwrap();
        assert_eq!(key, Some('z'));

        // Stream exhausted: the next pause sees EOF.
        let key = session.pause(None, None).unwrap();
        assert_eq!(key, None);
    }

    #[test]
    fn query_cursor_parses_a_clean_report() {
        let mut buffer = GapBuffer::new();
        let mut term = RecordingTerminal::new(80, 24);
        term.push_input(b"\x1b[12;34R");
        let mut session = session(&mut buffer, term);

        assert_eq!(session.query_cursor().unwrap(), (12, 34));
        assert_eq!(session.screen().cursor_row, 12);
        assert_eq!(session.screen().cursor_col, 34);
        assert_eq!(session.terminal().ops(), &[TermOp::QueryCursor]);
    }

    #[test]
    fn query_cursor_skips_nul_bytes_in_the_report() {
        let mut buffer = GapBuffer::new();
        let mut term = RecordingTerminal::new(80, 24);
        term.push_input(b"\x1b[\x005;\x007R");
        let mut session = session(&mut buffer, term);
        assert_eq!(session.query_cursor().unwrap(), (5, 7));
    }

    #[test]
    fn query_cursor_retries_past_a_malformed_report() {
        let mut buffer = GapBuffer::new();
        let mut term = RecordingTerminal::new(80, 24);
        // First report lacks the separator, second is valid.
        term.push_input(b"\x1b[77R\x1b[3;9R");
        let mut session = session(&mut buffer, term);

        assert_eq!(session.query_cursor().unwrap(), (3, 9));
        assert_eq!(
            session.terminal().ops(),
            &[TermOp::QueryCursor, TermOp::QueryCursor]
        );
    }

    #[test]
    fn query_cursor_exhausts_its_retry_budget() {
        let mut buffer = GapBuffer::new();
        let mut term = RecordingTerminal::new(80, 24);
        let config = EnvConfig {
            query_retries: 3,
            ..EnvConfig::default()
        };
        for _ in 0..3 {
            term.push_input(b"\x1b[junkR");
        }
        term.push_input(b"\x1b[1;1R");
        let mut session = Session::attach_with_config(&mut buffer, term, config).unwrap();

        let err = session.query_cursor().err().expect("must exhaust");
        assert!(matches!(err, Error::CursorQueryFailed { attempts: 3 }));
    }

    #[test]
    fn query_cursor_reports_a_closed_stream() {
        let mut buffer = GapBuffer::new();
        let term = RecordingTerminal::new(80, 24);
        let mut session = session(&mut buffer, term);
        let err = session.query_cursor().err().expect("must fail");
        assert!(matches!(err, Error::TransportUnavailable));
    }

    #[test]
    fn oversized_report_counts_as_malformed() {
        let mut buffer = GapBuffer::new();
        let mut term = RecordingTerminal::new(80, 24);
        let config = EnvConfig {
            query_retries: 1,
            ..EnvConfig::default()
        };
        term.push_input(&[b'x'; 64]);
        term.push_input(b"R");
        let mut session = Session::attach_with_config(&mut buffer, term, config).unwrap();
        assert!(session.query_cursor().is_err());
    }

    #[test]
    fn rebind_terminal_returns_the_old_transport() {
        let mut buffer = GapBuffer::new();
        let mut session = session(&mut buffer, RecordingTerminal::new(80, 24));
        let previous = session.rebind_terminal(RecordingTerminal::new(120, 40)).unwrap();
        assert_eq!(previous.columns(), 80);
        assert_eq!(session.screen().columns, 120);
        assert!(session.pending().contains(Redraw::CLEAR_LINE));

        let err = session.rebind_terminal(RecordingTerminal::new(0, 0));
        assert!(err.is_err());
    }

    /// Gap buffer that counts re-home requests, so tests can see the
    /// storage side of a repaint.
    struct TrackingBuffer {
        inner: GapBuffer,
        rehomes: usize,
    }

    impl TextBuffer for TrackingBuffer {
        fn left_len(&self) -> usize {
            self.inner.left_len()
        }

        fn right_len(&self) -> usize {
            self.inner.right_len()
        }

        fn left_slice(&self) -> &[u8] {
            self.inner.left_slice()
        }

        fn right_slice(&self) -> &[u8] {
            self.inner.right_slice()
        }

        fn point(&self) -> usize {
            self.inner.point()
        }

        fn move_gap_to_point(&mut self) {
            self.rehomes += 1;
            self.inner.move_gap_to_point();
        }

        fn insert(&mut self, byte: u8) {
            self.inner.insert(byte);
        }

        fn delete_backward(&mut self) -> bool {
            self.inner.delete_backward()
        }

        fn delete_forward(&mut self) -> bool {
            self.inner.delete_forward()
        }

        fn move_point(&mut self, delta: isize) -> usize {
            self.inner.move_point(delta)
        }

        fn set_point(&mut self, offset: usize) -> usize {
            self.inner.set_point(offset)
        }

        fn clear(&mut self) {
            self.inner.clear();
        }
    }

    #[test]
    fn redisplay_repaints_in_place_and_rehomes_the_gap() {
        let mut buffer = TrackingBuffer {
            inner: GapBuffer::from_bytes(b"abc"),
            rehomes: 0,
        };
        {
            let term = RecordingTerminal::new(80, 24);
            let mut session =
                Session::attach_with_config(&mut buffer, term, EnvConfig::default()).unwrap();
            session.set_prompt(static_prompt("> "));
            session.display_line().unwrap();
            session.terminal_mut().take_ops();

            session.redisplay_line().unwrap();
            let ops = session.terminal().ops();
            // Overwrite in place: the prompt goes straight down, no wipe
            // ahead of it.
            assert_eq!(ops[0], TermOp::Bol);
            assert_eq!(ops[1], TermOp::Bytes(b"> ".to_vec()));
            assert_eq!(session.terminal().rendered_line(), "> abc");
            assert_eq!(session.terminal().final_column(), 2 + 3);
            assert!(session.pending().is_empty());
        }
        assert_eq!(buffer.rehomes, 1);
    }

    #[test]
    fn redisplay_holds_the_cursor_postcondition_mid_line() {
        let mut buffer = GapBuffer::from_bytes(b"show ports");
        buffer.set_point(4);
        let mut session = session(&mut buffer, RecordingTerminal::new(80, 24));
        session.set_prompt(static_prompt("> "));

        session.redisplay_line().unwrap();
        assert_eq!(session.terminal().rendered_line(), "> show ports");
        assert_eq!(session.terminal().final_column(), 2 + 4);
    }

    #[test]
    fn cursor_report_parser_edge_cases() {
        assert_eq!(parse_cursor_report(b"\x1b[12;34"), Some((12, 34)));
        assert_eq!(parse_cursor_report(b"\x1b[1;1"), Some((1, 1)));
        assert_eq!(parse_cursor_report(b"\x1b[0;4"), None);
        assert_eq!(parse_cursor_report(b"\x1b[4;0"), None);
        assert_eq!(parse_cursor_report(b"\x1b[77"), None);
        assert_eq!(parse_cursor_report(b"12;34"), None);
        assert_eq!(parse_cursor_report(b""), None);
        // Garbage ahead of the escape introducer is tolerated.
        assert_eq!(parse_cursor_report(b"junk\x1b[2;3"), Some((2, 3)));
    }
}

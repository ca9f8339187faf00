//! Flag-driven redraw engine.
//!
//! One engine pass turns the session's pending flags into the minimal
//! terminal output that brings the display in sync with the buffer, then
//! clears the flags it consumed. Escalations raised during a pass
//! (`DELETE_CHAR` → `DISPLAY_LINE | CLEAR_TO_EOL`, `CLEAR_LINE` →
//! `DISPLAY_LINE | DISPLAY_PROMPT`) point strictly forward in the dispatch
//! order, so a single pass always reaches the quiescent state.
//!
//! Postcondition of every pass: the terminal cursor column equals
//! `prompt_len + point - window_start`.

use std::io;

use tracing::{debug, trace};

use crate::core::flags::Redraw;
use crate::core::session::Session;
use crate::core::terminal::Terminal;
use crate::core::window::window;
use crate::error::Result;
use crate::prompt::PromptKind;

/// `io::Write` view of a terminal backend, handed to prompt renderers.
struct TerminalSink<'a, T: Terminal> {
    term: &'a mut T,
}

impl<T: Terminal> io::Write for TerminalSink<'_, T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.term.write(buf).map_err(io::Error::from)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: Terminal> Session<'_, T> {
    /// Process pending redraw flags and repaint the visible window.
    pub fn display_line(&mut self) -> Result<()> {
        if self.flags.contains(Redraw::DELETE_CHAR) {
            self.flags.remove(Redraw::DELETE_CHAR);
            // Erase the vacated cell in place, then repaint fully.
            self.term.write(b" \x08")?;
            self.flags.insert(Redraw::DISPLAY_LINE | Redraw::CLEAR_TO_EOL);
        }

        if self.flags.contains(Redraw::CLEAR_LINE) {
            self.flags.remove(Redraw::CLEAR_LINE);
            self.term.bol()?;
            self.term.clear_to_eol()?;
            self.flags.insert(Redraw::DISPLAY_LINE | Redraw::DISPLAY_PROMPT);
        }

        if self.flags.contains(Redraw::CLEAR_TO_EOL) {
            self.flags.remove(Redraw::CLEAR_TO_EOL);
            self.term.clear_to_eol()?;
        }

        if self.flags.contains(Redraw::DISPLAY_PROMPT) {
            let kind = if self.flags.contains(Redraw::PROMPT_CONTINUE) {
                PromptKind::Continuation
            } else {
                PromptKind::Primary
            };
            self.flags
                .remove(Redraw::DISPLAY_PROMPT | Redraw::PROMPT_CONTINUE);
            self.display_prompt(kind)?;
        }

        self.flags.remove(Redraw::DISPLAY_LINE);

        let mut content = vec![0u8; self.buffer.len()];
        let copied = self.buffer.copy_to(&mut content);
        let point = self.buffer.point().min(copied);
        let width = usize::from(self.screen.columns)
            .saturating_sub(self.prompt_len)
            .saturating_sub(1);
        let (start, end) = window(point, copied, width);

        if self.debug_redraw {
            debug!(point, copied, width, start, end, "redraw pass");
        } else {
            trace!(point, copied, width, start, end, "redraw pass");
        }

        self.term.bol()?;
        self.term.cursor_right_by(self.prompt_len)?;
        if end > start {
            self.term.write(&content[start..end])?;
        }
        self.term.clear_to_eol()?;

        // (point - start) never exceeds the window; the min() only matters
        // for the degenerate zero-width case, which homes to the prompt.
        self.term.bol()?;
        self.term
            .cursor_right_by(self.prompt_len + (point - start).min(end - start))?;
        Ok(())
    }

    /// Emit the prompt at the start of the line and cache the width the
    /// renderer reports.
    pub(crate) fn display_prompt(&mut self, kind: PromptKind) -> Result<()> {
        self.term.bol()?;
        self.prompt_len = match self.prompt.as_mut() {
            Some(render) => render(&mut TerminalSink { term: &mut self.term }, kind)?,
            None => 0,
        };
        self.term.clear_to_eol()?;
        Ok(())
    }
}

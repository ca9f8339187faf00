//! Pending redraw obligations.

use bitflags::bitflags;

bitflags! {
    /// Independent redraw obligations, processed in a fixed priority order
    /// by [`Session::display_line`](crate::Session::display_line).
    ///
    /// The all-clear set is the quiescent state. Processing may escalate:
    /// `DELETE_CHAR` raises `DISPLAY_LINE | CLEAR_TO_EOL` and `CLEAR_LINE`
    /// raises `DISPLAY_LINE | DISPLAY_PROMPT`. Both escalations point
    /// forward in the processing order, so one pass reaches a fixed point.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Redraw: u32 {
        /// A character was just removed at the cursor; erase one cell and
        /// force a full repaint.
        const DELETE_CHAR = 1 << 0;
        /// Wipe the entire display line, then repaint prompt and content.
        const CLEAR_LINE = 1 << 1;
        /// Clear from the cursor to the end of the line.
        const CLEAR_TO_EOL = 1 << 2;
        /// Re-emit the prompt and re-cache its displayed width.
        const DISPLAY_PROMPT = 1 << 3;
        /// Render the continuation prompt instead of the primary one.
        const PROMPT_CONTINUE = 1 << 4;
        /// Repaint the visible window of the buffer. Performed on every
        /// engine pass whether or not the bit is set.
        const DISPLAY_LINE = 1 << 5;
    }
}

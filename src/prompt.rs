//! Prompt rendering callbacks and display-width measurement.

use std::io::{self, Write};

use unicode_width::UnicodeWidthChar;

/// Which prompt the renderer is being asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Start of a fresh input line.
    Primary,
    /// Continuation of a line the shell is still collecting.
    Continuation,
}

/// Callback painting the prompt for a redraw.
///
/// The renderer writes its text to `out` and returns the number of
/// terminal cells it occupies. The renderer is authoritative about its own
/// width, so prompts with terminal-specific glyphs stay correct;
/// [`display_width`] is the measuring helper for the common case.
pub type PromptFn = Box<dyn FnMut(&mut dyn Write, PromptKind) -> io::Result<usize> + Send>;

/// A renderer that always paints the same prompt text.
pub fn static_prompt(text: impl Into<String>) -> PromptFn {
    let text = text.into();
    Box::new(move |out, _kind| {
        out.write_all(text.as_bytes())?;
        Ok(display_width(&text))
    })
}

/// Displayed width of `text` in terminal cells, skipping CSI and OSC
/// control sequences.
pub fn display_width(text: &str) -> usize {
    let mut width = 0;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\x1b' {
            width += UnicodeWidthChar::width(ch).unwrap_or(0);
            continue;
        }
        match chars.peek() {
            // CSI: ESC [ params, terminated by a byte in 0x40..=0x7e.
            Some('[') => {
                chars.next();
                for ch in chars.by_ref() {
                    if ('\x40'..='\x7e').contains(&ch) {
                        break;
                    }
                }
            }
            // OSC: ESC ] payload, terminated by BEL or ESC \.
            Some(']') => {
                chars.next();
                let mut prev = '\0';
                for ch in chars.by_ref() {
                    if ch == '\x07' || (prev == '\x1b' && ch == '\\') {
                        break;
                    }
                    prev = ch;
                }
            }
            // Two-byte escape; drop the follower.
            Some(_) => {
                chars.next();
            }
            None => {}
        }
    }

    width
}

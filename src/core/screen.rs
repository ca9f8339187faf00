//! Terminal screen state.

use crate::core::terminal::Terminal;

/// Dimensions and last-queried cursor position of one terminal.
///
/// `cursor_row`/`cursor_col` are populated only by
/// [`Session::query_cursor`](crate::Session::query_cursor) and are stale the
/// instant anything else writes to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    /// Visible width in character cells.
    pub columns: u16,
    /// Visible height in rows.
    pub rows: u16,
    /// Last reported cursor row (1-based, 0 = never queried).
    pub cursor_row: u16,
    /// Last reported cursor column (1-based, 0 = never queried).
    pub cursor_col: u16,
}

impl Screen {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns,
            rows,
            cursor_row: 0,
            cursor_col: 0,
        }
    }

    /// Build from the backend's current dimensions.
    pub fn detect<T: Terminal + ?Sized>(term: &T) -> Self {
        Self::new(term.columns(), term.rows())
    }

    /// Re-read dimensions from the backend, e.g. after a resize.
    pub fn refresh_size<T: Terminal + ?Sized>(&mut self, term: &T) {
        self.columns = term.columns();
        self.rows = term.rows();
    }
}

#[cfg(test)]
mod tests {
    use super::Screen;
    use crate::core::terminal::RecordingTerminal;

    #[test]
    fn detect_copies_backend_dimensions() {
        let term = RecordingTerminal::new(80, 24);
        let screen = Screen::detect(&term);
        assert_eq!(screen.columns, 80);
        assert_eq!(screen.rows, 24);
        assert_eq!(screen.cursor_row, 0);
        assert_eq!(screen.cursor_col, 0);
    }

    #[test]
    fn refresh_tracks_resizes() {
        let mut term = RecordingTerminal::new(80, 24);
        let mut screen = Screen::detect(&term);
        term.set_size(120, 40);
        screen.refresh_size(&term);
        assert_eq!((screen.columns, screen.rows), (120, 40));
    }
}

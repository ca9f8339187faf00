//! Horizontal windowing for lines wider than the terminal.

/// Map the insertion point onto a visible slice of the logical line.
///
/// Returns `(start, end)` byte offsets into the line. When the point is
/// inside the first `window_width` cells the window is anchored at the
/// left edge; past that it scrolls right, keeping the point at the
/// rightmost visible cell. A zero-width window yields `(0, 0)` regardless
/// of content.
///
/// A `point` past `total_len` (possible transiently after a delete shrinks
/// the line) is clamped to the end before the rules apply.
pub fn window(point: usize, total_len: usize, window_width: usize) -> (usize, usize) {
    if window_width == 0 {
        return (0, 0);
    }

    let point = point.min(total_len);
    if point < window_width {
        (0, total_len.min(window_width))
    } else {
        (point - window_width, point)
    }
}

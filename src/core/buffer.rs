//! Text-storage contract consumed by the editing core.
//!
//! The engine never touches character storage directly; it drives an
//! implementation of [`TextBuffer`] (the crate ships [`crate::GapBuffer`])
//! through this narrow interface.

/// Editable byte storage with a movable insertion point.
///
/// Implementations keep content in two contiguous regions around an internal
/// gap; the point sits at the logical offset `left_len()`. All offsets are
/// byte offsets into the logical (gapless) content.
pub trait TextBuffer {
    /// Bytes before the gap.
    fn left_len(&self) -> usize;

    /// Bytes after the gap.
    fn right_len(&self) -> usize;

    /// Content region before the gap.
    fn left_slice(&self) -> &[u8];

    /// Content region after the gap.
    fn right_slice(&self) -> &[u8];

    /// Insertion-point offset from the logical start.
    fn point(&self) -> usize;

    /// Reposition internal storage so point-relative addressing is valid
    /// for subsequent reads.
    fn move_gap_to_point(&mut self);

    /// Insert one byte at the point.
    fn insert(&mut self, byte: u8);

    /// Delete the byte before the point. Returns false at offset 0.
    fn delete_backward(&mut self) -> bool;

    /// Delete the byte at the point. Returns false at the end.
    fn delete_forward(&mut self) -> bool;

    /// Move the point by `delta` bytes, clamped to the content. Returns the
    /// distance actually moved.
    fn move_point(&mut self, delta: isize) -> usize;

    /// Place the point at `offset`, clamped to the content. Returns the
    /// resulting offset.
    fn set_point(&mut self, offset: usize) -> usize;

    /// Remove all content.
    fn clear(&mut self);

    /// Combined logical length.
    fn len(&self) -> usize {
        self.left_len() + self.right_len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a run of bytes at the point.
    fn insert_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.insert(byte);
        }
    }

    /// Materialize the logical content contiguously into `out`. Returns the
    /// number of bytes copied (short when `out` is smaller than the
    /// content).
    fn copy_to(&self, out: &mut [u8]) -> usize {
        let mut copied = 0;
        for part in [self.left_slice(), self.right_slice()] {
            let take = part.len().min(out.len() - copied);
            out[copied..copied + take].copy_from_slice(&part[..take]);
            copied += take;
        }
        copied
    }
}

//! Gap-buffer implementation of the [`TextBuffer`] contract.

use crate::core::buffer::TextBuffer;

const MIN_GAP: usize = 64;

/// Byte storage with a movable empty region at the insertion point, so
/// edits at the point are cheap. The gap tracks the point: `gap_start` is
/// both the point offset and the length of the left region.
#[derive(Debug, Clone)]
pub struct GapBuffer {
    buf: Vec<u8>,
    gap_start: usize,
    gap_end: usize,
}

impl GapBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MIN_GAP)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_GAP);
        Self {
            buf: vec![0; capacity],
            gap_start: 0,
            gap_end: capacity,
        }
    }

    /// Build a buffer holding `content` with the point at the end.
    pub fn from_bytes(content: &[u8]) -> Self {
        let mut gb = Self::with_capacity(content.len() + MIN_GAP);
        gb.insert_slice(content);
        gb
    }

    /// Logical content as an owned vector, mainly for tests and submission.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = vec![0; self.len()];
        self.copy_to(&mut out);
        out
    }

    fn gap_len(&self) -> usize {
        self.gap_end - self.gap_start
    }

    fn grow(&mut self, needed: usize) {
        if self.gap_len() >= needed {
            return;
        }
        let old_len = self.buf.len();
        let grow_by = (old_len.max(MIN_GAP)).max(needed);
        let right_len = old_len - self.gap_end;
        self.buf.resize(old_len + grow_by, 0);
        // Shift the right region to the new tail, widening the gap.
        self.buf
            .copy_within(self.gap_end..self.gap_end + right_len, self.gap_end + grow_by);
        self.gap_end += grow_by;
    }
}

impl Default for GapBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer for GapBuffer {
    fn left_len(&self) -> usize {
        self.gap_start
    }

    fn right_len(&self) -> usize {
        self.buf.len() - self.gap_end
    }

    fn left_slice(&self) -> &[u8] {
        &self.buf[..self.gap_start]
    }

    fn right_slice(&self) -> &[u8] {
        &self.buf[self.gap_end..]
    }

    fn point(&self) -> usize {
        self.gap_start
    }

    fn move_gap_to_point(&mut self) {
        // The gap already rides the point in this implementation.
    }

    fn insert(&mut self, byte: u8) {
        self.grow(1);
        self.buf[self.gap_start] = byte;
        self.gap_start += 1;
    }

    fn delete_backward(&mut self) -> bool {
        if self.gap_start == 0 {
            return false;
        }
        self.gap_start -= 1;
        true
    }

    fn delete_forward(&mut self) -> bool {
        if self.gap_end == self.buf.len() {
            return false;
        }
        self.gap_end += 1;
        true
    }

    fn move_point(&mut self, delta: isize) -> usize {
        if delta < 0 {
            let step = delta.unsigned_abs().min(self.gap_start);
            let src = self.gap_start - step;
            self.buf
                .copy_within(src..self.gap_start, self.gap_end - step);
            self.gap_start -= step;
            self.gap_end -= step;
            step
        } else {
            let step = (delta as usize).min(self.right_len());
            self.buf
                .copy_within(self.gap_end..self.gap_end + step, self.gap_start);
            self.gap_start += step;
            self.gap_end += step;
            step
        }
    }

    fn set_point(&mut self, offset: usize) -> usize {
        let target = offset.min(self.len());
        let delta = target as isize - self.gap_start as isize;
        self.move_point(delta);
        self.gap_start
    }

    fn clear(&mut self) {
        self.gap_start = 0;
        self.gap_end = self.buf.len();
    }
}

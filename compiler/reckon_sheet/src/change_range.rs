//! Changed-line tracking.

use std::ops::Range;

/// A `[start, end)` span of changed lines plus the net number of lines
/// inserted or deleted.
///
/// Positions are in post-edit coordinates. The same accumulator tracks
/// changes for the whole worksheet (driving rescans) and within each chunk
/// (driving change events).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeRange {
    start: usize,
    end: usize,
    delta: isize,
}

impl ChangeRange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Lines inserted minus lines deleted.
    pub fn delta(&self) -> isize {
        self.delta
    }

    pub fn lines(&self) -> Range<usize> {
        self.start..self.end
    }

    /// No lines were inserted, deleted or changed.
    pub fn is_empty(&self) -> bool {
        self.delta == 0 && self.start == self.end
    }

    /// Mark `[start, end)` as changed.
    pub fn change(&mut self, start: usize, end: usize) {
        if self.is_empty() {
            self.start = start;
            self.end = end;
        } else {
            self.start = self.start.min(start);
            self.end = self.end.max(end);
        }
    }

    /// Adjust for `count` lines inserted at `position`.
    pub fn insert(&mut self, position: usize, count: usize) {
        if self.is_empty() {
            self.start = position;
            self.end = position + count;
        } else if position < self.start {
            self.start = position;
            self.end += count;
        } else if position < self.end {
            self.end += count;
        } else {
            self.end = position + count;
        }
        self.delta += signed(count);
    }

    /// Adjust for lines `[start, end)` being deleted.
    pub fn delete_range(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end);
        let count = end - start;
        if self.is_empty() {
            self.start = start;
            self.end = start;
        } else {
            if self.start >= end {
                self.start -= count;
            } else if self.start >= start {
                self.start = start;
            }
            if self.end >= end {
                self.end -= count;
            } else if self.end >= start {
                self.end = start;
            }
        }
        self.delta -= signed(count);
    }

    pub fn clear(&mut self) {
        *self = ChangeRange::default();
    }
}

fn signed(count: usize) -> isize {
    isize::try_from(count).unwrap_or(isize::MAX)
}

//! Chunks: typed runs of consecutive source lines.

use std::fmt;
use std::ops::Range;

use reckon_lexer::LineClass;

use crate::change_range::ChangeRange;
use crate::statement::StatementChunk;

/// Stable identity of a chunk. Ids are never reused within a worksheet.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(u32);

impl ChunkId {
    pub(crate) fn new(raw: u32) -> Self {
        ChunkId(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    Statement,
    Blank,
    Comment,
}

impl ChunkKind {
    /// Kind of chunk a run of lines of `class` forms.
    pub fn for_class(class: LineClass) -> ChunkKind {
        match class {
            LineClass::Blank => ChunkKind::Blank,
            LineClass::Comment => ChunkKind::Comment,
            LineClass::Continuation | LineClass::StatementStart => ChunkKind::Statement,
        }
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChunkKind::Statement => "statement",
            ChunkKind::Blank => "blank",
            ChunkKind::Comment => "comment",
        })
    }
}

#[derive(Debug)]
pub(crate) enum ChunkBody {
    Statement(Box<StatementChunk>),
    Blank,
    Comment,
}

/// A `[start, end)` range of source lines treated as a unit.
#[derive(Debug)]
pub struct Chunk {
    id: ChunkId,
    start: usize,
    end: usize,
    /// Lines changed since the last change notification, relative to
    /// `start`.
    pub(crate) changes: ChangeRange,
    /// Not yet announced to collaborators.
    pub(crate) newly_inserted: bool,
    pub(crate) body: ChunkBody,
}

impl Chunk {
    pub(crate) fn new(id: ChunkId, kind: ChunkKind, start: usize, end: usize) -> Self {
        let body = match kind {
            ChunkKind::Statement => ChunkBody::Statement(Box::new(StatementChunk::new())),
            ChunkKind::Blank => ChunkBody::Blank,
            ChunkKind::Comment => ChunkBody::Comment,
        };
        let mut changes = ChangeRange::new();
        changes.change(0, end - start);
        Chunk {
            id,
            start,
            end,
            changes,
            newly_inserted: true,
            body,
        }
    }

    pub fn id(&self) -> ChunkId {
        self.id
    }

    /// First source line.
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last source line.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn lines(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    pub fn kind(&self) -> ChunkKind {
        match self.body {
            ChunkBody::Statement(_) => ChunkKind::Statement,
            ChunkBody::Blank => ChunkKind::Blank,
            ChunkBody::Comment => ChunkKind::Comment,
        }
    }

    pub fn statement(&self) -> Option<&StatementChunk> {
        match &self.body {
            ChunkBody::Statement(statement) => Some(statement),
            _ => None,
        }
    }

    pub(crate) fn statement_mut(&mut self) -> Option<&mut StatementChunk> {
        match &mut self.body {
            ChunkBody::Statement(statement) => Some(statement),
            _ => None,
        }
    }

    /// Move the chunk to `[start, end)`, recording lines gained as
    /// inserted and lines lost as deleted.
    pub(crate) fn set_range(&mut self, start: usize, end: usize) {
        if start < self.start {
            self.changes.insert(0, self.start - start);
            self.start = start;
        }
        if end > self.end {
            self.changes.insert(self.end - self.start, end - self.end);
            self.end = end;
        }
        if start > self.start {
            self.changes.delete_range(0, start - self.start);
            self.start = start;
        }
        if end < self.end {
            self.changes
                .delete_range(end - self.start, self.end - self.start);
            self.end = end;
        }
    }

    /// Move down past `count` lines inserted above.
    pub(crate) fn shift_down(&mut self, count: usize) {
        self.start += count;
        self.end += count;
    }

    pub(crate) fn change_line(&mut self, line: usize) {
        self.change_lines(line, line + 1);
    }

    pub(crate) fn change_lines(&mut self, start: usize, end: usize) {
        self.changes.change(start - self.start, end - self.start);
    }

    pub(crate) fn insert_lines(&mut self, position: usize, count: usize) {
        self.changes.insert(position - self.start, count);
        self.end += count;
    }

    /// Remove lines `[start, end)`, clamped to the chunk, that were
    /// deleted from the worksheet. Lines deleted before the chunk shift it
    /// up.
    pub(crate) fn delete_lines(&mut self, start: usize, end: usize) {
        let lo = start.max(self.start);
        let hi = end.min(self.end);
        if lo < hi {
            self.changes.delete_range(lo - self.start, hi - self.start);
        }
        let before = end.min(self.start).saturating_sub(start);
        let inside = hi.saturating_sub(lo);
        self.start -= before;
        self.end -= before + inside;
    }

    /// Feed new text to a statement chunk, recording changed lines.
    /// Returns whether anything changed.
    pub(crate) fn set_statement_lines(&mut self, lines: Vec<String>) -> bool {
        let start = self.start;
        let Some(statement) = self.statement_mut() else {
            return false;
        };
        match statement.set_lines(lines) {
            Some(changed) => {
                if !changed.is_empty() {
                    self.change_lines(start + changed.start, start + changed.end);
                }
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.kind(), self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn blank(start: usize, end: usize) -> Chunk {
        let mut chunk = Chunk::new(ChunkId::new(0), ChunkKind::Blank, start, end);
        chunk.changes.clear();
        chunk
    }

    #[test]
    fn new_chunk_is_fully_changed() {
        let chunk = Chunk::new(ChunkId::new(1), ChunkKind::Comment, 2, 5);
        assert_eq!(chunk.changes.lines(), 0..3);
        assert!(chunk.newly_inserted);
        assert_eq!(chunk.to_string(), "comment(2,5)");
    }

    #[test]
    fn set_range_grow_and_shrink() {
        let mut chunk = blank(2, 4);
        chunk.set_range(1, 6);
        assert_eq!(chunk.lines(), 1..6);
        assert_eq!(chunk.changes.delta(), 3);

        let mut chunk = blank(2, 6);
        chunk.set_range(3, 5);
        assert_eq!(chunk.lines(), 3..5);
        assert_eq!(chunk.changes.delta(), -2);
    }

    #[test]
    fn delete_lines_clamps() {
        // Entirely before.
        let mut chunk = blank(5, 8);
        chunk.delete_lines(1, 3);
        assert_eq!(chunk.lines(), 3..6);
        assert!(chunk.changes.is_empty());

        // Overlapping the head.
        let mut chunk = blank(5, 8);
        chunk.delete_lines(3, 6);
        assert_eq!(chunk.lines(), 3..5);
        assert_eq!(chunk.changes.delta(), -1);

        // Inside.
        let mut chunk = blank(5, 8);
        chunk.delete_lines(6, 7);
        assert_eq!(chunk.lines(), 5..7);

        // Overlapping the tail.
        let mut chunk = blank(5, 8);
        chunk.delete_lines(7, 10);
        assert_eq!(chunk.lines(), 5..7);
    }

    #[test]
    fn statement_lines_record_changes() {
        let mut chunk = Chunk::new(ChunkId::new(3), ChunkKind::Statement, 4, 6);
        chunk.changes.clear();
        assert!(chunk.set_statement_lines(vec!["if x:".into(), "    y".into()]));
        assert_eq!(chunk.changes.lines(), 0..2);
        chunk.changes.clear();
        assert!(!chunk.set_statement_lines(vec!["if x:".into(), "    y".into()]));
        assert!(chunk.set_statement_lines(vec!["if x:".into(), "    z".into()]));
        assert_eq!(chunk.changes.lines(), 1..2);
    }
}

//! Placement of result lines between source lines.
//!
//! The document a collaborator renders interleaves two kinds of lines:
//! source lines, which the user edits, and result lines, which the
//! worksheet produces below each statement that has results. Source
//! coordinates count only source lines; document coordinates count both.
//! The [`Layout`] is derived from the statements after every batch of
//! edits, so results always sit directly below their statement's last
//! source line and move with it when statements grow, shrink or split.

use rustc_hash::FxHashMap;

use crate::chunk::ChunkId;

/// How a result line is shown.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LineStyle {
    Text,
    Warning,
    Error,
    /// Placeholder for a custom (non-text) result.
    Custom,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultLine {
    pub text: String,
    pub style: LineStyle,
}

impl ResultLine {
    pub fn new(text: impl Into<String>, style: LineStyle) -> Self {
        ResultLine {
            text: text.into(),
            style,
        }
    }
}

/// What a document line is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LineRef {
    Source(usize),
    Result { owner: ChunkId, index: usize },
}

/// Results of one statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Placement {
    pub owner: ChunkId,
    /// Source line the results precede: the owner's end.
    pub after: usize,
    pub lines: Vec<ResultLine>,
    /// Result lines of earlier placements.
    pub before: usize,
}

impl Placement {
    pub fn doc_start(&self) -> usize {
        self.after + self.before
    }

    pub fn doc_end(&self) -> usize {
        self.doc_start() + self.lines.len()
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Layout {
    placements: Vec<Placement>,
    by_owner: FxHashMap<ChunkId, usize>,
}

impl Layout {
    /// Build from `(owner, owner end, lines)` in source order. Owners with
    /// no lines get no placement.
    pub fn build(entries: impl IntoIterator<Item = (ChunkId, usize, Vec<ResultLine>)>) -> Self {
        let mut layout = Layout::default();
        let mut before = 0;
        for (owner, after, lines) in entries {
            if lines.is_empty() {
                continue;
            }
            debug_assert!(
                layout.placements.last().is_none_or(|p| p.after < after),
                "result placements out of order"
            );
            let count = lines.len();
            layout.by_owner.insert(owner, layout.placements.len());
            layout.placements.push(Placement {
                owner,
                after,
                lines,
                before,
            });
            before += count;
        }
        layout
    }

    pub fn placement(&self, owner: ChunkId) -> Option<&Placement> {
        self.by_owner.get(&owner).map(|&i| &self.placements[i])
    }

    pub fn result_line_count(&self) -> usize {
        self.placements
            .last()
            .map_or(0, |p| p.before + p.lines.len())
    }

    /// Document line of source line `line`.
    pub fn doc_line(&self, line: usize) -> usize {
        let k = self.placements.partition_point(|p| p.after <= line);
        match k.checked_sub(1) {
            Some(prev) => line + self.placements[prev].before + self.placements[prev].lines.len(),
            None => line,
        }
    }

    /// What document line `doc` is. Lines past the end map to source lines
    /// past the end.
    pub fn locate(&self, doc: usize) -> LineRef {
        let k = self.placements.partition_point(|p| p.doc_end() <= doc);
        match self.placements.get(k) {
            Some(p) if p.doc_start() <= doc => LineRef::Result {
                owner: p.owner,
                index: doc - p.doc_start(),
            },
            Some(p) => LineRef::Source(doc - p.before),
            None => LineRef::Source(doc - self.result_line_count()),
        }
    }

    /// Owners whose placement differs from `previous`.
    pub fn moved_since(&self, previous: &Layout) -> Vec<ChunkId> {
        let mut moved = Vec::new();
        for p in &self.placements {
            match previous.placement(p.owner) {
                Some(old) if old.after == p.after && old.lines == p.lines => {}
                _ => moved.push(p.owner),
            }
        }
        for old in &previous.placements {
            if !self.by_owner.contains_key(&old.owner) {
                moved.push(old.owner);
            }
        }
        moved
    }
}

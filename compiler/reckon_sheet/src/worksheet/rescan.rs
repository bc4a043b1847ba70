//! Repairing the chunk partition after edits.

use reckon_lexer::{classify_line, LineClass};
use tracing::{debug, trace};

use super::Worksheet;
use crate::chunk::{Chunk, ChunkId, ChunkKind};

impl Worksheet {
    /// Re-segment the lines touched since the last rescan into chunks.
    ///
    /// Typing inside a line that keeps its class rescans just the chunks
    /// holding the change. When a line changes class, or lines are
    /// inserted or deleted, the span widens back to the previous statement
    /// and forward to the next line that starts a statement, since the
    /// statements on either side may now merge or split.
    #[tracing::instrument(level = "debug", skip_all)]
    pub(super) fn rescan(&mut self) {
        if self.changes.is_empty() {
            return;
        }
        trace!(
            start = self.changes.start(),
            end = self.changes.end(),
            delta = self.changes.delta(),
            scan_adjacent = self.scan_adjacent,
            "rescan requested"
        );

        let len = self.lines.len();
        let mut rescan_start = self.changes.start().min(len);
        let mut rescan_end = self.changes.end().min(len);

        if self.scan_adjacent {
            while rescan_start > 0 {
                rescan_start -= 1;
                if let Some(chunk) = self.chunk_at_line(rescan_start) {
                    if chunk.kind() == ChunkKind::Statement {
                        rescan_start = chunk.start();
                        break;
                    }
                }
            }

            while rescan_end < len {
                let Some(chunk) = self.chunk_at_line(rescan_end) else {
                    rescan_end += 1;
                    continue;
                };
                // A statement chunk whose first line no longer starts a
                // statement (a joined line left it blank, or it begins with
                // a continuation) belongs to the span being rescanned.
                if chunk.kind() == ChunkKind::Statement
                    && chunk.start() == rescan_end
                    && classify_line(&self.lines[rescan_end]) == LineClass::StatementStart
                {
                    break;
                }
                rescan_end = chunk.end().max(rescan_end + 1);
            }
        }

        self.changes.clear();
        self.scan_adjacent = false;

        if let Some(chunk) = self.chunk_at_line(rescan_start) {
            rescan_start = chunk.start();
        }
        if let Some(chunk) = rescan_end.checked_sub(1).and_then(|l| self.chunk_at_line(l)) {
            rescan_end = chunk.end();
        }
        debug!(start = rescan_start, end = rescan_end, "rescanning lines");

        let mut chunk_start = rescan_start;
        let mut statement_end = rescan_start;
        let mut chunk_lines: Vec<String> = Vec::new();
        let mut seen_start = false;

        for line in rescan_start..rescan_end {
            let text = self.lines[line].clone();
            match classify_line(&text) {
                LineClass::Blank | LineClass::Comment => chunk_lines.push(text),
                LineClass::Continuation if seen_start => {
                    chunk_lines.push(text);
                    statement_end = line + 1;
                }
                LineClass::Continuation | LineClass::StatementStart => {
                    seen_start = true;
                    if !chunk_lines.is_empty() {
                        let lines = std::mem::take(&mut chunk_lines);
                        self.assign_lines(chunk_start, lines, statement_end);
                    }
                    chunk_start = line;
                    statement_end = line + 1;
                    chunk_lines.push(text);
                }
            }
        }

        self.assign_lines(chunk_start, chunk_lines, statement_end);
    }

    /// Turn `lines`, starting at `chunk_start`, into chunks: a statement up
    /// to `statement_end`, then runs of blank and comment lines.
    fn assign_lines(&mut self, chunk_start: usize, lines: Vec<String>, statement_end: usize) {
        let group_end = chunk_start + lines.len();

        if statement_end > chunk_start {
            let statement_lines = lines[..statement_end - chunk_start].to_vec();
            let id = self.adjust_or_create_chunk(chunk_start, statement_end, ChunkKind::Statement);
            if let Some(chunk) = self.chunks.get_mut(&id) {
                chunk.set_statement_lines(statement_lines);
                if !chunk.changes.is_empty() {
                    self.mark_changed_statement(id);
                }
            }
        }

        let mut start = statement_end;
        let mut prev_kind = ChunkKind::Statement;
        for (i, text) in lines.iter().enumerate().skip(statement_end - chunk_start) {
            let line = chunk_start + i;
            let kind = ChunkKind::for_class(classify_line(text));
            if kind != prev_kind && line > start {
                self.assign_filler(start, line, prev_kind);
                start = line;
            }
            prev_kind = kind;
        }
        if group_end > start {
            self.assign_filler(start, group_end, prev_kind);
        }
    }

    fn assign_filler(&mut self, start: usize, end: usize, kind: ChunkKind) {
        let id = self.adjust_or_create_chunk(start, end, kind);
        if self.chunks.get(&id).is_some_and(|c| !c.changes.is_empty()) {
            self.chunk_changed(id);
        }
    }

    /// Make `[start, end)` one chunk of `kind`, reusing the first existing
    /// chunk of that kind in the range. Chunks the new one covers are
    /// removed; chunks it overlaps are trimmed.
    fn adjust_or_create_chunk(&mut self, start: usize, end: usize, kind: ChunkKind) -> ChunkId {
        let existing = (start..end)
            .filter_map(|line| self.chunk_id_at(line))
            .find(|id| self.chunks[id].kind() == kind);

        let id = match existing {
            Some(id) => {
                // An old chunk becomes at most one new chunk; the lines it
                // loses are reassigned later in the scan.
                let old_end = self.chunks[&id].end();
                if old_end > end {
                    for slot in &mut self.line_chunks[end..old_end] {
                        *slot = None;
                    }
                }
                if let Some(chunk) = self.chunks.get_mut(&id) {
                    chunk.set_range(start, end);
                }
                id
            }
            None => {
                let id = self.alloc_id();
                trace!(chunk = %id, %kind, start, end, "chunk created");
                self.chunks.insert(id, Chunk::new(id, kind, start, end));
                id
            }
        };

        for other in self.chunk_ids_in(start, end) {
            if other == id {
                continue;
            }
            let other_end = self.chunks[&other].end();
            if other_end <= end {
                self.remove_chunk(other);
            } else if let Some(chunk) = self.chunks.get_mut(&other) {
                chunk.set_range(end, other_end);
            }
        }

        for slot in &mut self.line_chunks[start..end] {
            *slot = Some(id);
        }
        id
    }

    pub(super) fn remove_chunk(&mut self, id: ChunkId) {
        self.changed_chunks.remove(&id);
        let Some(chunk) = self.chunks.remove(&id) else {
            return;
        };
        trace!(%chunk, "chunk removed");
        if !chunk.newly_inserted {
            self.deleted_chunks.push(id);
        }
        if chunk.kind() == ChunkKind::Statement {
            self.mark_rest_for_execute(chunk.end());
        }
    }

    /// Flag every statement from `start_line` on for execution. Stops at
    /// the first statement already dirty: everything after it is too.
    pub(super) fn mark_rest_for_execute(&mut self, start_line: usize) {
        for id in self.chunk_ids_in(start_line, self.lines.len()) {
            let Some(statement) = self.statement_mut(id) else {
                continue;
            };
            if statement.mark_for_execute() {
                self.chunk_changed(id);
            } else {
                break;
            }
        }
    }

    fn mark_changed_statement(&mut self, id: ChunkId) {
        self.chunk_changed(id);
        if let Some(end) = self.chunks.get(&id).map(Chunk::end) {
            self.mark_rest_for_execute(end);
        }
    }
}

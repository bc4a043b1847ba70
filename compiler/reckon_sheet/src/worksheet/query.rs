//! Reading the worksheet: lines, chunks, text and cursor queries.

use std::iter;
use std::sync::Arc;

use reckon_eval::{ResultItem, Scope, Value};
use reckon_lexer::StatementTokenStore;

use super::Worksheet;
use crate::chunk::{Chunk, ChunkId, ChunkKind};
use crate::completion::{self, resolve_path, Completion};
use crate::layout::{LineRef, ResultLine};
use crate::statement::StatementChunk;
use crate::text::{ordered, Position};

/// A chunk as it appears in the document: a source chunk, or the result
/// lines of a statement. `start` and `end` are document lines.
#[derive(Copy, Clone, Debug)]
pub enum ChunkView<'a> {
    Source {
        chunk: &'a Chunk,
        start: usize,
        end: usize,
    },
    Results {
        owner: ChunkId,
        start: usize,
        end: usize,
        lines: &'a [ResultLine],
    },
}

impl ChunkView<'_> {
    pub fn start(&self) -> usize {
        match *self {
            ChunkView::Source { start, .. } | ChunkView::Results { start, .. } => start,
        }
    }

    pub fn end(&self) -> usize {
        match *self {
            ChunkView::Source { end, .. } | ChunkView::Results { end, .. } => end,
        }
    }

    pub fn is_result(&self) -> bool {
        matches!(self, ChunkView::Results { .. })
    }
}

impl Worksheet {
    /// Document lines, results included.
    pub fn line_count(&self) -> usize {
        self.lines.len() + self.layout.result_line_count()
    }

    /// Text of a document line.
    pub fn line_text(&self, line: usize) -> Option<&str> {
        match self.locate(line)? {
            LineRef::Source(source) => self.source_line(source),
            LineRef::Result { owner, index } => self
                .layout
                .placement(owner)
                .and_then(|p| p.lines.get(index))
                .map(|l| l.text.as_str()),
        }
    }

    /// What document line `line` holds.
    pub fn locate(&self, line: usize) -> Option<LineRef> {
        (line < self.line_count()).then(|| self.layout.locate(line))
    }

    /// Document line of a source line.
    pub fn doc_line(&self, source_line: usize) -> usize {
        self.layout.doc_line(source_line)
    }

    pub fn source_line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn source_line(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(String::as_str)
    }

    pub fn source_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn chunk(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunks.get(&id)
    }

    /// Chunks in source order.
    pub fn source_chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunk_ids_in(0, self.lines.len())
            .into_iter()
            .filter_map(|id| self.chunks.get(&id))
    }

    /// Statement chunks in source order.
    pub fn statements(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.source_chunks().filter(|c| c.statement().is_some())
    }

    /// The chunk covering document line `line`.
    pub fn chunk_at(&self, line: usize) -> Option<ChunkView<'_>> {
        match self.locate(line)? {
            LineRef::Source(source) => {
                let chunk = self.chunk_at_line(source)?;
                let start = self.layout.doc_line(chunk.start());
                Some(ChunkView::Source {
                    chunk,
                    start,
                    end: start + chunk.len(),
                })
            }
            LineRef::Result { owner, .. } => {
                let placement = self.layout.placement(owner)?;
                Some(ChunkView::Results {
                    owner,
                    start: placement.doc_start(),
                    end: placement.doc_end(),
                    lines: &placement.lines,
                })
            }
        }
    }

    /// Chunks overlapping document lines `[start, end)`, in order.
    pub fn chunks_in(&self, start: usize, end: usize) -> impl Iterator<Item = ChunkView<'_>> + '_ {
        let end = end.min(self.line_count());
        let mut line = start;
        iter::from_fn(move || {
            if line >= end {
                return None;
            }
            let view = self.chunk_at(line)?;
            line = view.end();
            Some(view)
        })
    }

    /// Source text between two source positions, clamped to the text.
    pub fn get_text(&self, start: Position, end: Position) -> String {
        let (start, end) = ordered(self.clamp(start), self.clamp(end));
        if start.line == end.line {
            return self.lines[start.line][start.offset..end.offset].to_owned();
        }
        let mut text = self.lines[start.line][start.offset..].to_owned();
        for line in &self.lines[start.line + 1..end.line] {
            text.push('\n');
            text.push_str(line);
        }
        text.push('\n');
        text.push_str(&self.lines[end.line][..end.offset]);
        text
    }

    fn clamp(&self, position: Position) -> Position {
        let last = self.lines.len() - 1;
        if position.line > last {
            return Position::new(last, self.lines[last].len());
        }
        let line = &self.lines[position.line];
        let mut offset = position.offset.min(line.len());
        while !line.is_char_boundary(offset) {
            offset -= 1;
        }
        Position::new(position.line, offset)
    }

    /// The whole source text.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Source text between two document positions, without result lines.
    /// Omitted ends mean the start and end of the document.
    pub fn public_text(&self, start: Option<Position>, end: Option<Position>) -> String {
        let start = start.map_or(Position::default(), |p| self.source_position_after(p));
        let end = match end {
            Some(p) if p.line < self.line_count() => self.source_position_before(p),
            _ => Position::new(self.lines.len(), 0),
        };
        if start >= end {
            return String::new();
        }
        self.get_text(start, end)
    }

    /// Source lines `[start, end)`, widened to whole chunks, as doctest
    /// input: statements get `>>> ` and `... ` prompts and are followed by
    /// their textual results.
    pub fn doctests(&self, start: usize, end: usize) -> String {
        let mut out = String::new();
        let last = self.lines.len() - 1;
        for id in self.chunk_ids_in(start, end) {
            let chunk = &self.chunks[&id];
            let statement = chunk.statement();
            for line in chunk.lines() {
                let text = &self.lines[line];
                if statement.is_some() {
                    out.push_str(if line == chunk.start() { ">>> " } else { "... " });
                }
                out.push_str(text);
                if line != last || !text.is_empty() {
                    out.push('\n');
                }
            }
            for result in statement.and_then(StatementChunk::results).unwrap_or_default() {
                if let ResultItem::Text(text) = result {
                    out.push_str(text);
                    out.push('\n');
                }
            }
        }
        out
    }

    /// Completions at a document position. `min_length > 0` asks for
    /// spontaneous completion, which needs at least that much typed.
    pub fn completions(&self, line: usize, offset: usize, min_length: usize) -> Vec<Completion> {
        let Some(LineRef::Source(source)) = self.locate(line) else {
            return Vec::new();
        };
        let Some(chunk) = self.chunk_at_line(source) else {
            return Vec::new();
        };
        let query = match chunk.statement() {
            Some(statement) => {
                statement
                    .tokens()
                    .completion_query(source - chunk.start(), offset, min_length)
            }
            None if chunk.kind() == ChunkKind::Blank => {
                let mut store = StatementTokenStore::new();
                store.set_lines(vec![self.lines[source].clone()]);
                store.completion_query(0, offset, min_length)
            }
            None => return Vec::new(),
        };
        let scope = self.scope_before(chunk.start());
        completion::complete(&query, &scope, &self.engine.builtin_names())
    }

    /// Document position of the bracket matching the one at a document
    /// position.
    pub fn pair_location(&self, line: usize, offset: usize) -> Option<Position> {
        let (chunk, statement, source) = self.statement_at(line)?;
        let (pair_line, pair_offset) = statement
            .tokens()
            .pair_location(source - chunk.start(), offset)?;
        Some(Position::new(
            self.layout.doc_line(chunk.start() + pair_line),
            pair_offset,
        ))
    }

    /// Indentation for a line opened after document line `line`.
    pub fn next_line_indent(&self, line: usize) -> String {
        if let Some((chunk, statement, source)) = self.statement_at(line) {
            return statement.tokens().next_line_indent(source - chunk.start());
        }
        let text = self.line_text(line).unwrap_or_default();
        let indent = text.len() - text.trim_start().len();
        text[..indent].to_owned()
    }

    /// The object named at a document position, with the document range
    /// of its last name. A name being assigned resolves in the statement's
    /// own result scope.
    pub fn object_at(
        &self,
        line: usize,
        offset: usize,
        include_adjacent: bool,
    ) -> Option<(Value, Position, Position)> {
        let (chunk, statement, source) = self.statement_at(line)?;
        let path = statement
            .tokens()
            .name_path_at(source - chunk.start(), offset, include_adjacent)?;
        let scope = if path.assigned {
            Arc::clone(statement.result_scope()?)
        } else {
            self.scope_before(chunk.start())
        };
        let value = resolve_path(&scope, &path.names)?;
        let doc = self.layout.doc_line(chunk.start() + path.line);
        Some((
            value,
            Position::new(doc, path.start),
            Position::new(doc, path.end),
        ))
    }

    fn statement_at(&self, line: usize) -> Option<(&Chunk, &StatementChunk, usize)> {
        let LineRef::Source(source) = self.locate(line)? else {
            return None;
        };
        let chunk = self.chunk_at_line(source)?;
        Some((chunk, chunk.statement()?, source))
    }

    /// Scope seen by code at source line `line`: the result scope of the
    /// nearest earlier statement that has one.
    fn scope_before(&self, line: usize) -> Arc<Scope> {
        self.chunk_ids_in(0, line)
            .into_iter()
            .rev()
            .find_map(|id| self.chunks[&id].statement()?.result_scope().cloned())
            .unwrap_or_else(|| Arc::clone(&self.root_scope))
    }
}

//! Text edits, user actions and undo.

use std::iter;

use reckon_lexer::classify_line;
use tracing::{debug, trace, warn};

use super::Worksheet;
use crate::chunk::ChunkId;
use crate::errors::EditError;
use crate::events::{SheetEvent, SheetState};
use crate::layout::LineRef;
use crate::text::{ordered, split_lines, Position};
use crate::undo::UndoOp;

impl Worksheet {
    /// Insert `text` at a document position. Result lines only accept text
    /// starting with a newline at the very end of their last line; it lands
    /// after the statement that owns them.
    pub fn insert(&mut self, line: usize, offset: usize, text: &str) -> Result<(), EditError> {
        self.check_idle()?;
        if text.is_empty() {
            return Ok(());
        }
        let at = Position::new(line, offset);
        let position = match self.layout.locate(line) {
            LineRef::Source(source) => Position::new(source, offset),
            LineRef::Result { owner, index } => self.append_after_results(owner, index, offset, text)?,
        };
        if !self.is_valid(position) {
            return Err(EditError::InvalidPosition(at));
        }
        self.insert_source(position, text);
        Ok(())
    }

    fn append_after_results(
        &self,
        owner: ChunkId,
        index: usize,
        offset: usize,
        text: &str,
    ) -> Result<Position, EditError> {
        let placement = self.layout.placement(owner).ok_or(EditError::ReadOnly)?;
        let last = placement.lines.len() - 1;
        let at_end = index == last && offset == placement.lines[last].text.len();
        if !at_end || !text.starts_with(['\n', '\r']) {
            warn!(chunk = %owner, "insert into result lines rejected");
            return Err(EditError::ReadOnly);
        }
        let line = placement.after - 1;
        Ok(Position::new(line, self.lines[line].len()))
    }

    /// Delete between two document positions. Result lines inside the
    /// range go with it; an end inside result lines moves to the next
    /// source line, so results are never joined onto source text.
    pub fn delete_range(&mut self, start: Position, end: Position) -> Result<(), EditError> {
        self.check_idle()?;
        let (start, end) = ordered(start, end);
        if start == end {
            return Ok(());
        }
        for position in [start, end] {
            if position.line >= self.line_count() {
                return Err(EditError::InvalidPosition(position));
            }
        }

        let mut from = self.source_position_after(start);
        let mut to = self.source_position_after(end);
        if from > to {
            return Ok(());
        }
        // Both ends collapsed onto one spot: the range only held results
        // and a newline. Join the source lines around them instead.
        if from == to {
            if from.offset == 0 {
                if from.line > 0 {
                    from = Position::new(from.line - 1, self.lines[from.line - 1].len());
                }
            } else if to.line + 1 < self.lines.len() {
                to = Position::new(to.line + 1, 0);
            }
        }
        if let Some(bad) = [from, to].into_iter().find(|p| !self.is_valid(*p)) {
            return Err(EditError::InvalidPosition(bad));
        }
        self.delete_source(from, to);
        Ok(())
    }

    /// Replace document lines `[start, end)` with `new_lines`. Result lines
    /// in the range are dropped along with the source lines.
    pub fn replace_lines(&mut self, start: usize, end: usize, new_lines: &[&str]) -> Result<(), EditError> {
        self.check_idle()?;
        let count = self.line_count();
        if start > end || end > count {
            return Err(EditError::InvalidPosition(Position::new(end, 0)));
        }
        if matches!(self.layout.locate(start), LineRef::Result { .. }) && start < count {
            return Err(EditError::ReadOnly);
        }
        let first = self.source_line_at_or_after(start);
        let last = self.source_line_at_or_after(end);
        self.replace_source_lines(first, last, new_lines);
        Ok(())
    }

    /// Replace the whole source text.
    pub fn set_text(&mut self, text: &str) -> Result<(), EditError> {
        self.check_idle()?;
        self.begin_user_action();
        self.delete_all();
        self.insert_source(Position::new(0, 0), text);
        self.end_user_action();
        Ok(())
    }

    /// Empty the worksheet and forget its file and history.
    pub fn clear(&mut self) -> Result<(), EditError> {
        self.check_idle()?;
        self.delete_all();
        self.set_filename(None);
        self.set_code_modified(false);
        self.undo.clear();
        Ok(())
    }

    /// Group the edits until the matching
    /// [`end_user_action`](Self::end_user_action) into one rescan and one
    /// undo step.
    pub fn begin_user_action(&mut self) {
        self.user_action_count += 1;
        self.undo.begin_user_action();
        self.freeze();
    }

    pub fn end_user_action(&mut self) {
        debug_assert!(self.user_action_count > 0, "unbalanced end_user_action");
        self.user_action_count = self.user_action_count.saturating_sub(1);
        self.thaw();
        self.undo.end_user_action();
    }

    pub fn in_user_action(&self) -> bool {
        self.user_action_count > 0
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Undo the last edit. Returns the document position where the text
    /// changed, or `None` if there was nothing to undo.
    pub fn undo(&mut self) -> Result<Option<Position>, EditError> {
        self.check_idle()?;
        match self.undo.undo() {
            Some(ops) => Ok(Some(self.apply_undo_ops(ops))),
            None => Ok(None),
        }
    }

    pub fn redo(&mut self) -> Result<Option<Position>, EditError> {
        self.check_idle()?;
        match self.undo.redo() {
            Some(ops) => Ok(Some(self.apply_undo_ops(ops))),
            None => Ok(None),
        }
    }

    fn apply_undo_ops(&mut self, ops: Vec<UndoOp>) -> Position {
        self.undo.set_applying(true);
        self.freeze();
        let mut cursor = Position::default();
        for op in ops {
            trace!(start = %op.start(), "replaying edit");
            cursor = match op {
                UndoOp::Insert { start, text, .. } => self.insert_source(start, &text),
                UndoOp::Delete { start, end, .. } => {
                    self.delete_source(start, end);
                    start
                }
            };
        }
        self.thaw();
        self.undo.set_applying(false);
        Position::new(self.layout.doc_line(cursor.line), cursor.offset)
    }

    pub(super) fn check_idle(&self) -> Result<(), EditError> {
        if self.state == SheetState::Executing {
            warn!("edit rejected while executing");
            return Err(EditError::Busy);
        }
        Ok(())
    }

    /// A source position on a line and a character boundary.
    fn is_valid(&self, position: Position) -> bool {
        self.lines
            .get(position.line)
            .is_some_and(|text| text.is_char_boundary(position.offset))
    }

    /// Source position of a document position; result lines map to the
    /// start of the next source line, or the end of the last one.
    pub(super) fn source_position_after(&self, position: Position) -> Position {
        match self.layout.locate(position.line) {
            LineRef::Source(line) => Position::new(line, position.offset),
            LineRef::Result { owner, .. } => {
                let after = self.layout.placement(owner).map_or(0, |p| p.after);
                if after < self.lines.len() {
                    Position::new(after, 0)
                } else {
                    self.source_position_before(position)
                }
            }
        }
    }

    /// Source position of a document position; result lines map to the
    /// end of the source line before them.
    pub(super) fn source_position_before(&self, position: Position) -> Position {
        match self.layout.locate(position.line) {
            LineRef::Source(line) => Position::new(line, position.offset),
            LineRef::Result { owner, .. } => {
                let line = self.layout.placement(owner).map_or(1, |p| p.after) - 1;
                Position::new(line, self.lines[line].len())
            }
        }
    }

    /// First source line at or after document line `doc`.
    fn source_line_at_or_after(&self, doc: usize) -> usize {
        if doc >= self.line_count() {
            return self.lines.len();
        }
        match self.layout.locate(doc) {
            LineRef::Source(line) => line,
            LineRef::Result { owner, .. } => self.layout.placement(owner).map_or(0, |p| p.after),
        }
    }

    /// Replace source lines `[start, end)`. Lines replaced one for one are
    /// edited in place, so their chunks survive.
    fn replace_source_lines(&mut self, start: usize, end: usize, new_lines: &[&str]) {
        let end = end.min(self.lines.len());
        let start = start.min(end);
        let common = (end - start).min(new_lines.len());

        self.begin_user_action();
        for (line, new) in (start..).zip(&new_lines[..common]) {
            if self.lines[line] != *new {
                let len = self.lines[line].len();
                self.delete_source(Position::new(line, 0), Position::new(line, len));
                self.insert_source(Position::new(line, 0), new);
            }
        }
        self.splice_source_lines(start + common, end, &new_lines[common..]);
        self.end_user_action();
    }

    /// Replace source lines `[start, end)` wholesale.
    fn splice_source_lines(&mut self, start: usize, end: usize, new_lines: &[&str]) {
        let n = self.lines.len();
        let text = (!new_lines.is_empty()).then(|| new_lines.join("\n"));

        if end < n {
            // Line `end` survives; the new lines go in front of it.
            if end > start {
                self.delete_source(Position::new(start, 0), Position::new(end, 0));
            }
            if let Some(text) = text {
                self.insert_source(Position::new(start, 0), &format!("{text}\n"));
            }
        } else if start == 0 {
            self.delete_all();
            if let Some(text) = text {
                self.insert_source(Position::new(0, 0), &text);
            }
        } else {
            let tail = Position::new(start - 1, self.lines[start - 1].len());
            if end > start {
                let last = Position::new(n - 1, self.lines[n - 1].len());
                self.delete_source(tail, last);
            }
            if let Some(text) = text {
                self.insert_source(tail, &format!("\n{text}"));
            }
        }
    }

    pub(super) fn delete_all(&mut self) {
        let last = self.lines.len() - 1;
        let end = Position::new(last, self.lines[last].len());
        self.delete_source(Position::new(0, 0), end);
    }

    /// Insert text at a source position. Returns the end of the inserted
    /// text.
    pub(super) fn insert_source(&mut self, position: Position, text: &str) -> Position {
        if text.is_empty() {
            return position;
        }
        debug!(%position, len = text.len(), "insert");
        self.freeze();
        self.events.push(SheetEvent::TextInserted {
            position,
            text: text.to_owned(),
        });

        let Position { line, offset } = position;
        let pieces = split_lines(text);
        let count = pieces.len() - 1;
        let ends_with_newline = count > 0 && pieces[count].is_empty();
        let current = &self.lines[line];
        let left = current[..offset].to_owned();
        let right = current[offset..].to_owned();

        let end = if count == 0 {
            self.set_line(line, format!("{left}{text}{right}"));
            self.change_chunk_line(line);
            Position::new(line, offset + text.len())
        } else {
            let chunk = self.chunk_id_at(line);
            if offset == 0 && ends_with_newline {
                // At a chunk boundary, extend the chunk before rather than
                // the chunk after.
                let target = match self.chunk_at_line(line) {
                    Some(c) if line > 0 && c.start() == line => self.chunk_id_at(line - 1),
                    _ => chunk,
                };
                self.insert_lines(line, count, target);
            } else if offset == 0 {
                self.insert_lines(line, count, chunk);
                self.change_chunk_line(line + count);
            } else {
                self.insert_lines(line + 1, count, chunk);
                self.change_chunk_line(line);
            }

            self.set_line(line, format!("{left}{}", pieces[0]));
            for (i, piece) in pieces.iter().enumerate().take(count).skip(1) {
                self.set_line(line + i, (*piece).to_owned());
            }
            if !(offset == 0 && ends_with_newline) {
                self.set_line(line + count, format!("{}{right}", pieces[count]));
            }
            Position::new(line + count, pieces[count].len())
        };

        self.thaw();
        self.undo.append(UndoOp::Insert {
            start: position,
            end,
            text: text.to_owned(),
        });
        self.set_code_modified(true);
        end
    }

    /// Delete between two source positions.
    pub(super) fn delete_source(&mut self, start: Position, end: Position) {
        let (start, end) = ordered(start, end);
        if start == end {
            return;
        }
        debug!(%start, %end, "delete");
        self.freeze();
        let deleted = self.get_text(start, end);
        self.events.push(SheetEvent::TextDeleted { start, end });

        if start.offset == 0 && end.offset == 0 {
            self.delete_lines(start.line, end.line);
        } else {
            let left = self.lines[start.line][..start.offset].to_owned();
            let right = self.lines[end.line][end.offset..].to_owned();
            if start.offset == 0 {
                self.delete_lines(start.line, end.line);
            } else {
                self.delete_lines(start.line + 1, end.line + 1);
            }
            self.set_line(start.line, left + &right);
            self.change_chunk_line(start.line);
            if let Some(id) = self.chunk_id_at(start.line) {
                self.chunk_changed(id);
            }
        }

        self.thaw();
        self.undo.append(UndoOp::Delete {
            start,
            end,
            text: deleted,
        });
        self.set_code_modified(true);
    }

    fn set_line(&mut self, line: usize, text: String) {
        if classify_line(&self.lines[line]) != classify_line(&text) {
            self.scan_adjacent = true;
        }
        self.lines[line] = text;
        self.changes.change(line, line + 1);
    }

    fn change_chunk_line(&mut self, line: usize) {
        if let Some(id) = self.chunk_id_at(line) {
            if let Some(chunk) = self.chunks.get_mut(&id) {
                chunk.change_line(line);
            }
        }
    }

    /// Insert `count` empty lines at `line`, owned by `chunk`.
    fn insert_lines(&mut self, line: usize, count: usize, chunk: Option<ChunkId>) {
        self.line_chunks
            .splice(line..line, iter::repeat(chunk).take(count));
        self.lines
            .splice(line..line, iter::repeat(String::new()).take(count));

        if let Some(id) = chunk {
            if let Some(c) = self.chunks.get_mut(&id) {
                c.insert_lines(line, count);
            }
            let after = self.chunks.get(&id).map_or(line + count, |c| c.end());
            for other in self.chunk_ids_in(after, self.lines.len()) {
                if other != id {
                    if let Some(c) = self.chunks.get_mut(&other) {
                        c.shift_down(count);
                    }
                }
            }
            self.chunk_changed(id);
        }

        self.changes.insert(line, count);
        self.scan_adjacent = true;
        self.events.push(SheetEvent::LinesInserted {
            start: line,
            end: line + count,
        });
    }

    /// Delete whole lines `[start, end)`.
    fn delete_lines(&mut self, start: usize, end: usize) {
        if start == end {
            return;
        }
        for id in self.chunk_ids_in(start, self.lines.len()) {
            let Some(chunk) = self.chunks.get(&id) else {
                continue;
            };
            let (chunk_start, chunk_end) = (chunk.start(), chunk.end());
            if chunk_start >= start && chunk_end <= end {
                self.remove_chunk(id);
            } else if let Some(chunk) = self.chunks.get_mut(&id) {
                chunk.delete_lines(start, end);
                if chunk_start < end {
                    self.chunk_changed(id);
                }
            }
        }

        self.lines.drain(start..end);
        self.line_chunks.drain(start..end);
        self.changes.delete_range(start, end);
        self.scan_adjacent = true;
        self.events.push(SheetEvent::LinesDeleted { start, end });
    }
}

//! Undo history in source coordinates.
//!
//! Result lines come and go as statements run; they are not user edits and
//! never appear here. Every operation is recorded against source lines
//! only, so history stays valid whatever results are displayed.

use crate::text::{is_word_char, Position};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum UndoOp {
    /// `text` was inserted at `start`, ending at `end`.
    Insert {
        start: Position,
        end: Position,
        text: String,
    },
    /// `text` between `start` and `end` was deleted.
    Delete {
        start: Position,
        end: Position,
        text: String,
    },
}

impl UndoOp {
    #[must_use]
    pub fn inverse(&self) -> UndoOp {
        match self.clone() {
            UndoOp::Insert { start, end, text } => UndoOp::Delete { start, end, text },
            UndoOp::Delete { start, end, text } => UndoOp::Insert { start, end, text },
        }
    }

    pub fn start(&self) -> Position {
        match self {
            UndoOp::Insert { start, .. } | UndoOp::Delete { start, .. } => *start,
        }
    }

    /// Extend a run of typed characters with `next`.
    fn coalesce(&mut self, next: &UndoOp) -> bool {
        match (self, next) {
            (
                UndoOp::Insert { end, text, .. },
                UndoOp::Insert {
                    start: next_start,
                    end: next_end,
                    text: next_text,
                },
            ) if *end == *next_start
                && is_word_char(next_text)
                && text.chars().all(|c| !c.is_whitespace()) =>
            {
                text.push_str(next_text);
                *end = *next_end;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct UndoStack {
    /// Each entry is undone and redone as a unit.
    entries: Vec<Vec<UndoOp>>,
    position: usize,
    action_depth: usize,
    group: Vec<UndoOp>,
    /// The last entry may absorb the next typed character.
    open: bool,
    applying: bool,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_undo(&self) -> bool {
        self.position > 0
    }

    pub fn can_redo(&self) -> bool {
        self.position < self.entries.len()
    }

    pub fn begin_user_action(&mut self) {
        self.action_depth += 1;
    }

    pub fn end_user_action(&mut self) {
        debug_assert!(self.action_depth > 0, "unbalanced end_user_action");
        self.action_depth = self.action_depth.saturating_sub(1);
        if self.action_depth > 0 {
            return;
        }
        let group = std::mem::take(&mut self.group);
        if group.is_empty() {
            return;
        }
        // A user action is never extended by later typing.
        self.truncate();
        self.entries.push(group);
        self.position += 1;
        self.open = false;
    }

    pub fn append(&mut self, op: UndoOp) {
        if self.applying {
            return;
        }
        if self.action_depth > 0 {
            if let Some(last) = self.group.last_mut() {
                if last.coalesce(&op) {
                    return;
                }
            }
            self.group.push(op);
        } else {
            self.push(op);
        }
    }

    fn push(&mut self, op: UndoOp) {
        self.truncate();
        if self.open {
            if let Some([last]) = self.entries.last_mut().map(Vec::as_mut_slice) {
                if last.coalesce(&op) {
                    return;
                }
            }
        }
        self.open = matches!(&op, UndoOp::Insert { text, .. } if is_word_char(text));
        self.entries.push(vec![op]);
        self.position += 1;
    }

    fn truncate(&mut self) {
        if self.position < self.entries.len() {
            self.entries.truncate(self.position);
            self.open = false;
        }
    }

    /// Operations that undo the last entry, in the order to apply them.
    pub fn undo(&mut self) -> Option<Vec<UndoOp>> {
        if self.position == 0 {
            return None;
        }
        self.position -= 1;
        self.open = false;
        let entry = &self.entries[self.position];
        Some(entry.iter().rev().map(UndoOp::inverse).collect())
    }

    /// Operations that redo the next entry, in the order to apply them.
    pub fn redo(&mut self) -> Option<Vec<UndoOp>> {
        let entry = self.entries.get(self.position)?.clone();
        self.position += 1;
        self.open = false;
        Some(entry)
    }

    /// Suppress recording while undo or redo operations are applied.
    pub fn set_applying(&mut self, applying: bool) {
        self.applying = applying;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.group.clear();
        self.position = 0;
        self.open = false;
    }
}

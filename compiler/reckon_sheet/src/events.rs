//! Change notifications for collaborators.
//!
//! The worksheet queues events while it works; a renderer drains them with
//! [`Worksheet::take_events`](crate::Worksheet::take_events) after each
//! call. Line numbers in events are source coordinates.

use std::ops::Range;
use std::path::PathBuf;

use crate::chunk::ChunkId;
use crate::text::Position;

/// Whether a calculation is running.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SheetState {
    #[default]
    Idle,
    /// A background calculation is running; edits are rejected.
    Executing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetEvent {
    ChunkInserted(ChunkId),
    /// `lines` are relative to the chunk start.
    ChunkChanged { chunk: ChunkId, lines: Range<usize> },
    ChunkDeleted(ChunkId),
    ChunkStatusChanged(ChunkId),
    /// The chunk's result lines changed or moved.
    ChunkResultsChanged(ChunkId),
    LinesInserted { start: usize, end: usize },
    LinesDeleted { start: usize, end: usize },
    TextInserted { position: Position, text: String },
    TextDeleted { start: Position, end: Position },
    FilenameChanged(Option<PathBuf>),
    ModifiedChanged(bool),
    StateChanged(SheetState),
    /// Statements finished by a background calculation so far.
    ExecutionProgress { completed: usize, total: usize },
}

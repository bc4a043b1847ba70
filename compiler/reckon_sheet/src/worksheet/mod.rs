//! The worksheet: source lines, their chunks, and everything derived.
//!
//! # Coordinates
//!
//! Source lines are what the user typed; the chunk partition, undo history
//! and saved files use source coordinates. The public editing and query
//! methods use document coordinates, where each statement's result lines
//! follow its last source line (see [`crate::layout`]).
//!
//! # Change batching
//!
//! Edits update lines and chunk ranges blindly. Every public operation is
//! bracketed by `freeze`/`thaw`; when the outermost bracket closes the
//! worksheet rescans the touched span, re-derives the result layout and
//! queues change events. `begin_user_action`/`end_user_action` widen the
//! bracket over several edits, which also makes them one undo step.

mod calculate;
mod edit;
mod file;
mod query;
mod rescan;


pub use query::ChunkView;

use std::path::PathBuf;
use std::sync::Arc;

use reckon_eval::{CancelToken, Engine, ReckonEngine, Scope};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::change_range::ChangeRange;
use crate::chunk::{Chunk, ChunkId, ChunkKind};
use crate::config::SheetConfig;
use crate::events::{SheetEvent, SheetState};
use crate::executor::AsyncExecutor;
use crate::layout::Layout;
use crate::statement::StatementChunk;
use crate::undo::UndoStack;

/// Interrupts the calculation of the worksheet it came from. Can be sent
/// to another thread.
#[derive(Clone, Debug)]
pub struct InterruptHandle {
    cancel: CancelToken,
}

impl InterruptHandle {
    pub fn interrupt(&self) {
        self.cancel.cancel();
    }
}

#[derive(Debug)]
pub struct Worksheet {
    config: SheetConfig,
    engine: Arc<dyn Engine>,
    /// Scope the first statement runs on.
    root_scope: Arc<Scope>,

    lines: Vec<String>,
    /// Chunk of each line. `None` only transiently, while a rescan
    /// reassigns lines.
    line_chunks: Vec<Option<ChunkId>>,
    chunks: FxHashMap<ChunkId, Chunk>,
    next_id: u32,

    /// Lines touched since the last rescan.
    changes: ChangeRange,
    /// Some line changed class, so neighbouring chunks may merge or split.
    scan_adjacent: bool,
    changed_chunks: FxHashSet<ChunkId>,
    deleted_chunks: Vec<ChunkId>,
    freeze_count: usize,
    user_action_count: usize,

    layout: Layout,
    undo: UndoStack,
    events: Vec<SheetEvent>,

    state: SheetState,
    executor: Option<AsyncExecutor>,
    cancel: CancelToken,

    filename: Option<PathBuf>,
    code_modified: bool,
}

impl Default for Worksheet {
    fn default() -> Self {
        Worksheet::new(SheetConfig::default())
    }
}

impl Worksheet {
    pub fn new(config: SheetConfig) -> Self {
        let engine = Arc::new(ReckonEngine::new(config.engine().clone()));
        Worksheet::with_engine(engine, config)
    }

    /// A worksheet that compiles and runs statements with `engine`.
    pub fn with_engine(engine: Arc<dyn Engine>, config: SheetConfig) -> Self {
        let mut worksheet = Worksheet {
            config,
            engine,
            root_scope: Arc::new(Scope::new()),
            lines: vec![String::new()],
            line_chunks: Vec::new(),
            chunks: FxHashMap::default(),
            next_id: 0,
            changes: ChangeRange::new(),
            scan_adjacent: false,
            changed_chunks: FxHashSet::default(),
            deleted_chunks: Vec::new(),
            freeze_count: 0,
            user_action_count: 0,
            layout: Layout::default(),
            undo: UndoStack::new(),
            events: Vec::new(),
            state: SheetState::Idle,
            executor: None,
            cancel: CancelToken::new(),
            filename: None,
            code_modified: false,
        };
        let id = worksheet.alloc_id();
        worksheet
            .chunks
            .insert(id, Chunk::new(id, ChunkKind::Blank, 0, 1));
        worksheet.line_chunks.push(Some(id));
        worksheet
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    pub fn root_scope(&self) -> &Arc<Scope> {
        &self.root_scope
    }

    /// Replace the scope the first statement runs on. Every statement
    /// needs to run again.
    pub fn set_root_scope(&mut self, scope: Scope) {
        self.root_scope = Arc::new(scope);
        self.freeze();
        self.mark_rest_for_execute(0);
        self.thaw();
    }

    pub fn state(&self) -> SheetState {
        self.state
    }

    pub fn filename(&self) -> Option<&std::path::Path> {
        self.filename.as_deref()
    }

    /// The source changed since it was last loaded or saved.
    pub fn code_modified(&self) -> bool {
        self.code_modified
    }

    pub fn interrupt_handle(&self) -> InterruptHandle {
        InterruptHandle {
            cancel: self.cancel.clone(),
        }
    }

    /// Events queued since the last call.
    pub fn take_events(&mut self) -> Vec<SheetEvent> {
        std::mem::take(&mut self.events)
    }

    fn alloc_id(&mut self) -> ChunkId {
        let id = ChunkId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn chunk_id_at(&self, line: usize) -> Option<ChunkId> {
        self.line_chunks
            .get(line)
            .copied()
            .flatten()
            .filter(|id| self.chunks.contains_key(id))
    }

    fn chunk_at_line(&self, line: usize) -> Option<&Chunk> {
        self.chunk_id_at(line).and_then(|id| self.chunks.get(&id))
    }

    /// Live chunks with a line in `[start, end)`, in order.
    fn chunk_ids_in(&self, start: usize, end: usize) -> Vec<ChunkId> {
        let end = end.min(self.line_chunks.len());
        let mut ids: Vec<ChunkId> = Vec::new();
        for line in start.min(end)..end {
            if let Some(id) = self.chunk_id_at(line) {
                if ids.last() != Some(&id) {
                    ids.push(id);
                }
            }
        }
        ids
    }

    /// Statement chunks in document order.
    fn statement_ids(&self) -> Vec<ChunkId> {
        self.chunk_ids_in(0, self.lines.len())
            .into_iter()
            .filter(|id| self.chunks[id].statement().is_some())
            .collect()
    }

    fn statement_mut(&mut self, id: ChunkId) -> Option<&mut StatementChunk> {
        self.chunks.get_mut(&id).and_then(Chunk::statement_mut)
    }

    fn freeze(&mut self) {
        self.freeze_count += 1;
    }

    fn thaw(&mut self) {
        debug_assert!(self.freeze_count > 0, "unbalanced thaw");
        self.freeze_count = self.freeze_count.saturating_sub(1);
        if self.freeze_count == 0 {
            self.rescan();
            self.relayout();
            self.emit_chunk_changes();
            self.check_partition();
        }
    }

    fn chunk_changed(&mut self, id: ChunkId) {
        self.changed_chunks.insert(id);
    }

    /// Re-derive result placement, flagging statements whose results
    /// moved or changed.
    fn relayout(&mut self) {
        let entries: Vec<_> = self
            .statement_ids()
            .into_iter()
            .filter_map(|id| {
                let chunk = &self.chunks[&id];
                let lines = chunk.statement()?.result_lines();
                Some((id, chunk.end(), lines))
            })
            .collect();
        let layout = Layout::build(entries);
        for id in layout.moved_since(&self.layout) {
            if let Some(statement) = self.statement_mut(id) {
                statement.results_changed = true;
                self.changed_chunks.insert(id);
            }
        }
        self.layout = layout;
    }

    fn emit_chunk_changes(&mut self) {
        for id in std::mem::take(&mut self.deleted_chunks) {
            self.events.push(SheetEvent::ChunkDeleted(id));
        }

        let mut changed: Vec<ChunkId> = std::mem::take(&mut self.changed_chunks)
            .into_iter()
            .filter(|id| self.chunks.contains_key(id))
            .collect();
        changed.sort_by_key(|id| self.chunks[id].start());

        for id in changed {
            let Some(chunk) = self.chunks.get_mut(&id) else {
                continue;
            };
            let mut status_cleared = false;
            if chunk.newly_inserted {
                chunk.newly_inserted = false;
                chunk.changes.clear();
                status_cleared = true;
                self.events.push(SheetEvent::ChunkInserted(id));
            } else if !chunk.changes.is_empty() {
                let lines = chunk.changes.lines();
                chunk.changes.clear();
                status_cleared = true;
                self.events.push(SheetEvent::ChunkChanged { chunk: id, lines });
            }
            if let Some(statement) = chunk.statement_mut() {
                if status_cleared {
                    statement.status_changed = false;
                }
                if statement.status_changed {
                    statement.status_changed = false;
                    self.events.push(SheetEvent::ChunkStatusChanged(id));
                }
                if statement.results_changed {
                    statement.results_changed = false;
                    self.events.push(SheetEvent::ChunkResultsChanged(id));
                }
            }
        }
    }

    fn set_state(&mut self, state: SheetState) {
        if self.state != state {
            self.state = state;
            self.events.push(SheetEvent::StateChanged(state));
        }
    }

    fn set_code_modified(&mut self, modified: bool) {
        if self.code_modified != modified {
            self.code_modified = modified;
            self.events.push(SheetEvent::ModifiedChanged(modified));
        }
    }

    fn set_filename(&mut self, filename: Option<PathBuf>) {
        if self.filename != filename {
            self.filename.clone_from(&filename);
            self.events.push(SheetEvent::FilenameChanged(filename));
        }
    }

    /// Chunks exactly partition the lines.
    fn check_partition(&self) {
        if cfg!(debug_assertions) {
            let mut line = 0;
            for id in self.chunk_ids_in(0, self.lines.len()) {
                let chunk = &self.chunks[&id];
                debug_assert_eq!(chunk.start(), line, "chunk {chunk} out of place");
                debug_assert!(chunk.end() > chunk.start(), "empty chunk {chunk}");
                debug_assert!(
                    self.line_chunks[chunk.lines()].iter().all(|c| *c == Some(id)),
                    "lines of {chunk} assigned elsewhere"
                );
                line = chunk.end();
            }
            debug_assert_eq!(line, self.lines.len(), "chunks don't cover every line");
        }
    }
}

//! Reckon sheet - the incremental worksheet model.
//!
//! A [`Worksheet`] owns a sequence of source lines and keeps them
//! partitioned into [`Chunk`]s: statements, runs of blank lines and runs of
//! comments. Edits re-segment only the lines they touch. Statements whose
//! text or upstream scope changed are flagged dirty, and
//! [`Worksheet::calculate`] compiles and re-runs them in order, each on the
//! scope its predecessor produced.
//!
//! # Layers
//!
//! - [`ChangeRange`]: accumulates the span touched by a batch of edits
//! - [`Chunk`] / [`StatementChunk`]: the partition and per-statement state
//! - `Layout`: where each statement's result lines appear in the document
//! - `UndoStack`: edit history in source coordinates
//! - `AsyncExecutor`: the optional background execution thread
//! - [`Worksheet`]: editing, rescanning, calculation, queries and files

mod change_range;
mod chunk;
mod completion;
mod config;
mod errors;
mod events;
mod executor;
mod layout;
mod statement;
mod text;
mod undo;
mod worksheet;

pub use change_range::ChangeRange;
pub use chunk::{Chunk, ChunkId, ChunkKind};
pub use completion::Completion;
pub use config::{SheetConfig, SheetConfigBuilder, DEFAULT_WORKER_STACK};
pub use errors::{EditError, FileError};
pub use events::{SheetEvent, SheetState};
pub use layout::{LineRef, LineStyle, ResultLine};
pub use statement::{StatementChunk, StatementError, StatementState};
pub use text::Position;
pub use worksheet::{ChunkView, InterruptHandle, Worksheet};

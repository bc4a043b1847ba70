//! The `chunks` command: show how a worksheet is segmented.

use std::fmt::Write as _;

use reckon_sheet::{ChunkView, Worksheet};

use super::{calculate_all, open_worksheet};
use crate::options::SheetOptions;

pub fn chunks_file(options: &SheetOptions) {
    let mut sheet = open_worksheet(options);
    calculate_all(&mut sheet);
    print!("{}", render_chunks(&sheet));
}

/// One line per chunk view: document line range, kind and id, and the
/// state of statements.
pub fn render_chunks(sheet: &Worksheet) -> String {
    let mut out = String::new();
    for view in sheet.chunks_in(0, sheet.line_count()) {
        let _ = match view {
            ChunkView::Source { chunk, start, end } => match chunk.statement() {
                Some(statement) => writeln!(
                    out,
                    "{start:>4}..{end:<4} {} {} [{}]",
                    chunk.kind(),
                    chunk.id(),
                    statement.state()
                ),
                None => writeln!(out, "{start:>4}..{end:<4} {} {}", chunk.kind(), chunk.id()),
            },
            ChunkView::Results {
                owner, start, end, ..
            } => writeln!(out, "{start:>4}..{end:<4} results of {owner}"),
        };
    }
    out
}

//! The `run` command: calculate a worksheet and print it with its results.

use std::fmt::Write as _;

use reckon_sheet::{ChunkView, LineStyle, Worksheet};

use super::{calculate_all, has_errors, open_worksheet};
use crate::options::SheetOptions;

/// Calculate the worksheet and print the document. Exits with status 1 if
/// any statement failed.
pub fn run_file(options: &SheetOptions) {
    let mut sheet = open_worksheet(options);
    calculate_all(&mut sheet);
    print!("{}", render_document(&sheet));
    if has_errors(&sheet) {
        std::process::exit(1);
    }
}

fn marker(style: LineStyle) -> &'static str {
    match style {
        LineStyle::Text => "=> ",
        LineStyle::Warning => "!> ",
        LineStyle::Error => "E> ",
        LineStyle::Custom => "#> ",
    }
}

/// The document as text: source lines as written, result lines behind a
/// marker for their style.
pub fn render_document(sheet: &Worksheet) -> String {
    let mut out = String::new();
    for view in sheet.chunks_in(0, sheet.line_count()) {
        match view {
            ChunkView::Source { chunk, .. } => {
                for line in chunk.lines() {
                    out.push_str(sheet.source_line(line).unwrap_or_default());
                    out.push('\n');
                }
            }
            ChunkView::Results { lines, .. } => {
                for line in lines {
                    let _ = writeln!(out, "{}{}", marker(line.style), line.text);
                }
            }
        }
    }
    out
}

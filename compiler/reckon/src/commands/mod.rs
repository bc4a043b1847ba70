//! Command handlers for the reckon CLI.
//!
//! Each submodule implements one command. The `*_file` entry points print
//! and exit the process on failure; the `render_*` functions they use
//! return text so tests can check it directly.

use std::path::Path;

use reckon_sheet::Worksheet;

use crate::options::SheetOptions;

mod check;
mod chunks;
mod debug;
mod doctest;
mod run;

pub use check::{check_file, render_compile_errors, CompileReport};
pub use chunks::{chunks_file, render_chunks};
pub use debug::{lex_file, render_tokens};
pub use doctest::doctest_file;
pub use run::{render_document, run_file};

/// Read a file from disk, exiting with a user-friendly error message on failure.
pub(crate) fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}

/// Load the worksheet named by `options`, exiting on failure.
pub(crate) fn open_worksheet(options: &SheetOptions) -> Worksheet {
    let Some(path) = options.path.as_deref() else {
        eprintln!("error: missing file path");
        std::process::exit(1);
    };
    let mut sheet = Worksheet::new(options.config());
    if let Err(err) = sheet.load(Path::new(path)) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    sheet
}

/// Calculate every dirty statement, waiting for a background run.
pub fn calculate_all(sheet: &mut Worksheet) {
    if let Err(err) = sheet.calculate() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    sheet.wait();
    tracing::debug!(events = sheet.take_events().len(), "calculation finished");
}

/// Whether any statement ended with an error.
pub fn has_errors(sheet: &Worksheet) -> bool {
    sheet
        .statements()
        .filter_map(|chunk| chunk.statement())
        .any(|statement| statement.error().is_some())
}

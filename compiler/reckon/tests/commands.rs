#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use std::fs;

use pretty_assertions::assert_eq;
use reckon::commands::{calculate_all, has_errors, render_chunks, render_document, render_tokens};
use reckon::{parse_sheet_options, SheetOptions};
use reckon_sheet::Worksheet;
use tempfile::TempDir;

fn load(dir: &TempDir, text: &str, background: bool) -> Worksheet {
    let path = dir.path().join("sheet.rk");
    fs::write(&path, text).unwrap();
    let options = SheetOptions {
        path: Some(path.display().to_string()),
        background,
        recursion_limit: None,
    };
    let mut sheet = Worksheet::new(options.config());
    sheet.load(&path).unwrap();
    sheet
}

#[test]
fn run_prints_results_under_statements() {
    let dir = TempDir::new().unwrap();
    let mut sheet = load(&dir, "x = 2\nx * 3\nprint('hi')\n", false);
    calculate_all(&mut sheet);
    assert_eq!(render_document(&sheet), "x = 2\nx * 3\n=> 6\nprint('hi')\n=> hi\n\n");
    assert!(!has_errors(&sheet));
}

#[test]
fn background_run_matches_in_place_run() {
    let dir = TempDir::new().unwrap();
    let text = "def f(n):\n    return n * n\n\nf(4)\n";
    let mut foreground = load(&dir, text, false);
    calculate_all(&mut foreground);
    let mut background = load(&dir, text, true);
    calculate_all(&mut background);
    assert_eq!(render_document(&background), render_document(&foreground));
    assert!(render_document(&background).contains("=> 16\n"));
}

#[test]
fn errors_are_marked() {
    let dir = TempDir::new().unwrap();
    let mut sheet = load(&dir, "1 / 0\n", false);
    calculate_all(&mut sheet);
    let document = render_document(&sheet);
    assert!(document.contains("E> ZeroDivisionError"), "{document}");
    assert!(has_errors(&sheet));
}

#[test]
fn chunks_lists_sources_and_results() {
    let dir = TempDir::new().unwrap();
    let mut sheet = load(&dir, "# setup\nx = 1\nx\n", false);
    calculate_all(&mut sheet);
    let rendered = render_chunks(&sheet);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 5, "{rendered}");
    assert!(lines[0].contains("comment"), "{rendered}");
    assert!(lines[1].contains("statement") && lines[1].ends_with("[ok]"));
    assert!(lines[3].contains("results of"), "{rendered}");
    assert!(lines[4].contains("blank"), "{rendered}");
}

#[test]
fn lex_carries_open_delimiters() {
    let rendered = render_tokens("x = (1,\n     2)\n");
    assert!(rendered.contains("open: ("), "{rendered}");
    assert!(rendered.contains("RParen"), "{rendered}");
    assert!(rendered.starts_with("   1 StatementStart\n"), "{rendered}");
}

#[test]
fn options_build_the_sheet_config() {
    let args: Vec<String> = ["s.rk", "-b"].iter().map(|s| (*s).to_string()).collect();
    let options = parse_sheet_options(&args).unwrap();
    let sheet = Worksheet::new(options.config());
    assert!(sheet.config().background());
}

//! Loading and saving worksheet files.

#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use std::fs;

use pretty_assertions::assert_eq;
use reckon_sheet::{FileError, Position, SheetEvent, Worksheet};
use tempfile::TempDir;

#[test]
fn save_and_load_round_trip_bytes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sheet.rk");
    let text = "import math\n\ndef area(r):\n    return math.pi * r * r\n\narea(2)\n";
    fs::write(&path, text).unwrap();

    let mut ws = Worksheet::default();
    ws.load(&path).unwrap();
    assert_eq!(ws.filename(), Some(path.as_path()));
    assert!(!ws.code_modified());
    assert!(!ws.can_undo());

    let copy = dir.path().join("copy.rk");
    ws.save(Some(&copy)).unwrap();
    assert_eq!(fs::read_to_string(&copy).unwrap(), text);
    assert_eq!(ws.filename(), Some(copy.as_path()));
}

#[test]
fn results_are_not_saved() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sheet.rk");
    let mut ws = Worksheet::default();
    ws.set_text("x = 20\nx + 1").unwrap();
    ws.calculate().unwrap();
    assert_eq!(ws.line_count(), 3);
    ws.save(Some(&path)).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "x = 20\nx + 1");
}

#[test]
fn save_uses_the_current_filename() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sheet.rk");
    fs::write(&path, "a = 1\n").unwrap();

    let mut ws = Worksheet::default();
    ws.load(&path).unwrap();
    ws.insert(0, 5, "0").unwrap();
    assert!(ws.code_modified());
    ws.save(None).unwrap();
    assert!(!ws.code_modified());
    assert_eq!(fs::read_to_string(&path).unwrap(), "a = 10\n");
}

#[test]
fn unmodified_sheet_is_not_rewritten() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sheet.rk");
    fs::write(&path, "a = 1\n").unwrap();

    let mut ws = Worksheet::default();
    ws.load(&path).unwrap();
    fs::write(&path, "changed behind our back\n").unwrap();
    ws.save(None).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "changed behind our back\n");
}

#[test]
fn save_without_a_name_fails() {
    let mut ws = Worksheet::default();
    ws.set_text("1").unwrap();
    assert!(matches!(ws.save(None), Err(FileError::NoFilename)));
}

#[test]
fn load_reports_missing_and_invalid_files() {
    let dir = TempDir::new().unwrap();
    let mut ws = Worksheet::default();
    ws.set_text("kept").unwrap();

    let missing = dir.path().join("missing.rk");
    assert!(matches!(ws.load(&missing), Err(FileError::Read { .. })));

    let binary = dir.path().join("binary.rk");
    fs::write(&binary, [0x66, 0xff, 0xfe]).unwrap();
    assert!(matches!(ws.load(&binary), Err(FileError::Encoding { .. })));

    assert_eq!(ws.text(), "kept");
    assert_eq!(ws.filename(), None);
}

#[test]
fn crlf_files_load_as_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dos.rk");
    fs::write(&path, "x = 1\r\ny = 2\r\n").unwrap();

    let mut ws = Worksheet::default();
    ws.load(&path).unwrap();
    assert_eq!(ws.source_lines(), &["x = 1", "y = 2", ""]);
    assert_eq!(ws.get_text(Position::new(0, 0), Position::new(1, 5)), "x = 1\ny = 2");
}

#[test]
fn load_announces_the_filename() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sheet.rk");
    fs::write(&path, "1\n").unwrap();

    let mut ws = Worksheet::default();
    ws.take_events();
    ws.load(&path).unwrap();
    let events = ws.take_events();
    assert!(events.contains(&SheetEvent::FilenameChanged(Some(path.clone()))));
}

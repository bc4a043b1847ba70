//! Property-based tests for editing.
//!
//! 1. Random edits leave the same text as applying them to a plain list of
//!    lines.
//! 2. The chunk partition after every incremental edit is the one a fresh
//!    worksheet computes for the same text.
//! 3. A user action undoes and redoes as a single step.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use reckon_sheet::{Position, Worksheet};

#[derive(Clone, Debug)]
enum Edit {
    /// Position as fractions of the line count and line length.
    Insert { line: f64, offset: f64, text: String },
    Delete { from: (f64, f64), to: (f64, f64) },
    /// Join a line onto the one above it.
    Join { line: f64 },
    /// Delete the first character of a line, such as a comment's `#`.
    Strip { line: f64 },
}

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("\n".to_owned()),
        Just("    ".to_owned()),
        Just("x = 1".to_owned()),
        Just("if x:".to_owned()),
        Just("else:".to_owned()),
        Just("# note".to_owned()),
        Just("\n\n".to_owned()),
        Just("y".to_owned()),
        Just("(".to_owned()),
        Just(")".to_owned()),
        Just("\\".to_owned()),
        Just("'''".to_owned()),
        prop::string::string_regex("[a-z ]{1,4}").expect("valid regex"),
    ]
}

fn edit() -> impl Strategy<Value = Edit> {
    let point = (0.0..1.0f64, 0.0..=1.0f64);
    prop_oneof![
        (point.clone(), prop::collection::vec(fragment(), 1..4)).prop_map(
            |((line, offset), parts)| Edit::Insert {
                line,
                offset,
                text: parts.concat(),
            }
        ),
        (point.clone(), point).prop_map(|(from, to)| Edit::Delete { from, to }),
        (0.0..1.0f64).prop_map(|line| Edit::Join { line }),
        (0.0..1.0f64).prop_map(|line| Edit::Strip { line }),
    ]
}

fn initial_text() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..12).prop_map(|parts| parts.concat())
}

/// Map fractional coordinates onto a real position of `lines`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn position(lines: &[String], (line, offset): (f64, f64)) -> Position {
    let line = ((lines.len() as f64 * line) as usize).min(lines.len() - 1);
    let offset = (lines[line].len() as f64 * offset) as usize;
    Position::new(line, offset.min(lines[line].len()))
}

/// The range a deleting edit removes.
fn delete_span(lines: &[String], edit: &Edit) -> Option<(Position, Position)> {
    match edit {
        Edit::Insert { .. } => None,
        Edit::Delete { from, to } => Some((position(lines, *from), position(lines, *to))),
        Edit::Join { line } => {
            let below = position(lines, (*line, 0.0)).line;
            let above = below.checked_sub(1)?;
            Some((
                Position::new(above, lines[above].len()),
                Position::new(below, 0),
            ))
        }
        Edit::Strip { line } => {
            let at = position(lines, (*line, 0.0));
            (!lines[at.line].is_empty()).then_some((at, Position::new(at.line, 1)))
        }
    }
}

/// The same edits applied to a bare line list.
fn apply_to_model(lines: &mut Vec<String>, edit: &Edit) {
    let mut text = lines.join("\n");
    let byte = |lines: &[String], p: Position| {
        lines[..p.line].iter().map(|l| l.len() + 1).sum::<usize>() + p.offset
    };
    match edit {
        Edit::Insert {
            line,
            offset,
            text: inserted,
        } => {
            let at = byte(lines, position(lines, (*line, *offset)));
            text.insert_str(at, inserted);
        }
        _ => {
            if let Some((from, to)) = delete_span(lines, edit) {
                let a = byte(lines, from);
                let b = byte(lines, to);
                text.replace_range(a.min(b)..a.max(b), "");
            }
        }
    }
    *lines = text.split('\n').map(str::to_owned).collect();
}

fn apply(ws: &mut Worksheet, edit: &Edit) {
    let lines = ws.source_lines().to_vec();
    match edit {
        Edit::Insert { line, offset, text } => {
            let at = position(&lines, (*line, *offset));
            ws.insert(at.line, at.offset, text).unwrap();
        }
        _ => {
            if let Some((from, to)) = delete_span(&lines, edit) {
                ws.delete_range(from, to).unwrap();
            }
        }
    }
}

fn shapes(ws: &Worksheet) -> Vec<String> {
    ws.source_chunks()
        .map(|chunk| match chunk.statement() {
            Some(statement) => format!("{chunk} {:?}", statement.text()),
            None => chunk.to_string(),
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 512, .. ProptestConfig::default() })]

    #[test]
    fn edits_match_a_line_model(text in initial_text(), edits in prop::collection::vec(edit(), 1..8)) {
        let mut ws = Worksheet::default();
        ws.set_text(&text).unwrap();
        let mut model: Vec<String> = text.split('\n').map(str::to_owned).collect();
        for edit in &edits {
            apply(&mut ws, edit);
            apply_to_model(&mut model, edit);
            prop_assert_eq!(ws.source_lines(), model.as_slice());
        }
    }

    #[test]
    fn incremental_partition_matches_fresh(text in initial_text(), edits in prop::collection::vec(edit(), 1..12)) {
        let mut ws = Worksheet::default();
        ws.set_text(&text).unwrap();
        for edit in &edits {
            apply(&mut ws, edit);
            let mut fresh = Worksheet::default();
            fresh.set_text(&ws.text()).unwrap();
            prop_assert_eq!(shapes(&ws), shapes(&fresh));
        }
    }

    #[test]
    fn user_action_is_one_undo_step(text in initial_text(), edits in prop::collection::vec(edit(), 1..6)) {
        let mut ws = Worksheet::default();
        ws.set_text(&text).unwrap();
        let before = ws.text();
        ws.begin_user_action();
        for edit in &edits {
            apply(&mut ws, edit);
        }
        ws.end_user_action();
        let after = ws.text();
        prop_assume!(after != before);

        ws.undo().unwrap();
        prop_assert_eq!(ws.text(), before);
        ws.redo().unwrap();
        prop_assert_eq!(ws.text(), after);
    }
}

#[test]
fn model_handles_newline_inserts() {
    let mut lines = vec!["ab".to_owned()];
    apply_to_model(
        &mut lines,
        &Edit::Insert {
            line: 0.0,
            offset: 0.5,
            text: "\n".to_owned(),
        },
    );
    assert_eq!(lines, vec!["a".to_owned(), "b".to_owned()]);
}

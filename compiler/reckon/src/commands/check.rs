//! The `check` command: compile every statement without running anything.

use ariadne::{Config, Label, Report, ReportKind, Source};
use reckon_parse::CompileError;
use reckon_sheet::Worksheet;

use super::open_worksheet;
use crate::options::SheetOptions;

/// A statement that failed to compile.
#[derive(Clone, Debug)]
pub struct CompileReport {
    /// First source line of the statement.
    pub line: usize,
    pub error: CompileError,
}

impl CompileReport {
    /// Every statement of `sheet` that does not compile, in source order.
    pub fn collect(sheet: &Worksheet) -> Vec<CompileReport> {
        sheet
            .statements()
            .filter_map(|chunk| {
                let statement = chunk.statement()?;
                let error = sheet.engine().compile(&statement.text()).err()?;
                Some(CompileReport {
                    line: chunk.start(),
                    error,
                })
            })
            .collect()
    }
}

/// Compile a worksheet and report every syntax error. Exits with status 1
/// if there were any.
pub fn check_file(options: &SheetOptions) {
    let sheet = open_worksheet(options);
    let reports = CompileReport::collect(&sheet);
    let statements = sheet.statements().count();
    if reports.is_empty() {
        println!("{statements} statements, no errors");
        return;
    }
    let color = std::io::IsTerminal::is_terminal(&std::io::stderr());
    let path = options.path.as_deref().unwrap_or("<worksheet>");
    eprint!("{}", render_compile_errors(path, &sheet, &reports, color));
    eprintln!("{} of {statements} statements failed to compile", reports.len());
    std::process::exit(1);
}

/// Render compile errors against the worksheet's source text.
pub fn render_compile_errors(
    path: &str,
    sheet: &Worksheet,
    reports: &[CompileReport],
    color: bool,
) -> String {
    let text = sheet.text();
    let line_starts: Vec<usize> = sheet
        .source_lines()
        .iter()
        .scan(0, |offset, line| {
            let start = *offset;
            *offset += line.len() + 1;
            Some(start)
        })
        .collect();

    let mut out = Vec::new();
    for report in reports {
        let line = report.line + report.error.line() as usize;
        let line_start = line_starts.get(line).copied().unwrap_or(text.len());
        let line_len = sheet.source_line(line).map_or(0, str::len);
        let (start, end) = match report.error.offset() {
            Some(offset) => {
                let start = line_start + (offset as usize).min(line_len);
                (start, (start + 1).min(line_start + line_len).max(start))
            }
            None => (line_start, line_start + line_len),
        };
        let span = char_index(&text, start)..char_index(&text, end);
        let label = match &report.error {
            CompileError::Syntax(_) => "invalid syntax here",
            CompileError::Unsupported(_) => "not supported in a worksheet",
        };
        let _ = Report::build(ReportKind::Error, path.to_string(), span.start)
            .with_config(Config::default().with_color(color))
            .with_message(report.error.to_string())
            .with_label(Label::new((path.to_string(), span)).with_message(label))
            .finish()
            .write((path.to_string(), Source::from(text.clone())), &mut out);
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Character index of a byte offset; spans are counted in characters.
fn char_index(text: &str, byte: usize) -> usize {
    text.get(..byte).map_or_else(|| text.chars().count(), |s| s.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reckon_sheet::SheetConfig;

    fn sheet(text: &str) -> Worksheet {
        let mut sheet = Worksheet::new(SheetConfig::default());
        sheet
            .insert(0, 0, text)
            .unwrap_or_else(|err| panic!("insert failed: {err}"));
        sheet
    }

    #[test]
    fn collects_failing_statements() {
        let sheet = sheet("a = 1\nb = 1 +\n\nc = a *\n");
        let reports = CompileReport::collect(&sheet);
        let lines: Vec<usize> = reports.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn renders_message_and_path() {
        let sheet = sheet("x = 1\ny = x +\n");
        let reports = CompileReport::collect(&sheet);
        let text = render_compile_errors("demo.rk", &sheet, &reports, false);
        assert!(text.contains("SyntaxError"), "{text}");
        assert!(text.contains("demo.rk"), "{text}");
        assert!(text.contains("y = x +"), "{text}");
    }

    #[test]
    fn clean_sheet_has_no_reports() {
        let sheet = sheet("x = 1\nif x:\n    y = 2\n");
        assert!(CompileReport::collect(&sheet).is_empty());
    }
}

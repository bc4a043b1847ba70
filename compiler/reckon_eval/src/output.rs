//! Statement output capture.
//!
//! Everything a statement shows ends up as a [`ResultItem`]: displayed
//! values, printed lines, copy warnings and custom results, in the order
//! they were produced. Printed text is line buffered; a trailing partial
//! line is flushed by [`OutputCapture::finish`], so it lands after any
//! values displayed while it was pending.

use std::fmt;
use std::sync::Arc;

use crate::value::CustomResult;

/// One result of a statement.
#[derive(Clone, Debug)]
pub enum ResultItem {
    /// A displayed value or a printed line.
    Text(String),
    /// Shown with warning styling.
    Warning(String),
    Custom(Arc<dyn CustomResult>),
}

impl ResultItem {
    /// Text shown for the item. Custom results show a `[kind]`
    /// placeholder.
    pub fn display_text(&self) -> String {
        match self {
            ResultItem::Text(text) | ResultItem::Warning(text) => text.clone(),
            ResultItem::Custom(custom) => format!("[{}]", custom.kind()),
        }
    }

    /// Plain text, with custom results rendered through
    /// [`CustomResult::text`].
    pub fn plain_text(&self) -> String {
        match self {
            ResultItem::Custom(custom) => custom.text(),
            other => other.display_text(),
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, ResultItem::Warning(_))
    }
}

impl PartialEq for ResultItem {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ResultItem::Text(a), ResultItem::Text(b))
            | (ResultItem::Warning(a), ResultItem::Warning(b)) => a == b,
            (ResultItem::Custom(a), ResultItem::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for ResultItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

/// Collects the results of one statement execution.
#[derive(Debug, Default)]
pub struct OutputCapture {
    results: Vec<ResultItem>,
    pending: String,
}

impl OutputCapture {
    pub fn new() -> Self {
        OutputCapture::default()
    }

    /// Record a displayed value's text.
    pub fn text(&mut self, text: String) {
        self.results.push(ResultItem::Text(text));
    }

    pub fn warning(&mut self, message: String) {
        self.results.push(ResultItem::Warning(message));
    }

    pub fn custom(&mut self, result: Arc<dyn CustomResult>) {
        self.results.push(ResultItem::Custom(result));
    }

    /// Append printed text; each completed line becomes a result.
    pub fn write(&mut self, text: &str) {
        self.pending.push_str(text);
        while let Some(pos) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=pos).collect();
            self.results
                .push(ResultItem::Text(line[..line.len() - 1].to_owned()));
        }
    }

    /// Results so far, without flushing the pending print line.
    pub fn results(&self) -> &[ResultItem] {
        &self.results
    }

    /// All results, the pending partial print line last.
    pub fn finish(mut self) -> Vec<ResultItem> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.results.push(ResultItem::Text(rest));
        }
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::HtmlResult;
    use pretty_assertions::assert_eq;

    fn texts(items: &[ResultItem]) -> Vec<String> {
        items.iter().map(ResultItem::display_text).collect()
    }

    #[test]
    fn print_is_split_into_lines() {
        let mut out = OutputCapture::new();
        out.write("a\nb");
        out.write("c\n");
        assert_eq!(texts(&out.finish()), vec!["a", "bc"]);
    }

    #[test]
    fn partial_line_flushes_last() {
        let mut out = OutputCapture::new();
        out.write("partial");
        out.text("2".into());
        assert_eq!(texts(&out.finish()), vec!["2", "partial"]);
    }

    #[test]
    fn empty_lines_are_kept() {
        let mut out = OutputCapture::new();
        out.write("\n\n");
        assert_eq!(texts(&out.finish()), vec!["", ""]);
    }

    #[test]
    fn warnings_and_custom_results() {
        let mut out = OutputCapture::new();
        out.warning("careful".into());
        out.custom(Arc::new(HtmlResult {
            html: "<i>x</i>".into(),
        }));
        let results = out.finish();
        assert!(results[0].is_warning());
        assert_eq!(texts(&results), vec!["careful", "[html]"]);
        assert_eq!(results[1].plain_text(), "<i>x</i>");
    }
}

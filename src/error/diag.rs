use std::fmt::Write;

use crate::source::{Source, Span};

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagKind {
    /// A hard error; parsing stops after the first one.
    Error,
    /// A warning; currently unused by the parser but part of the
    /// handler contract.
    Warning,
}

impl DiagKind {
    /// The lowercase label used in rendered messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// A sink for compile-time diagnostics.
///
/// The parser reports every lexical and syntactic problem through a
/// handler together with the exact source span. The default handler
/// renders to stderr; tests plug in [`CollectingHandler`] to capture
/// structured text instead.
pub trait DiagHandler {
    /// Reports one diagnostic.
    fn report(&mut self, source: &Source, kind: DiagKind, span: Span, message: &str);
}

/// Renders a diagnostic in the standard three-line format.
///
/// The first line is `filename:line:col: kind: message`. When the
/// offending line is not empty it is echoed verbatim, followed by a
/// caret strip starting at the diagnostic's column. The strip is as
/// wide as the span, clamped to a single caret when the span is empty
/// or runs past the end of the line (as the comment-absorbed `NEWLINE`
/// token does).
#[must_use]
pub fn render(source: &Source, kind: DiagKind, span: Span, message: &str) -> String {
    let line = source.line_number(span.start);
    let line_start = source.line_start(line);
    let column = span.start - line_start + 1;

    let mut out = String::new();
    let _ = writeln!(out,
                     "{}:{}:{}: {}: {}",
                     source.filename(),
                     line,
                     column,
                     kind.label(),
                     message);

    let line_end = source.line_end(line);
    if line_start == line_end {
        return out;
    }
    let _ = writeln!(out, "{}", source.slice(Span::new(line_start, line_end)));

    let mut length = span.len();
    if length == 0 || span.end > line_end {
        length = 1;
    }
    let _ = writeln!(out, "{}{}", " ".repeat(column - 1), "^".repeat(length));
    out
}

/// The default handler: renders each diagnostic to stderr.
pub struct StderrHandler;

impl DiagHandler for StderrHandler {
    fn report(&mut self, source: &Source, kind: DiagKind, span: Span, message: &str) {
        eprint!("{}", render(source, kind, span, message));
    }
}

/// A handler that records diagnostics as `kind: line:col-len: message`
/// strings, one per report. Used by tests to assert exact positions.
#[derive(Debug, Default)]
pub struct CollectingHandler {
    /// The recorded diagnostics, in report order.
    pub messages: Vec<String>,
}

impl CollectingHandler {
    /// Creates an empty handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagHandler for CollectingHandler {
    fn report(&mut self, source: &Source, kind: DiagKind, span: Span, message: &str) {
        let line = source.line_number(span.start);
        let column = span.start - source.line_start(line) + 1;
        self.messages
            .push(format!("{}: {}:{}-{}: {}", kind.label(), line, column, span.len(), message));
    }
}

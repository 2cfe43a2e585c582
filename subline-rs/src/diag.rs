//! Source-located diagnostics.
//!
//! Every fatal template error points at a byte offset in the source text.
//! A [`Diagnostic`] captures the message together with the offending line
//! and a caret column, pre-rendered at construction so the error value
//! stays self-contained after the source buffer is gone:
//!
//! ```text
//! Unexpected character: %
//! text(red) % "x"
//!           ^
//! ```

use std::fmt;

use thiserror::Error;

// ── Span ──────────────────────────────────────────────────────────────────

/// Half-open byte range `[start, end)` into the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Zero-width span, used by the end-of-input sentinel token.
    #[inline]
    pub fn empty(at: usize) -> Self {
        Span { start: at, end: at }
    }
}

// ── Diagnostic ────────────────────────────────────────────────────────────

/// A fatal template error: message plus source line and caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    message: String,
    line: String,
    column: usize,
}

impl Diagnostic {
    /// Build a diagnostic whose caret points at byte `offset` of `source`.
    ///
    /// Offsets past the end of the input (the EOF sentinel) render with the
    /// caret one column past the last line.
    pub fn new(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_at(source, offset);
        Diagnostic {
            message: message.into(),
            line: line.to_owned(),
            column,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message)?;
        writeln!(f, "{}", self.line)?;
        write!(f, "{:1$}^", "", self.column)
    }
}

/// The full line containing byte `offset`, and the caret column within it.
fn line_at(source: &str, offset: usize) -> (&str, usize) {
    let offset = offset.min(source.len());
    let start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = source[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(source.len());
    (&source[start..end], offset - start)
}

// ── Error ─────────────────────────────────────────────────────────────────

/// Errors produced while rendering a prompt template.
///
/// Lexical, syntax, and evaluation failures are all fatal and carry a
/// [`Diagnostic`]; environmental misses (unset variable, no repo, failed
/// subprocess) never surface here, they degrade to empty text instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad byte or malformed literal while scanning.
    #[error("{0}")]
    Lex(Diagnostic),
    /// Token stream does not match the grammar.
    #[error("{0}")]
    Syntax(Diagnostic),
    /// Bad call, argument, or escape discovered during evaluation.
    #[error("{0}")]
    Eval(Diagnostic),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_on_first_line() {
        let d = Diagnostic::new("abc def", 4, "boom");
        assert_eq!(d.to_string(), "boom\nabc def\n    ^");
    }

    #[test]
    fn caret_on_middle_line() {
        let src = "one\ntwo three\nfour";
        let d = Diagnostic::new(src, 8, "bad");
        assert_eq!(d.to_string(), "bad\ntwo three\n    ^");
    }

    #[test]
    fn caret_at_line_start() {
        let d = Diagnostic::new("ab\ncd", 3, "x");
        assert_eq!(d.to_string(), "x\ncd\n^");
    }

    #[test]
    fn caret_at_end_of_input() {
        let d = Diagnostic::new("ab", 2, "eof");
        assert_eq!(d.to_string(), "eof\nab\n  ^");
    }

    #[test]
    fn offset_past_end_is_clamped() {
        let d = Diagnostic::new("ab", 99, "eof");
        assert_eq!(d.to_string(), "eof\nab\n  ^");
    }

    #[test]
    fn empty_source() {
        let d = Diagnostic::new("", 0, "nothing");
        assert_eq!(d.to_string(), "nothing\n\n^");
    }

    #[test]
    fn line_at_newline_boundary() {
        // Offset pointing at the newline itself belongs to the line before it.
        let (line, col) = line_at("ab\ncd", 2);
        assert_eq!(line, "ab");
        assert_eq!(col, 2);
    }
}

//! Parser error types.

use crate::lexer::Span;

/// Classification of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The statement could not be decomposed into a header and body.
    Malformed,
    /// The statement is not a recognised top-level schema form.
    UnsupportedStatement,
}

/// A parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// The location of the error in the schema text.
    pub span: Span,
    /// What went wrong.
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Creates a new error for a malformed statement.
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            kind: ParseErrorKind::Malformed,
        }
    }

    /// Creates an "expected X" error at `span`.
    #[must_use]
    pub fn expected(expected: &str, found: &str, span: Span) -> Self {
        Self::new(format!("Expected {expected}, found '{found}'"), span)
    }

    /// Creates an "unexpected end of statement" error.
    #[must_use]
    pub fn unexpected_end(expected: &str, span: Span) -> Self {
        Self::new(
            format!("Unexpected end of statement: expected {expected}"),
            span,
        )
    }

    /// Creates an error for a statement that is not part of a schema.
    #[must_use]
    pub fn unsupported(statement: &str, span: Span) -> Self {
        Self {
            message: format!("Unsupported statement: {statement}"),
            span,
            kind: ParseErrorKind::UnsupportedStatement,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at position {}..{}",
            self.message, self.span.start, self.span.end
        )
    }
}

impl std::error::Error for ParseError {}

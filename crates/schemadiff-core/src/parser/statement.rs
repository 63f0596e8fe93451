//! Splitting a schema script into top-level statements.

use tracing::trace;

use super::ParseError;
use crate::lexer::{Lexer, Span, Token, TokenKind};

/// One top-level statement of a script.
///
/// Tokens keep their absolute spans into the whole script, so error positions
/// and verbatim slices refer to the original text.
#[derive(Debug, Clone)]
pub struct Statement<'a> {
    /// The whole script this statement was cut from.
    pub source: &'a str,
    /// The statement's tokens, comments included, terminator excluded.
    pub tokens: Vec<Token>,
}

impl<'a> Statement<'a> {
    /// Returns the non-comment tokens of the statement.
    pub fn significant(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| !t.is_comment())
    }

    /// Returns the span from the first to the last non-comment token.
    #[must_use]
    pub fn span(&self) -> Span {
        let mut significant = self.significant();
        match significant.next() {
            Some(first) => significant.fold(first.span, |acc, t| acc.merge(t.span)),
            None => Span::default(),
        }
    }

    /// Returns the statement text without leading or trailing comments.
    #[must_use]
    pub fn text(&self) -> &'a str {
        self.span().text(self.source)
    }

    /// Returns true if the statement starts with the given keywords, in
    /// order, optionally skipping `TEMP`/`TEMPORARY` after `CREATE`.
    #[must_use]
    pub fn starts_with(&self, keywords: &[&str]) -> bool {
        let mut words = self
            .significant()
            .filter(|t| !(t.is_keyword("temp") || t.is_keyword("temporary")));
        keywords
            .iter()
            .all(|kw| words.next().is_some_and(|t| t.is_keyword(kw)))
    }
}

/// Returns true once `tokens` opens a `CREATE [TEMP] TRIGGER` statement.
fn is_trigger(tokens: &[Token]) -> bool {
    let mut words = tokens
        .iter()
        .filter(|t| !t.is_comment())
        .filter(|t| !(t.is_keyword("temp") || t.is_keyword("temporary")));
    matches!(
        (words.next(), words.next()),
        (Some(create), Some(trigger)) if create.is_keyword("create") && trigger.is_keyword("trigger")
    )
}

/// Splits `source` into statements on `;`, dropping empty statements.
///
/// Comments before a statement's first keyword belong to no statement and
/// are discarded. Trigger bodies, which contain `;`, are kept whole until
/// their closing `END`.
///
/// # Errors
///
/// Returns a [`ParseError`] for lexical errors such as an unterminated
/// string literal.
pub fn split_statements(source: &str) -> Result<Vec<Statement<'_>>, ParseError> {
    let mut statements = Vec::new();
    let mut current: Vec<Token> = Vec::new();

    for token in Lexer::new(source).tokenize() {
        match &token.kind {
            TokenKind::Error(message) => {
                return Err(ParseError::new(message.clone(), token.span));
            }
            TokenKind::Comment(_) if current.is_empty() => {
                trace!(comment = %token.span.text(source), "Dropping comment outside any statement");
            }
            TokenKind::Semicolon => {
                let in_trigger_body = is_trigger(&current)
                    && !current
                        .iter()
                        .rev()
                        .find(|t| !t.is_comment())
                        .is_some_and(|t| t.is_keyword("end"));
                if in_trigger_body {
                    current.push(token);
                } else {
                    flush(source, &mut current, &mut statements);
                }
            }
            _ => current.push(token),
        }
    }
    flush(source, &mut current, &mut statements);

    Ok(statements)
}

fn flush<'a>(source: &'a str, current: &mut Vec<Token>, statements: &mut Vec<Statement<'a>>) {
    let tokens = std::mem::take(current);
    if tokens.iter().any(|t| !t.is_comment()) {
        statements.push(Statement { source, tokens });
    }
}

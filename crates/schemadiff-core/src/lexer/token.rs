//! Token types for the schema lexer.

use super::Span;

/// The kind of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A bare word: identifier or keyword, exactly as written.
    Word(String),
    /// A quoted identifier (`"x"`, `` `x` `` or `[x]`), quotes removed.
    QuotedIdent(String),
    /// A string or blob literal, quotes removed.
    String(String),
    /// A numeric literal as written.
    Number(String),
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `.`
    Dot,
    /// A line (`-- ...`) or block (`/* ... */`) comment, delimiters removed
    /// and surrounding whitespace trimmed.
    Comment(String),
    /// Any other operator character.
    Operator(char),
    /// A lexical error (unterminated literal, stray character).
    Error(String),
}

/// A token with its location in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token kind.
    pub kind: TokenKind,
    /// The source location.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is a bare word matching `keyword`, ignoring case.
    #[must_use]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.kind, TokenKind::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    /// Returns the identifier this token names, unquoted.
    ///
    /// SQLite accepts string literals in identifier position, so those count.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Word(s) | TokenKind::QuotedIdent(s) | TokenKind::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the comment text if this is a comment token.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Comment(text) => Some(text),
            _ => None,
        }
    }

    /// Returns true if this is a comment token.
    #[must_use]
    pub const fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Comment(_))
    }

    /// Returns the canonical text used when comparing definitions.
    ///
    /// Words, numbers and punctuation are lower-cased; literals and quoted
    /// identifiers keep their exact spelling.
    #[must_use]
    pub fn canonical(&self, source: &str) -> String {
        let text = self.span.text(source);
        match self.kind {
            TokenKind::String(_) | TokenKind::QuotedIdent(_) => text.to_string(),
            _ => text.to_ascii_lowercase(),
        }
    }
}

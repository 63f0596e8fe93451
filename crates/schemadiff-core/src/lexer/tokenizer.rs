//! Tokenizer implementation.

use super::{Span, Token, TokenKind};

/// A lexer that tokenizes schema text, keeping comments as tokens.
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.pos))
    }

    /// Scans a `-- ...` comment up to (not including) the line break.
    fn scan_line_comment(&mut self) -> Token {
        self.advance();
        self.advance();
        let body_start = self.pos;
        while self.peek().is_some_and(|c| c != '\n') {
            self.advance();
        }
        let body = self.input[body_start..self.pos].trim();
        self.make_token(TokenKind::Comment(body.to_string()))
    }

    /// Scans a `/* ... */` comment. An unterminated block comment runs to the
    /// end of input, as it does in SQLite.
    fn scan_block_comment(&mut self) -> Token {
        self.advance();
        self.advance();
        let body_start = self.pos;
        let mut body_end = self.input.len();
        while let Some(c) = self.advance() {
            if c == '*' && self.peek() == Some('/') {
                body_end = self.pos - 1;
                self.advance();
                break;
            }
        }
        let body = self.input[body_start..body_end].trim();
        self.make_token(TokenKind::Comment(body.to_string()))
    }

    /// Scans a quoted run closed by `close`, where a doubled `close` escapes
    /// itself. Returns `None` if the input ends first.
    fn scan_quoted(&mut self, close: char) -> Option<String> {
        self.advance();
        let mut value = String::new();
        loop {
            match self.advance()? {
                c if c == close => {
                    if close != ']' && self.peek() == Some(close) {
                        value.push(close);
                        self.advance();
                    } else {
                        return Some(value);
                    }
                }
                c => value.push(c),
            }
        }
    }

    fn scan_string(&mut self) -> Token {
        match self.scan_quoted('\'') {
            Some(value) => self.make_token(TokenKind::String(value)),
            None => self.make_token(TokenKind::Error("Unterminated string literal".into())),
        }
    }

    fn scan_quoted_identifier(&mut self, close: char) -> Token {
        match self.scan_quoted(close) {
            Some(value) => self.make_token(TokenKind::QuotedIdent(value)),
            None => self.make_token(TokenKind::Error("Unterminated quoted identifier".into())),
        }
    }

    fn scan_number(&mut self) -> Token {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
        {
            let c = self.advance();
            // Exponent sign: 1e-5, 2E+3.
            if matches!(c, Some('e' | 'E')) && matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
        }
        let text = &self.input[self.start..self.pos];
        self.make_token(TokenKind::Number(text.to_string()))
    }

    /// Scans an identifier or keyword, or a blob literal (`x'00ff'`).
    fn scan_word(&mut self) -> Token {
        if matches!(self.peek(), Some('x' | 'X')) && self.peek_next() == Some('\'') {
            self.advance();
            return match self.scan_quoted('\'') {
                Some(value) => self.make_token(TokenKind::String(value)),
                None => self.make_token(TokenKind::Error("Unterminated blob literal".into())),
            };
        }
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            self.advance();
        }
        let text = &self.input[self.start..self.pos];
        self.make_token(TokenKind::Word(text.to_string()))
    }

    /// Scans the next token, or returns `None` at end of input.
    pub fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();
        self.start = self.pos;

        let c = self.peek()?;
        let next = self.peek_next();

        let token = match c {
            '-' if next == Some('-') => self.scan_line_comment(),
            '/' if next == Some('*') => self.scan_block_comment(),
            '\'' => self.scan_string(),
            '"' => self.scan_quoted_identifier('"'),
            '`' => self.scan_quoted_identifier('`'),
            '[' => self.scan_quoted_identifier(']'),
            '.' if next.is_some_and(|n| n.is_ascii_digit()) => self.scan_number(),
            c if c.is_ascii_digit() => self.scan_number(),
            c if c.is_alphabetic() || c == '_' => self.scan_word(),
            _ => {
                self.advance();
                let kind = match c {
                    '(' => TokenKind::LeftParen,
                    ')' => TokenKind::RightParen,
                    ',' => TokenKind::Comma,
                    ';' => TokenKind::Semicolon,
                    '.' => TokenKind::Dot,
                    '+' | '-' | '*' | '/' | '%' | '<' | '>' | '=' | '!' | '|' | '&' | '~'
                    | '?' | ':' | '@' | '#' => TokenKind::Operator(c),
                    other => TokenKind::Error(format!("Unexpected character: {other}")),
                };
                self.make_token(kind)
            }
        };
        Some(token)
    }

    /// Tokenizes the entire input and returns all tokens.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }
}

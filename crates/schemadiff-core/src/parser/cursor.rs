//! A cursor over the significant tokens of one statement or item.

use super::ParseError;
use crate::lexer::{Span, Token, TokenKind};
use crate::schema::{ForeignKeyAction, ForeignKeyClause};

pub(crate) struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
    /// Where "unexpected end" errors point.
    end: Span,
}

impl<'t> Cursor<'t> {
    /// Creates a cursor over comment-free tokens.
    pub(crate) fn new(tokens: &'t [Token]) -> Self {
        let end = tokens
            .last()
            .map_or_else(Span::default, |t| Span::new(t.span.end, t.span.end));
        Self {
            tokens,
            pos: 0,
            end,
        }
    }

    pub(crate) const fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    pub(crate) fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_keyword(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes the whole keyword sequence, or nothing.
    pub(crate) fn eat_keywords(&mut self, keywords: &[&str]) -> bool {
        let matches = keywords
            .iter()
            .enumerate()
            .all(|(i, kw)| self.tokens.get(self.pos + i).is_some_and(|t| t.is_keyword(kw)));
        if matches {
            self.pos += keywords.len();
        }
        matches
    }

    fn next_or_end(&mut self, expected: &str) -> Result<&'t Token, ParseError> {
        let end = self.end;
        self.next()
            .ok_or_else(|| ParseError::unexpected_end(expected, end))
    }

    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> Result<&'t Token, ParseError> {
        let token = self.next_or_end(&keyword.to_ascii_uppercase())?;
        if token.is_keyword(keyword) {
            Ok(token)
        } else {
            Err(ParseError::expected(
                &keyword.to_ascii_uppercase(),
                &format!("{:?}", token.kind),
                token.span,
            ))
        }
    }

    pub(crate) fn expect_kind(
        &mut self,
        kind: &TokenKind,
        expected: &str,
    ) -> Result<&'t Token, ParseError> {
        let token = self.next_or_end(expected)?;
        if &token.kind == kind {
            Ok(token)
        } else {
            Err(ParseError::expected(
                expected,
                &format!("{:?}", token.kind),
                token.span,
            ))
        }
    }

    pub(crate) fn expect_identifier(
        &mut self,
        what: &str,
    ) -> Result<(&'t Token, String), ParseError> {
        let token = self.next_or_end(what)?;
        token.identifier().map_or_else(
            || {
                Err(ParseError::expected(
                    what,
                    &format!("{:?}", token.kind),
                    token.span,
                ))
            },
            |name| Ok((token, name.to_string())),
        )
    }

    /// Parses `[schema.]name` and returns the first token and the bare name.
    pub(crate) fn object_name(&mut self, what: &str) -> Result<(&'t Token, String), ParseError> {
        let (first, mut name) = self.expect_identifier(what)?;
        if self.peek().is_some_and(|t| t.kind == TokenKind::Dot) {
            self.pos += 1;
            name = self.expect_identifier(what)?.1;
        }
        Ok((first, name))
    }

    /// Consumes a parenthesised group, nested groups included.
    pub(crate) fn skip_group(&mut self) -> Result<(), ParseError> {
        self.expect_kind(&TokenKind::LeftParen, "'('")?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.next_or_end("')'")?.kind {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }

    /// Parses `(a [COLLATE x] [ASC|DESC], b, ...)` and returns the column
    /// names.
    pub(crate) fn column_list(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect_kind(&TokenKind::LeftParen, "'('")?;
        let mut columns = Vec::new();
        let mut at_element_start = true;
        loop {
            let Some(token) = self.peek() else {
                return Err(ParseError::unexpected_end("')'", self.end));
            };
            match &token.kind {
                TokenKind::RightParen => {
                    self.pos += 1;
                    return Ok(columns);
                }
                TokenKind::Comma => {
                    self.pos += 1;
                    at_element_start = true;
                }
                TokenKind::LeftParen => {
                    self.skip_group()?;
                    at_element_start = false;
                }
                _ => {
                    self.pos += 1;
                    if at_element_start {
                        if let Some(name) = token.identifier() {
                            columns.push(name.to_string());
                        }
                    }
                    at_element_start = false;
                }
            }
        }
    }

    /// Skips an `ON CONFLICT <resolution>` clause if present.
    pub(crate) fn skip_conflict_clause(&mut self) {
        if self.eat_keywords(&["on", "conflict"]) {
            self.next();
        }
    }

    /// Parses the remainder of a `REFERENCES` clause, the keyword itself
    /// already consumed.
    pub(crate) fn references_clause(&mut self) -> Result<ForeignKeyClause, ParseError> {
        let (_, to_table) = self.object_name("referenced table")?;
        let mut clause = ForeignKeyClause::new(to_table);
        if self.peek().is_some_and(|t| t.kind == TokenKind::LeftParen) {
            clause.to_columns = self.column_list()?;
        }

        loop {
            if self.eat_keyword("on") {
                if self.eat_keyword("update") {
                    clause.on_update = self.foreign_key_action()?;
                } else {
                    self.expect_keyword("delete")?;
                    clause.on_delete = self.foreign_key_action()?;
                }
            } else if self.eat_keyword("match") {
                let (_, match_type) = self.expect_identifier("match type")?;
                clause.match_type = match_type.to_ascii_uppercase();
            } else if self.eat_keywords(&["not", "deferrable"]) || self.eat_keyword("deferrable") {
                if self.eat_keyword("initially") {
                    self.next();
                }
            } else {
                return Ok(clause);
            }
        }
    }

    fn foreign_key_action(&mut self) -> Result<ForeignKeyAction, ParseError> {
        if self.eat_keyword("set") {
            if self.eat_keyword("null") {
                return Ok(ForeignKeyAction::SetNull);
            }
            self.expect_keyword("default")?;
            return Ok(ForeignKeyAction::SetDefault);
        }
        if self.eat_keyword("cascade") {
            return Ok(ForeignKeyAction::Cascade);
        }
        if self.eat_keyword("restrict") {
            return Ok(ForeignKeyAction::Restrict);
        }
        self.expect_keyword("no")?;
        self.expect_keyword("action")?;
        Ok(ForeignKeyAction::NoAction)
    }
}

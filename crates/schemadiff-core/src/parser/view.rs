//! `CREATE VIEW` and `CREATE INDEX` parsing.

use super::cursor::Cursor;
use super::statement::Statement;
use super::ParseError;
use crate::lexer::{Span, Token, TokenKind};
use crate::schema::{UniqueIndexDef, ViewDef};

/// Parses a `CREATE VIEW` statement. The defining query is kept verbatim.
///
/// # Errors
///
/// Returns a [`ParseError`] if the header is malformed or the `AS` keyword
/// is missing.
pub fn parse_create_view(statement: &Statement<'_>) -> Result<ViewDef, ParseError> {
    let source = statement.source;
    let significant: Vec<Token> = statement.significant().cloned().collect();
    let mut cursor = Cursor::new(&significant);

    cursor.expect_keyword("create")?;
    let _ = cursor.eat_keyword("temp") || cursor.eat_keyword("temporary");
    cursor.expect_keyword("view")?;
    if cursor.eat_keyword("if") {
        cursor.expect_keyword("not")?;
        cursor.expect_keyword("exists")?;
    }
    let (name_token, name) = cursor.object_name("view name")?;
    let name_end = significant
        .get(cursor.pos() - 1)
        .map_or(name_token.span.end, |t| t.span.end);
    if cursor.peek().is_some_and(|t| t.kind == TokenKind::LeftParen) {
        cursor.column_list()?;
    }
    let as_token = cursor.expect_keyword("as")?;
    if cursor.peek().is_none() {
        return Err(ParseError::unexpected_end("query after AS", as_token.span));
    }

    let comments = statement
        .tokens
        .iter()
        .filter(|t| t.span.start >= name_end && t.span.end <= as_token.span.start)
        .filter_map(Token::comment)
        .map(String::from)
        .collect();

    let start = name_token.span.start;
    let normalized = significant
        .iter()
        .filter(|t| t.span.start >= start)
        .map(|t| t.canonical(source))
        .collect::<Vec<_>>()
        .join(" ");

    Ok(ViewDef {
        name,
        definition: Span::new(start, statement.span().end)
            .text(source)
            .to_string(),
        normalized,
        comments,
    })
}

/// Parses a `CREATE [UNIQUE] INDEX` statement.
///
/// Returns `None` for indexes that do not define a plain unique key:
/// non-unique indexes, partial indexes and indexes on expressions.
///
/// # Errors
///
/// Returns a [`ParseError`] if the statement is malformed.
pub fn parse_create_index(statement: &Statement<'_>) -> Result<Option<UniqueIndexDef>, ParseError> {
    let significant: Vec<Token> = statement.significant().cloned().collect();
    let mut cursor = Cursor::new(&significant);

    cursor.expect_keyword("create")?;
    let unique = cursor.eat_keyword("unique");
    cursor.expect_keyword("index")?;
    if cursor.eat_keyword("if") {
        cursor.expect_keyword("not")?;
        cursor.expect_keyword("exists")?;
    }
    let (_, name) = cursor.object_name("index name")?;
    cursor.expect_keyword("on")?;
    let (_, table) = cursor.expect_identifier("table name")?;

    let groups = significant
        .iter()
        .skip(cursor.pos())
        .filter(|t| t.kind == TokenKind::LeftParen)
        .count();
    let columns = cursor.column_list()?;
    let partial = cursor.eat_keyword("where");

    if !unique || partial || groups > 1 {
        return Ok(None);
    }
    Ok(Some(UniqueIndexDef {
        name,
        table,
        columns,
    }))
}

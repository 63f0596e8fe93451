//! `CREATE TABLE` parsing.
//!
//! The column list is split into top-level items on commas outside nested
//! parentheses, each item is classified once as a column or a table
//! constraint, and comments are attached to the item they follow. Comments
//! that come before the first item (after the table name or right after the
//! opening parenthesis) belong to the table header.

use std::ops::Range;

use super::cursor::Cursor;
use super::statement::Statement;
use super::ParseError;
use crate::lexer::{Span, Token, TokenKind};
use crate::schema::{ColumnDef, ConstraintKind, TableConstraint, TableDef};

/// Keywords that start a column constraint, ending the type name.
const COLUMN_CONSTRAINT_KEYWORDS: &[&str] = &[
    "constraint",
    "primary",
    "not",
    "null",
    "unique",
    "check",
    "default",
    "collate",
    "references",
    "generated",
    "as",
];

/// Keywords that start a table-level constraint.
const TABLE_CONSTRAINT_KEYWORDS: &[&str] = &["constraint", "primary", "unique", "check", "foreign"];

/// The tokens and comments of one top-level item of the column list.
#[derive(Debug, Default)]
struct Item {
    tokens: Vec<Token>,
    comments: Vec<String>,
}

impl Item {
    fn span(&self) -> Span {
        match (self.tokens.first(), self.tokens.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => Span::default(),
        }
    }

    fn is_constraint(&self) -> bool {
        self.tokens.first().is_some_and(|first| {
            TABLE_CONSTRAINT_KEYWORDS
                .iter()
                .any(|kw| first.is_keyword(kw))
        })
    }
}

/// Parses one `CREATE TABLE name (...) [options]` statement.
///
/// # Errors
///
/// Returns a [`ParseError`] if the statement has no parenthesised column
/// list, the list is unterminated or has an empty item, or an item cannot
/// be parsed.
pub fn parse_create_table(statement: &Statement<'_>) -> Result<TableDef, ParseError> {
    let source = statement.source;
    let tokens = &statement.tokens;
    let mut comments = Vec::new();

    let open = tokens
        .iter()
        .position(|t| t.kind == TokenKind::LeftParen)
        .ok_or_else(|| {
            ParseError::new("Expected '(' starting the column list", statement.span())
        })?;

    let header: Vec<Token> = tokens[..open]
        .iter()
        .filter(|t| !t.is_comment())
        .cloned()
        .collect();
    comments.extend(tokens[..open].iter().filter_map(Token::comment).map(String::from));

    let mut cursor = Cursor::new(&header);
    cursor.expect_keyword("create")?;
    let _ = cursor.eat_keyword("temp") || cursor.eat_keyword("temporary");
    cursor.expect_keyword("table")?;
    if cursor.eat_keyword("if") {
        cursor.expect_keyword("not")?;
        cursor.expect_keyword("exists")?;
    }
    let (name_token, name) = cursor.object_name("table name")?;
    let ident_token = header.get(cursor.pos() - 1).unwrap_or(name_token);
    if let Some(extra) = cursor.peek() {
        return Err(ParseError::expected(
            "'(' after table name",
            extra.span.text(source),
            extra.span,
        ));
    }

    let (items, close) = split_items(tokens, open, &mut comments)?;

    let mut options: Vec<String> = Vec::new();
    for token in &tokens[close + 1..] {
        match &token.kind {
            TokenKind::Comment(text) => comments.push(text.clone()),
            TokenKind::Comma => options.push(",".to_string()),
            TokenKind::Word(word) => options.push(word.to_ascii_lowercase()),
            _ => {
                return Err(ParseError::expected(
                    "table option",
                    token.span.text(source),
                    token.span,
                ))
            }
        }
    }

    let mut columns: Vec<ColumnDef> = Vec::new();
    let mut constraints = Vec::new();
    for item in items {
        if item.is_constraint() {
            constraints.push(parse_table_constraint(item, source)?);
        } else {
            let column = parse_column(item, source)?;
            if columns.iter().any(|c| c.name == column.name) {
                return Err(ParseError::new(
                    format!("Duplicate column '{}' in table '{name}'", column.name),
                    statement.span(),
                ));
            }
            columns.push(column);
        }
    }

    Ok(TableDef {
        ident: ident_token.span.text(source).to_string(),
        definition: Span::new(name_token.span.start, statement.span().end)
            .text(source)
            .to_string(),
        name,
        columns,
        constraints,
        options: join_options(&options),
        comments,
        indexes: Vec::new(),
    })
}

/// Splits the tokens after the opening parenthesis at `open` into items and
/// returns them with the index of the closing parenthesis.
fn split_items(
    tokens: &[Token],
    open: usize,
    header_comments: &mut Vec<String>,
) -> Result<(Vec<Item>, usize), ParseError> {
    let mut items: Vec<Item> = Vec::new();
    let mut current = Item::default();
    let mut depth = 0usize;

    for (index, token) in tokens.iter().enumerate().skip(open + 1) {
        match &token.kind {
            TokenKind::Comment(text) => {
                if !current.tokens.is_empty() {
                    current.comments.push(text.clone());
                } else if let Some(previous) = items.last_mut() {
                    previous.comments.push(text.clone());
                } else {
                    header_comments.push(text.clone());
                }
            }
            TokenKind::RightParen if depth == 0 => {
                if current.tokens.is_empty() {
                    return Err(ParseError::new("Empty column definition", token.span));
                }
                items.push(current);
                return Ok((items, index));
            }
            TokenKind::Comma if depth == 0 => {
                if current.tokens.is_empty() {
                    return Err(ParseError::new("Empty column definition", token.span));
                }
                items.push(std::mem::take(&mut current));
            }
            kind => {
                match kind {
                    TokenKind::LeftParen => depth += 1,
                    TokenKind::RightParen => depth -= 1,
                    _ => {}
                }
                current.tokens.push(token.clone());
            }
        }
    }

    let end = tokens.last().map_or_else(Span::default, |t| t.span);
    Err(ParseError::unexpected_end("')' closing the column list", end))
}

/// Joins option words as `strict, without rowid`.
fn join_options(pieces: &[String]) -> String {
    let mut options = String::new();
    for piece in pieces {
        if piece == "," {
            options.push(',');
        } else {
            if !options.is_empty() {
                options.push(' ');
            }
            options.push_str(piece);
        }
    }
    options
}

fn parse_column(item: Item, source: &str) -> Result<ColumnDef, ParseError> {
    let Item { tokens, comments } = item;
    let tokens = tokens.as_slice();
    let mut cursor = Cursor::new(tokens);
    let (name_token, name) = cursor.expect_identifier("column name")?;

    while let Some(token) = cursor.peek() {
        if COLUMN_CONSTRAINT_KEYWORDS.iter().any(|kw| token.is_keyword(kw)) {
            break;
        }
        if token.kind == TokenKind::LeftParen {
            cursor.skip_group()?;
        } else {
            cursor.next();
        }
    }
    let sql_type = (cursor.pos() > 1).then(|| slice(tokens, 1..cursor.pos(), source).to_string());

    let mut column = ColumnDef {
        ident: name_token.span.text(source).to_string(),
        definition: slice(tokens, 1..tokens.len(), source).to_string(),
        comments,
        sql_type,
        primary_key: false,
        unique: false,
        not_null: false,
        default: None,
        references: None,
        addable: String::new(),
        normalized: String::new(),
        name,
    };

    // Token ranges left out of ADD COLUMN text, and of the comparison key.
    let mut key_clauses: Vec<Range<usize>> = Vec::new();
    let mut reference_clauses: Vec<Range<usize>> = Vec::new();

    while cursor.peek().is_some() {
        let clause_start = cursor.pos();
        if cursor.eat_keyword("constraint") {
            cursor.next();
        }

        if cursor.eat_keyword("primary") {
            cursor.expect_keyword("key")?;
            let _ = cursor.eat_keyword("asc") || cursor.eat_keyword("desc");
            cursor.skip_conflict_clause();
            cursor.eat_keyword("autoincrement");
            column.primary_key = true;
            key_clauses.push(clause_start..cursor.pos());
        } else if cursor.eat_keyword("unique") {
            cursor.skip_conflict_clause();
            column.unique = true;
            key_clauses.push(clause_start..cursor.pos());
        } else if cursor.eat_keyword("not") {
            cursor.expect_keyword("null")?;
            cursor.skip_conflict_clause();
            column.not_null = true;
        } else if cursor.eat_keyword("null") {
            cursor.skip_conflict_clause();
        } else if cursor.eat_keyword("check") {
            cursor.skip_group()?;
        } else if cursor.eat_keyword("default") {
            let start = cursor.pos();
            match cursor.peek().map(|t| &t.kind) {
                Some(TokenKind::LeftParen) => cursor.skip_group()?,
                Some(TokenKind::Operator('+' | '-')) => {
                    cursor.next();
                    cursor.next();
                }
                _ => {
                    cursor.next();
                }
            }
            column.default = Some(slice(tokens, start..cursor.pos(), source).to_string());
        } else if cursor.eat_keyword("collate") {
            cursor.next();
        } else if cursor.eat_keyword("references") {
            column.references = Some(cursor.references_clause()?);
            reference_clauses.push(clause_start..cursor.pos());
        } else if cursor.eat_keyword("generated") || cursor.eat_keyword("as") {
            cursor.eat_keyword("always");
            cursor.eat_keyword("as");
            cursor.skip_group()?;
            let _ = cursor.eat_keyword("stored") || cursor.eat_keyword("virtual");
        } else {
            cursor.next();
        }
    }

    let in_any = |ranges: &[Range<usize>], index: usize| ranges.iter().any(|r| r.contains(&index));

    let mut addable = vec![column.ident.clone()];
    let mut run: Option<Range<usize>> = None;
    for index in 1..tokens.len() {
        if in_any(&key_clauses, index) {
            if let Some(r) = run.take() {
                addable.push(slice(tokens, r, source).to_string());
            }
        } else {
            run = Some(run.map_or(index..index + 1, |r| r.start..index + 1));
        }
    }
    if let Some(r) = run {
        addable.push(slice(tokens, r, source).to_string());
    }
    column.addable = addable.join(" ");

    column.normalized = (1..tokens.len())
        .filter(|&i| !in_any(&key_clauses, i) && !in_any(&reference_clauses, i))
        .map(|i| tokens[i].canonical(source))
        .collect::<Vec<_>>()
        .join(" ");

    Ok(column)
}

fn parse_table_constraint(item: Item, source: &str) -> Result<TableConstraint, ParseError> {
    let mut cursor = Cursor::new(&item.tokens);
    let name = if cursor.eat_keyword("constraint") {
        Some(cursor.expect_identifier("constraint name")?.1)
    } else {
        None
    };

    let kind = if cursor.eat_keyword("primary") {
        cursor.expect_keyword("key")?;
        ConstraintKind::PrimaryKey {
            columns: cursor.column_list()?,
        }
    } else if cursor.eat_keyword("unique") {
        ConstraintKind::Unique {
            columns: cursor.column_list()?,
        }
    } else if cursor.eat_keyword("check") {
        ConstraintKind::Check
    } else if cursor.eat_keyword("foreign") {
        cursor.expect_keyword("key")?;
        let columns = cursor.column_list()?;
        cursor.expect_keyword("references")?;
        ConstraintKind::ForeignKey {
            columns,
            references: cursor.references_clause()?,
        }
    } else {
        let span = item.span();
        return Err(ParseError::expected(
            "table constraint",
            span.text(source),
            span,
        ));
    };

    Ok(TableConstraint {
        name,
        kind,
        source: item.span().text(source).to_string(),
        comments: item.comments,
    })
}

/// Returns the verbatim source covered by `tokens[range]`.
fn slice<'s>(tokens: &[Token], range: Range<usize>, source: &'s str) -> &'s str {
    match (tokens.get(range.start), range.end.checked_sub(1).and_then(|i| tokens.get(i))) {
        (Some(first), Some(last)) if range.start < range.end => {
            first.span.merge(last.span).text(source)
        }
        _ => "",
    }
}

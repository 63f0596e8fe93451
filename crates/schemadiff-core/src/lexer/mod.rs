//! Comment-preserving SQL tokenizer.
//!
//! Schema diffing needs the comments that a regular SQL lexer throws away:
//! rename annotations live in trailing `--` comments, so comments are kept as
//! tokens and routed by the parser to the item they follow.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Token, TokenKind};
pub use tokenizer::Lexer;

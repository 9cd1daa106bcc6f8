//! Directive expression parsing.

pub mod lexer;
pub mod parser;

pub use parser::{parse_expression, parse_iterator, IteratorExpression};

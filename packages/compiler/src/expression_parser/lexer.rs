//! Expression Lexer
//!
//! Tokenizes the directive expression subset: identifiers, member chains,
//! calls, literals (including template literals), unary and binary operators.

use crate::error::{CompileError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Identifier(String),
    Number(f64),
    Str(String),
    /// Template literal split into raw text and `${...}` source fragments,
    /// parsed recursively by the parser.
    Template(Vec<TemplateToken>),
    Punct(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateToken {
    Text(String),
    Source(String),
}

/// Multi-character operators, longest first so lexing is greedy.
const PUNCTUATORS: &[&str] = &[
    "===", "!==", "...", "?.", "??", "&&", "||", "<=", ">=", "=>", "(", ")", "[", "]", "{", "}",
    ",", ".", ":", ";", "?", "!", "<", ">", "+", "-", "*", "/", "%", "=",
];

pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            let start = i;
            while i < chars.len()
                && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '$')
            {
                i += 1;
            }
            tokens.push(Token::Identifier(chars[start..i].iter().collect()));
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let value = text.parse::<f64>().map_err(|_| CompileError::ExpressionSyntax {
                source_text: source.to_string(),
                message: format!("invalid number literal \"{}\"", text),
            })?;
            tokens.push(Token::Number(value));
            continue;
        }

        if c == '"' || c == '\'' {
            let (value, next) = read_string(&chars, i, c, source)?;
            tokens.push(Token::Str(value));
            i = next;
            continue;
        }

        if c == '`' {
            let (parts, next) = read_template(&chars, i, source)?;
            tokens.push(Token::Template(parts));
            i = next;
            continue;
        }

        let rest: String = chars[i..].iter().collect();
        match PUNCTUATORS.iter().find(|p| rest.starts_with(*p)) {
            Some(punct) => {
                tokens.push(Token::Punct(punct));
                i += punct.len();
            }
            None => {
                return Err(CompileError::ExpressionSyntax {
                    source_text: source.to_string(),
                    message: format!("unexpected character '{}'", c),
                })
            }
        }
    }

    Ok(tokens)
}

fn read_string(
    chars: &[char],
    start: usize,
    quote: char,
    source: &str,
) -> Result<(String, usize)> {
    let mut value = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                value.push(unescape(chars[i + 1]));
                i += 2;
            }
            c if c == quote => return Ok((value, i + 1)),
            c => {
                value.push(c);
                i += 1;
            }
        }
    }
    Err(CompileError::ExpressionSyntax {
        source_text: source.to_string(),
        message: "unterminated string literal".to_string(),
    })
}

fn read_template(chars: &[char], start: usize, source: &str) -> Result<(Vec<TemplateToken>, usize)> {
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                text.push(unescape(chars[i + 1]));
                i += 2;
            }
            '`' => {
                if !text.is_empty() {
                    parts.push(TemplateToken::Text(text));
                }
                return Ok((parts, i + 1));
            }
            '$' if chars.get(i + 1) == Some(&'{') => {
                if !text.is_empty() {
                    parts.push(TemplateToken::Text(std::mem::take(&mut text)));
                }
                let mut depth = 1;
                let mut j = i + 2;
                let expr_start = j;
                while j < chars.len() && depth > 0 {
                    match chars[j] {
                        '{' => depth += 1,
                        '}' => depth -= 1,
                        _ => {}
                    }
                    j += 1;
                }
                if depth > 0 {
                    return Err(CompileError::ExpressionSyntax {
                        source_text: source.to_string(),
                        message: "unterminated template substitution".to_string(),
                    });
                }
                parts.push(TemplateToken::Source(
                    chars[expr_start..j - 1].iter().collect(),
                ));
                i = j;
            }
            c => {
                text.push(c);
                i += 1;
            }
        }
    }
    Err(CompileError::ExpressionSyntax {
        source_text: source.to_string(),
        message: "unterminated template literal".to_string(),
    })
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        other => other,
    }
}

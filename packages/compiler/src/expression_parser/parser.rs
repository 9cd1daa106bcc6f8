//! Expression Parser
//!
//! Precedence-climbing parser from directive/interpolation text into the
//! generated-code AST. Covers the expression grammar the template directives
//! accept; statements, arrow functions and regex literals are not part of the
//! directive surface.

use indexmap::IndexMap;

use super::lexer::{tokenize, Token, TemplateToken};
use crate::error::{CompileError, Result};
use crate::js::ast::{
    BinaryOperator, Expr, Literal, ObjectLiteral, TemplatePart, UnaryOperator,
};

/// Iterator expression from a `#for` parameter: `variable of subject`.
#[derive(Debug, Clone, PartialEq)]
pub struct IteratorExpression {
    pub variable: String,
    pub subject: Expr,
}

/// Parse a single expression from source text.
pub fn parse_expression(source: &str) -> Result<Expr> {
    let tokens = tokenize(source)?;
    let mut parser = Parser::new(source, tokens);
    let expr = parser.parse_assignment()?;
    parser.expect_end()?;
    Ok(expr)
}

/// Parse a `#for` parameter. Only the iterator form is supported; a C-style
/// triple (anything with `;`) is a directive syntax error.
pub fn parse_iterator(source: &str) -> Result<IteratorExpression> {
    if source.contains(';') {
        return Err(CompileError::ForParameterNotIterator {
            source_text: source.to_string(),
        });
    }
    let tokens = tokenize(source)?;
    let mut parser = Parser::new(source, tokens);
    let variable = match parser.next() {
        Some(Token::Identifier(name)) => name,
        _ => {
            return Err(CompileError::ForParameterNotIterator {
                source_text: source.to_string(),
            })
        }
    };
    match parser.next() {
        Some(Token::Identifier(ref of)) if of == "of" => {}
        _ => {
            return Err(CompileError::ForParameterNotIterator {
                source_text: source.to_string(),
            })
        }
    }
    let subject = parser.parse_assignment()?;
    parser.expect_end()?;
    Ok(IteratorExpression { variable, subject })
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    position: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str, tokens: Vec<Token>) -> Self {
        Parser {
            source,
            tokens,
            position: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn eat(&mut self, punct: &str) -> bool {
        if matches!(self.peek(), Some(Token::Punct(p)) if *p == punct) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &'static str) -> Result<()> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(self.error(format!("expected \"{}\"", punct)))
        }
    }

    fn expect_end(&mut self) -> Result<()> {
        if self.position == self.tokens.len() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing tokens".to_string()))
        }
    }

    fn error(&self, message: String) -> CompileError {
        CompileError::ExpressionSyntax {
            source_text: self.source.to_string(),
            message,
        }
    }

    fn parse_assignment(&mut self) -> Result<Expr> {
        let target = self.parse_conditional()?;
        if self.eat("=") {
            let value = self.parse_assignment()?;
            return Ok(target.assign(value));
        }
        Ok(target)
    }

    fn parse_conditional(&mut self) -> Result<Expr> {
        let condition = self.parse_binary(0)?;
        if self.eat("?") {
            let truthy = self.parse_assignment()?;
            self.expect(":")?;
            let falsy = self.parse_assignment()?;
            return Ok(Expr::Conditional {
                condition: Box::new(condition),
                truthy: Box::new(truthy),
                falsy: Box::new(falsy),
            });
        }
        Ok(condition)
    }

    fn binary_operator(&self) -> Option<(BinaryOperator, u8)> {
        let punct = match self.peek() {
            Some(Token::Punct(p)) => *p,
            _ => return None,
        };
        let (operator, precedence) = match punct {
            "??" => (BinaryOperator::NullCoalescing, 1),
            "||" => (BinaryOperator::LogicalOr, 2),
            "&&" => (BinaryOperator::LogicalAnd, 3),
            "===" => (BinaryOperator::Equal, 4),
            "!==" => (BinaryOperator::NotEqual, 4),
            "<" => (BinaryOperator::LessThan, 5),
            "<=" => (BinaryOperator::LessThanOrEqual, 5),
            ">" => (BinaryOperator::GreaterThan, 5),
            ">=" => (BinaryOperator::GreaterThanOrEqual, 5),
            "+" => (BinaryOperator::Add, 6),
            "-" => (BinaryOperator::Subtract, 6),
            "*" => (BinaryOperator::Multiply, 7),
            "/" => (BinaryOperator::Divide, 7),
            "%" => (BinaryOperator::Modulo, 7),
            _ => return None,
        };
        Some((operator, precedence))
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        while let Some((operator, precedence)) = self.binary_operator() {
            if precedence < min_precedence {
                break;
            }
            self.position += 1;
            let rhs = self.parse_binary(precedence + 1)?;
            lhs = lhs.binary(operator, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.eat("!") {
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                operator: UnaryOperator::Not,
                operand: Box::new(operand),
            });
        }
        if self.eat("-") {
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                operator: UnaryOperator::Negate,
                operand: Box::new(operand),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(".") {
                let name = self.identifier()?;
                expr = expr.property(name);
            } else if self.eat("?.") {
                if self.eat("(") {
                    let arguments = self.parse_arguments()?;
                    expr = expr.optional_call(arguments);
                } else {
                    let name = self.identifier()?;
                    expr = expr.optional_property(name);
                }
            } else if self.eat("[") {
                let index = self.parse_assignment()?;
                self.expect("]")?;
                expr = expr.index(index);
            } else if self.eat("(") {
                let arguments = self.parse_arguments()?;
                expr = expr.call(arguments);
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>> {
        let mut arguments = Vec::new();
        if self.eat(")") {
            return Ok(arguments);
        }
        loop {
            if self.eat("...") {
                arguments.push(self.parse_assignment()?.spread());
            } else {
                arguments.push(self.parse_assignment()?);
            }
            if self.eat(")") {
                return Ok(arguments);
            }
            self.expect(",")?;
        }
    }

    fn identifier(&mut self) -> Result<String> {
        match self.next() {
            Some(Token::Identifier(name)) => Ok(name),
            _ => Err(self.error("expected identifier".to_string())),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.next() {
            Some(Token::Identifier(name)) => Ok(match name.as_str() {
                "true" => Expr::boolean(true),
                "false" => Expr::boolean(false),
                "null" => Expr::Literal(Literal::Null),
                _ => Expr::Identifier(name),
            }),
            Some(Token::Number(value)) => Ok(Expr::number(value)),
            Some(Token::Str(value)) => Ok(Expr::string(value)),
            Some(Token::Template(parts)) => {
                let mut rendered = Vec::new();
                for part in parts {
                    match part {
                        TemplateToken::Text(text) => rendered.push(TemplatePart::Text(text)),
                        TemplateToken::Source(source) => {
                            rendered.push(TemplatePart::Expr(parse_expression(&source)?))
                        }
                    }
                }
                Ok(Expr::TemplateLiteral(rendered))
            }
            Some(Token::Punct("(")) => {
                let inner = self.parse_assignment()?;
                self.expect(")")?;
                Ok(inner)
            }
            Some(Token::Punct("[")) => {
                let mut elements = Vec::new();
                if self.eat("]") {
                    return Ok(Expr::ArrayLiteral(elements));
                }
                loop {
                    elements.push(self.parse_assignment()?);
                    if self.eat("]") {
                        return Ok(Expr::ArrayLiteral(elements));
                    }
                    self.expect(",")?;
                }
            }
            Some(Token::Punct("{")) => {
                let mut values = IndexMap::new();
                if self.eat("}") {
                    return Ok(Expr::ObjectLiteral(ObjectLiteral { values }));
                }
                loop {
                    let key = match self.next() {
                        Some(Token::Identifier(name)) => name,
                        Some(Token::Str(value)) => value,
                        _ => return Err(self.error("expected object key".to_string())),
                    };
                    let value = if self.eat(":") {
                        self.parse_assignment()?
                    } else {
                        // Shorthand `{ title }`
                        Expr::Identifier(key.clone())
                    };
                    values.insert(key, value);
                    if self.eat("}") {
                        return Ok(Expr::ObjectLiteral(ObjectLiteral { values }));
                    }
                    self.expect(",")?;
                }
            }
            Some(other) => Err(self.error(format!("unexpected token {:?}", other))),
            None => Err(self.error("unexpected end of expression".to_string())),
        }
    }
}

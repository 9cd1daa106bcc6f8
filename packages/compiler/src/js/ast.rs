//! Generated Code AST
//!
//! Defines the expression and statement nodes that both code generators emit
//! and that the directive expression parser produces. One node set serves both
//! directions so a parsed binding expression can be spliced unmodified into
//! generated accessor functions.

use indexmap::IndexMap;
use serde::Serialize;

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    Not,
    Negate,
    Delete,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LogicalAnd,
    LogicalOr,
    NullCoalescing,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Equal => "===",
            BinaryOperator::NotEqual => "!==",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::LogicalAnd => "&&",
            BinaryOperator::LogicalOr => "||",
            BinaryOperator::NullCoalescing => "??",
        }
    }
}

/// Literal primitive (string, number, boolean, null)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
}

/// One piece of a template literal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TemplatePart {
    Text(String),
    Expr(Expr),
}

/// Object literal with deterministic key order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ObjectLiteral {
    pub values: IndexMap<String, Expr>,
}

impl ObjectLiteral {
    pub fn new() -> Self {
        ObjectLiteral {
            values: IndexMap::new(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: Expr) {
        self.values.insert(key.into(), value);
    }
}

/// Function declaration or arrow function body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub name: Option<String>,
    pub parameters: Vec<String>,
    pub statements: Vec<Statement>,
}

impl Function {
    pub fn new(
        name: Option<String>,
        parameters: Vec<String>,
        statements: Vec<Statement>,
    ) -> Self {
        Function {
            name,
            parameters,
            statements,
        }
    }
}

/// Statements generated into accessor bodies and render methods
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    Expression(Expr),
    Return(Option<Expr>),
}

/// Expression node union
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum Expr {
    Identifier(String),
    PropertyAccess {
        parent: Box<Expr>,
        name: String,
        optional: bool,
    },
    Index {
        parent: Box<Expr>,
        index: Box<Expr>,
        optional: bool,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        optional: bool,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Expr>,
    },
    Binary {
        operator: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assignment {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        truthy: Box<Expr>,
        falsy: Box<Expr>,
    },
    Spread(Box<Expr>),
    Literal(Literal),
    TemplateLiteral(Vec<TemplatePart>),
    ObjectLiteral(ObjectLiteral),
    ArrayLiteral(Vec<Expr>),
    FunctionExpression(Box<Function>),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Expr {
        Expr::Identifier(name.into())
    }

    pub fn string(value: impl Into<String>) -> Expr {
        Expr::Literal(Literal::String(value.into()))
    }

    pub fn number(value: f64) -> Expr {
        Expr::Literal(Literal::Number(value))
    }

    pub fn boolean(value: bool) -> Expr {
        Expr::Literal(Literal::Boolean(value))
    }

    /// Builds `a.b.c` style member chains from a list of names.
    pub fn from_chain<I, S>(parts: I) -> Expr
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut iter = parts.into_iter();
        let first = iter
            .next()
            .map(|p| Expr::Identifier(p.into()))
            .unwrap_or_else(|| Expr::Identifier(String::new()));
        iter.fold(first, |parent, name| parent.property(name))
    }

    pub fn property(self, name: impl Into<String>) -> Expr {
        Expr::PropertyAccess {
            parent: Box::new(self),
            name: name.into(),
            optional: false,
        }
    }

    pub fn optional_property(self, name: impl Into<String>) -> Expr {
        Expr::PropertyAccess {
            parent: Box::new(self),
            name: name.into(),
            optional: true,
        }
    }

    pub fn index(self, index: Expr) -> Expr {
        Expr::Index {
            parent: Box::new(self),
            index: Box::new(index),
            optional: false,
        }
    }

    pub fn index_number(self, index: usize) -> Expr {
        self.index(Expr::number(index as f64))
    }

    pub fn call(self, arguments: Vec<Expr>) -> Expr {
        Expr::Call {
            callee: Box::new(self),
            arguments,
            optional: false,
        }
    }

    pub fn optional_call(self, arguments: Vec<Expr>) -> Expr {
        Expr::Call {
            callee: Box::new(self),
            arguments,
            optional: true,
        }
    }

    pub fn assign(self, value: Expr) -> Expr {
        Expr::Assignment {
            target: Box::new(self),
            value: Box::new(value),
        }
    }

    pub fn binary(self, operator: BinaryOperator, rhs: Expr) -> Expr {
        Expr::Binary {
            operator,
            lhs: Box::new(self),
            rhs: Box::new(rhs),
        }
    }

    pub fn spread(self) -> Expr {
        Expr::Spread(Box::new(self))
    }

    pub fn arrow(parameters: Vec<String>, statements: Vec<Statement>) -> Expr {
        Expr::FunctionExpression(Box::new(Function::new(None, parameters, statements)))
    }
}

/// `this.data`, the aliasing target for client-side bound expressions.
pub fn this_data_variable() -> Expr {
    Expr::from_chain(["this", "data"])
}

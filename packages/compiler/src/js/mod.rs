//! Generated-code AST, printer and variable rewriting utilities.

pub mod ast;
pub mod emitter;
pub mod variables;

pub use ast::{
    this_data_variable, BinaryOperator, Expr, Function, Literal, ObjectLiteral, Statement,
    TemplatePart, UnaryOperator,
};
pub use emitter::{render_expression, render_function, render_statement, EmitSettings};
pub use variables::{alias_variables, chain_parts, referenced_chains, replace_variables, PathPart};

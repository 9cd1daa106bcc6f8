//! Variable Utilities
//!
//! Chain extraction, the "variables referenced" query, and the in-place
//! rewriting passes (aliasing to `this.data`/`data`, substituting the `value`
//! parameter) that let one parsed expression serve the client renderer, the
//! server renderer and the generated accessor functions.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use super::ast::{Expr, Literal, Statement, TemplatePart};

/// One segment of a plain member chain as it appears in source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathPart {
    Name(String),
    Number(u32),
}

/// Identifiers that are never data references.
static JS_GLOBALS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "window", "document", "console", "event", "Math", "JSON", "Date", "Object", "Array",
        "String", "Number", "Boolean", "undefined", "NaN", "Infinity", "parseInt", "parseFloat",
        "isNaN",
    ]
    .into_iter()
    .collect()
});

pub fn is_js_global(name: &str) -> bool {
    JS_GLOBALS.contains(name)
}

/// Extract `a.b[0].c` style chains. Returns `None` for anything that is not a
/// plain member chain rooted at an identifier.
pub fn chain_parts(expr: &Expr) -> Option<Vec<PathPart>> {
    match expr {
        Expr::Identifier(name) => Some(vec![PathPart::Name(name.clone())]),
        Expr::PropertyAccess { parent, name, .. } => {
            let mut parts = chain_parts(parent)?;
            parts.push(PathPart::Name(name.clone()));
            Some(parts)
        }
        Expr::Index { parent, index, .. } => {
            if let Expr::Literal(Literal::Number(n)) = index.as_ref() {
                let mut parts = chain_parts(parent)?;
                parts.push(PathPart::Number(*n as u32));
                Some(parts)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// List every variable chain an expression depends on, in evaluation order and
/// deduplicated. A chain used as a call target drops its final (method name)
/// segment: `title.toUpperCase()` depends on `title`.
pub fn referenced_chains(expr: &Expr) -> Vec<Vec<PathPart>> {
    let mut chains = Vec::new();
    let mut shadowed = Vec::new();
    collect(expr, &mut chains, &mut shadowed, false);
    chains
}

fn push_chain(chain: Vec<PathPart>, chains: &mut Vec<Vec<PathPart>>, shadowed: &[String]) {
    if let Some(PathPart::Name(root)) = chain.first() {
        if root == "this" || is_js_global(root) || shadowed.iter().any(|s| s == root) {
            return;
        }
        if !chains.contains(&chain) {
            chains.push(chain);
        }
    }
}

fn collect(
    expr: &Expr,
    chains: &mut Vec<Vec<PathPart>>,
    shadowed: &mut Vec<String>,
    as_callee: bool,
) {
    if let Some(mut chain) = chain_parts(expr) {
        if as_callee {
            chain.pop();
            if chain.is_empty() {
                return;
            }
        }
        push_chain(chain, chains, shadowed);
        return;
    }

    match expr {
        Expr::Identifier(_) => {}
        Expr::PropertyAccess { parent, .. } => collect(parent, chains, shadowed, false),
        Expr::Index { parent, index, .. } => {
            collect(parent, chains, shadowed, false);
            collect(index, chains, shadowed, false);
        }
        Expr::Call {
            callee, arguments, ..
        } => {
            collect(callee, chains, shadowed, true);
            for argument in arguments {
                collect(argument, chains, shadowed, false);
            }
        }
        Expr::Unary { operand, .. } => collect(operand, chains, shadowed, false),
        Expr::Binary { lhs, rhs, .. } => {
            collect(lhs, chains, shadowed, false);
            collect(rhs, chains, shadowed, false);
        }
        Expr::Assignment { target, value } => {
            collect(target, chains, shadowed, false);
            collect(value, chains, shadowed, false);
        }
        Expr::Conditional {
            condition,
            truthy,
            falsy,
        } => {
            collect(condition, chains, shadowed, false);
            collect(truthy, chains, shadowed, false);
            collect(falsy, chains, shadowed, false);
        }
        Expr::Spread(inner) => collect(inner, chains, shadowed, false),
        Expr::Literal(_) => {}
        Expr::TemplateLiteral(parts) => {
            for part in parts {
                if let TemplatePart::Expr(inner) = part {
                    collect(inner, chains, shadowed, false);
                }
            }
        }
        Expr::ObjectLiteral(object) => {
            for value in object.values.values() {
                collect(value, chains, shadowed, false);
            }
        }
        Expr::ArrayLiteral(elements) => {
            for element in elements {
                collect(element, chains, shadowed, false);
            }
        }
        Expr::FunctionExpression(function) => {
            let introduced = function.parameters.len();
            shadowed.extend(function.parameters.iter().cloned());
            for statement in &function.statements {
                match statement {
                    Statement::Expression(inner) => collect(inner, chains, shadowed, false),
                    Statement::Return(Some(inner)) => collect(inner, chains, shadowed, false),
                    Statement::Return(None) => {}
                }
            }
            shadowed.truncate(shadowed.len() - introduced);
        }
    }
}

/// Rewrite every variable reference in place so it resolves through `prefix`
/// (`title` becomes `this.data.title`). Names in `except`, JS globals and
/// `this` are left alone; arrow parameters shadow within their body.
pub fn alias_variables(expr: &mut Expr, prefix: &Expr, except: &[String]) {
    let mut shadowed: Vec<String> = except.to_vec();
    alias_walk(expr, prefix, &mut shadowed);
}

fn alias_walk(expr: &mut Expr, prefix: &Expr, shadowed: &mut Vec<String>) {
    match expr {
        Expr::Identifier(name) => {
            if name != "this" && !is_js_global(name) && !shadowed.iter().any(|s| s == name) {
                let replacement = prefix.clone().property(name.clone());
                *expr = replacement;
            }
        }
        Expr::PropertyAccess { parent, .. } => alias_walk(parent, prefix, shadowed),
        Expr::Index { parent, index, .. } => {
            alias_walk(parent, prefix, shadowed);
            alias_walk(index, prefix, shadowed);
        }
        Expr::Call {
            callee, arguments, ..
        } => {
            alias_walk(callee, prefix, shadowed);
            for argument in arguments {
                alias_walk(argument, prefix, shadowed);
            }
        }
        Expr::Unary { operand, .. } => alias_walk(operand, prefix, shadowed),
        Expr::Binary { lhs, rhs, .. } => {
            alias_walk(lhs, prefix, shadowed);
            alias_walk(rhs, prefix, shadowed);
        }
        Expr::Assignment { target, value } => {
            alias_walk(target, prefix, shadowed);
            alias_walk(value, prefix, shadowed);
        }
        Expr::Conditional {
            condition,
            truthy,
            falsy,
        } => {
            alias_walk(condition, prefix, shadowed);
            alias_walk(truthy, prefix, shadowed);
            alias_walk(falsy, prefix, shadowed);
        }
        Expr::Spread(inner) => alias_walk(inner, prefix, shadowed),
        Expr::Literal(_) => {}
        Expr::TemplateLiteral(parts) => {
            for part in parts {
                if let TemplatePart::Expr(inner) = part {
                    alias_walk(inner, prefix, shadowed);
                }
            }
        }
        Expr::ObjectLiteral(object) => {
            for value in object.values.values_mut() {
                alias_walk(value, prefix, shadowed);
            }
        }
        Expr::ArrayLiteral(elements) => {
            for element in elements {
                alias_walk(element, prefix, shadowed);
            }
        }
        Expr::FunctionExpression(function) => {
            let introduced = function.parameters.len();
            shadowed.extend(function.parameters.iter().cloned());
            for statement in &mut function.statements {
                match statement {
                    Statement::Expression(inner) => alias_walk(inner, prefix, shadowed),
                    Statement::Return(Some(inner)) => alias_walk(inner, prefix, shadowed),
                    Statement::Return(None) => {}
                }
            }
            shadowed.truncate(shadowed.len() - introduced);
        }
    }
}

/// Replace every occurrence of any of `targets` (matched structurally as a
/// chain) with `replacement`.
pub fn replace_variables(expr: &mut Expr, replacement: &Expr, targets: &[Vec<PathPart>]) {
    if let Some(chain) = chain_parts(expr) {
        if targets.contains(&chain) {
            *expr = replacement.clone();
            return;
        }
    }
    match expr {
        Expr::Identifier(_) | Expr::Literal(_) => {}
        Expr::PropertyAccess { parent, .. } => replace_variables(parent, replacement, targets),
        Expr::Index { parent, index, .. } => {
            replace_variables(parent, replacement, targets);
            replace_variables(index, replacement, targets);
        }
        Expr::Call {
            callee, arguments, ..
        } => {
            replace_variables(callee, replacement, targets);
            for argument in arguments {
                replace_variables(argument, replacement, targets);
            }
        }
        Expr::Unary { operand, .. } => replace_variables(operand, replacement, targets),
        Expr::Binary { lhs, rhs, .. } => {
            replace_variables(lhs, replacement, targets);
            replace_variables(rhs, replacement, targets);
        }
        Expr::Assignment { target, value } => {
            replace_variables(target, replacement, targets);
            replace_variables(value, replacement, targets);
        }
        Expr::Conditional {
            condition,
            truthy,
            falsy,
        } => {
            replace_variables(condition, replacement, targets);
            replace_variables(truthy, replacement, targets);
            replace_variables(falsy, replacement, targets);
        }
        Expr::Spread(inner) => replace_variables(inner, replacement, targets),
        Expr::TemplateLiteral(parts) => {
            for part in parts {
                if let TemplatePart::Expr(inner) = part {
                    replace_variables(inner, replacement, targets);
                }
            }
        }
        Expr::ObjectLiteral(object) => {
            for value in object.values.values_mut() {
                replace_variables(value, replacement, targets);
            }
        }
        Expr::ArrayLiteral(elements) => {
            for element in elements {
                replace_variables(element, replacement, targets);
            }
        }
        Expr::FunctionExpression(function) => {
            for statement in &mut function.statements {
                match statement {
                    Statement::Expression(inner) => replace_variables(inner, replacement, targets),
                    Statement::Return(Some(inner)) => {
                        replace_variables(inner, replacement, targets)
                    }
                    Statement::Return(None) => {}
                }
            }
        }
    }
}

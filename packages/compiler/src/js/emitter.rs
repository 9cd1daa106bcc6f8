//! Code Printer
//!
//! Serializes generated AST nodes back to JavaScript source text under a
//! settings object. Operator precedence decides parenthesization so emitted
//! text never depends on how an expression tree was constructed.

use serde::{Deserialize, Serialize};

use super::ast::{
    BinaryOperator, Expr, Function, Literal, ObjectLiteral, Statement, TemplatePart,
    UnaryOperator,
};

/// Module format of the emitted bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleFormat {
    Esm,
    Cjs,
}

/// Target dialect of emitted code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptTarget {
    JavaScript,
    TypeScript,
}

/// Printer settings shared by every emitting call site
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmitSettings {
    pub minify: bool,
    pub module_format: ModuleFormat,
    pub script_target: ScriptTarget,
}

impl Default for EmitSettings {
    fn default() -> Self {
        EmitSettings {
            minify: false,
            module_format: ModuleFormat::Esm,
            script_target: ScriptTarget::JavaScript,
        }
    }
}

impl EmitSettings {
    pub fn minified() -> Self {
        EmitSettings {
            minify: true,
            ..Default::default()
        }
    }
}

// Precedence bands, higher binds tighter.
const PREC_PRIMARY: u8 = 20;
const PREC_MEMBER: u8 = 18;
const PREC_UNARY: u8 = 15;
const PREC_CONDITIONAL: u8 = 4;
const PREC_ASSIGN: u8 = 3;
const PREC_SPREAD: u8 = 2;

fn binary_precedence(operator: BinaryOperator) -> u8 {
    match operator {
        BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => 14,
        BinaryOperator::Add | BinaryOperator::Subtract => 13,
        BinaryOperator::LessThan
        | BinaryOperator::LessThanOrEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterThanOrEqual => 11,
        BinaryOperator::Equal | BinaryOperator::NotEqual => 10,
        BinaryOperator::LogicalAnd => 6,
        BinaryOperator::LogicalOr => 5,
        // `??` may not mix bare with `&&`/`||`; the Binary arm adds the
        // mandatory parentheses around logical operands.
        BinaryOperator::NullCoalescing => 4,
    }
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Identifier(_)
        | Expr::Literal(_)
        | Expr::TemplateLiteral(_)
        | Expr::ObjectLiteral(_)
        | Expr::ArrayLiteral(_)
        | Expr::FunctionExpression(_) => PREC_PRIMARY,
        Expr::PropertyAccess { .. } | Expr::Index { .. } | Expr::Call { .. } => PREC_MEMBER,
        Expr::Unary { .. } => PREC_UNARY,
        Expr::Binary { operator, .. } => binary_precedence(*operator),
        Expr::Conditional { .. } => PREC_CONDITIONAL,
        Expr::Assignment { .. } => PREC_ASSIGN,
        Expr::Spread(_) => PREC_SPREAD,
    }
}

/// Render an expression to source text.
pub fn render_expression(expr: &Expr, settings: &EmitSettings) -> String {
    render_at(expr, settings, 0)
}

/// Render a statement (with trailing semicolon).
pub fn render_statement(statement: &Statement, settings: &EmitSettings) -> String {
    match statement {
        Statement::Expression(expr) => format!("{};", render_at(expr, settings, 0)),
        Statement::Return(Some(expr)) => {
            format!("return {};", render_at(expr, settings, 0))
        }
        Statement::Return(None) => "return;".to_string(),
    }
}

/// Render a function. Named functions use method shorthand (they attach to a
/// generated class body), anonymous functions render as arrows.
pub fn render_function(function: &Function, settings: &EmitSettings) -> String {
    let params = function.parameters.join(if settings.minify { "," } else { ", " });
    match &function.name {
        Some(name) => format!(
            "{}({}){}{}",
            name,
            params,
            if settings.minify { "" } else { " " },
            render_block(&function.statements, settings)
        ),
        None => render_arrow(function, settings),
    }
}

fn render_arrow(function: &Function, settings: &EmitSettings) -> String {
    let params = match function.parameters.as_slice() {
        [single] => single.clone(),
        many => format!(
            "({})",
            many.join(if settings.minify { "," } else { ", " })
        ),
    };
    let arrow = if settings.minify { "=>" } else { " => " };
    // Single-return bodies collapse to the concise form.
    if let [Statement::Return(Some(value))] = function.statements.as_slice() {
        let body = render_at(value, settings, 0);
        let body = if matches!(value, Expr::ObjectLiteral(_)) {
            format!("({})", body)
        } else {
            body
        };
        return format!("{}{}{}", params, arrow, body);
    }
    format!(
        "{}{}{}",
        params,
        arrow,
        render_block(&function.statements, settings)
    )
}

fn render_block(statements: &[Statement], settings: &EmitSettings) -> String {
    if settings.minify {
        let body: Vec<String> = statements
            .iter()
            .map(|s| render_statement(s, settings))
            .collect();
        format!("{{{}}}", body.join(""))
    } else {
        let body: Vec<String> = statements
            .iter()
            .map(|s| format!("    {}", render_statement(s, settings)))
            .collect();
        format!("{{\n{}\n}}", body.join("\n"))
    }
}

fn render_at(expr: &Expr, settings: &EmitSettings, parent_precedence: u8) -> String {
    let rendered = match expr {
        Expr::Identifier(name) => name.clone(),
        Expr::PropertyAccess {
            parent,
            name,
            optional,
        } => format!(
            "{}{}{}",
            render_at(parent, settings, PREC_MEMBER),
            if *optional { "?." } else { "." },
            name
        ),
        Expr::Index {
            parent,
            index,
            optional,
        } => format!(
            "{}{}[{}]",
            render_at(parent, settings, PREC_MEMBER),
            if *optional { "?." } else { "" },
            render_at(index, settings, 0)
        ),
        Expr::Call {
            callee,
            arguments,
            optional,
        } => {
            let args: Vec<String> = arguments
                .iter()
                .map(|a| render_at(a, settings, PREC_SPREAD))
                .collect();
            format!(
                "{}{}({})",
                render_at(callee, settings, PREC_MEMBER),
                if *optional { "?." } else { "" },
                args.join(if settings.minify { "," } else { ", " })
            )
        }
        Expr::Unary { operator, operand } => {
            let symbol = match operator {
                UnaryOperator::Not => "!",
                UnaryOperator::Negate => "-",
                UnaryOperator::Delete => "delete ",
            };
            format!("{}{}", symbol, render_at(operand, settings, PREC_UNARY))
        }
        Expr::Binary { operator, lhs, rhs } => {
            let prec = binary_precedence(*operator);
            let space = if settings.minify { "" } else { " " };
            // A `&&` or `||` operand of `??` must carry parentheses, the
            // grammar rejects the bare mix. Rendering such operands above
            // the logical band forces the wrap.
            let operand_prec = |operand: &Expr, base: u8| {
                if *operator == BinaryOperator::NullCoalescing
                    && matches!(
                        operand,
                        Expr::Binary {
                            operator: BinaryOperator::LogicalAnd
                                | BinaryOperator::LogicalOr,
                            ..
                        }
                    )
                {
                    7
                } else {
                    base
                }
            };
            format!(
                "{}{}{}{}{}",
                render_at(lhs, settings, operand_prec(lhs, prec)),
                space,
                operator.symbol(),
                space,
                // Right operand of equal precedence re-parenthesizes, binary
                // operators here are left associative.
                render_at(rhs, settings, operand_prec(rhs, prec + 1))
            )
        }
        Expr::Assignment { target, value } => {
            let space = if settings.minify { "" } else { " " };
            format!(
                "{}{}={}{}",
                render_at(target, settings, PREC_MEMBER),
                space,
                space,
                render_at(value, settings, PREC_ASSIGN)
            )
        }
        Expr::Conditional {
            condition,
            truthy,
            falsy,
        } => {
            let space = if settings.minify { "" } else { " " };
            format!(
                "{}{}?{}{}{}:{}{}",
                render_at(condition, settings, PREC_CONDITIONAL + 1),
                space,
                space,
                render_at(truthy, settings, PREC_CONDITIONAL),
                space,
                space,
                render_at(falsy, settings, PREC_CONDITIONAL)
            )
        }
        Expr::Spread(inner) => format!("...{}", render_at(inner, settings, PREC_SPREAD)),
        Expr::Literal(literal) => render_literal(literal),
        Expr::TemplateLiteral(parts) => {
            let mut out = String::from("`");
            for part in parts {
                match part {
                    TemplatePart::Text(text) => out.push_str(&escape_template_text(text)),
                    TemplatePart::Expr(inner) => {
                        out.push_str("${");
                        out.push_str(&render_at(inner, settings, 0));
                        out.push('}');
                    }
                }
            }
            out.push('`');
            out
        }
        Expr::ObjectLiteral(object) => render_object(object, settings),
        Expr::ArrayLiteral(elements) => {
            let rendered: Vec<String> = elements
                .iter()
                .map(|e| render_at(e, settings, PREC_SPREAD))
                .collect();
            format!(
                "[{}]",
                rendered.join(if settings.minify { "," } else { ", " })
            )
        }
        Expr::FunctionExpression(function) => render_arrow(function, settings),
    };

    if precedence(expr) < parent_precedence {
        format!("({})", rendered)
    } else {
        rendered
    }
}

fn render_object(object: &ObjectLiteral, settings: &EmitSettings) -> String {
    let pairs: Vec<String> = object
        .values
        .iter()
        .map(|(key, value)| {
            // Named functions stored under their own key become methods, so
            // the runtime can re-bind `this` with `.call` (arrows cannot).
            if let Expr::FunctionExpression(function) = value {
                if function.name.as_deref() == Some(key.as_str()) {
                    return render_function(function, settings);
                }
            }
            let key = if is_valid_identifier(key) {
                key.clone()
            } else {
                format!("\"{}\"", escape_string(key))
            };
            if settings.minify {
                format!("{}:{}", key, render_at(value, settings, PREC_SPREAD))
            } else {
                format!("{}: {}", key, render_at(value, settings, PREC_SPREAD))
            }
        })
        .collect();
    if settings.minify {
        format!("{{{}}}", pairs.join(","))
    } else {
        format!("{{ {} }}", pairs.join(", "))
    }
}

fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::String(value) => format!("\"{}\"", escape_string(value)),
        Literal::Number(value) => {
            if value.fract() == 0.0 && value.abs() < 1e15 {
                format!("{}", *value as i64)
            } else {
                format!("{}", value)
            }
        }
        Literal::Boolean(value) => value.to_string(),
        Literal::Null => "null".to_string(),
    }
}

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn escape_template_text(value: &str) -> String {
    value.replace('\\', "\\\\").replace('`', "\\`").replace("${", "\\${")
}

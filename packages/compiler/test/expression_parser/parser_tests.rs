//! Directive Expression Parser Tests
//!
//! End to end parse-then-render checks over the expression subset templates
//! may use in interpolation and directive positions.

use isomer_compiler::expression_parser::{parse_expression, parse_iterator};
use isomer_compiler::js::{render_expression, EmitSettings};
use isomer_compiler::CompileError;

fn roundtrip(source: &str) -> String {
    let expression = parse_expression(source).expect(source);
    render_expression(&expression, &EmitSettings::default())
}

fn minified(source: &str) -> String {
    let expression = parse_expression(source).expect(source);
    render_expression(
        &expression,
        &EmitSettings {
            minify: true,
            ..EmitSettings::default()
        },
    )
}

#[test]
fn member_chains_and_calls() {
    assert_eq!(roundtrip("user.address.city"), "user.address.city");
    assert_eq!(roundtrip("items[0].name"), "items[0].name");
    assert_eq!(roundtrip("format(date, \"short\")"), "format(date, \"short\")");
    assert_eq!(roundtrip("user?.name"), "user?.name");
}

#[test]
fn binary_precedence_is_preserved() {
    assert_eq!(roundtrip("a + b * c"), "a + b * c");
    assert_eq!(roundtrip("(a + b) * c"), "(a + b) * c");
    assert_eq!(roundtrip("a === b && c"), "a === b && c");
    assert_eq!(roundtrip("a ?? b"), "a ?? b");
}

#[test]
fn conditional_binds_looser_than_comparison() {
    assert_eq!(
        roundtrip("count > 1 ? \"items\" : \"item\""),
        "count > 1 ? \"items\" : \"item\""
    );
}

#[test]
fn unary_and_boolean_literals() {
    assert_eq!(roundtrip("!done"), "!done");
    assert_eq!(roundtrip("-offset"), "-offset");
    assert_eq!(roundtrip("true"), "true");
    assert_eq!(roundtrip("null"), "null");
}

#[test]
fn template_literals_nest_expressions() {
    assert_eq!(roundtrip("`Hello ${name}!`"), "`Hello ${name}!`");
}

#[test]
fn object_and_array_literals() {
    assert_eq!(roundtrip("{ count: count + 1 }"), "{ count: count + 1 }");
    assert_eq!(roundtrip("[a, b]"), "[a, b]");
}

#[test]
fn null_coalescing_mixed_with_logical_operators_parenthesizes() {
    assert_eq!(roundtrip("a || b ?? c"), "(a || b) ?? c");
    assert_eq!(roundtrip("a ?? b && c"), "a ?? (b && c)");
    assert_eq!(minified("a || b ?? c"), "(a||b)??c");
}

#[test]
fn minified_output_drops_cosmetic_spacing() {
    assert_eq!(minified("a + b"), "a+b");
    assert_eq!(minified("{ count: 1 }"), "{count:1}");
}

#[test]
fn iterator_splits_variable_and_subject() {
    let iterator = parse_iterator("item of list.entries").unwrap();
    assert_eq!(iterator.variable, "item");
    assert_eq!(
        render_expression(&iterator.subject, &EmitSettings::default()),
        "list.entries"
    );
}

#[test]
fn iterator_rejects_classic_for_headers() {
    assert!(matches!(
        parse_iterator("let i = 0; i < 10; i++"),
        Err(CompileError::ForParameterNotIterator { .. })
    ));
}

#[test]
fn syntax_errors_carry_the_source_text() {
    let error = parse_expression("a +").unwrap_err();
    assert!(error.to_string().contains("a +"), "{error}");
}

//! Binding Tree Tests
//!
//! The mapping tree is what the reactive runtime walks: one branch per
//! reachable variable chain, with `get`/`set`/`push` method shorthands and a
//! `type` tag on non-primitive leaves. These tests drive the full walker
//! pipeline and assert on the rendered tree text.

use std::collections::HashSet;

use isomer_compiler::html::parse_template_root;
use isomer_compiler::js::{render_expression, EmitSettings, Expr};
use isomer_compiler::template::{construct_bindings, parse_template, TemplateConfig};
use isomer_compiler::{
    CompileError, CompileSettings, Component, ComponentRegistry, Context, TypeSignature,
};

fn mapping(
    source: &str,
    root_type: &TypeSignature,
    settings: &CompileSettings,
) -> Result<String, CompileError> {
    let registry = ComponentRegistry::new();
    mapping_with(source, root_type, settings, &registry)
}

fn mapping_with(
    source: &str,
    root_type: &TypeSignature,
    settings: &CompileSettings,
    registry: &ComponentRegistry,
) -> Result<String, CompileError> {
    let (mut tree, root) = parse_template_root(source)?;
    let methods = HashSet::new();
    let config = TemplateConfig {
        ssr_enabled: settings.is_isomorphic(),
        imported_components: registry,
        component_methods: &methods,
    };
    let data = parse_template(&mut tree, root, &config, &[])?;
    let object = construct_bindings(
        &data.bindings,
        &data.node_data,
        &tree,
        root_type,
        &[],
        settings,
    )?;
    Ok(render_expression(
        &Expr::ObjectLiteral(object),
        &EmitSettings::default(),
    ))
}

fn isomorphic() -> CompileSettings {
    CompileSettings::default()
}

fn client() -> CompileSettings {
    CompileSettings {
        context: Context::Client,
        ..CompileSettings::default()
    }
}

#[test]
fn interpolated_text_gets_and_sets_through_its_fragment() {
    let rendered = mapping(
        "<template><h1>{title}</h1></template>",
        &TypeSignature::object([("title", TypeSignature::String)]),
        &isomorphic(),
    )
    .unwrap();
    assert!(rendered.contains("title: {"), "{rendered}");
    assert!(
        rendered.contains("return this.getElem(\"c0\").childNodes[0].textContent;"),
        "{rendered}"
    );
    assert!(rendered.contains("set(value) {"), "{rendered}");
    assert!(
        rendered.contains("this.getElem(\"c0\").childNodes[0].data = value;"),
        "{rendered}"
    );
    // Primitive leaves carry no type tag.
    assert!(!rendered.contains("type:"), "{rendered}");
}

#[test]
fn iterated_arrays_expand_to_length_and_star_entries() {
    let rendered = mapping(
        "<template><ul #for=\"item of items\"><li>{item}</li></ul></template>",
        &TypeSignature::object([("items", TypeSignature::array(TypeSignature::String))]),
        &isomorphic(),
    )
    .unwrap();
    assert!(rendered.contains("items: {"), "{rendered}");
    assert!(rendered.contains("type: \"Array\""), "{rendered}");
    // The length point reads the rendered child count and truncates on set.
    assert!(rendered.contains("length: {"), "{rendered}");
    assert!(
        rendered.contains("return this.getElem(\"c0\").children.length;"),
        "{rendered}"
    );
    assert!(
        rendered.contains("setLength(this.getElem(\"c0\"), value);"),
        "{rendered}"
    );
    // Entries resolve positionally, lettered by loop depth.
    assert!(rendered.contains("\"*\": {"), "{rendered}");
    assert!(rendered.contains("get(x) {"), "{rendered}");
    assert!(rendered.contains(".children[x]"), "{rendered}");
    assert!(rendered.contains("set(value, x) {"), "{rendered}");
    assert!(rendered.contains("push(value) {"), "{rendered}");
    assert!(rendered.contains(".append(this."), "{rendered}");
}

#[test]
fn duplicate_chains_share_one_data_point() {
    let rendered = mapping(
        "<template><h1>{name}</h1><p>{name}</p></template>",
        &TypeSignature::object([("name", TypeSignature::String)]),
        &isomorphic(),
    )
    .unwrap();
    assert_eq!(rendered.matches("name: {").count(), 1, "{rendered}");
    // Both sinks update from the single setter.
    assert!(rendered.contains("\"c0\""), "{rendered}");
    assert!(rendered.contains("\"c1\""), "{rendered}");
    assert_eq!(rendered.matches("get()").count(), 1, "{rendered}");
}

#[test]
fn client_builds_emit_no_reverse_getters() {
    let rendered = mapping(
        "<template><h1>{title}</h1></template>",
        &TypeSignature::object([("title", TypeSignature::String)]),
        &client(),
    )
    .unwrap();
    assert!(!rendered.contains("get()"), "{rendered}");
    assert!(rendered.contains("set(value) {"), "{rendered}");
}

#[test]
fn strict_mode_rejects_underivable_chains() {
    let settings = CompileSettings {
        strict_server_getters: true,
        ..CompileSettings::default()
    };
    let error = mapping(
        "<template><h1>{first + last}</h1></template>",
        &TypeSignature::object([
            ("first", TypeSignature::String),
            ("last", TypeSignature::String),
        ]),
        &settings,
    )
    .unwrap_err();
    match error {
        CompileError::MissingServerGetter { chain } => assert_eq!(chain, "first"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn component_data_is_exempt_from_strict_getters() {
    let settings = CompileSettings {
        strict_server_getters: true,
        ..CompileSettings::default()
    };
    let mut registry = ComponentRegistry::new();
    registry.register(Component::new(
        "user-card",
        TypeSignature::object([("name", TypeSignature::String)]),
    ));
    let rendered = mapping_with(
        "<template><user-card $data=\"user\"></user-card></template>",
        &TypeSignature::object([(
            "user",
            TypeSignature::object([("name", TypeSignature::String)]),
        )]),
        &settings,
        &registry,
    )
    .unwrap();
    assert!(rendered.contains("user: {"), "{rendered}");
}

//! Template Walker Tests
//!
//! The walker consumes directives, assigns lookup identifiers and fills the
//! annotation store. After the walk the tree holds plain markup only; both
//! code generators read the store without writing it.

use std::collections::HashSet;

use isomer_compiler::html::parse_template_root;
use isomer_compiler::js::Expr;
use isomer_compiler::template::{parse_template, BindingAspect, TemplateConfig, TemplateData};
use isomer_compiler::{CompileError, Component, ComponentRegistry, TypeSignature};

type Walked = (isomer_compiler::html::Tree, isomer_compiler::html::NodeId, TemplateData);

fn walk(source: &str, ssr: bool) -> Result<Walked, CompileError> {
    let registry = ComponentRegistry::new();
    walk_with(source, ssr, &registry)
}

fn walk_with(
    source: &str,
    ssr: bool,
    registry: &ComponentRegistry,
) -> Result<Walked, CompileError> {
    let (mut tree, root) = parse_template_root(source)?;
    let methods = HashSet::new();
    let config = TemplateConfig {
        ssr_enabled: ssr,
        imported_components: registry,
        component_methods: &methods,
    };
    let data = parse_template(&mut tree, root, &config, &[])?;
    Ok((tree, root, data))
}

#[test]
fn identifiers_are_sequential_classes() {
    let (tree, root, data) = walk(
        "<template><h1>{a}</h1><p>{b}</p></template>",
        false,
    )
    .unwrap();
    let children = tree.children(root);
    assert_eq!(
        tree.element(children[0]).attributes.get("class"),
        Some(&Some("c0".to_string()))
    );
    assert_eq!(
        tree.element(children[1]).attributes.get("class"),
        Some(&Some("c1".to_string()))
    );
    assert_eq!(data.bindings.len(), 2);
}

#[test]
fn directives_are_consumed_from_the_markup() {
    let (tree, root, _) = walk(
        "<template><ul #for=\"item of items\"><li>{item}</li></ul></template>",
        false,
    )
    .unwrap();
    for id in tree.flat_elements(root) {
        let element = tree.element(id);
        assert!(!element.attributes.contains_key("#for"), "{:?}", element);
    }
}

#[test]
fn title_text_binds_the_document_title() {
    let (tree, root, data) = walk("<template><title>{name} | Site</title></template>", true).unwrap();
    assert_eq!(data.bindings.len(), 1);
    assert_eq!(data.bindings[0].aspect, BindingAspect::DocumentTitle);
    assert_eq!(data.bindings[0].fragment_index, None);
    // No lookup identifier and no fragment comments inside <title>.
    for id in tree.flat_elements(root) {
        assert!(!tree.element(id).attributes.contains_key("class"));
    }
}

#[test]
fn ssr_doubles_fragment_indices_with_delimiters() {
    let (tree, root, data) = walk("<template><p>{a} and {b}</p></template>", true).unwrap();
    let indices: Vec<_> = data
        .bindings
        .iter()
        .filter_map(|binding| binding.fragment_index)
        .collect();
    assert_eq!(indices, vec![0, 4]);
    let comments = tree
        .flat_elements(root)
        .into_iter()
        .flat_map(|id| tree.children(id).to_vec())
        .filter(|&id| tree.is_comment(id))
        .count();
    assert_eq!(comments, 2);
}

#[test]
fn client_only_builds_skip_delimiters() {
    let (tree, root, data) = walk("<template><p>{a} and {b}</p></template>", false).unwrap();
    let indices: Vec<_> = data
        .bindings
        .iter()
        .filter_map(|binding| binding.fragment_index)
        .collect();
    assert_eq!(indices, vec![0, 2]);
    for id in tree.flat_elements(root) {
        for &child in tree.children(id) {
            assert!(!tree.is_comment(child));
        }
    }
}

#[test]
fn for_requires_an_iterator_parameter() {
    let error = walk(
        "<template><ul #for=\"let i = 0; i < 5; i++\"><li>x</li></ul></template>",
        false,
    )
    .unwrap_err();
    assert!(matches!(error, CompileError::ForParameterNotIterator { .. }));
    assert!(error.to_string().contains("let i = 0"), "{error}");
}

#[test]
fn for_requires_a_single_child() {
    let error = walk(
        "<template><ul #for=\"item of items\"><li>a</li><li>b</li></ul></template>",
        false,
    )
    .unwrap_err();
    assert!(matches!(error, CompileError::MultipleIterationChildren));
}

#[test]
fn if_requires_an_else_sibling() {
    let error = walk("<template><p #if=\"ok\">Up</p></template>", false).unwrap_err();
    assert!(matches!(error, CompileError::MissingElseElement));
}

#[test]
fn stray_else_is_a_directive_error() {
    let error = walk("<template><p #else>Down</p></template>", false).unwrap_err();
    assert!(matches!(error, CompileError::DirectiveSyntax { .. }));
}

#[test]
fn conditional_branches_share_an_identifier() {
    let (tree, root, data) = walk(
        "<template><p #if=\"ok\">Up</p><p #else>Down</p></template>",
        false,
    )
    .unwrap();
    let paragraphs: Vec<_> = tree
        .flat_elements(root)
        .into_iter()
        .filter(|&id| tree.element(id).tag_name == "p")
        .collect();
    assert_eq!(paragraphs.len(), 2);
    let class_of = |id| tree.element(id).attributes.get("class").cloned().flatten();
    assert_eq!(class_of(paragraphs[0]), class_of(paragraphs[1]));
    assert!(tree
        .element(paragraphs[1])
        .attributes
        .contains_key("data-else"));
    assert!(data.node_data.is_nullable(paragraphs[0]));
    assert!(data.node_data.is_nullable(paragraphs[1]));
}

#[test]
fn loop_descendants_get_no_identifiers() {
    let (tree, root, _) = walk(
        "<template><ul #for=\"item of items\"><li>{item}</li></ul></template>",
        false,
    )
    .unwrap();
    let li = tree
        .flat_elements(root)
        .into_iter()
        .find(|&id| tree.element(id).tag_name == "li")
        .unwrap();
    assert!(!tree.element(li).attributes.contains_key("class"));
}

#[test]
fn interpolated_attribute_values_lower_to_dynamic_attributes() {
    let (tree, root, data) = walk(
        "<template><img alt=\"Photo of {name}\"></template>",
        false,
    )
    .unwrap();
    let img = tree.children(root)[0];
    assert!(!tree.element(img).attributes.contains_key("alt"));
    let record = data.node_data.get(img).unwrap();
    assert!(record.dynamic_attributes.contains_key("alt"));
    let binding = &data.bindings[0];
    assert_eq!(binding.aspect, BindingAspect::Attribute);
    assert_eq!(binding.attribute.as_deref(), Some("alt"));
}

#[test]
fn loops_produce_exactly_one_iterator_binding() {
    let (_, _, data) = walk(
        "<template><ul #for=\"item of items\"><li>{item}</li></ul></template>",
        false,
    )
    .unwrap();
    let iterators = data
        .bindings
        .iter()
        .filter(|binding| binding.aspect == BindingAspect::Iterator)
        .count();
    assert_eq!(iterators, 1);
}

#[test]
fn walking_a_reparsed_copy_yields_the_same_bindings() {
    let source = "<template><h1 $title=\"heading\">{heading}</h1>\
                  <ul #for=\"item of items\"><li>{item}</li></ul></template>";
    let (_, _, first) = walk(source, true).unwrap();
    let (_, _, second) = walk(source, true).unwrap();
    assert_eq!(first.bindings.len(), second.bindings.len());
    for (a, b) in first.bindings.iter().zip(&second.bindings) {
        assert_eq!(a.aspect, b.aspect);
        assert_eq!(a.fragment_index, b.fragment_index);
        assert_eq!(a.attribute, b.attribute);
        assert_eq!(a.references_variables, b.references_variables);
    }
}

#[test]
fn style_directive_records_the_hyphenated_key() {
    let (tree, root, data) = walk(
        "<template><div $style.background-color=\"accent\"></div></template>",
        false,
    )
    .unwrap();
    assert_eq!(data.bindings.len(), 1);
    assert_eq!(data.bindings[0].aspect, BindingAspect::Style);
    assert_eq!(data.bindings[0].style_key.as_deref(), Some("background-color"));
    let div = tree.children(root)[0];
    let element = tree.element(div);
    assert!(!element.attributes.keys().any(|name| name.starts_with('$')));
    assert_eq!(element.attributes.get("class"), Some(&Some("c0".to_string())));
}

#[test]
fn set_hook_binds_the_named_property() {
    let (tree, root, data) = walk(
        "<template><audio @set:paused=\"pausedChanged\"></audio></template>",
        false,
    )
    .unwrap();
    assert_eq!(data.bindings.len(), 1);
    let binding = &data.bindings[0];
    assert_eq!(binding.aspect, BindingAspect::SetHook);
    assert_eq!(binding.attribute.as_deref(), Some("paused"));
    assert_eq!(binding.expression, Expr::ident("pausedChanged"));
    assert_eq!(binding.references_variables.len(), 1);
    let audio = tree.children(root)[0];
    assert!(!tree
        .element(audio)
        .attributes
        .keys()
        .any(|name| name.starts_with('@')));
}

#[test]
fn raw_inner_html_supplants_children() {
    let (tree, root, data) = walk(
        "<template><div #html=\"markup\"><span>{ignored}</span></div></template>",
        false,
    )
    .unwrap();
    // The child interpolation is never walked, only the html binding exists.
    assert_eq!(data.bindings.len(), 1);
    assert_eq!(data.bindings[0].aspect, BindingAspect::InnerHTML);
    let div = tree.children(root)[0];
    let record = data.node_data.get(div).unwrap();
    assert_eq!(record.raw_inner_html, Some(Expr::ident("markup")));
    assert!(!tree.element(div).attributes.contains_key("#html"));
}

#[test]
fn nested_slot_is_recorded() {
    let (_, _, data) = walk("<template><div><slot></slot></div></template>", false).unwrap();
    assert!(data.slots.contains_key("content"));
}

#[test]
fn slot_only_accepts_content() {
    let error = walk("<template><slot for=\"footer\"></slot></template>", false).unwrap_err();
    match error {
        CompileError::UnknownSlotName { received, .. } => assert_eq!(received, "footer"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn component_references_resolve_through_the_registry() {
    let mut registry = ComponentRegistry::new();
    registry.register(Component::new(
        "user-card",
        TypeSignature::object([("name", TypeSignature::String)]),
    ));
    let (tree, root, data) = walk_with(
        "<template><user-card $data=\"user\"></user-card></template>",
        false,
        &registry,
    )
    .unwrap();
    let card = tree
        .flat_elements(root)
        .into_iter()
        .find(|&id| tree.element(id).tag_name == "user-card")
        .unwrap();
    let record = data.node_data.get(card).unwrap();
    assert_eq!(record.component.as_deref(), Some("user-card"));
    assert!(record.dynamic_attributes.contains_key("data"));
    assert!(data
        .bindings
        .iter()
        .any(|binding| binding.aspect == BindingAspect::Data));
}

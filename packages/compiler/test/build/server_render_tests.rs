//! Server Render Tests
//!
//! The server generator folds a walked template into a flat chunk list that a
//! host backend renders to a string. These tests compile full templates and
//! assert on the resulting chunk structure.

use std::collections::HashSet;

use isomer_compiler::build::server_render::{ServerRenderArgument, ServerRenderChunk};
use isomer_compiler::js::{render_expression, EmitSettings};
use isomer_compiler::{
    compile_template, CompileSettings, CompiledTemplate, Component, ComponentRegistry,
    TypeSignature,
};

fn page_type() -> TypeSignature {
    TypeSignature::object([
        ("title", TypeSignature::String),
        ("locked", TypeSignature::Boolean),
        ("items", TypeSignature::array(TypeSignature::String)),
    ])
}

fn compile(source: &str, minify: bool) -> CompiledTemplate {
    let registry = ComponentRegistry::new();
    compile_registered(source, minify, &registry, Component::new("test-page", page_type()))
}

fn compile_registered(
    source: &str,
    minify: bool,
    registry: &ComponentRegistry,
    component: Component,
) -> CompiledTemplate {
    let settings = CompileSettings {
        minify,
        ..CompileSettings::default()
    };
    compile_template(source, &component, registry, &settings).unwrap()
}

fn expr_text(value: &isomer_compiler::js::Expr) -> String {
    render_expression(value, &EmitSettings::default())
}

#[test]
fn static_markup_collapses_to_one_literal() {
    let compiled = compile("<template><div><p>Hi</p><br></div></template>", true);
    assert_eq!(
        compiled.server_chunks,
        vec![ServerRenderChunk::Literal(
            "<div><p>Hi</p><br></div>".to_string()
        )]
    );
}

#[test]
fn interpolations_become_escaped_expressions() {
    let compiled = compile("<template><h1>{title}</h1></template>", true);
    assert_eq!(compiled.server_chunks.len(), 3);
    match &compiled.server_chunks[1] {
        ServerRenderChunk::Expression { value, escape } => {
            assert!(*escape);
            assert_eq!(expr_text(value), "data.title");
        }
        other => panic!("unexpected chunk {other:?}"),
    }
    assert_eq!(
        compiled.server_chunks[0],
        ServerRenderChunk::Literal("<h1 class=\"c0\">".to_string())
    );
}

#[test]
fn sibling_interpolations_are_delimited_for_hydration() {
    let compiled = compile("<template><p>{title} is {locked}</p></template>", true);
    let literals: Vec<&str> = compiled
        .server_chunks
        .iter()
        .filter_map(|chunk| match chunk {
            ServerRenderChunk::Literal(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert!(
        literals.iter().any(|text| text.contains("<!---->")),
        "{literals:?}"
    );
}

#[test]
fn conditionals_fold_both_branches_into_one_chunk() {
    let compiled = compile(
        "<template><p #if=\"locked\">Closed</p><p #else>Open</p></template>",
        true,
    );
    assert_eq!(compiled.server_chunks.len(), 1);
    match &compiled.server_chunks[0] {
        ServerRenderChunk::Conditional {
            condition,
            truthy,
            falsy,
        } => {
            assert_eq!(expr_text(condition), "data.locked");
            let truthy_text = format!("{truthy:?}");
            let falsy_text = format!("{falsy:?}");
            assert!(truthy_text.contains("Closed"), "{truthy_text}");
            assert!(falsy_text.contains("Open"), "{falsy_text}");
            assert!(falsy_text.contains("data-else"), "{falsy_text}");
        }
        other => panic!("unexpected chunk {other:?}"),
    }
}

#[test]
fn loops_keep_the_iteration_variable() {
    let compiled = compile(
        "<template><ul #for=\"item of items\"><li>{item}</li></ul></template>",
        true,
    );
    let found = compiled.server_chunks.iter().find_map(|chunk| match chunk {
        ServerRenderChunk::Loop {
            subject,
            variable,
            body,
        } => Some((expr_text(subject), variable.clone(), body.clone())),
        _ => None,
    });
    let (subject, variable, body) = found.expect("loop chunk");
    assert_eq!(subject, "data.items");
    assert_eq!(variable, "item");
    // The body reads the alias unprefixed, the host provides it per entry.
    assert!(body.iter().any(|chunk| matches!(
        chunk,
        ServerRenderChunk::Expression { value, .. } if expr_text(value) == "item"
    )));
}

#[test]
fn boolean_attributes_render_conditionally() {
    let compiled = compile("<template><input $disabled=\"locked\"></template>", true);
    let conditional = compiled.server_chunks.iter().find_map(|chunk| match chunk {
        ServerRenderChunk::Conditional { truthy, falsy, .. } => Some((truthy.clone(), falsy.clone())),
        _ => None,
    });
    let (truthy, falsy) = conditional.expect("conditional attribute chunk");
    assert_eq!(truthy, vec![ServerRenderChunk::Literal(" disabled".to_string())]);
    assert_eq!(falsy, vec![ServerRenderChunk::Literal(String::new())]);
    // Void element, no closing tag.
    let text = format!("{:?}", compiled.server_chunks);
    assert!(!text.contains("</input>"), "{text}");
}

#[test]
fn required_event_elements_render_disabled_until_hydration() {
    let mut component = Component::new("test-page", page_type());
    component.methods = HashSet::from(["increment".to_string()]);
    let registry = ComponentRegistry::new();
    let compiled = compile_registered(
        "<template><button @click=\"increment\">+</button></template>",
        true,
        &registry,
        component,
    );
    assert_eq!(
        compiled.server_chunks,
        vec![ServerRenderChunk::Literal(
            "<button class=\"c0\" disabled>+</button>".to_string()
        )]
    );
}

#[test]
fn unminified_output_indents_nested_children() {
    let compiled = compile("<template><div><p>Hi</p></div></template>", false);
    assert_eq!(
        compiled.server_chunks,
        vec![ServerRenderChunk::Literal(
            "<div>\n    <p>\n    Hi\n</p>\n</div>".to_string()
        )]
    );
}

#[test]
fn child_components_delegate_with_attributes_and_data() {
    let mut child = Component::new("user-card", TypeSignature::object([(
        "name",
        TypeSignature::String,
    )]));
    child.has_slots = true;
    child.client_globals = vec!["session".to_string()];
    let mut registry = ComponentRegistry::new();
    registry.register(child);
    let parent = Component::new(
        "test-page",
        TypeSignature::object([(
            "user",
            TypeSignature::object([("name", TypeSignature::String)]),
        )]),
    );
    let compiled = compile_registered(
        "<template><user-card $data=\"user\">Bio</user-card></template>",
        true,
        &registry,
        parent,
    );
    let call = compiled.server_chunks.iter().find_map(|chunk| match chunk {
        ServerRenderChunk::ComponentCall { tag_name, args } => Some((tag_name.clone(), args.clone())),
        _ => None,
    });
    let (tag_name, args) = call.expect("component call chunk");
    assert_eq!(tag_name, "user-card");
    let keys: Vec<&String> = args.keys().collect();
    assert_eq!(keys, ["attributes", "contentSlot", "data", "session"]);
    match &args["contentSlot"] {
        ServerRenderArgument::Chunks(chunks) => {
            assert!(format!("{chunks:?}").contains("Bio"));
        }
        other => panic!("unexpected argument {other:?}"),
    }
    match &args["data"] {
        ServerRenderArgument::Expression(value) => assert_eq!(expr_text(value), "data.user"),
        other => panic!("unexpected argument {other:?}"),
    }
}

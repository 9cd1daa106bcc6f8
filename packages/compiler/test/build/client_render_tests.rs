//! Client Render Tests
//!
//! End to end checks over the compiled client render method: the `h(...)`
//! construction tree, hoisted loop and conditional methods and event wiring.

use std::collections::HashSet;

use isomer_compiler::js::{render_function, EmitSettings};
use isomer_compiler::{
    compile_template, CompileSettings, CompiledTemplate, Component, ComponentRegistry, Context,
    RuntimeFeatures, TypeSignature,
};

fn page_type() -> TypeSignature {
    TypeSignature::object([
        ("title", TypeSignature::String),
        ("ok", TypeSignature::Boolean),
        ("items", TypeSignature::array(TypeSignature::String)),
    ])
}

fn compile(source: &str) -> CompiledTemplate {
    compile_with(source, Component::new("test-page", page_type()))
}

fn compile_with(source: &str, component: Component) -> CompiledTemplate {
    let registry = ComponentRegistry::new();
    let settings = CompileSettings {
        context: Context::Client,
        ..CompileSettings::default()
    };
    compile_template(source, &component, &registry, &settings).unwrap()
}

fn render(compiled: &CompiledTemplate) -> String {
    render_function(&compiled.render_method, &EmitSettings::default())
}

#[test]
fn render_appends_into_the_component_by_default() {
    let compiled = compile("<template><p>Hello</p></template>");
    let rendered = render(&compiled);
    assert!(rendered.contains("super.append("), "{rendered}");
    assert!(rendered.contains("h(\"p\", 0, 0, \"Hello\")"), "{rendered}");
}

#[test]
fn shadow_dom_components_attach_a_shadow_root() {
    let mut component = Component::new("test-page", page_type());
    component.use_shadow_dom = true;
    let compiled = compile_with("<template><p>Hello</p></template>", component);
    let rendered = render(&compiled);
    assert!(
        rendered.contains("this.attachShadow({ mode: \"open\" })"),
        "{rendered}"
    );
    assert!(!rendered.contains("super.append("), "{rendered}");
}

#[test]
fn dynamic_text_reads_component_data() {
    let compiled = compile("<template><h1>{title}</h1></template>");
    let rendered = render(&compiled);
    assert!(
        rendered.contains("h(\"h1\", { class: \"c0\" }, 0, this.data.title)"),
        "{rendered}"
    );
}

#[test]
fn loops_spread_a_hoisted_render_method() {
    let compiled =
        compile("<template><ul #for=\"item of items\"><li>{item}</li></ul></template>");
    let rendered = render(&compiled);
    assert!(
        rendered.contains("...this.data.items.map(this.render0)"),
        "{rendered}"
    );
    assert_eq!(compiled.hoisted_methods.len(), 1);
    let hoisted = render_function(&compiled.hoisted_methods[0], &EmitSettings::default());
    assert!(hoisted.starts_with("render0(item)"), "{hoisted}");
    assert!(hoisted.contains("h(\"li\", 0, 0, item)"), "{hoisted}");
}

#[test]
fn conditionals_render_through_a_parameterized_branch_method() {
    let compiled =
        compile("<template><p #if=\"ok\">Yes</p><p #else>No</p></template>");
    let rendered = render(&compiled);
    assert!(rendered.contains("this.render0(this.data.ok)"), "{rendered}");
    assert!(!rendered.contains("\"Yes\""), "{rendered}");
    let hoisted = render_function(&compiled.hoisted_methods[0], &EmitSettings::default());
    assert!(hoisted.contains("p ?"), "{hoisted}");
    assert!(hoisted.contains("\"Yes\""), "{hoisted}");
    assert!(hoisted.contains("\"No\""), "{hoisted}");
    // The falsy element keeps its marker so the runtime swap recognizes it.
    assert!(hoisted.contains("\"data-else\""), "{hoisted}");
}

#[test]
fn events_bind_component_class_methods() {
    let mut component = Component::new("test-page", page_type());
    component.methods = HashSet::from(["increment".to_string()]);
    let compiled = compile_with(
        "<template><button @click=\"increment\">+</button></template>",
        component,
    );
    let rendered = render(&compiled);
    assert!(
        rendered.contains("{ click: this.increment.bind(this) }"),
        "{rendered}"
    );
    assert_eq!(compiled.events.len(), 1);
    assert_eq!(compiled.events[0].event_name, "click");
    assert!(compiled.events[0].exists_on_component_class);
}

#[test]
fn svg_content_flags_the_namespace_aware_renderer() {
    let compiled = compile("<template><svg><circle r=\"4\"></circle></svg></template>");
    assert!(compiled.features.contains(RuntimeFeatures::SVG));
    let rendered = render(&compiled);
    assert!(rendered.contains("h(\"svg\""), "{rendered}");
}

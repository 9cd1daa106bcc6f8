//! Component model and compile entry point.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::build::client_render::{build_client_render, ClientRender};
use crate::build::server_render::{
    build_server_render, ServerRenderChunk, ServerRenderSettings,
};
use crate::error::Result;
use crate::html::{parse_template_root, Tree};
use crate::js::{Expr, Function, ObjectLiteral};
use crate::runtime::RuntimeFeatures;
use crate::settings::CompileSettings;
use crate::template::{
    construct_bindings, parse_template, Binding, BindingAspect, ChainSegment, EventListener,
    TemplateConfig, TypeSignature, VariableChain,
};

/// Facts about one component, as known to components that embed it.
#[derive(Debug, Clone)]
pub struct Component {
    pub tag_name: String,
    /// The template contains a `<slot>` and accepts projected content.
    pub has_slots: bool,
    pub data_type: TypeSignature,
    pub use_shadow_dom: bool,
    /// Values injected per request rather than carried in component data.
    pub client_globals: Vec<String>,
    /// Method names on the component class.
    pub methods: HashSet<String>,
    /// Data fields filled from the matched URL, reset-and-rerender on change.
    pub route_parameters: Vec<String>,
}

impl Component {
    pub fn new(tag_name: impl Into<String>, data_type: TypeSignature) -> Self {
        Component {
            tag_name: tag_name.into(),
            has_slots: false,
            data_type,
            use_shadow_dom: false,
            client_globals: Vec::new(),
            methods: HashSet::new(),
            route_parameters: Vec::new(),
        }
    }
}

/// Components resolvable by tag name during a walk.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: IndexMap<String, Component>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        ComponentRegistry {
            components: IndexMap::new(),
        }
    }

    pub fn register(&mut self, component: Component) {
        self.components
            .insert(component.tag_name.clone(), component);
    }

    pub fn get(&self, tag_name: &str) -> Option<&Component> {
        self.components.get(tag_name)
    }
}

/// Everything compiled from one component template.
#[derive(Debug)]
pub struct CompiledTemplate {
    pub tree: Tree,
    pub render_method: Function,
    pub hoisted_methods: Vec<Function>,
    /// The mapping tree handed to the runtime data proxy.
    pub bindings_tree: ObjectLiteral,
    /// Empty outside isomorphic builds.
    pub server_chunks: Vec<ServerRenderChunk>,
    pub events: Vec<EventListener>,
    pub features: RuntimeFeatures,
}

/// Walk the template, build the mapping tree and run both code generators.
pub fn compile_template(
    source: &str,
    component: &Component,
    registry: &ComponentRegistry,
    settings: &CompileSettings,
) -> Result<CompiledTemplate> {
    let (mut tree, root) = parse_template_root(source)?;
    let config = TemplateConfig {
        ssr_enabled: settings.is_isomorphic(),
        imported_components: registry,
        component_methods: &component.methods,
    };
    let globals = component.client_globals.as_slice();
    let mut data = parse_template(&mut tree, root, &config, globals)?;

    // Route parameters bind like data fields whose setter tears down cached
    // server state and re-renders.
    for parameter in &component.route_parameters {
        let mut chain = VariableChain::new();
        chain.push(ChainSegment::Property(parameter.clone()));
        data.bindings.push(Binding {
            element: root,
            expression: Expr::ident(parameter.clone()),
            aspect: BindingAspect::ServerParameter,
            fragment_index: None,
            attribute: None,
            style_key: None,
            references_variables: vec![chain],
        });
    }

    let bindings_tree = construct_bindings(
        &data.bindings,
        &data.node_data,
        &tree,
        &component.data_type,
        globals,
        settings,
    )?;

    let ClientRender {
        render_method,
        hoisted_methods,
    } = build_client_render(
        &tree,
        root,
        &data.node_data,
        component.use_shadow_dom,
        globals,
    );

    let server_chunks = if settings.is_isomorphic() {
        let server_settings = ServerRenderSettings {
            minify: settings.minify,
            add_disable_to_element_with_events: settings.add_disable_to_element_with_events,
        };
        build_server_render(&tree, root, &data.node_data, registry, &server_settings, globals)
    } else {
        Vec::new()
    };

    let mut features = RuntimeFeatures::empty();
    if settings.is_isomorphic() {
        features |= RuntimeFeatures::ISOMORPHIC;
    }
    if data.has_svg {
        features |= RuntimeFeatures::SVG;
    }
    for binding in &data.bindings {
        match binding.aspect {
            BindingAspect::Conditional => features |= RuntimeFeatures::CONDITIONALS,
            BindingAspect::Iterator => features |= RuntimeFeatures::OBSERVABLE_ARRAYS,
            _ => {}
        }
    }
    features |= type_features(&component.data_type, true);

    Ok(CompiledTemplate {
        tree,
        render_method,
        hoisted_methods,
        bindings_tree,
        server_chunks,
        events: data.events,
        features,
    })
}

/// Runtime needs implied by the shape of the component's data.
fn type_features(signature: &TypeSignature, root: bool) -> RuntimeFeatures {
    let mut features = RuntimeFeatures::empty();
    match signature {
        TypeSignature::Date => features |= RuntimeFeatures::OBSERVABLE_DATES,
        TypeSignature::Array(element) => {
            features |= RuntimeFeatures::OBSERVABLE_ARRAYS;
            features |= type_features(element, false);
        }
        TypeSignature::Object(fields) => {
            if !root {
                features |= RuntimeFeatures::SUB_OBJECTS;
            }
            for field in fields.values() {
                features |= type_features(field, false);
            }
        }
        _ => {}
    }
    features
}

//! Template Walker
//!
//! Walks a parsed `<template>` tree, classifies every node, extracts the
//! directive surface (`#if`/`#else`, `#for`, `{expr}` interpolation, `$attr`,
//! `$style.*`, `@event`, `#html`, `<slot>`) and accumulates the flat binding
//! list plus the per-node annotation store both code generators consume.

mod conditional;
mod data_bindings;
mod element;
mod for_loop;
mod node_data;
mod shell;
mod slots;
mod text;

use std::collections::HashSet;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::component::ComponentRegistry;
use crate::error::{CompileError, Result};
use crate::html::{NodeId, NodeKind, Tree};
use crate::js::{referenced_chains, Expr, PathPart};

pub use data_bindings::{construct_bindings, TypeSignature};
pub use node_data::{NodeData, NodeDataStore};
pub use shell::{parse_shell, ShellData};

/// What effect a data dependency has on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingAspect {
    Attribute,
    Data,
    InnerText,
    Iterator,
    Conditional,
    DocumentTitle,
    SetHook,
    Style,
    InnerHTML,
    ServerParameter,
}

/// One segment of a resolved variable reference chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainSegment {
    Property(String),
    Index(u32),
    /// A loop-bound placeholder. Chains compare by `alias`, never by origin.
    Loop { alias: String, origin: NodeId },
}

/// A resolved variable reference, root property first.
pub type VariableChain = SmallVec<[ChainSegment; 3]>;

/// Renders a chain back to source-like text for diagnostics.
pub fn chain_to_string(chain: &[ChainSegment]) -> String {
    let mut out = String::new();
    for segment in chain {
        match segment {
            ChainSegment::Property(name) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(name);
            }
            ChainSegment::Index(index) => {
                out.push_str(&format!("[{}]", index));
            }
            ChainSegment::Loop { alias, .. } => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push('*');
                out.push_str(&format!("({})", alias));
            }
        }
    }
    out
}

/// The unit of data-to-DOM linkage accumulated in walk order.
#[derive(Debug, Clone)]
pub struct Binding {
    pub element: NodeId,
    pub expression: Expr,
    pub aspect: BindingAspect,
    /// For text bindings, the child index of the fragment to edit.
    pub fragment_index: Option<usize>,
    pub attribute: Option<String>,
    pub style_key: Option<String>,
    pub references_variables: Vec<VariableChain>,
}

/// A binding before its variable chains have been resolved.
#[derive(Debug, Clone)]
pub struct PartialBinding {
    pub element: NodeId,
    pub expression: Expr,
    pub aspect: BindingAspect,
    pub fragment_index: Option<usize>,
    pub attribute: Option<String>,
    pub style_key: Option<String>,
}

impl PartialBinding {
    pub fn new(element: NodeId, aspect: BindingAspect, expression: Expr) -> Self {
        PartialBinding {
            element,
            expression,
            aspect,
            fragment_index: None,
            attribute: None,
            style_key: None,
        }
    }
}

/// An event listener registered through an `@name` attribute.
#[derive(Debug, Clone)]
pub struct EventListener {
    pub node_identifier: String,
    pub element: NodeId,
    pub event_name: String,
    pub callback: Expr,
    /// Required for the component to function. Required listeners get their
    /// element disabled in server output until hydration.
    pub required: bool,
    /// The callback names a method on the component class.
    pub exists_on_component_class: bool,
}

/// A loop variable in scope, with the data path it stands for.
#[derive(Debug, Clone)]
pub struct Local {
    pub name: String,
    pub path: VariableChain,
}

pub type Locals = Vec<Local>;

/// Everything the walker produces for one template.
#[derive(Debug, Default)]
pub struct TemplateData {
    pub bindings: Vec<Binding>,
    pub events: Vec<EventListener>,
    pub node_data: NodeDataStore,
    pub slots: IndexMap<String, NodeId>,
    pub has_svg: bool,
}

/// Walk configuration supplied by the component being compiled.
pub struct TemplateConfig<'a> {
    pub ssr_enabled: bool,
    pub imported_components: &'a ComponentRegistry,
    /// Method names on the component class, used to decide whether an event
    /// callback needs `this` binding.
    pub component_methods: &'a HashSet<String>,
}

/// Parse a `<template>` root and all of its descendants.
pub fn parse_template(
    tree: &mut Tree,
    template_root: NodeId,
    config: &TemplateConfig,
    globals: &[String],
) -> Result<TemplateData> {
    match tree.as_element(template_root) {
        Some(element) if element.tag_name == "template" => {}
        _ => {
            return Err(CompileError::MarkupSyntax {
                message: "component root must be a <template> element".to_string(),
            })
        }
    }

    let mut walker = TemplateWalker {
        tree,
        config,
        globals,
        data: TemplateData::default(),
        identifier_count: 0,
        method_count: 0,
    };

    let children: Vec<NodeId> = walker.tree.children(template_root).to_vec();
    let locals = Locals::new();
    for child in children {
        walker.parse_node(child, &locals, false, false)?;
    }

    Ok(walker.data)
}

/// Carries walk state. Submodules implement the per-construct passes.
pub(crate) struct TemplateWalker<'a, 'c> {
    pub(crate) tree: &'a mut Tree,
    pub(crate) config: &'a TemplateConfig<'c>,
    pub(crate) globals: &'a [String],
    pub(crate) data: TemplateData,
    pub(crate) identifier_count: usize,
    pub(crate) method_count: usize,
}

impl<'a, 'c> TemplateWalker<'a, 'c> {
    pub(crate) fn parse_node(
        &mut self,
        id: NodeId,
        local_data: &Locals,
        nullable: bool,
        multiple: bool,
    ) -> Result<()> {
        match &self.tree.node(id).kind {
            NodeKind::Element(_) => self.parse_element(id, local_data, nullable, multiple),
            NodeKind::Text(_) => self.parse_text(id, local_data, multiple),
            NodeKind::Comment(_) => Ok(()),
        }
    }

    /// Assigns (or returns) the element's generated class identifier used for
    /// runtime lookup, appending it to the element's `class` attribute.
    pub(crate) fn add_identifier(&mut self, element: NodeId) -> String {
        if let Some(identifier) = self.data.node_data.identifier(element) {
            return identifier.to_string();
        }
        let identifier = format!("c{}", self.identifier_count);
        self.identifier_count += 1;
        self.data.node_data.entry(element).identifier = Some(identifier.clone());

        let attributes = &mut self.tree.element_mut(element).attributes;
        let class = match attributes.get("class") {
            Some(Some(existing)) => format!("{} {}", existing, identifier),
            _ => identifier.clone(),
        };
        attributes.insert("class".to_string(), Some(class));
        identifier
    }

    /// Names the next hoisted per-node render method. Lookup identifiers
    /// cannot serve here because loop bodies never receive one.
    pub(crate) fn next_render_method_name(&mut self) -> String {
        let name = format!("render{}", self.method_count);
        self.method_count += 1;
        name
    }

    /// Resolves the variable chains a partial binding's expression references
    /// and appends the finished binding. Expressions that reference no data
    /// (pure literals, globals) produce no binding.
    pub(crate) fn add_binding(&mut self, partial: PartialBinding, local_data: &Locals) {
        let chains = referenced_chains(&partial.expression);
        let references: Vec<VariableChain> = chains
            .iter()
            .filter_map(|parts| resolve_chain(parts, local_data, self.globals))
            .collect();
        self.add_binding_with_references(partial, references);
    }

    pub(crate) fn add_binding_with_references(
        &mut self,
        partial: PartialBinding,
        references: Vec<VariableChain>,
    ) {
        if references.is_empty() {
            return;
        }
        self.data.bindings.push(Binding {
            element: partial.element,
            expression: partial.expression,
            aspect: partial.aspect,
            fragment_index: partial.fragment_index,
            attribute: partial.attribute,
            style_key: partial.style_key,
            references_variables: references,
        });
    }
}

/// Maps a raw reference chain through the loop scope. A chain rooted at a
/// loop variable picks up that variable's full path (with its `*` segments)
/// so nested loop chains deduplicate structurally. Chains rooted at a
/// declared global resolve to nothing.
pub(crate) fn resolve_chain(
    parts: &[PathPart],
    local_data: &Locals,
    globals: &[String],
) -> Option<VariableChain> {
    let root = match parts.first()? {
        PathPart::Name(name) => name,
        PathPart::Number(_) => return None,
    };
    if globals.iter().any(|global| global == root) {
        return None;
    }

    let mut chain = VariableChain::new();
    let rest = if let Some(local) = local_data.iter().find(|local| &local.name == root) {
        chain.extend(local.path.iter().cloned());
        &parts[1..]
    } else {
        parts
    };
    for part in rest {
        match part {
            PathPart::Name(name) => chain.push(ChainSegment::Property(name.clone())),
            PathPart::Number(index) => chain.push(ChainSegment::Index(*index)),
        }
    }
    Some(chain)
}

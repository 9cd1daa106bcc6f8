//! Server render chunk construction.
//!
//! Server output is described as a flat list of chunks rather than emitted
//! source, so a host backend can turn the same list into a template literal,
//! a string builder or a streaming response. Adjacent literal chunks are
//! coalesced as they are added.

use indexmap::IndexMap;

use crate::component::ComponentRegistry;
use crate::html::tags::{BOOLEAN_ATTRIBUTES, VOID_ELEMENTS};
use crate::html::{NodeId, Tree};
use crate::js::{alias_variables, Expr};
use crate::template::NodeDataStore;

use super::{data_variable, expand_char_references};

/// One piece of server output.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerRenderChunk {
    Literal(String),
    /// A bound expression. `escape` is false only for trusted values such as
    /// raw innerHTML and slot content rendered by a nested call.
    Expression {
        value: Expr,
        escape: bool,
    },
    Conditional {
        condition: Expr,
        truthy: Vec<ServerRenderChunk>,
        falsy: Vec<ServerRenderChunk>,
    },
    Loop {
        subject: Expr,
        variable: String,
        body: Vec<ServerRenderChunk>,
    },
    /// Delegation to a child component's own server render function.
    ComponentCall {
        tag_name: String,
        args: IndexMap<String, ServerRenderArgument>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerRenderArgument {
    Chunks(Vec<ServerRenderChunk>),
    Expression(Expr),
}

#[derive(Debug, Clone, Copy)]
pub struct ServerRenderSettings {
    pub minify: bool,
    /// Elements with required listeners render disabled until hydration.
    pub add_disable_to_element_with_events: bool,
}

/// Appends a chunk, merging consecutive literals.
pub(crate) fn add_chunk(chunk: ServerRenderChunk, chunks: &mut Vec<ServerRenderChunk>) {
    if let (ServerRenderChunk::Literal(text), Some(ServerRenderChunk::Literal(last))) =
        (&chunk, chunks.last_mut())
    {
        last.push_str(text);
        return;
    }
    chunks.push(chunk);
}

/// Chunks for every child of the template root.
pub fn build_server_render(
    tree: &Tree,
    template_root: NodeId,
    node_data: &NodeDataStore,
    registry: &ComponentRegistry,
    settings: &ServerRenderSettings,
    globals: &[String],
) -> Vec<ServerRenderChunk> {
    let builder = ServerRenderBuilder {
        tree,
        node_data,
        registry,
        settings: *settings,
        globals,
    };
    let children = tree.children(template_root);
    let mut chunks = Vec::new();
    for (i, &child) in children.iter().enumerate() {
        for chunk in builder.render_node(child, &[], false) {
            add_chunk(chunk, &mut chunks);
        }
        if !settings.minify && i + 1 < children.len() {
            add_chunk(ServerRenderChunk::Literal("\n".to_string()), &mut chunks);
        }
    }
    chunks
}

struct ServerRenderBuilder<'a> {
    tree: &'a Tree,
    node_data: &'a NodeDataStore,
    registry: &'a ComponentRegistry,
    settings: ServerRenderSettings,
    globals: &'a [String],
}

impl<'a> ServerRenderBuilder<'a> {
    fn render_node(
        &self,
        id: NodeId,
        locals: &[String],
        skip_over_expression: bool,
    ) -> Vec<ServerRenderChunk> {
        let mut chunks = Vec::new();

        if let Some(text) = self.tree.as_text(id) {
            let dynamic = self
                .node_data
                .get(id)
                .and_then(|data| data.text_node_value.as_ref());
            match dynamic {
                Some(value) => add_chunk(
                    ServerRenderChunk::Expression {
                        value: self.aliased(value, locals),
                        escape: true,
                    },
                    &mut chunks,
                ),
                None => add_chunk(
                    ServerRenderChunk::Literal(expand_char_references(&text.text)),
                    &mut chunks,
                ),
            }
            return chunks;
        }

        if let Some(comment) = self.tree.as_comment(id) {
            // Fragment delimiters survive into server output so hydration can
            // split adjacent text back into separate CharacterData nodes.
            if self.node_data.is_fragment(id) {
                add_chunk(
                    ServerRenderChunk::Literal(format!("<!--{}-->", comment.comment)),
                    &mut chunks,
                );
            }
            return chunks;
        }

        let element = self.tree.element(id);
        let data = self.node_data.get(id);

        if let Some(slot_for) = data.and_then(|d| d.slot_for.as_deref()) {
            add_chunk(
                ServerRenderChunk::Expression {
                    value: Expr::ident(format!("{}Slot", slot_for)),
                    escape: false,
                },
                &mut chunks,
            );
            return chunks;
        }

        if !skip_over_expression && element.attributes.contains_key("data-else") {
            // Emitted as the falsy side of the paired conditional chunk.
            return chunks;
        }

        if !skip_over_expression {
            if let Some(condition) = data.and_then(|d| d.conditional_expression.as_ref()) {
                let truthy = self.render_node(id, locals, true);
                let falsy = data
                    .and_then(|d| d.else_element)
                    .map(|element| self.render_node(element, locals, true))
                    .unwrap_or_default();
                return vec![ServerRenderChunk::Conditional {
                    condition: self.aliased(condition, locals),
                    truthy,
                    falsy,
                }];
            }
        }

        if let Some(component) = data
            .and_then(|d| d.component.as_deref())
            .and_then(|tag| self.registry.get(tag))
        {
            let mut args: IndexMap<String, ServerRenderArgument> = IndexMap::new();
            args.insert(
                "attributes".to_string(),
                ServerRenderArgument::Chunks(self.render_attributes(id, locals)),
            );
            if component.has_slots {
                let mut slot_chunks = Vec::new();
                for &child in &element.children {
                    for chunk in self.render_node(child, locals, false) {
                        add_chunk(chunk, &mut slot_chunks);
                    }
                }
                args.insert(
                    "contentSlot".to_string(),
                    ServerRenderArgument::Chunks(slot_chunks),
                );
            }
            if let Some(value) = data.and_then(|d| d.dynamic_attributes.get("data")) {
                args.insert(
                    "data".to_string(),
                    ServerRenderArgument::Expression(self.aliased(value, locals)),
                );
            }
            for global in &component.client_globals {
                args.insert(
                    global.clone(),
                    ServerRenderArgument::Expression(Expr::ident(global.clone())),
                );
            }
            add_chunk(
                ServerRenderChunk::ComponentCall {
                    tag_name: component.tag_name.clone(),
                    args,
                },
                &mut chunks,
            );
            return chunks;
        }

        add_chunk(
            ServerRenderChunk::Literal(format!("<{}", element.tag_name)),
            &mut chunks,
        );
        for chunk in self.render_attributes(id, locals) {
            add_chunk(chunk, &mut chunks);
        }
        let has_required_events = data
            .map(|d| d.events.iter().any(|event| event.required))
            .unwrap_or(false);
        if self.settings.add_disable_to_element_with_events && has_required_events {
            add_chunk(ServerRenderChunk::Literal(" disabled".to_string()), &mut chunks);
        }
        if element.closes_self {
            add_chunk(ServerRenderChunk::Literal("/".to_string()), &mut chunks);
        }
        add_chunk(ServerRenderChunk::Literal(">".to_string()), &mut chunks);
        if element.closes_self || VOID_ELEMENTS.contains(element.tag_name.as_str()) {
            return chunks;
        }
        if !self.settings.minify && !element.children.is_empty() {
            add_chunk(ServerRenderChunk::Literal("\n    ".to_string()), &mut chunks);
        }

        if let Some(iterator) = data.and_then(|d| d.iterator_expression.as_ref()) {
            let child = element
                .children
                .iter()
                .copied()
                .find(|&child| !self.tree.is_comment(child));
            let mut inner = vec![iterator.variable.clone()];
            inner.extend(locals.iter().cloned());
            let body = child
                .map(|child| self.render_node(child, &inner, false))
                .unwrap_or_default();
            add_chunk(
                ServerRenderChunk::Loop {
                    subject: self.aliased(&iterator.subject, locals),
                    variable: iterator.variable.clone(),
                    body,
                },
                &mut chunks,
            );
        } else if let Some(raw) = data.and_then(|d| d.raw_inner_html.as_ref()) {
            add_chunk(
                ServerRenderChunk::Expression {
                    value: self.aliased(raw, locals),
                    escape: false,
                },
                &mut chunks,
            );
        } else {
            for (i, &child) in element.children.iter().enumerate() {
                let mut parts = self.render_node(child, locals, false);
                if !self.settings.minify {
                    for part in &mut parts {
                        if let ServerRenderChunk::Literal(text) = part {
                            if text.starts_with('\n') {
                                text.push_str("    ");
                            }
                        }
                    }
                    if i + 1 < element.children.len()
                        && !self.fragment_boundary(child, element.children[i + 1])
                    {
                        parts.push(ServerRenderChunk::Literal("\n    ".to_string()));
                    }
                }
                for part in parts {
                    add_chunk(part, &mut chunks);
                }
            }
        }

        if !self.settings.minify && !element.children.is_empty() {
            add_chunk(ServerRenderChunk::Literal("\n".to_string()), &mut chunks);
        }
        add_chunk(
            ServerRenderChunk::Literal(format!("</{}>", element.tag_name)),
            &mut chunks,
        );
        chunks
    }

    /// Whitespace between a text fragment and its delimiter comment would end
    /// up inside hydrated text, so no cosmetic break is inserted there.
    fn fragment_boundary(&self, child: NodeId, next: NodeId) -> bool {
        (self.tree.is_comment(child)
            && self.node_data.is_fragment(child)
            && self.tree.as_text(next).is_some())
            || (self.tree.as_text(child).is_some()
                && self.tree.is_comment(next)
                && self.node_data.is_fragment(next))
    }

    fn render_attributes(&self, id: NodeId, locals: &[String]) -> Vec<ServerRenderChunk> {
        let element = self.tree.element(id);
        let mut chunks = Vec::new();
        for (name, value) in &element.attributes {
            add_chunk(ServerRenderChunk::Literal(format!(" {}", name)), &mut chunks);
            if let Some(value) = value {
                add_chunk(
                    ServerRenderChunk::Literal(format!("=\"{}\"", value)),
                    &mut chunks,
                );
            }
        }
        let dynamic = self
            .node_data
            .get(id)
            .map(|data| &data.dynamic_attributes);
        if let Some(dynamic) = dynamic {
            for (name, value) in dynamic {
                // `data` is forwarded to the component call, not serialized
                // as a markup attribute.
                if name == "data" {
                    continue;
                }
                let value = self.aliased(value, locals);
                if BOOLEAN_ATTRIBUTES.contains(name.as_str()) {
                    add_chunk(
                        ServerRenderChunk::Conditional {
                            condition: value,
                            truthy: vec![ServerRenderChunk::Literal(format!(" {}", name))],
                            falsy: vec![ServerRenderChunk::Literal(String::new())],
                        },
                        &mut chunks,
                    );
                } else {
                    add_chunk(ServerRenderChunk::Literal(format!(" {}=\"", name)), &mut chunks);
                    add_chunk(
                        ServerRenderChunk::Expression {
                            value,
                            escape: true,
                        },
                        &mut chunks,
                    );
                    add_chunk(ServerRenderChunk::Literal("\"".to_string()), &mut chunks);
                }
            }
        }
        chunks
    }

    fn aliased(&self, expression: &Expr, locals: &[String]) -> Expr {
        let mut cloned = expression.clone();
        let mut except: Vec<String> = locals.to_vec();
        except.extend(self.globals.iter().cloned());
        alias_variables(&mut cloned, &data_variable(), &except);
        cloned
    }
}

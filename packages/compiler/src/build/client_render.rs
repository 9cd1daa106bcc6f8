//! Client render method construction.
//!
//! Produces the component's `render` method as a tree of calls to the bundled
//! `h` helper, one call per element. Loop and conditional roots are hoisted
//! into their own named methods so the mutation accessors can re-render a
//! single branch or row without touching the rest of the tree.

use crate::html::tags::BOOLEAN_ATTRIBUTES;
use crate::html::{NodeId, Tree};
use crate::js::{
    alias_variables, this_data_variable, Expr, Function, ObjectLiteral, Statement,
};
use crate::template::NodeDataStore;

use super::expand_char_references;

/// The `render` method plus any hoisted per-node render methods.
pub struct ClientRender {
    pub render_method: Function,
    pub hoisted_methods: Vec<Function>,
}

pub fn build_client_render(
    tree: &Tree,
    template_root: NodeId,
    node_data: &NodeDataStore,
    use_shadow_dom: bool,
    globals: &[String],
) -> ClientRender {
    let mut builder = ClientRenderBuilder {
        tree,
        node_data,
        globals,
        hoisted: Vec::new(),
    };

    let mut children = Vec::new();
    for &child in tree.children(template_root) {
        if let Some(rendered) = builder.render_node(child, &[], false) {
            children.push(rendered);
        }
    }

    let attach_to = if use_shadow_dom {
        let mut mode = ObjectLiteral::new();
        mode.set("mode", Expr::string("open"));
        Expr::from_chain(["this", "attachShadow"]).call(vec![Expr::ObjectLiteral(mode)])
    } else {
        // `super` so the append is not intercepted by slot catching.
        Expr::ident("super")
    };

    let render_method = Function::new(
        Some("render".to_string()),
        Vec::new(),
        vec![Statement::Expression(
            attach_to.property("append").call(children),
        )],
    );

    ClientRender {
        render_method,
        hoisted_methods: builder.hoisted,
    }
}

struct ClientRenderBuilder<'a> {
    tree: &'a Tree,
    node_data: &'a NodeDataStore,
    globals: &'a [String],
    hoisted: Vec<Function>,
}

impl<'a> ClientRenderBuilder<'a> {
    /// The construction expression for one node, or `None` for nodes with no
    /// client-side counterpart. `skip_over_expression` renders a loop or
    /// conditional root as a plain element, used inside its hoisted method.
    fn render_node(
        &mut self,
        id: NodeId,
        locals: &[String],
        skip_over_expression: bool,
    ) -> Option<Expr> {
        if let Some(text) = self.tree.as_text(id) {
            let dynamic = self
                .node_data
                .get(id)
                .and_then(|data| data.text_node_value.as_ref());
            return Some(match dynamic {
                Some(expression) => self.aliased(expression, locals),
                None => Expr::string(expand_char_references(&text.text)),
            });
        }

        if self.tree.is_comment(id) {
            // Only fragment delimiter comments exist client side, recreated
            // so hydrated child indices line up with server output.
            if self.node_data.is_fragment(id) {
                return Some(Expr::ident("cC").call(Vec::new()));
            }
            return None;
        }

        let element = self.tree.element(id);
        let data = self.node_data.get(id);

        if data.and_then(|d| d.slot_for.as_deref()).is_some() {
            return Some(Expr::from_chain(["this", "slotElement"]).spread());
        }

        if !skip_over_expression && element.attributes.contains_key("data-else") {
            // Rendered by the paired conditional's hoisted method.
            return None;
        }

        if !skip_over_expression {
            if let Some(data) = data {
                if let (Some(condition), Some(method)) =
                    (&data.conditional_expression, &data.client_render_method)
                {
                    let condition = self.aliased(condition, locals);
                    self.hoist_conditional_method(id, method, locals);
                    return Some(
                        Expr::ident("this")
                            .property(method.clone())
                            .call(vec![condition]),
                    );
                }
            }
        }

        let mut attributes: Vec<(String, Expr)> = Vec::new();
        for (name, value) in &element.attributes {
            if BOOLEAN_ATTRIBUTES.contains(name.as_str()) {
                attributes.push((name.clone(), Expr::boolean(true)));
            } else {
                attributes.push((
                    name.clone(),
                    Expr::string(value.clone().unwrap_or_default()),
                ));
            }
        }
        if let Some(data) = data {
            for (name, value) in &data.dynamic_attributes {
                attributes.push((name.clone(), self.aliased(value, locals)));
            }
        }

        let events = match data {
            Some(data) if !data.events.is_empty() => {
                let mut listeners = ObjectLiteral::new();
                for event in &data.events {
                    let callback = match (&event.callback, event.exists_on_component_class) {
                        (Expr::Identifier(name), true) => Expr::ident("this")
                            .property(name.clone())
                            .property("bind")
                            .call(vec![Expr::ident("this")]),
                        (callback, _) => callback.clone(),
                    };
                    listeners.set(event.event_name.clone(), callback);
                }
                Expr::ObjectLiteral(listeners)
            }
            _ => Expr::number(0.0),
        };

        let children: Vec<Expr>;
        let iterator = data.and_then(|d| d.iterator_expression.as_ref());
        if let (false, Some(iterator)) = (skip_over_expression, iterator) {
            let subject = self.aliased(&iterator.subject, locals);
            let method = data
                .and_then(|d| d.client_render_method.clone())
                .unwrap_or_default();
            self.hoist_loop_method(id, &method, &iterator.variable, locals);
            children = vec![subject
                .property("map")
                .call(vec![Expr::ident("this").property(method)])
                .spread()];
        } else if let Some(raw) = data.and_then(|d| d.raw_inner_html.as_ref()) {
            attributes.push(("innerHTML".to_string(), self.aliased(raw, locals)));
            children = Vec::new();
        } else {
            children = element
                .children
                .iter()
                .filter_map(|&child| self.render_node(child, locals, false))
                .collect();
        }

        let attribute_argument = if attributes.is_empty() {
            // 0 over an empty object, the helper treats any falsy the same.
            Expr::number(0.0)
        } else {
            let mut object = ObjectLiteral::new();
            for (name, value) in attributes {
                object.set(name, value);
            }
            Expr::ObjectLiteral(object)
        };

        let mut arguments = vec![
            Expr::string(element.tag_name.clone()),
            attribute_argument,
            events,
        ];
        arguments.extend(children);
        Some(Expr::ident("h").call(arguments))
    }

    /// `renderN(variable) { return <row>; }` for a loop root's single child.
    fn hoist_loop_method(&mut self, id: NodeId, name: &str, variable: &str, locals: &[String]) {
        if self.already_hoisted(name) {
            return;
        }
        let child = self
            .tree
            .children(id)
            .iter()
            .copied()
            .find(|&child| !self.tree.is_comment(child));
        let mut inner = locals.to_vec();
        inner.push(variable.to_string());
        let body = child.and_then(|child| self.render_node(child, &inner, false));
        self.hoisted.push(Function::new(
            Some(name.to_string()),
            vec![variable.to_string()],
            vec![Statement::Return(body)],
        ));
    }

    /// `renderN(p) { return p ? <truthy> : <falsy>; }` for a conditional root
    /// and its else branch. The caller evaluates the condition.
    fn hoist_conditional_method(&mut self, id: NodeId, name: &str, locals: &[String]) {
        if self.already_hoisted(name) {
            return;
        }
        let truthy = self.render_node(id, locals, true);
        let else_element = self
            .node_data
            .get(id)
            .and_then(|data| data.else_element);
        let falsy = else_element.and_then(|element| self.render_node(element, locals, true));
        let branch = Expr::Conditional {
            condition: Box::new(Expr::ident("p")),
            truthy: Box::new(truthy.unwrap_or(Expr::number(0.0))),
            falsy: Box::new(falsy.unwrap_or(Expr::number(0.0))),
        };
        self.hoisted.push(Function::new(
            Some(name.to_string()),
            vec!["p".to_string()],
            vec![Statement::Return(Some(branch))],
        ));
    }

    fn already_hoisted(&self, name: &str) -> bool {
        self.hoisted
            .iter()
            .any(|function| function.name.as_deref() == Some(name))
    }

    fn aliased(&self, expression: &Expr, locals: &[String]) -> Expr {
        let mut cloned = expression.clone();
        let mut except: Vec<String> = locals.to_vec();
        except.extend(self.globals.iter().cloned());
        alias_variables(&mut cloned, &this_data_variable(), &except);
        cloned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentRegistry;
    use crate::html::parse_template_root;
    use crate::js::{render_function, EmitSettings};
    use crate::template::{parse_template, TemplateConfig, TemplateData};
    use std::collections::HashSet;

    fn compile(source: &str, methods: &[&str]) -> (Tree, NodeId, TemplateData) {
        let (mut tree, root) = parse_template_root(source).unwrap();
        let registry = ComponentRegistry::new();
        let component_methods: HashSet<String> =
            methods.iter().map(|name| name.to_string()).collect();
        let config = TemplateConfig {
            ssr_enabled: false,
            imported_components: &registry,
            component_methods: &component_methods,
        };
        let data = parse_template(&mut tree, root, &config, &[]).unwrap();
        (tree, root, data)
    }

    fn render(tree: &Tree, root: NodeId, data: &TemplateData) -> ClientRender {
        build_client_render(tree, root, &data.node_data, false, &[])
    }

    #[test]
    fn interpolated_heading_renders_through_h() {
        let (tree, root, data) = compile("<template><h1>{title}</h1></template>", &[]);
        let output = render(&tree, root, &data);
        let method = render_function(&output.render_method, &EmitSettings::default());
        assert!(
            method.contains("h(\"h1\", { class: \"c0\" }, 0, this.data.title)"),
            "{}",
            method
        );
        assert!(method.contains("super.append("), "{}", method);
    }

    #[test]
    fn loop_hoists_a_row_method() {
        let (tree, root, data) = compile(
            "<template><ul #for=\"item of items\"><li>{item}</li></ul></template>",
            &[],
        );
        let output = render(&tree, root, &data);
        let method = render_function(&output.render_method, &EmitSettings::default());
        assert!(
            method.contains("...this.data.items.map(this.render0)"),
            "{}",
            method
        );
        assert_eq!(output.hoisted_methods.len(), 1);
        let hoisted = render_function(&output.hoisted_methods[0], &EmitSettings::default());
        assert!(hoisted.starts_with("render0(item)"), "{}", hoisted);
        assert!(hoisted.contains("h(\"li\", 0, 0, item)"), "{}", hoisted);
    }

    #[test]
    fn conditional_renders_both_branches_from_one_method() {
        let (tree, root, data) = compile(
            "<template><p #if=\"show\">Yes</p><p #else>No</p></template>",
            &[],
        );
        let output = render(&tree, root, &data);
        let method = render_function(&output.render_method, &EmitSettings::default());
        assert!(method.contains("this.render0(this.data.show)"), "{}", method);
        // The else branch only appears inside the hoisted method.
        assert!(!method.contains("\"No\""), "{}", method);
        assert_eq!(output.hoisted_methods.len(), 1);
        let hoisted = render_function(&output.hoisted_methods[0], &EmitSettings::default());
        assert!(hoisted.contains("p ?"), "{}", hoisted);
        assert!(hoisted.contains("\"Yes\""), "{}", hoisted);
        assert!(hoisted.contains("\"No\""), "{}", hoisted);
    }

    #[test]
    fn class_methods_are_bound_listeners() {
        let (tree, root, data) = compile(
            "<template><button @click=\"increment\">Go</button></template>",
            &["increment"],
        );
        let output = render(&tree, root, &data);
        let method = render_function(&output.render_method, &EmitSettings::default());
        assert!(
            method.contains("{ click: this.increment.bind(this) }"),
            "{}",
            method
        );
    }
}

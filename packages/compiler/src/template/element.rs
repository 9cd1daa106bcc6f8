//! Element classification and attribute directives.
//!
//! `$name="expr"` binds an attribute, `$style.key="expr"` binds a style
//! property, `@name="cb"` attaches an event listener, `@set:prop="method"`
//! hooks a method to data changes and `#html="expr"` assigns raw innerHTML.
//! Static attribute values may also carry `{expr}` interpolation.

use crate::error::{CompileError, Result};
use crate::expression_parser::parse_expression;
use crate::html::NodeId;
use crate::html::tags::SVG_ELEMENTS;
use crate::js::{Expr, TemplatePart};

use super::text::{split_interpolated_text, TextFragment};
use super::{
    resolve_chain, BindingAspect, EventListener, Locals, PartialBinding, TemplateWalker,
    VariableChain,
};

impl<'a, 'c> TemplateWalker<'a, 'c> {
    pub(crate) fn parse_element(
        &mut self,
        id: NodeId,
        local_data: &Locals,
        nullable: bool,
        multiple: bool,
    ) -> Result<()> {
        let tag_name = self.tree.element(id).tag_name.clone();

        if tag_name == "slot" {
            return self.parse_slot(id);
        }

        if self.tree.element(id).attributes.contains_key("#if") {
            return self.parse_conditional(id, local_data, multiple);
        }
        if self.tree.element(id).attributes.contains_key("#for") {
            return self.parse_for(id, local_data, nullable, multiple);
        }
        if self.tree.element(id).attributes.contains_key("#else") {
            // A reachable #else means no preceding #if claimed it.
            return Err(CompileError::DirectiveSyntax {
                construct: "#else",
                source_text: format!("<{}>", tag_name),
            });
        }

        self.parse_standard_element(id, local_data, nullable, multiple)
    }

    /// An element with no structural directive: attribute classification,
    /// component resolution, then child recursion.
    pub(crate) fn parse_standard_element(
        &mut self,
        id: NodeId,
        local_data: &Locals,
        nullable: bool,
        multiple: bool,
    ) -> Result<()> {
        let tag_name = self.tree.element(id).tag_name.clone();

        if SVG_ELEMENTS.contains(tag_name.as_str()) {
            self.data.has_svg = true;
        }

        let is_component = self
            .config
            .imported_components
            .get(&tag_name)
            .is_some();
        if is_component {
            self.data.node_data.entry(id).component = Some(tag_name.clone());
        }

        let attribute_names: Vec<String> =
            self.tree.element(id).attributes.keys().cloned().collect();

        for name in attribute_names {
            if let Some(event_name) = name.strip_prefix('@') {
                let value = self.take_attribute_value(id, &name, "@")?;
                if let Some(property) = event_name.strip_prefix("set:") {
                    self.parse_set_hook(id, property, &value, local_data)?;
                } else {
                    self.parse_event(id, event_name.to_string(), &value, multiple)?;
                }
            } else if let Some(target) = name.strip_prefix('$') {
                let value = self.take_attribute_value(id, &name, "$")?;
                let expression = parse_expression(&value)?;
                if !multiple {
                    self.add_identifier(id);
                }
                if let Some(style_key) = target.strip_prefix("style.") {
                    let mut partial =
                        PartialBinding::new(id, BindingAspect::Style, expression);
                    partial.style_key = Some(style_key.to_string());
                    self.add_binding(partial, local_data);
                } else if target == "data" && is_component {
                    self.data
                        .node_data
                        .entry(id)
                        .dynamic_attributes
                        .insert("data".to_string(), expression.clone());
                    let partial = PartialBinding::new(id, BindingAspect::Data, expression);
                    self.add_binding(partial, local_data);
                } else {
                    self.data
                        .node_data
                        .entry(id)
                        .dynamic_attributes
                        .insert(target.to_string(), expression.clone());
                    let mut partial =
                        PartialBinding::new(id, BindingAspect::Attribute, expression);
                    partial.attribute = Some(target.to_string());
                    self.add_binding(partial, local_data);
                }
            } else if name == "#html" {
                let value = self.take_attribute_value(id, &name, "#html")?;
                let expression = parse_expression(&value)?;
                if !multiple {
                    self.add_identifier(id);
                }
                self.data.node_data.entry(id).raw_inner_html = Some(expression.clone());
                let partial = PartialBinding::new(id, BindingAspect::InnerHTML, expression);
                self.add_binding(partial, local_data);
            } else if name.starts_with('#') {
                let value = self
                    .tree
                    .element(id)
                    .attributes
                    .get(&name)
                    .cloned()
                    .flatten()
                    .unwrap_or_default();
                return Err(CompileError::DirectiveSyntax {
                    construct: "directive attribute",
                    source_text: format!("{}=\"{}\"", name, value),
                });
            } else {
                self.parse_interpolated_attribute(id, &name, local_data, multiple)?;
            }
        }

        if self
            .data
            .node_data
            .get(id)
            .map(|data| data.raw_inner_html.is_some())
            .unwrap_or(false)
        {
            // Children are supplanted by the bound markup.
            return Ok(());
        }

        let children: Vec<NodeId> = self.tree.children(id).to_vec();
        for child in children {
            self.parse_node(child, local_data, nullable, multiple)?;
        }
        Ok(())
    }

    /// Static attribute values may embed `{expr}`; they lower to a dynamic
    /// attribute whose expression is a template literal.
    fn parse_interpolated_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        local_data: &Locals,
        multiple: bool,
    ) -> Result<()> {
        let value = match self.tree.element(id).attributes.get(name) {
            Some(Some(value)) if value.contains('{') => value.clone(),
            _ => return Ok(()),
        };
        let fragments = split_interpolated_text(&value)?;
        if fragments.is_empty() {
            return Ok(());
        }

        let expression = if fragments.len() == 1 {
            match fragments.into_iter().next() {
                Some(TextFragment::Dynamic(expression)) => expression,
                _ => return Ok(()),
            }
        } else {
            Expr::TemplateLiteral(
                fragments
                    .into_iter()
                    .map(|fragment| match fragment {
                        TextFragment::Static(text) => TemplatePart::Text(text),
                        TextFragment::Dynamic(expression) => TemplatePart::Expr(expression),
                    })
                    .collect(),
            )
        };

        self.tree.element_mut(id).attributes.shift_remove(name);
        if !multiple {
            self.add_identifier(id);
        }
        self.data
            .node_data
            .entry(id)
            .dynamic_attributes
            .insert(name.to_string(), expression.clone());
        let mut partial = PartialBinding::new(id, BindingAspect::Attribute, expression);
        partial.attribute = Some(name.to_string());
        self.add_binding(partial, local_data);
        Ok(())
    }

    fn parse_event(
        &mut self,
        id: NodeId,
        event_name: String,
        value: &str,
        multiple: bool,
    ) -> Result<()> {
        let callback = parse_expression(value)?;
        let exists_on_component_class = match &callback {
            Expr::Identifier(name) => self.config.component_methods.contains(name),
            _ => false,
        };
        // The hydration pass looks the element up by class to re-attach
        // handlers, so every event carrier needs an identifier.
        let node_identifier = if multiple {
            self.data
                .node_data
                .identifier(id)
                .map(str::to_string)
                .unwrap_or_default()
        } else {
            self.add_identifier(id)
        };
        let listener = EventListener {
            node_identifier,
            element: id,
            event_name,
            callback,
            required: true,
            exists_on_component_class,
        };
        self.data.node_data.entry(id).events.push(listener.clone());
        self.data.events.push(listener);
        Ok(())
    }

    /// `@set:prop="method"` calls the named component method whenever `prop`
    /// is assigned.
    fn parse_set_hook(
        &mut self,
        id: NodeId,
        property: &str,
        value: &str,
        local_data: &Locals,
    ) -> Result<()> {
        let callback = parse_expression(value)?;
        let chain: Option<VariableChain> = resolve_chain(
            &[crate::js::PathPart::Name(property.to_string())],
            local_data,
            self.globals,
        );
        let references = match chain {
            Some(chain) => vec![chain],
            None => Vec::new(),
        };
        let mut partial = PartialBinding::new(id, BindingAspect::SetHook, callback);
        partial.attribute = Some(property.to_string());
        self.add_binding_with_references(partial, references);
        Ok(())
    }

    /// Removes a directive attribute, returning its value or a syntax error
    /// naming the construct when the value is missing.
    pub(crate) fn take_attribute_value(
        &mut self,
        id: NodeId,
        name: &str,
        construct: &'static str,
    ) -> Result<String> {
        match self.tree.element_mut(id).attributes.shift_remove(name) {
            Some(Some(value)) if !value.is_empty() => Ok(value),
            _ => Err(CompileError::DirectiveSyntax {
                construct,
                source_text: name.to_string(),
            }),
        }
    }
}

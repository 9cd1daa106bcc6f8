//! `#if` / `#else` conditionals.
//!
//! The `#if` element and the `#else` element that must follow it swap places
//! at runtime (`conditionalSwap`), so both share a lookup identifier and both
//! subtrees are walked as nullable. The `#else` element is marked with a
//! `data-else` attribute so the runtime can tell which branch is mounted.

use crate::error::{CompileError, Result};
use crate::expression_parser::parse_expression;
use crate::html::{NodeId, NodeKind};

use super::{BindingAspect, Locals, PartialBinding, TemplateWalker};

impl<'a, 'c> TemplateWalker<'a, 'c> {
    pub(crate) fn parse_conditional(
        &mut self,
        id: NodeId,
        local_data: &Locals,
        multiple: bool,
    ) -> Result<()> {
        let source = self.take_attribute_value(id, "#if", "#if")?;
        let expression = parse_expression(&source)?;

        let else_element = self.find_else_sibling(id)?;
        self.tree
            .element_mut(else_element)
            .attributes
            .shift_remove("#else");
        self.tree
            .element_mut(else_element)
            .attributes
            .insert("data-else".to_string(), None);

        let identifier = self.add_identifier(id);
        // The swapped-in branch must answer the same lookup.
        self.share_identifier(else_element, &identifier);

        let method = self.next_render_method_name();
        {
            let data = self.data.node_data.entry(id);
            data.conditional_expression = Some(expression.clone());
            data.else_element = Some(else_element);
            data.nullable = true;
            data.client_render_method = Some(method);
        }
        self.data.node_data.entry(else_element).nullable = true;

        let partial = PartialBinding::new(id, BindingAspect::Conditional, expression);
        self.add_binding(partial, local_data);

        self.parse_standard_element(id, local_data, true, multiple)?;
        self.parse_element(else_element, local_data, true, multiple)
    }

    /// The next element sibling, which must carry `#else`. Intervening
    /// whitespace text and comments are tolerated.
    fn find_else_sibling(&self, id: NodeId) -> Result<NodeId> {
        let mut current = id;
        while let Some(next) = self.tree.next_sibling(current) {
            match &self.tree.node(next).kind {
                NodeKind::Element(element) => {
                    if element.attributes.contains_key("#else") {
                        return Ok(next);
                    }
                    return Err(CompileError::MissingElseElement);
                }
                NodeKind::Text(text) if text.text.trim().is_empty() => current = next,
                NodeKind::Comment(_) => current = next,
                NodeKind::Text(_) => return Err(CompileError::MissingElseElement),
            }
        }
        Err(CompileError::MissingElseElement)
    }

    fn share_identifier(&mut self, element: NodeId, identifier: &str) {
        self.data.node_data.entry(element).identifier = Some(identifier.to_string());
        let attributes = &mut self.tree.element_mut(element).attributes;
        let class = match attributes.get("class") {
            Some(Some(existing)) => format!("{} {}", existing, identifier),
            _ => identifier.to_string(),
        };
        attributes.insert("class".to_string(), Some(class));
    }
}

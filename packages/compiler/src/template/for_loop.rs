//! `#for` iteration.
//!
//! `#for="item of items"` repeats the element's single child per entry of the
//! subject array. The loop variable joins the local scope as a `*` path
//! segment so chains referenced inside the body deduplicate structurally.

use crate::error::{CompileError, Result};
use crate::expression_parser::parse_iterator;
use crate::html::NodeId;
use crate::js::chain_parts;

use super::{
    resolve_chain, BindingAspect, ChainSegment, Local, Locals, PartialBinding, TemplateWalker,
    VariableChain,
};

impl<'a, 'c> TemplateWalker<'a, 'c> {
    pub(crate) fn parse_for(
        &mut self,
        id: NodeId,
        local_data: &Locals,
        nullable: bool,
        multiple: bool,
    ) -> Result<()> {
        let value = self.take_attribute_value(id, "#for", "#for")?;
        let iterator = parse_iterator(&value)?;

        let subject_parts = chain_parts(&iterator.subject).ok_or_else(|| {
            CompileError::ForParameterNotIterator {
                source_text: value.clone(),
            }
        })?;

        {
            let children = self.tree.children(id);
            let non_comment = children
                .iter()
                .filter(|&&child| !self.tree.is_comment(child))
                .count();
            if non_comment != 1 {
                return Err(CompileError::MultipleIterationChildren);
            }
        }

        self.data.node_data.entry(id).iterator_expression = Some(iterator.clone());
        if !multiple {
            self.add_identifier(id);
        }
        let method = self.next_render_method_name();
        self.data.node_data.entry(id).client_render_method = Some(method);

        // Resolve the subject through enclosing loops so nested arrays chain.
        let from_local: VariableChain =
            match resolve_chain(&subject_parts, local_data, self.globals) {
                Some(chain) => chain,
                None => VariableChain::new(),
            };

        let mut partial = PartialBinding::new(id, BindingAspect::Iterator, iterator.subject.clone());
        partial.attribute = None;
        if from_local.is_empty() {
            // Subject is a global; nothing reactive to register.
        } else {
            self.add_binding_with_references(partial, vec![from_local.clone()]);
        }

        let mut loop_path = from_local;
        loop_path.push(ChainSegment::Loop {
            alias: iterator.variable.clone(),
            origin: id,
        });
        let mut new_locals = local_data.clone();
        new_locals.push(Local {
            name: iterator.variable.clone(),
            path: loop_path,
        });

        let children: Vec<NodeId> = self.tree.children(id).to_vec();
        for child in children {
            self.parse_node(child, &new_locals, nullable, true)?;
        }
        Ok(())
    }
}

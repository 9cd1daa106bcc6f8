//! `<slot>` elements inside component templates.
//!
//! A component template only carries content slots; the parent component
//! supplies the slotted children at construction time. `meta` slots belong to
//! the shell document and are handled by [`super::shell`].

use crate::error::{CompileError, Result};
use crate::html::NodeId;

use super::TemplateWalker;

impl<'a, 'c> TemplateWalker<'a, 'c> {
    pub(crate) fn parse_slot(&mut self, id: NodeId) -> Result<()> {
        let slot_for = self
            .tree
            .element(id)
            .attributes
            .get("for")
            .cloned()
            .flatten()
            .unwrap_or_else(|| "content".to_string());

        if slot_for != "content" {
            return Err(CompileError::UnknownSlotName {
                expected: "\"content\"",
                received: slot_for,
            });
        }

        self.data.node_data.entry(id).slot_for = Some(slot_for.clone());
        self.data.slots.insert(slot_for, id);
        Ok(())
    }
}

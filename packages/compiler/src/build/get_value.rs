//! Reverse getters.
//!
//! In isomorphic builds the client must be able to re-derive data from server
//! rendered DOM instead of shipping it twice. A getter exists only when the
//! binding expression is a bare variable reference, anything computed cannot
//! be inverted and the data point simply keeps no getter.

use crate::html::Tree;
use crate::js::{chain_parts, Expr};
use crate::template::{Binding, BindingAspect, ChainSegment, NodeDataStore};

use crate::html::tags::BOOLEAN_ATTRIBUTES;

use super::{get_element, get_slice, style_key_to_camel};

/// A DOM read reproducing the bound value, when one can be derived.
pub fn make_get_from_binding(
    binding: &Binding,
    node_data: &NodeDataStore,
    tree: &Tree,
    chain: &[ChainSegment],
) -> Option<Expr> {
    // Invertible only when the expression is the plain reference itself.
    let expression_parts = chain_parts(&binding.expression)?;
    if expression_parts != get_slice(chain) {
        return None;
    }

    let nullable = node_data.is_nullable(binding.element);
    let element = || get_element(binding.element, node_data, tree);

    match binding.aspect {
        BindingAspect::InnerText => {
            let fragment_index = binding.fragment_index?;
            let child_nodes = if nullable {
                element().optional_property("childNodes")
            } else {
                element().property("childNodes")
            };
            Some(child_nodes.index_number(fragment_index).property("textContent"))
        }
        BindingAspect::Attribute => {
            let attribute = binding.attribute.as_deref()?;
            if BOOLEAN_ATTRIBUTES.contains(attribute) {
                Some(if nullable {
                    element().optional_property(attribute)
                } else {
                    element().property(attribute)
                })
            } else {
                let get_attribute = if nullable {
                    element().optional_property("getAttribute")
                } else {
                    element().property("getAttribute")
                };
                Some(get_attribute.call(vec![Expr::string(attribute)]))
            }
        }
        BindingAspect::Style => {
            let key = style_key_to_camel(binding.style_key.as_deref()?);
            Some(element().property("style").property(key))
        }
        BindingAspect::InnerHTML => Some(if nullable {
            element().optional_property("innerHTML")
        } else {
            element().property("innerHTML")
        }),
        BindingAspect::DocumentTitle => Some(Expr::from_chain(["document", "title"])),
        // Sinks with no DOM representation to read back.
        BindingAspect::Data
        | BindingAspect::Iterator
        | BindingAspect::Conditional
        | BindingAspect::SetHook
        | BindingAspect::ServerParameter => None,
    }
}

/// `length` getter for an iterator binding: the rendered child count.
pub fn get_length_from_iterator_binding(
    binding: &Binding,
    node_data: &NodeDataStore,
    tree: &Tree,
) -> Expr {
    get_element(binding.element, node_data, tree)
        .property("children")
        .property("length")
}

//! Code Generators
//!
//! Both output shapes are folded from the same walked tree and annotation
//! store: `client_render` emits DOM construction expression trees and
//! `server_render` emits string template chunks. `get_value`/`set_value`
//! synthesize the per-aspect accessor bodies embedded in the mapping tree.

pub mod client_render;
pub mod get_value;
pub mod server_render;
pub mod set_value;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::html::{NodeId, Tree};
use crate::js::{Expr, PathPart};
use crate::template::{ChainSegment, NodeDataStore};

/// The conventional server render data parameter.
pub(crate) fn data_variable() -> Expr {
    Expr::ident("data")
}

/// Number of loop roots strictly above `id`, which is the positional
/// parameter slot its own index occupies.
fn loop_depth(tree: &Tree, node_data: &NodeDataStore, id: NodeId) -> usize {
    let mut depth = 0;
    let mut current = tree.parent(id);
    while let Some(ancestor) = current {
        if node_data
            .get(ancestor)
            .map(|data| data.iterator_expression.is_some())
            .unwrap_or(false)
        {
            depth += 1;
        }
        current = tree.parent(ancestor);
    }
    depth
}

/// Positional index parameter name for a loop at the given depth (`x`, `y`,
/// `z`, …). Must agree with the lettering used in the mapping tree.
pub(crate) fn positional_letter(depth: usize) -> String {
    char::from(b'x' + depth as u8).to_string()
}

/// An expression locating `element` at runtime. Identified elements resolve
/// through the component's lookup cache; loop descendants index through
/// `children` with the positional parameters of the enclosing accessor.
pub(crate) fn get_element(element: NodeId, node_data: &NodeDataStore, tree: &Tree) -> Expr {
    if let Some(identifier) = node_data.identifier(element) {
        return Expr::from_chain(["this", "getElem"]).call(vec![Expr::string(identifier)]);
    }

    // Steps down from the nearest identified ancestor.
    let mut steps: Vec<NodeId> = vec![element];
    let mut anchor = element;
    loop {
        match tree.parent(anchor) {
            Some(parent) => {
                anchor = parent;
                if node_data.identifier(anchor).is_some() {
                    break;
                }
                steps.push(anchor);
            }
            None => break,
        }
    }

    let mut expression = get_element_anchor(anchor, node_data);
    for &step in steps.iter().rev() {
        let parent = match tree.parent(step) {
            Some(parent) => parent,
            None => continue,
        };
        let index = if node_data
            .get(parent)
            .map(|data| data.iterator_expression.is_some())
            .unwrap_or(false)
        {
            Expr::ident(positional_letter(loop_depth(tree, node_data, parent)))
        } else {
            let position = tree
                .children(parent)
                .iter()
                .filter(|&&child| tree.as_element(child).is_some())
                .position(|&child| child == step)
                .unwrap_or(0);
            Expr::number(position as f64)
        };
        expression = expression.property("children").index(index);
    }
    expression
}

fn get_element_anchor(anchor: NodeId, node_data: &NodeDataStore) -> Expr {
    match node_data.identifier(anchor) {
        Some(identifier) => {
            Expr::from_chain(["this", "getElem"]).call(vec![Expr::string(identifier)])
        }
        None => Expr::ident("this"),
    }
}

/// The reference text a binding expression uses for a chain: inside a loop
/// body that is the loop alias plus the trailing segments, outside it is the
/// full property path.
pub(crate) fn get_slice(chain: &[ChainSegment]) -> Vec<PathPart> {
    let last_loop = chain
        .iter()
        .rposition(|segment| matches!(segment, ChainSegment::Loop { .. }));
    match last_loop {
        Some(position) => {
            let mut parts = Vec::new();
            if let ChainSegment::Loop { alias, .. } = &chain[position] {
                parts.push(PathPart::Name(alias.clone()));
            }
            parts.extend(chain[position + 1..].iter().filter_map(segment_part));
            parts
        }
        None => chain.iter().filter_map(segment_part).collect(),
    }
}

fn segment_part(segment: &ChainSegment) -> Option<PathPart> {
    match segment {
        ChainSegment::Property(name) => Some(PathPart::Name(name.clone())),
        ChainSegment::Index(index) => Some(PathPart::Number(*index)),
        ChainSegment::Loop { .. } => None,
    }
}

/// `background-color` to `backgroundColor`, the key form the `style` object
/// exposes.
pub(crate) fn style_key_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for c in key.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

static CHAR_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(x?)([0-9a-fA-F]+);").expect("valid regex"));

/// Numeric HTML character references in static text are pre-expanded to
/// literal characters at compile time, decimal and hex forms alike.
pub(crate) fn expand_char_references(text: &str) -> String {
    CHAR_REFERENCE
        .replace_all(text, |captures: &regex::Captures| {
            let radix = if captures[1].is_empty() { 10 } else { 16 };
            u32::from_str_radix(&captures[2], radix)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| captures[0].to_string())
        })
        .into_owned()
}

//! Shell document handling.
//!
//! The shell is the outer HTML page every build ships. Its `<slot
//! for="content">` marks where rendered pages land (wrapped in the router
//! element when client side routing is enabled), and `<slot for="meta">`
//! receives references to the emitted script and style bundles.

use crate::error::{CompileError, Result};
use crate::html::{parse_fragment, Element, NodeId, Tree};
use crate::settings::CompileSettings;

use super::NodeDataStore;

/// The parsed and rewritten shell document.
#[derive(Debug)]
pub struct ShellData {
    pub tree: Tree,
    pub roots: Vec<NodeId>,
    pub node_data: NodeDataStore,
    pub slots: Vec<NodeId>,
}

/// Parse the shell markup and rewrite its slot elements in place.
pub fn parse_shell(source: &str, settings: &CompileSettings) -> Result<ShellData> {
    let (mut tree, mut roots) = parse_fragment(source)?;
    let mut node_data = NodeDataStore::new();
    let mut slots = Vec::new();

    let mut elements = Vec::new();
    for &root in &roots {
        if tree.as_element(root).is_some() {
            elements.extend(tree.flat_elements(root));
        }
    }

    for element in elements {
        if tree.element(element).tag_name != "slot" {
            continue;
        }
        let slot_for = tree
            .element(element)
            .attributes
            .get("for")
            .cloned()
            .flatten()
            .unwrap_or_else(|| "content".to_string());

        slots.push(element);
        node_data.entry(element).slot_for = Some(slot_for.clone());

        match slot_for.as_str() {
            "content" => {
                if settings.do_client_side_routing {
                    wrap_in_router(&mut tree, &mut roots, element);
                }
            }
            "meta" => inject_bundle_references(&mut tree, element, settings),
            _ => {
                return Err(CompileError::UnknownSlotName {
                    expected: "\"content\" or \"meta\"",
                    received: slot_for,
                })
            }
        }
    }

    Ok(ShellData {
        tree,
        roots,
        node_data,
        slots,
    })
}

/// Wraps the content slot inside the router element so page swaps have a
/// stable mount point.
fn wrap_in_router(tree: &mut Tree, roots: &mut [NodeId], slot: NodeId) {
    let parent = tree.parent(slot);
    let wrapper = tree.push_element(Element::new("router-component"), parent);
    tree.append_child(wrapper, slot);

    match parent {
        Some(parent) => tree.replace_child(parent, slot, vec![wrapper]),
        None => {
            if let Some(position) = roots.iter().position(|&root| root == slot) {
                roots[position] = wrapper;
            }
        }
    }
}

/// Inserts `<script type=module>` and `<link rel=stylesheet>` referring to
/// the build's bundles just before the meta slot.
fn inject_bundle_references(tree: &mut Tree, slot: NodeId, settings: &CompileSettings) {
    let parent = match tree.parent(slot) {
        Some(parent) => parent,
        None => return,
    };

    let mut script = Element::new("script");
    script.attributes.insert("type".to_string(), Some("module".to_string()));
    script.attributes.insert(
        "src".to_string(),
        Some(format!(
            "{}{}",
            settings.relative_base_path, settings.output_script_name
        )),
    );
    let script = tree.push_element(script, Some(parent));

    let mut link = Element::new("link");
    link.attributes
        .insert("rel".to_string(), Some("stylesheet".to_string()));
    link.attributes.insert(
        "href".to_string(),
        Some(format!(
            "{}{}",
            settings.relative_base_path, settings.output_style_name
        )),
    );
    let link = tree.push_element(link, Some(parent));

    tree.replace_child(parent, slot, vec![script, link, slot]);
}

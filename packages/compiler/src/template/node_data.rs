//! Annotation Store
//!
//! Compiler facts derived while walking a template are kept out of the markup
//! arena and stored here, keyed by `NodeId`. The walker is the only writer;
//! both code generators read the finished store.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::expression_parser::IteratorExpression;
use crate::html::NodeId;
use crate::js::Expr;

use super::EventListener;

/// Facts attached to one node. All fields start unset.
#[derive(Debug, Clone, Default)]
pub struct NodeData {
    /// Tag name of a resolved child component, when the element refers to one.
    pub component: Option<String>,
    /// Attribute name to bound expression.
    pub dynamic_attributes: IndexMap<String, Expr>,
    pub events: Vec<EventListener>,
    /// Class name used for runtime element lookup (`getElem`).
    pub identifier: Option<String>,
    pub slot_for: Option<String>,
    /// The node may be absent at runtime (conditional branches).
    pub nullable: bool,
    pub iterator_expression: Option<IteratorExpression>,
    pub conditional_expression: Option<Expr>,
    /// For a conditional root, the paired else branch element.
    pub else_element: Option<NodeId>,
    /// Name of the hoisted per-node render method, when the node's subtree is
    /// extracted into its own function.
    pub client_render_method: Option<String>,
    /// For dynamic text nodes, the interpolated expression.
    pub text_node_value: Option<Expr>,
    /// Marks comments inserted purely to delimit adjacent text fragments.
    pub is_fragment: bool,
    pub raw_inner_html: Option<Expr>,
}

/// Parallel store from node id to annotation record.
#[derive(Debug, Clone, Default)]
pub struct NodeDataStore {
    records: HashMap<NodeId, NodeData>,
}

impl NodeDataStore {
    pub fn new() -> Self {
        NodeDataStore {
            records: HashMap::new(),
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.records.get(&id)
    }

    /// The record for `id`, created empty on first access.
    pub fn entry(&mut self, id: NodeId) -> &mut NodeData {
        self.records.entry(id).or_default()
    }

    pub fn identifier(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|data| data.identifier.as_deref())
    }

    pub fn is_nullable(&self, id: NodeId) -> bool {
        self.get(id).map(|data| data.nullable).unwrap_or(false)
    }

    pub fn is_fragment(&self, id: NodeId) -> bool {
        self.get(id).map(|data| data.is_fragment).unwrap_or(false)
    }
}

//! Markup Tree
//!
//! Arena-allocated node storage. Nodes are addressed by integer `NodeId`
//! handles assigned in parse order; annotations live in a parallel store
//! keyed by the same ids, so the tree itself never grows compiler fields.

use indexmap::IndexMap;

/// Handle into a [`Tree`]'s node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Element node payload
#[derive(Debug, Clone)]
pub struct Element {
    pub tag_name: String,
    pub attributes: IndexMap<String, Option<String>>,
    pub children: Vec<NodeId>,
    pub closes_self: bool,
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Element {
            tag_name: tag_name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            closes_self: false,
        }
    }
}

/// Text node payload
#[derive(Debug, Clone)]
pub struct Text {
    pub text: String,
}

/// Comment node payload
#[derive(Debug, Clone)]
pub struct Comment {
    pub comment: String,
}

/// Node kind union
#[derive(Debug, Clone)]
pub enum NodeKind {
    Element(Element),
    Text(Text),
    Comment(Comment),
}

/// A stored node: payload plus parent back-pointer.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
}

/// The node arena for one parsed template or document.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Tree { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { kind, parent });
        id
    }

    pub fn push_element(&mut self, element: Element, parent: Option<NodeId>) -> NodeId {
        self.push(NodeKind::Element(element), parent)
    }

    pub fn push_text(&mut self, text: impl Into<String>, parent: Option<NodeId>) -> NodeId {
        self.push(
            NodeKind::Text(Text { text: text.into() }),
            parent,
        )
    }

    pub fn push_comment(&mut self, comment: impl Into<String>, parent: Option<NodeId>) -> NodeId {
        self.push(
            NodeKind::Comment(Comment {
                comment: comment.into(),
            }),
            parent,
        )
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.node_mut(id).parent = parent;
    }

    pub fn as_element(&self, id: NodeId) -> Option<&Element> {
        match &self.node(id).kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.node_mut(id).kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Panics if `id` is not an element. Callers hold the classification
    /// invariant from the walk that produced the id.
    pub fn element(&self, id: NodeId) -> &Element {
        self.as_element(id)
            .unwrap_or_else(|| panic!("node {:?} is not an element", id))
    }

    pub fn element_mut(&mut self, id: NodeId) -> &mut Element {
        match &mut self.node_mut(id).kind {
            NodeKind::Element(element) => element,
            _ => panic!("node {:?} is not an element", id),
        }
    }

    pub fn as_text(&self, id: NodeId) -> Option<&Text> {
        match &self.node(id).kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_comment(&self, id: NodeId) -> Option<&Comment> {
        match &self.node(id).kind {
            NodeKind::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    pub fn is_comment(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Comment(_))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).kind {
            NodeKind::Element(element) => &element.children,
            _ => &[],
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.element_mut(parent).children.push(child);
        self.set_parent(child, Some(parent));
    }

    /// Splice `replacements` into the parent's child list in place of `old`.
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, replacements: Vec<NodeId>) {
        for &replacement in &replacements {
            self.set_parent(replacement, Some(parent));
        }
        let children = &mut self.element_mut(parent).children;
        if let Some(position) = children.iter().position(|&c| c == old) {
            children.splice(position..=position, replacements);
        }
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let position = siblings.iter().position(|&c| c == id)?;
        siblings.get(position + 1).copied()
    }

    /// Every element under (and including) `root`, in document order.
    pub fn flat_elements(&self, root: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if self.as_element(id).is_some() {
                found.push(id);
                for &child in self.children(id).iter().rev() {
                    stack.push(child);
                }
            }
        }
        found
    }
}

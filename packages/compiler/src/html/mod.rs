pub mod ast;
pub mod parser;
pub mod tags;

pub use ast::{Element, Node, NodeId, NodeKind, Tree};
pub use parser::{parse_fragment, parse_template_root};

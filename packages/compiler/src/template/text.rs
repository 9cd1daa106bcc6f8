//! Interpolated text handling.
//!
//! Splits `Hello {name}!` style text into alternating static and dynamic
//! fragments, replacing the original node with one node per fragment. Under
//! server side rendering a delimiter comment is interleaved between fragments
//! so hydration can re-locate each `CharacterData` node by child index.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CompileError, Result};
use crate::expression_parser::parse_expression;
use crate::html::NodeId;
use crate::js::Expr;

use super::{BindingAspect, Locals, PartialBinding, TemplateWalker};

/// Single level interpolation, non greedy. Nested braces are not supported.
static INTERPOLATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(.+?)\}").expect("valid regex"));

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TextFragment {
    Static(String),
    Dynamic(Expr),
}

/// Splits text on `{expr}` occurrences. Empty static runs are dropped so
/// fragment indices count emitted nodes only. Returns an empty vector when
/// the text holds no interpolation at all.
pub(crate) fn split_interpolated_text(text: &str) -> Result<Vec<TextFragment>> {
    let mut fragments = Vec::new();
    let mut last = 0;
    for captures in INTERPOLATION.captures_iter(text) {
        let whole = captures.get(0).expect("capture 0 always present");
        let source = captures.get(1).expect("capture 1 always present").as_str();
        if whole.start() > last {
            fragments.push(TextFragment::Static(text[last..whole.start()].to_string()));
        }
        let expression =
            parse_expression(source).map_err(|error| CompileError::InterpolationSyntax {
                fragment: source.to_string(),
                message: error.to_string(),
            })?;
        fragments.push(TextFragment::Dynamic(expression));
        last = whole.end();
    }
    if fragments.is_empty() {
        return Ok(fragments);
    }
    if last < text.len() {
        fragments.push(TextFragment::Static(text[last..].to_string()));
    }
    Ok(fragments)
}

impl<'a, 'c> TemplateWalker<'a, 'c> {
    pub(crate) fn parse_text(
        &mut self,
        id: NodeId,
        local_data: &Locals,
        multiple: bool,
    ) -> Result<()> {
        let text = match self.tree.as_text(id) {
            Some(text) => text.text.clone(),
            None => return Ok(()),
        };
        let parent = match self.tree.parent(id) {
            Some(parent) => parent,
            None => {
                return Err(CompileError::MarkupSyntax {
                    message: "found text node without parent".to_string(),
                })
            }
        };

        let fragments = split_interpolated_text(&text)?;
        if fragments.is_empty() {
            return Ok(());
        }

        // Text inside <title> drives the document title rather than a DOM
        // mutation point, so no lookup identifier is needed.
        let is_title = self.tree.element(parent).tag_name == "title";

        // Accounts for earlier siblings that have already been split up.
        let offset = self
            .tree
            .children(parent)
            .iter()
            .position(|&child| child == id)
            .unwrap_or(0);

        if !multiple && !is_title {
            self.add_identifier(parent);
        }

        let fragment_count = fragments.len();
        let mut inserted: Vec<NodeId> = Vec::new();
        for (i, fragment) in fragments.into_iter().enumerate() {
            match fragment {
                TextFragment::Static(value) => {
                    inserted.push(self.tree.push_text(value, Some(parent)));
                }
                TextFragment::Dynamic(expression) => {
                    let node = self.tree.push_text("", Some(parent));
                    self.data.node_data.entry(node).text_node_value = Some(expression.clone());

                    let mut partial = PartialBinding::new(
                        parent,
                        if is_title {
                            BindingAspect::DocumentTitle
                        } else {
                            BindingAspect::InnerText
                        },
                        expression,
                    );
                    if !is_title {
                        // Server rendering interleaves a delimiter comment
                        // between fragments, doubling each fragment's index.
                        let index = if self.config.ssr_enabled { i * 2 } else { i };
                        partial.fragment_index = Some(index + offset);
                    }
                    self.add_binding(partial, local_data);
                    inserted.push(node);
                }
            }

            if i + 1 < fragment_count && self.config.ssr_enabled && !is_title {
                let comment = self.tree.push_comment("", Some(parent));
                self.data.node_data.entry(comment).is_fragment = true;
                inserted.push(comment);
            }
        }

        self.tree.replace_child(parent, id, inserted);
        Ok(())
    }
}

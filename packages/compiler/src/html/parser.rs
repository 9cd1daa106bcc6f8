//! Markup Parser
//!
//! A small, non-validating parser sufficient for component templates: elements
//! with attributes, text, comments, void and self-closing elements. Full
//! HTML5 document conformance is out of scope.

use super::ast::{Element, NodeId, Tree};
use super::tags::VOID_ELEMENTS;
use crate::error::{CompileError, Result};

/// Parse a markup fragment. Returns the arena and the top-level node ids.
pub fn parse_fragment(source: &str) -> Result<(Tree, Vec<NodeId>)> {
    let mut parser = MarkupParser {
        chars: source.chars().collect(),
        position: 0,
        tree: Tree::new(),
    };
    let roots = parser.parse_children(None, None)?;
    Ok((parser.tree, roots))
}

/// Parse a fragment expected to contain exactly one `<template>` root.
pub fn parse_template_root(source: &str) -> Result<(Tree, NodeId)> {
    let (tree, roots) = parse_fragment(source)?;
    let mut elements = roots
        .iter()
        .copied()
        .filter(|&id| tree.as_element(id).is_some());
    match (elements.next(), elements.next()) {
        (Some(root), None) if tree.element(root).tag_name == "template" => Ok((tree, root)),
        _ => Err(CompileError::MarkupSyntax {
            message: "expected a single <template> root element".to_string(),
        }),
    }
}

struct MarkupParser {
    chars: Vec<char>,
    position: usize,
    tree: Tree,
}

impl MarkupParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn starts_with(&self, text: &str) -> bool {
        self.chars[self.position..]
            .iter()
            .zip(text.chars())
            .filter(|(a, b)| **a == *b)
            .count()
            == text.len()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.position += 1;
        }
    }

    /// Children of `closing_tag` (None at top level). Consumes the closing tag.
    fn parse_children(
        &mut self,
        parent: Option<NodeId>,
        closing_tag: Option<&str>,
    ) -> Result<Vec<NodeId>> {
        let mut children = Vec::new();
        loop {
            if self.position >= self.chars.len() {
                if let Some(tag) = closing_tag {
                    return Err(CompileError::MarkupSyntax {
                        message: format!("unexpected end of input, expected </{}>", tag),
                    });
                }
                return Ok(children);
            }

            if self.starts_with("</") {
                let start = self.position;
                self.position += 2;
                let name = self.read_name();
                self.skip_whitespace();
                if self.peek() == Some('>') {
                    self.position += 1;
                }
                match closing_tag {
                    Some(tag) if tag == name => return Ok(children),
                    _ => {
                        // Stray close tag, rewind so the parent level sees it.
                        if closing_tag.is_some() {
                            self.position = start;
                            return Ok(children);
                        }
                        return Err(CompileError::MarkupSyntax {
                            message: format!("unexpected closing tag </{}>", name),
                        });
                    }
                }
            }

            if self.starts_with("<!--") {
                self.position += 4;
                let start = self.position;
                while self.position < self.chars.len() && !self.starts_with("-->") {
                    self.position += 1;
                }
                let comment: String = self.chars[start..self.position].iter().collect();
                self.position = (self.position + 3).min(self.chars.len());
                children.push(self.tree.push_comment(comment, parent));
                continue;
            }

            if self.starts_with("<!") {
                // Doctype or processing noise, skip to the closing angle.
                while self.position < self.chars.len() && self.peek() != Some('>') {
                    self.position += 1;
                }
                self.position += 1;
                continue;
            }

            if self.peek() == Some('<') {
                let element = self.parse_element(parent)?;
                children.push(element);
                continue;
            }

            let start = self.position;
            while self.position < self.chars.len() && self.peek() != Some('<') {
                self.position += 1;
            }
            let text: String = self.chars[start..self.position].iter().collect();
            if !text.trim().is_empty() {
                children.push(self.tree.push_text(text, parent));
            }
        }
    }

    fn parse_element(&mut self, parent: Option<NodeId>) -> Result<NodeId> {
        self.position += 1; // <
        let tag_name = self.read_name();
        if tag_name.is_empty() {
            return Err(CompileError::MarkupSyntax {
                message: "expected tag name after '<'".to_string(),
            });
        }

        let mut element = Element::new(tag_name.clone());
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('>') => {
                    self.position += 1;
                    break;
                }
                Some('/') => {
                    self.position += 1;
                    if self.peek() == Some('>') {
                        self.position += 1;
                    }
                    element.closes_self = true;
                    break;
                }
                Some(_) => {
                    let name = self.read_attribute_name();
                    if name.is_empty() {
                        return Err(CompileError::MarkupSyntax {
                            message: format!("malformed attribute in <{}>", tag_name),
                        });
                    }
                    self.skip_whitespace();
                    if self.peek() == Some('=') {
                        self.position += 1;
                        self.skip_whitespace();
                        let value = self.read_attribute_value()?;
                        element.attributes.insert(name, Some(value));
                    } else {
                        element.attributes.insert(name, None);
                    }
                }
                None => {
                    return Err(CompileError::MarkupSyntax {
                        message: format!("unterminated <{}> tag", tag_name),
                    })
                }
            }
        }

        let id = self.tree.push_element(element, parent);
        if !self.tree.element(id).closes_self && !VOID_ELEMENTS.contains(tag_name.as_str()) {
            let children = self.parse_children(Some(id), Some(&tag_name))?;
            self.tree.element_mut(id).children = children;
        }
        Ok(id)
    }

    fn read_name(&mut self) -> String {
        let start = self.position;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            self.position += 1;
        }
        self.chars[start..self.position].iter().collect()
    }

    fn read_attribute_name(&mut self) -> String {
        let start = self.position;
        while matches!(
            self.peek(),
            Some(c) if !c.is_whitespace() && c != '=' && c != '>' && c != '/'
        ) {
            self.position += 1;
        }
        self.chars[start..self.position].iter().collect()
    }

    fn read_attribute_value(&mut self) -> Result<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.position += 1;
                let start = self.position;
                while self.position < self.chars.len() && self.peek() != Some(quote) {
                    self.position += 1;
                }
                if self.position >= self.chars.len() {
                    return Err(CompileError::MarkupSyntax {
                        message: "unterminated attribute value".to_string(),
                    });
                }
                let value: String = self.chars[start..self.position].iter().collect();
                self.position += 1;
                Ok(value)
            }
            _ => {
                let start = self.position;
                while matches!(self.peek(), Some(c) if !c.is_whitespace() && c != '>') {
                    self.position += 1;
                }
                Ok(self.chars[start..self.position].iter().collect())
            }
        }
    }
}

//! Markup Parser Tests
//!
//! Covers the small non-validating HTML subset used by component templates.

use isomer_compiler::html::{parse_fragment, parse_template_root};
use isomer_compiler::CompileError;

#[test]
fn nested_elements_keep_parent_links() {
    let (tree, roots) = parse_fragment("<div><span>text</span></div>").unwrap();
    assert_eq!(roots.len(), 1);
    let div = roots[0];
    assert_eq!(tree.element(div).tag_name, "div");
    let span = tree.children(div)[0];
    assert_eq!(tree.element(span).tag_name, "span");
    assert_eq!(tree.parent(span), Some(div));
    let text = tree.children(span)[0];
    assert_eq!(tree.as_text(text).unwrap().text, "text");
}

#[test]
fn attributes_parse_quoted_and_bare() {
    let (tree, roots) =
        parse_fragment("<input type=\"text\" required value=initial>").unwrap();
    let input = tree.element(roots[0]);
    assert_eq!(input.attributes.get("type"), Some(&Some("text".to_string())));
    assert_eq!(input.attributes.get("required"), Some(&None));
    assert_eq!(
        input.attributes.get("value"),
        Some(&Some("initial".to_string()))
    );
}

#[test]
fn void_elements_do_not_swallow_siblings() {
    let (tree, roots) = parse_fragment("<div><br><p>after</p></div>").unwrap();
    let children = tree.children(roots[0]);
    assert_eq!(children.len(), 2);
    assert_eq!(tree.element(children[0]).tag_name, "br");
    assert_eq!(tree.element(children[1]).tag_name, "p");
}

#[test]
fn comments_are_kept_as_nodes() {
    let (tree, roots) = parse_fragment("<div><!--marker--></div>").unwrap();
    let comment = tree.children(roots[0])[0];
    assert_eq!(tree.as_comment(comment).unwrap().comment, "marker");
}

#[test]
fn whitespace_only_text_is_dropped() {
    let (tree, roots) = parse_fragment("<ul>\n    <li>a</li>\n</ul>").unwrap();
    let children = tree.children(roots[0]);
    assert_eq!(children.len(), 1);
    assert_eq!(tree.element(children[0]).tag_name, "li");
}

#[test]
fn self_closing_elements_take_no_children() {
    let (tree, roots) = parse_fragment("<div><custom-icon />trailing</div>").unwrap();
    let children = tree.children(roots[0]);
    assert_eq!(children.len(), 2);
    assert!(tree.element(children[0]).closes_self);
    assert!(tree.children(children[0]).is_empty());
}

#[test]
fn template_root_must_be_a_single_template() {
    let (tree, root) = parse_template_root("<template><p>ok</p></template>").unwrap();
    assert_eq!(tree.element(root).tag_name, "template");

    assert!(matches!(
        parse_template_root("<div></div>"),
        Err(CompileError::MarkupSyntax { .. })
    ));
    assert!(matches!(
        parse_template_root("<template></template><template></template>"),
        Err(CompileError::MarkupSyntax { .. })
    ));
}

//! Whether an element (and therefore its whole subtree) is hidden from the
//! landmark scanner, and the rendered text of what isn't.
//!
//! Both checks only look at the element itself. The scanner never descends
//! into a hidden element, which takes care of hidden ancestors.

use crate::css::StyleSheet;
use crate::dom;
use kuchiki::{NodeData, NodeRef};

/// `hidden` attribute, `display: none` or `visibility: hidden`.
pub fn is_visually_hidden(element: &NodeRef, styles: &StyleSheet) -> bool {
    if dom::has_attribute(element, "hidden") {
        return true;
    }
    let style = styles.compute(element);
    style.is_display_none() || style.is_visibility_hidden()
}

/// `aria-hidden="true"`, or an `inert` attribute not set to `"false"`.
pub fn is_semantically_hidden(element: &NodeRef) -> bool {
    if dom::attribute(element, "aria-hidden").as_deref() == Some("true") {
        return true;
    }
    match dom::attribute(element, "inert") {
        Some(value) => value != "false",
        None => false,
    }
}

pub fn is_hidden(element: &NodeRef, styles: &StyleSheet) -> bool {
    is_semantically_hidden(element) || is_visually_hidden(element, styles)
}

/// The text a user would see inside `node`: text of every descendant that
/// isn't visually hidden, with whitespace collapsed.
pub fn rendered_text(node: &NodeRef, styles: &StyleSheet) -> String {
    let mut raw = String::new();
    collect_text(node, styles, &mut raw);
    collapse_whitespace(&raw)
}

fn collect_text(node: &NodeRef, styles: &StyleSheet, out: &mut String) {
    for child in node.children() {
        match child.data() {
            NodeData::Text(ref text) => out.push_str(&text.borrow()),
            NodeData::Element(..) => {
                if !is_visually_hidden(&child, styles) {
                    collect_text(&child, styles, out);
                }
            }
            _ => {}
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

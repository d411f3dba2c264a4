//! Accessible names of landmark elements.

use crate::css::StyleSheet;
use crate::dom;
use crate::visibility::rendered_text;
use kuchiki::NodeRef;

/// Resolves the label of `element` from `aria-labelledby`, else `aria-label`.
///
/// Every id in `aria-labelledby` contributes the rendered text of the element
/// it refers to. An id with no element contributes an empty string, but is
/// still joined, so `"missing present"` gives `" Present text"`.
pub fn resolve_label(document: &NodeRef, element: &NodeRef, styles: &StyleSheet) -> Option<String> {
    if let Some(ids) = dom::attribute(element, "aria-labelledby") {
        if !ids.trim().is_empty() {
            let label = ids
                .split_whitespace()
                .map(|id| match dom::get_element_by_id(document, id) {
                    Some(referenced) => rendered_text(&referenced, styles),
                    None => String::new(),
                })
                .collect::<Vec<_>>()
                .join(" ");
            if label.trim().is_empty() {
                return None;
            }
            return Some(label);
        }
    }

    dom::attribute(element, "aria-label").filter(|label| !label.is_empty())
}

pub fn role_description(element: &NodeRef) -> Option<String> {
    dom::attribute(element, "aria-roledescription").filter(|description| !description.is_empty())
}

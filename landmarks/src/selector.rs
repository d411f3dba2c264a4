//! Human-readable CSS paths to landmark elements, for inspection.
//!
//! These are best-effort: ids are assumed unique, and nothing guarantees the
//! path still matches after the DOM changes.

use crate::dom;
use kuchiki::traits::*;
use kuchiki::NodeRef;
use smallvec::SmallVec;

pub fn build_selector(element: &NodeRef) -> String {
    let mut steps = SmallVec::<[String; 8]>::new();

    for node in element.inclusive_ancestors() {
        let name = match dom::local_name(&node) {
            Some(name) => name,
            None => break,
        };
        if name == "html" {
            break;
        }

        if let Some(id) = dom::attribute(&node, "id").filter(|id| !id.is_empty()) {
            steps.push(format!("#{}", id));
            break;
        }

        let mut step = name.to_ascii_lowercase();
        if let Some(class) = dom::first_class(&node) {
            step.push('.');
            step.push_str(&class);
        }
        if let Some(position) = ambiguous_position(&node, name) {
            step.push_str(&format!(":nth-child({})", position));
        }
        steps.push(step);
    }

    steps.reverse();
    steps.join(" > ")
}

/// The 1-based element index of `node` among its siblings, if some sibling
/// shares its tag name.
fn ambiguous_position(node: &NodeRef, name: &str) -> Option<usize> {
    let parent = node.parent()?;
    let mut position = None;
    let mut same_name = 0;
    for (i, sibling) in parent.children().elements().enumerate() {
        if &*sibling.name.local == name {
            same_name += 1;
        }
        if *sibling.as_node() == *node {
            position = Some(i + 1);
        }
    }
    if same_name > 1 {
        position
    } else {
        None
    }
}

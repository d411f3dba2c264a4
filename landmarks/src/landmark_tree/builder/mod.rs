mod heuristics;

use super::{LandmarkEntry, LandmarkId, LandmarkTree};
use crate::css::StyleSheet;
use crate::dom;
use crate::label::{resolve_label, role_description};
use crate::role::{classify, is_landmark};
use crate::visibility::is_hidden;
use kuchiki::NodeRef;

/// Inserts landmarks found in a DOM into a `LandmarkTree`.
///
/// Used both for full scans and for scanning just the subtrees a mutation
/// batch added, so it works on a borrowed tree.
pub struct LandmarkTreeBuilder<'a> {
    document: &'a NodeRef,
    styles: &'a StyleSheet,
    tree: &'a mut LandmarkTree,
}

impl<'a> LandmarkTreeBuilder<'a> {
    pub fn new(document: &'a NodeRef, styles: &'a StyleSheet, tree: &'a mut LandmarkTree) -> Self {
        Self { document, styles, tree }
    }

    /// Scans the whole document into the (presumably empty) tree.
    ///
    /// Starts at the document element rather than `<body>`, so a role on the
    /// body itself counts.
    pub fn build(&mut self) {
        if let Some(root) = dom::document_element(self.document) {
            self.insert_node(&root, None);
        }
    }

    /// Scans `node` and its descendants into the children of `level`.
    pub fn insert_node(&mut self, node: &NodeRef, level: Option<LandmarkId>) {
        if node.as_element().is_none() {
            return;
        }
        if is_hidden(node, self.styles) {
            return;
        }

        let mut child_level = level;
        let classification = classify(node);
        if let Some(role) = classification.role {
            let label = resolve_label(self.document, node, self.styles);
            if is_landmark(role, classification.explicit, label.as_deref()) {
                let mut entry = LandmarkEntry::new(node, role, classification.explicit, label);
                entry.role_description = role_description(node);
                let ip = self.tree.insertion_point(level, node);
                child_level = Some(self.tree.insert(entry, ip));
            }
        }

        for child in node.children() {
            self.insert_node(&child, child_level);
        }
    }

    /// The landmark whose children a landmark at `node` would be among.
    pub fn insertion_level(&self, node: &NodeRef) -> Option<LandmarkId> {
        node.ancestors().find_map(|ancestor| self.tree.lookup(&ancestor))
    }

    /// Whether an ancestor of `node` hides it, so that a full scan wouldn't
    /// reach it.
    pub fn is_in_hidden_subtree(&self, node: &NodeRef) -> bool {
        node.ancestors()
            .filter(|ancestor| ancestor.as_element().is_some())
            .any(|ancestor| is_hidden(&ancestor, self.styles))
    }
}

//! Keeping the landmark tree in sync with DOM mutations without rescanning.
//!
//! Mutation records are handed to us after the fact, so everything here looks
//! at the DOM in its final state for the batch: removed nodes are only used
//! to find entries to drop, added nodes are scanned only if they're still
//! connected.

use super::LandmarksFinder;
use crate::dom::mutation::{is_watched_attribute, MutationRecord};
use crate::dom::{self, NodeKey};
use crate::label::{resolve_label, role_description};
use crate::landmark_tree::builder::LandmarkTreeBuilder;
use crate::landmark_tree::Inconsistency;
use crate::lint::lint;
use crate::role::{classify, is_landmark};
use kuchiki::NodeRef;
use std::collections::HashSet;

/// Why a batch can't be applied incrementally.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error(transparent)]
    UntrackedEntry(#[from] Inconsistency),
    #[error("a landmark's role no longer qualifies")]
    RoleNoLongerLandmark,
    #[error("a landmark's label no longer qualifies it")]
    LabelNoLongerQualifies,
    #[error("attribute `{0}` may have changed a landmark's visibility")]
    VisibilityMayHaveChanged(String),
    #[error("a style sheet was added or removed")]
    StyleSheetChanged,
    #[error("an element referenced by `aria-labelledby` changed")]
    LabelSourceChanged,
    #[error("attribute `{0}` changed on a guessed landmark")]
    GuessedElementChanged(String),
    #[error("attribute `{0}` changed outside of any landmark")]
    UntrackedAttributeChange(String),
}

#[derive(Debug)]
enum AttributeUpdate {
    Reclassify(NodeRef),
    Relabel(NodeRef),
    RoleDescription(NodeRef),
}

fn has_style_element(node: &NodeRef) -> bool {
    node.inclusive_descendants().any(|n| dom::has_local_name(&n, "style"))
}

/// Every id some element's `aria-labelledby` points at.
fn label_sources(document: &NodeRef) -> HashSet<String> {
    document
        .descendants()
        .filter_map(|node| dom::attribute(&node, "aria-labelledby"))
        .flat_map(|ids| ids.split_whitespace().map(str::to_owned).collect::<Vec<_>>())
        .collect()
}

fn is_label_source(node: &NodeRef, sources: &HashSet<String>) -> bool {
    dom::attribute(node, "id").map_or(false, |id| sources.contains(&id))
}

impl LandmarksFinder {
    /// Applies a batch of mutation records, falling back to a full scan when
    /// the batch can't be handled locally.
    pub fn handle_mutations(&mut self, records: &[MutationRecord]) {
        if records.is_empty() {
            return;
        }
        let before = self.tree.len();
        match self.patch(records) {
            Ok(()) => {
                debug!(
                    "Patched {} records: {} -> {} landmarks",
                    records.len(),
                    before,
                    self.tree.len()
                );
            },
            Err(PatchError::UntrackedEntry(e)) => {
                warn!("{}, rescanning", e);
                self.scan();
            },
            Err(e) => {
                debug!("Can't patch ({}), rescanning", e);
                self.scan();
            },
        }
    }

    fn plan_attribute_updates(&self, records: &[MutationRecord]) -> Result<Vec<AttributeUpdate>, PatchError> {
        let mut updates = Vec::new();
        for record in records {
            let (target, name) = match *record {
                MutationRecord::Attributes { ref target, ref attribute_name } => (target, attribute_name),
                MutationRecord::ChildList { .. } => continue,
            };
            if !is_watched_attribute(name) {
                continue;
            }
            // Removed by this batch; the child list records deal with it.
            if !dom::is_connected(target, &self.document) {
                continue;
            }

            let id = match self.tree.lookup(target) {
                Some(id) => id,
                None => {
                    if name == "aria-roledescription" {
                        continue;
                    }
                    return Err(PatchError::UntrackedAttributeChange(name.clone()));
                },
            };
            if self.tree[id].guessed {
                return Err(PatchError::GuessedElementChanged(name.clone()));
            }

            trace!("{} changed on tracked landmark {:?}", name, id);
            updates.push(match name.as_str() {
                "role" => AttributeUpdate::Reclassify(target.clone()),
                "aria-label" | "aria-labelledby" => AttributeUpdate::Relabel(target.clone()),
                "aria-roledescription" => AttributeUpdate::RoleDescription(target.clone()),
                _ => return Err(PatchError::VisibilityMayHaveChanged(name.clone())),
            });
        }
        Ok(updates)
    }

    /// Child list changes that could alter a style sheet or the text of a
    /// label source. Labels and membership depend on those in ways the
    /// tree doesn't record.
    fn check_child_lists(&self, records: &[MutationRecord]) -> Result<(), PatchError> {
        let sources = label_sources(&self.document);
        for record in records {
            let (target, added_nodes, removed_nodes) = match *record {
                MutationRecord::ChildList { ref target, ref added_nodes, ref removed_nodes } => {
                    (target, added_nodes, removed_nodes)
                },
                MutationRecord::Attributes { .. } => continue,
            };
            let mut changed = added_nodes.iter().chain(removed_nodes.iter());
            if dom::has_local_name(target, "style") || changed.clone().any(has_style_element) {
                return Err(PatchError::StyleSheetChanged);
            }
            if sources.is_empty() {
                continue;
            }
            if target.inclusive_ancestors().any(|n| is_label_source(&n, &sources)) ||
                changed.any(|node| node.inclusive_descendants().any(|n| is_label_source(&n, &sources)))
            {
                return Err(PatchError::LabelSourceChanged);
            }
        }
        Ok(())
    }

    fn patch(&mut self, records: &[MutationRecord]) -> Result<(), PatchError> {
        let updates = self.plan_attribute_updates(records)?;
        self.check_child_lists(records)?;

        if self.tree.is_empty() {
            trace!("No landmarks tracked, only looking at additions");
        } else {
            self.apply_removals(records)?;
        }
        self.apply_additions(records)?;
        self.apply_attribute_updates(updates)?;

        if self.active.heuristics {
            LandmarkTreeBuilder::new(&self.document, &self.styles, &mut self.tree).reconcile_guesses();
        }
        self.tree.renumber()?;
        if self.active.developer_mode {
            self.page_warnings = lint(&mut self.tree);
        }
        self.cursor.clamp(&self.tree);
        self.invalidate_views();
        Ok(())
    }

    /// Drops the entries of every removed subtree, then any other entry whose
    /// element isn't in the document any more.
    fn apply_removals(&mut self, records: &[MutationRecord]) -> Result<(), PatchError> {
        for record in records {
            let removed_nodes = match *record {
                MutationRecord::ChildList { ref removed_nodes, .. } => removed_nodes,
                MutationRecord::Attributes { .. } => continue,
            };
            for node in removed_nodes {
                self.untrack_subtree(node)?;
            }
        }

        let disconnected = self
            .tree
            .ids()
            .iter()
            .cloned()
            .filter(|&id| match self.tree.get(id) {
                Some(entry) => entry
                    .element()
                    .map_or(true, |e| !dom::is_connected(&e, &self.document)),
                None => false,
            })
            .collect::<Vec<_>>();
        for id in disconnected {
            // Might have gone away with an ancestor already. Nothing has been
            // allocated since `ids()` was built, so slots weren't reused.
            if self.tree.get(id).is_some() {
                trace!("Pruning disconnected landmark {:?}", id);
                self.tree.remove_subtree(id)?;
            }
        }
        Ok(())
    }

    /// Removes the entries for `node` and its descendants. Entries nested in
    /// one found earlier go away with it, and aren't found again.
    fn untrack_subtree(&mut self, node: &NodeRef) -> Result<usize, Inconsistency> {
        let mut removed = 0;
        for descendant in node.inclusive_descendants() {
            if let Some(id) = self.tree.lookup(&descendant) {
                removed += self.tree.remove_subtree(id)?;
            }
        }
        Ok(removed)
    }

    fn apply_additions(&mut self, records: &[MutationRecord]) -> Result<(), PatchError> {
        let mut seen = HashSet::<NodeKey>::new();
        for record in records {
            let added_nodes = match *record {
                MutationRecord::ChildList { ref added_nodes, .. } => added_nodes,
                MutationRecord::Attributes { .. } => continue,
            };
            for node in added_nodes {
                if node.as_element().is_none() || !seen.insert(dom::node_key(node)) {
                    continue;
                }
                // Added and removed again within the batch.
                if !dom::is_connected(node, &self.document) {
                    continue;
                }

                // Something moved in might still be tracked at its old spot.
                self.untrack_subtree(node)?;

                let mut builder = LandmarkTreeBuilder::new(&self.document, &self.styles, &mut self.tree);
                if builder.is_in_hidden_subtree(node) {
                    trace!("Added node is in a hidden subtree");
                    continue;
                }
                let level = builder.insertion_level(node);
                builder.insert_node(node, level);
            }
        }
        Ok(())
    }

    fn apply_attribute_updates(&mut self, updates: Vec<AttributeUpdate>) -> Result<(), PatchError> {
        for update in updates {
            let element = match update {
                AttributeUpdate::Reclassify(ref e) |
                AttributeUpdate::Relabel(ref e) |
                AttributeUpdate::RoleDescription(ref e) => e,
            };
            // Re-scanned as part of an addition, so already up to date.
            let id = match self.tree.lookup(element) {
                Some(id) => id,
                None => continue,
            };

            match update {
                AttributeUpdate::Reclassify(_) => {
                    let classification = classify(element);
                    let role = classification.role.ok_or(PatchError::RoleNoLongerLandmark)?;
                    let label = resolve_label(&self.document, element, &self.styles);
                    if !is_landmark(role, classification.explicit, label.as_deref()) {
                        return Err(PatchError::RoleNoLongerLandmark);
                    }
                    let entry = &mut self.tree[id];
                    entry.role = role;
                    entry.explicit = classification.explicit;
                    entry.label = label;
                },
                AttributeUpdate::Relabel(_) => {
                    let label = resolve_label(&self.document, element, &self.styles);
                    let entry = &mut self.tree[id];
                    if !is_landmark(entry.role, entry.explicit, label.as_deref()) {
                        return Err(PatchError::LabelNoLongerQualifies);
                    }
                    entry.label = label;
                },
                AttributeUpdate::RoleDescription(_) => {
                    self.tree[id].role_description = role_description(element);
                },
            }
        }
        Ok(())
    }
}

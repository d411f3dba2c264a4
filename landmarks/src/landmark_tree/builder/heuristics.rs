//! Guessing `main` and `navigation` landmarks on pages that lack them, from
//! common id and class naming conventions.

use super::LandmarkTreeBuilder;
use crate::dom;
use crate::label::resolve_label;
use crate::landmark_tree::{LandmarkEntry, LandmarkId};
use crate::role::Role;
use crate::selector::build_selector;
use crate::visibility::{is_hidden, rendered_text};
use kuchiki::NodeRef;

const MAIN_IDS: &[&str] = &["main", "content", "main-content"];
const MAIN_CLASS: &str = "main";
const NAVIGATION_IDS: &[&str] = &["navigation", "nav"];
const NAVIGATION_CLASSES: &[&str] = &["navigation", "nav"];

impl<'a> LandmarkTreeBuilder<'a> {
    /// Makes the guessed landmarks in the tree match what the page calls for
    /// right now: removes guesses that no longer apply and adds new ones.
    ///
    /// The outcome only depends on the page and the real landmarks, not on
    /// the guesses already present, so it can be re-run after each
    /// incremental update.
    pub fn reconcile_guesses(&mut self) {
        let mut wanted = Vec::<(NodeRef, Role)>::new();
        for &role in &[Role::Main, Role::Navigation] {
            if self.has_real_landmark(role) {
                continue;
            }
            let candidates = match role {
                Role::Main => self.main_candidates(),
                _ => self.navigation_candidates(),
            };
            for element in candidates {
                // A `main` guess takes precedence.
                if !wanted.iter().any(|&(ref e, _)| *e == element) {
                    wanted.push((element, role));
                }
            }
        }

        let stale = self
            .tracked_ids()
            .into_iter()
            .filter(|&id| {
                let entry = &self.tree[id];
                entry.guessed &&
                    !entry
                        .element()
                        .map_or(false, |e| wanted.iter().any(|w| w.0 == e && w.1 == entry.role))
            })
            .collect::<Vec<_>>();
        for id in stale {
            trace!("Dropping guessed {} landmark {:?}", self.tree[id].role, id);
            self.tree.splice_out(id);
        }

        for (element, role) in wanted {
            if self.tree.lookup(&element).is_some() {
                continue;
            }
            debug!("Guessed {} landmark at {}", role, build_selector(&element));
            let label = resolve_label(self.document, &element, self.styles);
            let mut entry = LandmarkEntry::new(&element, role, false, label);
            entry.guessed = true;
            let level = self.insertion_level(&element);
            let ip = self.tree.insertion_point(level, &element);
            self.tree.insert(entry, ip);
        }
    }

    fn has_real_landmark(&self, role: Role) -> bool {
        self.tracked_ids()
            .into_iter()
            .any(|id| self.tree[id].role == role && !self.tree[id].guessed)
    }

    /// Every live entry, whether or not the tree has been renumbered since it
    /// was inserted.
    fn tracked_ids(&self) -> Vec<LandmarkId> {
        let mut ids = Vec::new();
        let mut stack = self.tree.roots().collect::<Vec<_>>();
        while let Some(id) = stack.pop() {
            ids.push(id);
            stack.extend(self.tree[id].children(&*self.tree));
        }
        ids
    }

    /// Whether `element` could become a guessed landmark. Real landmarks are
    /// never guessed again, elements of earlier guesses are.
    fn is_eligible(&self, element: &NodeRef) -> bool {
        if self.tree.lookup(element).map_or(false, |id| !self.tree[id].guessed) {
            return false;
        }
        !is_hidden(element, self.styles) &&
            !self.is_in_hidden_subtree(element) &&
            !rendered_text(element, self.styles).is_empty()
    }

    fn main_candidates(&self) -> Vec<NodeRef> {
        for id in MAIN_IDS {
            if let Some(element) = dom::get_element_by_id(self.document, id) {
                if self.is_eligible(&element) {
                    return vec![element];
                }
            }
        }

        let by_class = dom::elements_with_class(self.document, MAIN_CLASS);
        if by_class.len() == 1 && self.is_eligible(&by_class[0]) {
            return by_class;
        }
        Vec::new()
    }

    /// Unlike `main`, every element with a navigation class is promoted.
    fn navigation_candidates(&self) -> Vec<NodeRef> {
        let mut candidates = Vec::new();
        for id in NAVIGATION_IDS {
            if let Some(element) = dom::get_element_by_id(self.document, id) {
                if self.is_eligible(&element) {
                    candidates.push(element);
                    break;
                }
            }
        }

        for class in NAVIGATION_CLASSES {
            for element in dom::elements_with_class(self.document, class) {
                if !candidates.contains(&element) && self.is_eligible(&element) {
                    candidates.push(element);
                }
            }
        }

        candidates.sort_by(dom::compare_document_position);
        candidates
    }
}

//! Keyboard navigation between landmarks.

use crate::dom::compare_document_position;
use crate::landmark_tree::LandmarkTree;
use kuchiki::NodeRef;
use std::cmp::Ordering;

/// Which landmark was selected last, and where main-cycling is at.
#[derive(Debug, Default)]
pub struct NavigationCursor {
    selected: Option<usize>,
    main_pointer: Option<usize>,
}

impl NavigationCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Forgets selections that don't exist any more.
    pub fn clamp(&mut self, tree: &LandmarkTree) {
        if self.selected.map_or(false, |i| i >= tree.ids().len()) {
            self.selected = None;
        }
        if self.main_pointer.map_or(false, |i| i >= tree.mains().len()) {
            self.main_pointer = None;
        }
    }

    /// The landmark after the focused element, or after the last selected one
    /// if focus isn't in a landmark. Wraps around.
    pub fn next(&mut self, tree: &LandmarkTree, focused: Option<&NodeRef>) -> Option<usize> {
        let count = tree.ids().len();
        if count == 0 {
            return None;
        }

        let index = match focused.filter(|f| tree.enclosing(f).is_some()) {
            Some(focused) => {
                let after = tree.ids().partition_point(|&id| {
                    tree[id]
                        .element()
                        .map_or(true, |e| compare_document_position(&e, focused) != Ordering::Greater)
                });
                if after == count {
                    0
                } else {
                    after
                }
            },
            None => self.selected.map_or(0, |i| (i + 1) % count),
        };

        self.selected = Some(index);
        Some(index)
    }

    /// The landmark before the focused element (not counting the one it's
    /// in), or before the last selected one. Wraps around.
    pub fn previous(&mut self, tree: &LandmarkTree, focused: Option<&NodeRef>) -> Option<usize> {
        let count = tree.ids().len();
        if count == 0 {
            return None;
        }

        let index = match focused.and_then(|f| tree.enclosing(f).map(|context| (f, context))) {
            Some((focused, context)) => {
                let before = tree.ids().partition_point(|&id| {
                    tree[id]
                        .element()
                        .map_or(true, |e| compare_document_position(&e, focused) == Ordering::Less)
                });
                tree.ids()[..before]
                    .iter()
                    .rposition(|&id| id != context)
                    .unwrap_or(count - 1)
            },
            None => self.selected.map_or(count - 1, |i| (i + count - 1) % count),
        };

        self.selected = Some(index);
        Some(index)
    }

    pub fn jump_to(&mut self, tree: &LandmarkTree, index: usize) -> Option<usize> {
        if index >= tree.ids().len() {
            return None;
        }
        self.selected = Some(index);
        Some(index)
    }

    /// Cycles through all `main` landmarks, of which there should be one but
    /// there are often more.
    pub fn cycle_main(&mut self, tree: &LandmarkTree) -> Option<usize> {
        let mains = tree.mains();
        if mains.is_empty() {
            return None;
        }
        let pointer = self.main_pointer.map_or(0, |p| (p + 1) % mains.len());
        self.main_pointer = Some(pointer);
        self.selected = Some(mains[pointer]);
        Some(mains[pointer])
    }
}

//! Developer-mode checks run over a finished landmark tree.

use crate::landmark_tree::LandmarkTree;
use crate::role::Role;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

bitflags! {
    #[derive(Default)]
    pub struct Warnings: u8 {
        /// The page has no `main` landmark.
        const NO_MAIN = 1 << 0;
        /// The page has more than one `main` landmark.
        const MANY_MAINS = 1 << 1;
        /// More than one visible `<main>` element.
        const MANY_VISIBLE_MAIN_ELEMENTS = 1 << 2;
        /// Another landmark shares this role and neither has a label.
        const DUPLICATE_UNLABELLED = 1 << 3;
    }
}

const TAGS: &[(Warnings, &str)] = &[
    (Warnings::NO_MAIN, "lintNoMain"),
    (Warnings::MANY_MAINS, "lintManyMains"),
    (Warnings::MANY_VISIBLE_MAIN_ELEMENTS, "lintManyVisibleMainElements"),
    (Warnings::DUPLICATE_UNLABELLED, "lintDuplicateUnlabelled"),
];

impl Warnings {
    pub fn tags(self) -> impl Iterator<Item = &'static str> {
        TAGS.iter()
            .filter(move |&&(flag, _)| self.contains(flag))
            .map(|&(_, tag)| tag)
    }
}

impl Serialize for Warnings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.tags())
    }
}

/// Recomputes the warnings of every entry, and returns those of the page.
///
/// Guessed landmarks are not the page author's doing, so they're neither
/// flagged nor counted.
pub fn lint(tree: &mut LandmarkTree) -> Warnings {
    let mut page = Warnings::empty();
    let mut mains = 0;
    let mut implicit_mains = Vec::new();
    let mut unlabelled = HashMap::<Role, Vec<_>>::new();

    for id in tree.ids().to_vec() {
        let entry = &mut tree[id];
        entry.warnings = Warnings::empty();
        if entry.guessed {
            continue;
        }
        if entry.role == Role::Main {
            mains += 1;
            if !entry.explicit {
                implicit_mains.push(id);
            }
        }
        if entry.label.is_none() {
            unlabelled.entry(entry.role).or_default().push(id);
        }
    }

    match mains {
        0 => page |= Warnings::NO_MAIN,
        1 => {},
        _ => page |= Warnings::MANY_MAINS,
    }

    // Hidden elements never make it into the tree, so every tracked <main>
    // is a visible one.
    if implicit_mains.len() > 1 {
        for id in implicit_mains {
            tree[id].warnings |= Warnings::MANY_VISIBLE_MAIN_ELEMENTS;
        }
    }

    for ids in unlabelled.values().filter(|ids| ids.len() > 1) {
        for &id in ids {
            tree[id].warnings |= Warnings::DUPLICATE_UNLABELLED;
        }
    }

    page
}

//! Read-only projections of the landmark tree handed out to UI code.
//!
//! None of these reference the tree itself, so they stay valid (if stale)
//! across later patches.

use crate::landmark_tree::{LandmarkId, LandmarkTree};
use crate::lint::Warnings;
use crate::role::Role;
use kuchiki::NodeRef;
use serde::Serialize;

/// An entry of the flat list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandmarkInfo {
    pub index: usize,
    pub depth: usize,
    pub role: Role,
    pub role_description: Option<String>,
    pub label: Option<String>,
    pub selector: String,
    pub guessed: bool,
    pub warnings: Warnings,
}

impl LandmarkInfo {
    pub(super) fn new(tree: &LandmarkTree, id: LandmarkId) -> Self {
        let entry = &tree[id];
        Self {
            index: entry.index(),
            depth: tree.depth(id),
            role: entry.role,
            role_description: entry.role_description.clone(),
            label: entry.label.clone(),
            selector: entry.selector(),
            guessed: entry.guessed,
            warnings: entry.warnings,
        }
    }
}

/// The nested form of the landmarks, fit for sending to another process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeEntry {
    pub index: usize,
    pub role: Role,
    pub role_description: Option<String>,
    pub label: Option<String>,
    pub selector: String,
    pub guessed: bool,
    #[serde(skip_serializing_if = "Warnings::is_empty")]
    pub warnings: Warnings,
    pub contains: Vec<TreeEntry>,
}

impl TreeEntry {
    pub(super) fn build(tree: &LandmarkTree) -> Vec<Self> {
        tree.roots().map(|id| Self::new(tree, id)).collect()
    }

    fn new(tree: &LandmarkTree, id: LandmarkId) -> Self {
        let entry = &tree[id];
        Self {
            index: entry.index(),
            role: entry.role,
            role_description: entry.role_description.clone(),
            label: entry.label.clone(),
            selector: entry.selector(),
            guessed: entry.guessed,
            warnings: entry.warnings,
            contains: entry.children(tree).map(|child| Self::new(tree, child)).collect(),
        }
    }
}

/// What navigating to a landmark yields: enough to announce it, and the
/// element to focus.
#[derive(Debug, Clone)]
pub struct LandmarkElementInfo {
    pub index: usize,
    pub role: Role,
    pub role_description: Option<String>,
    pub label: Option<String>,
    pub guessed: bool,
    pub element: NodeRef,
}

impl LandmarkElementInfo {
    pub(super) fn new(tree: &LandmarkTree, index: usize) -> Option<Self> {
        let entry = &tree[tree.at(index)?];
        Some(Self {
            index,
            role: entry.role,
            role_description: entry.role_description.clone(),
            label: entry.label.clone(),
            guessed: entry.guessed,
            element: entry.element()?,
        })
    }
}

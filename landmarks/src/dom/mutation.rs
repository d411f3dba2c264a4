//! Mutation records, as a host's mutation observer would deliver them.
//!
//! kuchiki doesn't observe its own mutations, so `MutationRecorder` performs
//! DOM edits and queues the records an observer subscribed to the whole
//! document (child lists and `WATCHED_ATTRIBUTES`) would have seen.

use html5ever::LocalName;
use kuchiki::NodeRef;
use std::mem;

/// The attribute filter landmark observation subscribes with.
pub const WATCHED_ATTRIBUTES: &[&str] = &[
    "role",
    "aria-label",
    "aria-labelledby",
    "aria-roledescription",
    "aria-hidden",
    "inert",
    "hidden",
    "class",
    "style",
];

pub fn is_watched_attribute(name: &str) -> bool {
    WATCHED_ATTRIBUTES.contains(&name)
}

/// A single observed change. Records describe what happened, but by the time
/// they are delivered the DOM is already in its final state for the batch.
#[derive(Debug, Clone)]
pub enum MutationRecord {
    ChildList {
        target: NodeRef,
        added_nodes: Vec<NodeRef>,
        removed_nodes: Vec<NodeRef>,
    },
    Attributes {
        target: NodeRef,
        attribute_name: String,
    },
}

impl MutationRecord {
    pub fn target(&self) -> &NodeRef {
        match *self {
            MutationRecord::ChildList { ref target, .. } |
            MutationRecord::Attributes { ref target, .. } => target,
        }
    }

    pub fn is_child_list(&self) -> bool {
        match *self {
            MutationRecord::ChildList { .. } => true,
            MutationRecord::Attributes { .. } => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct MutationRecorder {
    records: Vec<MutationRecord>,
}

impl MutationRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_child(&mut self, parent: &NodeRef, child: NodeRef) {
        self.remove(&child);
        parent.append(child.clone());
        self.records.push(MutationRecord::ChildList {
            target: parent.clone(),
            added_nodes: vec![child],
            removed_nodes: Vec::new(),
        });
    }

    /// Inserts `child` right before `reference`. Does nothing if `reference`
    /// has no parent.
    pub fn insert_before(&mut self, reference: &NodeRef, child: NodeRef) {
        if *reference == child {
            return;
        }
        self.remove(&child);
        let parent = match reference.parent() {
            Some(parent) => parent,
            None => return,
        };
        reference.insert_before(child.clone());
        self.records.push(MutationRecord::ChildList {
            target: parent,
            added_nodes: vec![child],
            removed_nodes: Vec::new(),
        });
    }

    /// Detaches `node` from its parent, if it has one.
    pub fn remove(&mut self, node: &NodeRef) {
        let parent = match node.parent() {
            Some(parent) => parent,
            None => return,
        };
        node.detach();
        self.records.push(MutationRecord::ChildList {
            target: parent,
            added_nodes: Vec::new(),
            removed_nodes: vec![node.clone()],
        });
    }

    pub fn set_attribute(&mut self, element: &NodeRef, name: &str, value: &str) {
        let data = match element.as_element() {
            Some(data) => data,
            None => return,
        };
        data.attributes
            .borrow_mut()
            .insert(LocalName::from(name), value.to_owned());
        self.record_attribute(element, name);
    }

    pub fn remove_attribute(&mut self, element: &NodeRef, name: &str) {
        let data = match element.as_element() {
            Some(data) => data,
            None => return,
        };
        let removed = data.attributes.borrow_mut().remove(LocalName::from(name));
        if removed.is_some() {
            self.record_attribute(element, name);
        }
    }

    fn record_attribute(&mut self, element: &NodeRef, name: &str) {
        if !is_watched_attribute(name) {
            return;
        }
        self.records.push(MutationRecord::Attributes {
            target: element.clone(),
            attribute_name: name.to_owned(),
        });
    }

    pub fn has_records(&self) -> bool {
        !self.records.is_empty()
    }

    /// Hands over the queued records, oldest first.
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        mem::take(&mut self.records)
    }
}

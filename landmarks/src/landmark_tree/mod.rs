pub mod builder;

use crate::allocator::Allocator;
use crate::dom::{self, NodeKey};
use crate::lint::Warnings;
use crate::misc::print_tree::PrintTree;
use crate::role::Role;
use crate::selector::build_selector;
use kuchiki::{self, NodeRef};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io;
use std::rc::{Rc, Weak};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LandmarkId(usize);

/// The tree or the flat list don't describe the same set of landmarks any
/// more. Never expected, but recoverable by scanning again.
#[derive(Debug, thiserror::Error)]
#[error("inconsistent landmark tree: {0}")]
pub struct Inconsistency(pub String);

trait NodeMapHelpers<V> {
    fn for_node(&self, node: &kuchiki::Node) -> Option<&V>;
}

impl<V> NodeMapHelpers<V> for HashMap<NodeKey, V> {
    #[inline(always)]
    fn for_node(&self, node: &kuchiki::Node) -> Option<&V> {
        self.get(&(node as NodeKey))
    }
}

/// Where in the tree a new entry goes: among the children of `parent` (or the
/// roots), right after `prev_sibling`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InsertionPoint {
    pub parent: Option<LandmarkId>,
    pub prev_sibling: Option<LandmarkId>,
}

/// A landmark region of the page.
///
/// Entries are linked twice: as a tree following landmark containment, and as
/// a flat list in document order (`next` / `previous`).
#[derive(Debug)]
pub struct LandmarkEntry {
    pub role: Role,
    /// Whether `role` came from the `role` attribute.
    pub explicit: bool,
    pub role_description: Option<String>,
    pub label: Option<String>,
    pub guessed: bool,
    pub warnings: Warnings,
    /// The page owns the element, we just refer to it.
    element: Weak<kuchiki::Node>,
    selector: RefCell<Option<String>>,
    index: usize,
    parent: Option<LandmarkId>,
    first_child: Option<LandmarkId>,
    last_child: Option<LandmarkId>,
    prev_sibling: Option<LandmarkId>,
    next_sibling: Option<LandmarkId>,
    next: Option<LandmarkId>,
    previous: Option<LandmarkId>,
}

impl LandmarkEntry {
    pub fn new(element: &NodeRef, role: Role, explicit: bool, label: Option<String>) -> Self {
        Self {
            role,
            explicit,
            role_description: None,
            label,
            guessed: false,
            warnings: Warnings::empty(),
            element: Rc::downgrade(&element.0),
            selector: RefCell::new(None),
            index: 0,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            next: None,
            previous: None,
        }
    }

    /// The element of this landmark, if the page still has it around.
    pub fn element(&self) -> Option<NodeRef> {
        self.element.upgrade().map(NodeRef)
    }

    fn key(&self) -> NodeKey {
        self.element.as_ptr()
    }

    /// A CSS path to the element. Computed lazily, and recomputed after the
    /// tree changes.
    pub fn selector(&self) -> String {
        if let Some(ref selector) = *self.selector.borrow() {
            return selector.clone();
        }
        let selector = self.element().map_or_else(String::new, |e| build_selector(&e));
        *self.selector.borrow_mut() = Some(selector.clone());
        selector
    }

    fn invalidate_selector(&self) {
        self.selector.borrow_mut().take();
    }

    /// Position in the flat list.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn children<'tree>(&self, tree: &'tree LandmarkTree) -> Children<'tree> {
        Children { tree, current: self.first_child }
    }

    fn description(&self) -> String {
        let mut description = self.role.to_string();
        if let Some(ref label) = self.label {
            description.push_str(&format!(" {:?}", label));
        }
        if let Some(ref role_description) = self.role_description {
            description.push_str(&format!(" [{}]", role_description));
        }
        if self.guessed {
            description.push_str(" (guessed)");
        }
        description.push_str(" @ ");
        description.push_str(&self.selector());
        for tag in self.warnings.tags() {
            description.push_str(" !");
            description.push_str(tag);
        }
        description
    }

    fn print(&self, tree: &LandmarkTree, printer: &mut PrintTree) -> io::Result<()> {
        printer.new_level(&self.description())?;
        for child in self.children(tree) {
            tree[child].print(tree, printer)?;
        }
        printer.end_level();
        Ok(())
    }
}

/// An iterator over the ids of a level of the tree.
pub struct Children<'a> {
    tree: &'a LandmarkTree,
    current: Option<LandmarkId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = LandmarkId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        self.current = self.tree[current].next_sibling;
        Some(current)
    }
}

#[derive(Debug, Default)]
pub struct LandmarkTree {
    entries: Allocator<LandmarkEntry>,
    first_root: Option<LandmarkId>,
    last_root: Option<LandmarkId>,
    head: Option<LandmarkId>,
    tail: Option<LandmarkId>,
    by_element: HashMap<NodeKey, LandmarkId>,
    /// The flat list, as of the last `renumber`.
    order: Vec<LandmarkId>,
    /// Flat list indices of `main` landmarks, as of the last `renumber`.
    mains: Vec<usize>,
}

impl LandmarkTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids in document order. Only up to date after `renumber`.
    pub fn ids(&self) -> &[LandmarkId] {
        &self.order
    }

    pub fn mains(&self) -> &[usize] {
        &self.mains
    }

    pub fn at(&self, index: usize) -> Option<LandmarkId> {
        self.order.get(index).cloned()
    }

    pub fn roots(&self) -> Children {
        Children { tree: self, current: self.first_root }
    }

    pub fn lookup(&self, element: &NodeRef) -> Option<LandmarkId> {
        self.by_element.for_node(element).cloned()
    }

    /// The nearest tracked landmark containing `node`, including itself.
    pub fn enclosing(&self, node: &NodeRef) -> Option<LandmarkId> {
        node.inclusive_ancestors().find_map(|n| self.lookup(&n))
    }

    pub fn depth(&self, id: LandmarkId) -> usize {
        let mut depth = 0;
        let mut current = self[id].parent;
        while let Some(parent) = current {
            depth += 1;
            current = self[parent].parent;
        }
        depth
    }

    /// Lookup of an entry that may have been removed already.
    pub fn get(&self, id: LandmarkId) -> Option<&LandmarkEntry> {
        self.entries.get(id.0)
    }

    fn level_first(&self, parent: Option<LandmarkId>) -> Option<LandmarkId> {
        match parent {
            Some(parent) => self[parent].first_child,
            None => self.first_root,
        }
    }

    fn level_last(&self, parent: Option<LandmarkId>) -> Option<LandmarkId> {
        match parent {
            Some(parent) => self[parent].last_child,
            None => self.last_root,
        }
    }

    fn set_level_first(&mut self, parent: Option<LandmarkId>, id: Option<LandmarkId>) {
        match parent {
            Some(parent) => self[parent].first_child = id,
            None => self.first_root = id,
        }
    }

    fn set_level_last(&mut self, parent: Option<LandmarkId>, id: Option<LandmarkId>) {
        match parent {
            Some(parent) => self[parent].last_child = id,
            None => self.last_root = id,
        }
    }

    /// The last entry of the subtree rooted at `id`, in flat list order.
    fn last_descendant(&self, mut id: LandmarkId) -> LandmarkId {
        while let Some(last) = self[id].last_child {
            id = last;
        }
        id
    }

    /// Finds where an entry for `element` goes among the children of
    /// `parent`, by comparing document positions with the existing ones.
    ///
    /// Searches backwards since during a scan the answer is always the last
    /// child.
    pub fn insertion_point(&self, parent: Option<LandmarkId>, element: &NodeRef) -> InsertionPoint {
        let mut prev_sibling = self.level_last(parent);
        while let Some(candidate) = prev_sibling {
            let follows = match self[candidate].element() {
                Some(ref e) => dom::compare_document_position(e, element) == Ordering::Greater,
                None => false,
            };
            if !follows {
                break;
            }
            prev_sibling = self[candidate].prev_sibling;
        }
        InsertionPoint { parent, prev_sibling }
    }

    /// Inserts `entry` at `ip`, adopting the siblings after it that are
    /// contained by its element, and links it into the flat list.
    pub fn insert(&mut self, mut entry: LandmarkEntry, ip: InsertionPoint) -> LandmarkId {
        debug_assert!(entry.parent.is_none() && entry.first_child.is_none());
        if let Some(prev_sibling) = ip.prev_sibling {
            debug_assert_eq!(self[prev_sibling].parent, ip.parent);
        }

        let element = entry.element();
        entry.parent = ip.parent;
        entry.prev_sibling = ip.prev_sibling;
        entry.next_sibling = match ip.prev_sibling {
            Some(prev_sibling) => self[prev_sibling].next_sibling,
            None => self.level_first(ip.parent),
        };

        let key = entry.key();
        let new_next_sibling = entry.next_sibling;
        let id = LandmarkId(self.entries.allocate(entry));
        self.by_element.insert(key, id);

        match ip.prev_sibling {
            Some(prev_sibling) => self[prev_sibling].next_sibling = Some(id),
            None => self.set_level_first(ip.parent, Some(id)),
        }
        match new_next_sibling {
            Some(next_sibling) => self[next_sibling].prev_sibling = Some(id),
            None => self.set_level_last(ip.parent, Some(id)),
        }

        // Flat list: right after the last thing before us in tree order. Any
        // entry we adopt below is already after that.
        let previous = match ip.prev_sibling {
            Some(prev_sibling) => Some(self.last_descendant(prev_sibling)),
            None => ip.parent,
        };
        self.link_after(id, previous);

        if let Some(element) = element {
            self.adopt_following_siblings(id, &element);
        }

        id
    }

    fn link_after(&mut self, id: LandmarkId, previous: Option<LandmarkId>) {
        let next = match previous {
            Some(previous) => self[previous].next,
            None => self.head,
        };
        self[id].previous = previous;
        self[id].next = next;
        match previous {
            Some(previous) => self[previous].next = Some(id),
            None => self.head = Some(id),
        }
        match next {
            Some(next) => self[next].previous = Some(id),
            None => self.tail = Some(id),
        }
    }

    /// Moves the siblings following `id` whose elements are inside `element`
    /// to be children of `id`.
    ///
    /// This only happens for entries created around existing ones, like
    /// guessed landmarks.
    fn adopt_following_siblings(&mut self, id: LandmarkId, element: &NodeRef) {
        while let Some(sibling) = self[id].next_sibling {
            let contained = match self[sibling].element() {
                Some(ref e) => e != element && dom::contains(element, e),
                None => false,
            };
            if !contained {
                break;
            }
            self.unlink_from_level(sibling);
            self.append_to_level(Some(id), sibling);
        }
    }

    fn unlink_from_level(&mut self, id: LandmarkId) {
        let parent = self[id].parent;
        let prev_sibling = self[id].prev_sibling.take();
        let next_sibling = self[id].next_sibling.take();
        self[id].parent = None;

        match prev_sibling {
            Some(prev_sibling) => self[prev_sibling].next_sibling = next_sibling,
            None => self.set_level_first(parent, next_sibling),
        }
        match next_sibling {
            Some(next_sibling) => self[next_sibling].prev_sibling = prev_sibling,
            None => self.set_level_last(parent, prev_sibling),
        }
    }

    fn append_to_level(&mut self, parent: Option<LandmarkId>, id: LandmarkId) {
        let last = self.level_last(parent);
        self[id].parent = parent;
        self[id].prev_sibling = last;
        self[id].next_sibling = None;
        match last {
            Some(last) => self[last].next_sibling = Some(id),
            None => self.set_level_first(parent, Some(id)),
        }
        self.set_level_last(parent, Some(id));
    }

    /// Removes `id` and everything nested in it. Returns how many entries went
    /// away.
    pub fn remove_subtree(&mut self, id: LandmarkId) -> Result<usize, Inconsistency> {
        let last = self.last_descendant(id);
        let previous = self[id].previous;
        let next = self[last].next;

        let previous_next = match previous {
            Some(previous) => self[previous].next,
            None => self.head,
        };
        if previous_next != Some(id) {
            return Err(Inconsistency(format!(
                "{:?} is not linked from its predecessor {:?}",
                id, previous
            )));
        }

        match previous {
            Some(previous) => self[previous].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self[next].previous = previous,
            None => self.tail = previous,
        }

        self.unlink_from_level(id);
        Ok(self.destroy(id))
    }

    fn destroy(&mut self, id: LandmarkId) -> usize {
        let entry = match self.entries.deallocate(id.0) {
            Some(entry) => entry,
            None => return 0,
        };
        if self.by_element.get(&entry.key()) == Some(&id) {
            self.by_element.remove(&entry.key());
        }

        let mut destroyed = 1;
        let mut child = entry.first_child;
        while let Some(child_to_remove) = child.take() {
            child = self[child_to_remove].next_sibling;
            destroyed += self.destroy(child_to_remove);
        }
        destroyed
    }

    /// Removes just `id`, moving its children up to its own level.
    pub fn splice_out(&mut self, id: LandmarkId) {
        let previous = self[id].previous;
        let next = self[id].next;
        match previous {
            Some(previous) => self[previous].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self[next].previous = previous,
            None => self.tail = previous,
        }

        let parent = self[id].parent;
        let prev_sibling = self[id].prev_sibling;
        let next_sibling = self[id].next_sibling;
        let first_child = self[id].first_child.take();
        let last_child = self[id].last_child.take();

        let mut child = first_child;
        while let Some(c) = child {
            self[c].parent = parent;
            child = self[c].next_sibling;
        }

        let (first, last) = match (first_child, last_child) {
            (Some(first), Some(last)) => {
                self[first].prev_sibling = prev_sibling;
                self[last].next_sibling = next_sibling;
                (Some(first), Some(last))
            },
            _ => (next_sibling, prev_sibling),
        };
        match prev_sibling {
            Some(prev_sibling) => self[prev_sibling].next_sibling = first,
            None => self.set_level_first(parent, first),
        }
        match next_sibling {
            Some(next_sibling) => self[next_sibling].prev_sibling = last,
            None => self.set_level_last(parent, last),
        }

        self[id].next_sibling = None;
        self[id].prev_sibling = None;
        self.destroy(id);
    }

    /// Assigns dense indices in flat list order, and refreshes everything
    /// derived from them.
    pub fn renumber(&mut self) -> Result<(), Inconsistency> {
        self.order.clear();
        self.mains.clear();

        let mut current = self.head;
        while let Some(id) = current {
            if self.order.len() >= self.entries.len() {
                return Err(Inconsistency("flat list has a cycle or stale entries".into()));
            }
            let index = self.order.len();
            let entry = &mut self[id];
            entry.index = index;
            entry.invalidate_selector();
            let is_main = entry.role == Role::Main;
            current = entry.next;
            if is_main {
                self.mains.push(index);
            }
            self.order.push(id);
        }

        if self.order.len() != self.entries.len() {
            return Err(Inconsistency(format!(
                "flat list has {} entries, tree has {}",
                self.order.len(),
                self.entries.len()
            )));
        }
        Ok(())
    }

    /// Checks that the flat list is the tree in pre-order, that it follows
    /// document order, and that nesting follows element containment.
    pub fn validate(&self) -> Result<(), Inconsistency> {
        let mut preorder = Vec::new();
        let mut stack = self.roots().collect::<Vec<_>>();
        stack.reverse();
        while let Some(id) = stack.pop() {
            preorder.push(id);
            let mut children = self[id].children(self).collect::<Vec<_>>();
            children.reverse();
            stack.extend(children);
        }
        if preorder != self.order {
            return Err(Inconsistency("flat list isn't the tree in pre-order".into()));
        }

        for (index, &id) in self.order.iter().enumerate() {
            let entry = &self[id];
            if entry.index != index {
                return Err(Inconsistency(format!("{:?} has index {}, expected {}", id, entry.index, index)));
            }
            let element = entry
                .element()
                .ok_or_else(|| Inconsistency(format!("{:?} lost its element", id)))?;
            if self.lookup(&element) != Some(id) {
                return Err(Inconsistency(format!("{:?} isn't mapped from its element", id)));
            }
            let nearest = element.ancestors().find_map(|a| self.lookup(&a));
            if nearest != entry.parent {
                return Err(Inconsistency(format!("{:?} is nested in the wrong landmark", id)));
            }
            if let Some(next) = entry.next {
                let next_element = self[next].element();
                if next_element.map_or(true, |n| dom::compare_document_position(&element, &n) != Ordering::Less) {
                    return Err(Inconsistency(format!("{:?} is out of document order", next)));
                }
            }
        }

        if self.by_element.len() != self.order.len() {
            return Err(Inconsistency("stale element mappings".into()));
        }
        Ok(())
    }

    pub fn print(&self, printer: &mut PrintTree) -> io::Result<()> {
        for root in self.roots() {
            self[root].print(self, printer)?;
        }
        Ok(())
    }
}

impl ::std::ops::Index<LandmarkId> for LandmarkTree {
    type Output = LandmarkEntry;

    fn index(&self, id: LandmarkId) -> &LandmarkEntry {
        &self.entries[id.0]
    }
}

impl ::std::ops::IndexMut<LandmarkId> for LandmarkTree {
    fn index_mut(&mut self, id: LandmarkId) -> &mut LandmarkEntry {
        &mut self.entries[id.0]
    }
}

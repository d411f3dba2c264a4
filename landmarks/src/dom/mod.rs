//! Helpers over the kuchiki DOM: parsing, dumping, identity, document order
//! and the handful of attribute lookups the landmark scanner needs.

pub mod mutation;

use crate::misc::print_tree::PrintTree;
use kuchiki::traits::*;
use kuchiki::{self, NodeData, NodeRef};
use std::cmp::Ordering;
use std::io::{self, Read, Write};

/// Identity of a DOM node, used to key side tables.
///
/// Only valid while something keeps the node's allocation alive, which for
/// landmark entries is the weak handle they hold.
pub type NodeKey = *const kuchiki::Node;

#[inline]
pub fn node_key(node: &NodeRef) -> NodeKey {
    &**node as *const kuchiki::Node
}

/// Parses a DOM tree using html5ever and returns the root.
pub fn build_dom<R>(input: &mut R) -> io::Result<NodeRef>
where
    R: Read,
{
    kuchiki::parse_html().from_utf8().read_from(input)
}

pub fn parse_document(html: &str) -> NodeRef {
    kuchiki::parse_html().one(html)
}

/// Parses `html` as body content and returns the resulting top-level nodes,
/// detached and ready to be inserted somewhere else.
///
/// Elements the parser hoists into `<head>` (like a leading `<style>`) are
/// not returned; wrap them in an element if you need them.
pub fn parse_fragment(html: &str) -> Vec<NodeRef> {
    let document = parse_document(html);
    let body = match document.select_first("body") {
        Ok(body) => body.as_node().clone(),
        Err(()) => return Vec::new(),
    };
    let children = body.children().collect::<Vec<_>>();
    for child in &children {
        child.detach();
    }
    children
}

fn print_node(node: &NodeRef, print: &mut PrintTree) -> io::Result<()> {
    print.new_level(&match node.data() {
        NodeData::Document(..) => "#document".into(),
        NodeData::DocumentFragment => "#document-fragment".into(),
        NodeData::Comment(ref comment) => format!("<!-- {} -->", comment.borrow()),
        NodeData::ProcessingInstruction(ref content) => {
            let content = content.borrow();
            format!("<?{} {}?>", content.0, content.1)
        },
        NodeData::Doctype(ref doctype) => {
            format!("<!DOCTYPE {} {} {}>", doctype.name, doctype.public_id, doctype.system_id)
        },
        NodeData::Text(ref text) => {
            format!("#text {:?}", text.borrow())
        },
        NodeData::Element(ref element) => {
            format!("<{}>", element.name.local)
        }
    })?;

    for child in node.children() {
        print_node(&child, print)?;
    }

    print.end_level();
    Ok(())
}

/// Prints the dom to stdout.
pub fn print_dom(root: &NodeRef) -> io::Result<()> {
    print_dom_to(root, &mut io::stdout())
}

/// Prints the dom to a particular output.
pub fn print_dom_to(root: &NodeRef, dest: &mut dyn Write) -> io::Result<()> {
    let mut tree = PrintTree::new("DOM tree", dest)?;
    print_node(root, &mut tree)
}

/// The root element of a document (usually `<html>`).
pub fn document_element(document: &NodeRef) -> Option<NodeRef> {
    document.children().find(|child| child.as_element().is_some())
}

pub fn local_name(node: &NodeRef) -> Option<&str> {
    node.as_element().map(|element| &*element.name.local)
}

pub fn has_local_name(node: &NodeRef, name: &str) -> bool {
    local_name(node) == Some(name)
}

pub fn attribute(node: &NodeRef, name: &str) -> Option<String> {
    let element = node.as_element()?;
    let attributes = element.attributes.borrow();
    attributes.get(name).map(str::to_owned)
}

pub fn has_attribute(node: &NodeRef, name: &str) -> bool {
    node.as_element()
        .map_or(false, |element| element.attributes.borrow().contains(name))
}

fn attribute_is(node: &NodeRef, name: &str, value: &str) -> bool {
    node.as_element()
        .map_or(false, |element| element.attributes.borrow().get(name) == Some(value))
}

pub fn has_class(node: &NodeRef, class: &str) -> bool {
    node.as_element().map_or(false, |element| {
        element
            .attributes
            .borrow()
            .get("class")
            .map_or(false, |classes| classes.split_whitespace().any(|c| c == class))
    })
}

pub fn first_class(node: &NodeRef) -> Option<String> {
    let classes = attribute(node, "class")?;
    classes.split_whitespace().next().map(str::to_owned)
}

/// Whether `node` is still part of the tree rooted at `document`.
pub fn is_connected(node: &NodeRef, document: &NodeRef) -> bool {
    node.inclusive_ancestors()
        .last()
        .map_or(false, |top| top == *document)
}

/// Whether `ancestor` is `node` or one of its ancestors.
pub fn contains(ancestor: &NodeRef, node: &NodeRef) -> bool {
    node.inclusive_ancestors().any(|a| a == *ancestor)
}

/// Compares two nodes in tree (pre-)order, so an ancestor sorts before its
/// descendants.
///
/// Nodes in different trees have no meaningful order; they're ordered by
/// identity so that the result is at least consistent.
pub fn compare_document_position(a: &NodeRef, b: &NodeRef) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let mut a_chain = a.inclusive_ancestors().collect::<Vec<_>>();
    let mut b_chain = b.inclusive_ancestors().collect::<Vec<_>>();
    a_chain.reverse();
    b_chain.reverse();

    let common = a_chain
        .iter()
        .zip(b_chain.iter())
        .take_while(|&(a, b)| a == b)
        .count();

    if common == 0 {
        return node_key(a).cmp(&node_key(b));
    }
    if common == a_chain.len() {
        return Ordering::Less;
    }
    if common == b_chain.len() {
        return Ordering::Greater;
    }

    let b_branch = &b_chain[common];
    if a_chain[common].following_siblings().any(|sibling| sibling == *b_branch) {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// The first element in document order with the given id.
pub fn get_element_by_id(document: &NodeRef, id: &str) -> Option<NodeRef> {
    if id.is_empty() {
        return None;
    }
    document.descendants().find(|node| attribute_is(node, "id", id))
}

/// All elements in document order carrying `class`.
pub fn elements_with_class(document: &NodeRef, class: &str) -> Vec<NodeRef> {
    document
        .descendants()
        .filter(|node| has_class(node, class))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(document: &NodeRef, selector: &str) -> NodeRef {
        document.select_first(selector).unwrap().as_node().clone()
    }

    #[test]
    fn document_order() {
        let document = parse_document(
            "<body><div id=a><p id=b></p></div><div id=c><span id=d></span></div></body>",
        );
        let a = select(&document, "#a");
        let b = select(&document, "#b");
        let c = select(&document, "#c");
        let d = select(&document, "#d");

        assert_eq!(compare_document_position(&a, &b), Ordering::Less);
        assert_eq!(compare_document_position(&b, &a), Ordering::Greater);
        assert_eq!(compare_document_position(&b, &c), Ordering::Less);
        assert_eq!(compare_document_position(&d, &b), Ordering::Greater);
        assert_eq!(compare_document_position(&c, &c), Ordering::Equal);
    }

    #[test]
    fn connectedness() {
        let document = parse_document("<body><nav id=n></nav></body>");
        let nav = select(&document, "#n");
        assert!(is_connected(&nav, &document));
        nav.detach();
        assert!(!is_connected(&nav, &document));
        assert!(get_element_by_id(&document, "n").is_none());
    }

    #[test]
    fn fragments_are_detached() {
        let nodes = parse_fragment("<nav>a</nav><main>b</main>");
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|node| node.parent().is_none()));
        assert!(has_local_name(&nodes[1], "main"));
    }

    #[test]
    fn classes() {
        let document = parse_document("<body><div class='  nav  main'></div><p class=nav></p></body>");
        assert_eq!(elements_with_class(&document, "nav").len(), 2);
        assert_eq!(elements_with_class(&document, "main").len(), 1);
        let div = select(&document, "div");
        assert_eq!(first_class(&div).as_deref(), Some("nav"));
    }

    #[test]
    fn dumps_dom() {
        let document = parse_document("<p>hi</p>");
        let mut out = Vec::new();
        print_dom_to(&document, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("DOM tree\n- #document\n"));
        assert!(out.contains("      - <p>\n        - #text \"hi\"\n"));
    }
}

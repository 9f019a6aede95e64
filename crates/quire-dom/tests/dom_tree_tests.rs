//! Tests for element tree construction and traversal.

use quire_dom::{DomTree, ElementData, NodeId, NodeType};

/// Helper to create an element node under `parent` and return its NodeId.
fn element(tree: &mut DomTree, parent: NodeId, tag: &str) -> NodeId {
    tree.append_element(parent, ElementData::new(tag))
}

#[test]
fn test_new_tree_has_document_root() {
    let tree = DomTree::new();
    assert_eq!(tree.len(), 1);
    assert!(matches!(
        tree.get(NodeId::ROOT).map(|n| &n.node_type),
        Some(NodeType::Document)
    ));
    assert_eq!(tree.document_element(), None);
}

#[test]
fn test_append_child_links_parent() {
    let mut tree = DomTree::new();
    let html = element(&mut tree, NodeId::ROOT, "html");
    let body = element(&mut tree, html, "body");
    let text = tree.append_text(body, "hello");

    assert_eq!(tree.children(html), &[body]);
    assert_eq!(tree.parent(text), Some(body));
    assert_eq!(tree.as_text(text), Some("hello"));
    assert_eq!(tree.document_element(), Some(html));
}

#[test]
fn test_ancestors_walk_to_root() {
    let mut tree = DomTree::new();
    let html = element(&mut tree, NodeId::ROOT, "html");
    let div = element(&mut tree, html, "div");
    let span = element(&mut tree, div, "span");

    let ancestors: Vec<NodeId> = tree.ancestors(span).collect();
    assert_eq!(ancestors, vec![div, html, NodeId::ROOT]);
}

#[test]
fn test_comment_is_not_element() {
    let mut tree = DomTree::new();
    let comment = tree.alloc(NodeType::Comment("note".to_string()));
    tree.append_child(NodeId::ROOT, comment);
    assert!(tree.as_element(comment).is_none());
    assert!(tree.as_text(comment).is_none());
}

#[test]
fn test_integer_attributes() {
    let mut data = ElementData::new("td");
    let _ = data.attrs.insert("colspan".to_string(), " 3 ".to_string());
    let _ = data.attrs.insert("rowspan".to_string(), "x".to_string());
    assert_eq!(data.integer_attr("colspan"), Some(3));
    assert_eq!(data.integer_attr("rowspan"), None);
    assert_eq!(data.integer_attr("span"), None);
}

#[test]
fn test_append_to_unknown_parent_is_ignored() {
    let mut tree = DomTree::new();
    let orphan = tree.alloc(NodeType::Text("x".to_string()));
    tree.append_child(NodeId(99), orphan);
    assert_eq!(tree.parent(orphan), None);
}

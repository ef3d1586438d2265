use griddom::{Node, NodeKind};

fn cell(id: &str) -> Node {
    Node::with_id(NodeKind::Cell, id)
}

// ============================================================================
// Identity and content
// ============================================================================

#[test]
fn test_generated_ids_are_unique() {
    let a = Node::new(NodeKind::Row);
    let b = Node::new(NodeKind::Row);
    assert_ne!(a.id(), b.id());
}

#[test]
fn test_clone_shares_the_element() {
    let a = Node::new(NodeKind::Cell);
    let b = a.clone();
    a.set_text("hello");

    assert!(a.same(&b));
    assert_eq!(b.text().as_deref(), Some("hello"));
}

#[test]
fn test_data_attributes() {
    let node = Node::new(NodeKind::Row).with_data("row-index", "12");

    assert_eq!(node.data("row-index").as_deref(), Some("12"));
    assert_eq!(node.data("missing"), None);
}

// ============================================================================
// CSS custom properties
// ============================================================================

#[test]
fn test_vars_set_and_remove() {
    let node = Node::new(NodeKind::Wrapper);
    node.set_var("--grid-col-a-width", "120px");
    node.set_var("--grid-col-b-width", "80px");
    node.set_var("--grid-row-height", "36px");

    assert_eq!(node.var("--grid-col-a-width").as_deref(), Some("120px"));

    node.retain_vars_without_prefix("--grid-col-");
    assert_eq!(node.var("--grid-col-a-width"), None);
    assert_eq!(node.var("--grid-col-b-width"), None);
    assert_eq!(node.var("--grid-row-height").as_deref(), Some("36px"));
}

// ============================================================================
// Children
// ============================================================================

#[test]
fn test_append_and_remove_children() {
    let row = Node::new(NodeKind::Row);
    row.append_child(cell("a"));
    row.append_children([cell("b"), cell("c")]);

    assert_eq!(row.child_ids(), vec!["a", "b", "c"]);

    let removed = row.remove_child("b").unwrap();
    assert_eq!(removed.id(), "b");
    assert_eq!(row.child_ids(), vec!["a", "c"]);
    assert!(row.remove_child("b").is_none());
}

#[test]
fn test_insert_child_clamps_index() {
    let row = Node::new(NodeKind::Row);
    row.append_child(cell("a"));
    row.insert_child(0, cell("first"));
    row.insert_child(99, cell("last"));

    assert_eq!(row.child_ids(), vec!["first", "a", "last"]);
}

#[test]
fn test_replace_child_keeps_position() {
    let row = Node::new(NodeKind::Row);
    row.append_children([cell("a"), cell("b"), cell("c")]);

    let old = row.replace_child("b", cell("b2")).unwrap();
    assert_eq!(old.id(), "b");
    assert_eq!(row.child_ids(), vec!["a", "b2", "c"]);
}

#[test]
fn test_reorder_children() {
    let row = Node::new(NodeKind::Row);
    row.append_children([cell("a"), cell("b"), cell("c"), cell("d")]);

    // Listed ids first in the given order, unlisted keep relative order.
    row.reorder_children(&["c".into(), "a".into(), "nope".into()]);
    assert_eq!(row.child_ids(), vec!["c", "a", "b", "d"]);
}

#[test]
fn test_find_descends_recursively() {
    let wrapper = Node::with_id(NodeKind::Wrapper, "wrapper");
    let body = Node::with_id(NodeKind::Body, "body");
    let row = Node::with_id(NodeKind::Row, "row-3");
    body.append_child(row);
    wrapper.append_child(body);

    assert_eq!(wrapper.find("row-3").unwrap().id(), "row-3");
    assert!(wrapper.find("row-4").is_none());
}

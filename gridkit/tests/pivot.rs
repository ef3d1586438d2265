use std::collections::HashMap;
use std::sync::Arc;

use gridkit::model::Row;
use gridkit::pivot::{
    ancestor_labels, build_pivot_tree, flatten, toggle_node, Aggregation, FlatRowKind,
    FlatRowType, PivotConfig, PivotView,
};
use gridkit::render::DefaultElementFactory;

fn sales() -> Vec<Row> {
    vec![
        Row::new().set("r", "N").set("c", "X").set("v", 10i64),
        Row::new().set("r", "N").set("c", "Y").set("v", 20i64),
        Row::new().set("r", "S").set("c", "X").set("v", 30i64),
    ]
}

fn two_level_config() -> PivotConfig {
    PivotConfig::new(["r", "c"])
        .value_field("v", Aggregation::Sum)
        .show_subtotals(true)
}

// ============================================================================
// Tree construction
// ============================================================================

#[test]
fn test_tree_shape_and_aggregates() {
    let root = build_pivot_tree(&sales(), &two_level_config());

    assert_eq!(root.level, -1);
    assert!(root.is_expanded, "root is always expanded");
    assert_eq!(root.data.get_number("v"), Some(60.0), "grand total");

    assert_eq!(root.children.len(), 2);
    let n = &root.children[0];
    let s = &root.children[1];
    assert_eq!(n.label, "N");
    assert_eq!(n.data.get_number("v"), Some(30.0));
    assert_eq!(s.label, "S");
    assert_eq!(s.data.get_number("v"), Some(30.0));

    assert_eq!(n.children.len(), 2, "N splits into X and Y");
    assert_eq!(n.children[0].label, "X");
    assert_eq!(n.children[0].data.get_number("v"), Some(10.0));
    assert_eq!(n.children[1].label, "Y");
    assert_eq!(n.children[1].data.get_number("v"), Some(20.0));

    // Leaves hold the original rows below the last group level.
    assert_eq!(n.children[0].children.len(), 1);
    assert_eq!(
        n.children[0].children[0].data.get_number("v"),
        Some(10.0)
    );
}

#[test]
fn test_groups_keep_insertion_order() {
    let rows = vec![
        Row::new().set("g", "zebra").set("v", 1i64),
        Row::new().set("g", "apple").set("v", 2i64),
        Row::new().set("g", "mango").set("v", 3i64),
        Row::new().set("g", "apple").set("v", 4i64),
    ];
    let config = PivotConfig::new(["g"]).value_field("v", Aggregation::Sum);
    let root = build_pivot_tree(&rows, &config);

    let labels: Vec<&str> = root.children.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["zebra", "apple", "mango"]);
    assert_eq!(root.children[1].data.get_number("v"), Some(6.0));
}

#[test]
fn test_aggregations() {
    let rows = vec![
        Row::new().set("g", "A").set("v", 1i64),
        Row::new().set("g", "A").set("v", 2i64),
        Row::new().set("g", "A").set("v", "bad"),
    ];
    let config = PivotConfig::new(["g"])
        .value_field("v", Aggregation::Avg)
        .value_field("v2", Aggregation::Min);
    let root = build_pivot_tree(&rows, &config);

    let group = &root.children[0];
    assert_eq!(group.data.get_number("v"), Some(1.5), "parse failures skipped");
    assert_eq!(group.data.get_number("v2"), Some(0.0), "empty min is 0");

    let count_config = PivotConfig::new(["g"]).value_field("v", Aggregation::Count);
    let counted = build_pivot_tree(&rows, &count_config);
    assert_eq!(counted.children[0].data.get_number("v"), Some(3.0));
}

#[test]
fn test_config_validation() {
    assert!(PivotConfig::new(Vec::<String>::new()).validate().is_err());
    assert!(PivotConfig::new(["a", "b", "c", "d", "e", "f"])
        .validate()
        .is_err());
    assert!(PivotConfig::new(["a"]).validate().is_ok());
}

// ============================================================================
// Flattening
// ============================================================================

#[test]
fn test_two_level_flatten_order_matches_expansion() {
    let root = build_pivot_tree(&sales(), &two_level_config());
    let flat = flatten(&root, true);

    let shape: Vec<(String, FlatRowKind, i32, Option<f64>)> = flat
        .iter()
        .map(|r| (r.label.clone(), r.kind, r.level, r.data.get_number("v")))
        .collect();

    assert_eq!(
        shape,
        vec![
            ("N".into(), FlatRowKind::Normal, 0, Some(30.0)),
            ("X".into(), FlatRowKind::Normal, 1, Some(10.0)),
            ("Y".into(), FlatRowKind::Normal, 1, Some(20.0)),
            ("N".into(), FlatRowKind::Subtotal, 1, Some(30.0)),
            ("S".into(), FlatRowKind::Normal, 0, Some(30.0)),
            ("X".into(), FlatRowKind::Normal, 1, Some(30.0)),
            ("S".into(), FlatRowKind::Subtotal, 1, Some(30.0)),
            ("Total".into(), FlatRowKind::GrandTotal, 0, Some(60.0)),
        ]
    );
}

#[test]
fn test_collapsed_group_emits_no_children_or_subtotal() {
    let mut root = build_pivot_tree(&sales(), &two_level_config());
    let n_id = root.children[0].id.clone();
    assert!(toggle_node(&mut root, &n_id), "N found and collapsed");

    let flat = flatten(&root, true);
    let labels: Vec<(String, FlatRowKind)> =
        flat.iter().map(|r| (r.label.clone(), r.kind)).collect();
    assert_eq!(
        labels,
        vec![
            ("N".into(), FlatRowKind::Normal),
            ("S".into(), FlatRowKind::Normal),
            ("X".into(), FlatRowKind::Normal),
            ("S".into(), FlatRowKind::Subtotal),
            ("Total".into(), FlatRowKind::GrandTotal),
        ]
    );
}

#[test]
fn test_expanding_inner_group_reveals_leaves() {
    let mut root = build_pivot_tree(&sales(), &two_level_config());
    let nx_id = root.children[0].children[0].id.clone();
    assert!(toggle_node(&mut root, &nx_id));

    let flat = flatten(&root, false);
    let data_rows: Vec<&gridkit::pivot::FlatRow> = flat
        .iter()
        .filter(|r| r.row_type == FlatRowType::Data)
        .collect();
    assert_eq!(data_rows.len(), 1);
    assert_eq!(data_rows[0].data.get_number("v"), Some(10.0));
    assert_eq!(data_rows[0].level, 2);
}

#[test]
fn test_toggle_unknown_node_returns_false() {
    let mut root = build_pivot_tree(&sales(), &two_level_config());
    assert!(!toggle_node(&mut root, "9.9.9"));
}

#[test]
fn test_empty_dataset_flattens_to_grand_total_only() {
    let root = build_pivot_tree(&[], &two_level_config());
    let flat = flatten(&root, true);
    assert_eq!(flat.len(), 1);
    assert_eq!(flat[0].kind, FlatRowKind::GrandTotal);
    assert_eq!(flat[0].data.get_number("v"), Some(0.0));
}

#[test]
fn test_deep_tree_flattens_without_recursion() {
    // 5 group levels, every node expanded: the stack-based flatten must
    // walk the whole structure.
    let mut rows = Vec::new();
    for i in 0..64 {
        rows.push(
            Row::new()
                .set("a", (i % 2).to_string())
                .set("b", (i % 4 / 2).to_string())
                .set("c", (i % 8 / 4).to_string())
                .set("d", (i % 16 / 8).to_string())
                .set("e", (i % 32 / 16).to_string())
                .set("v", 1i64),
        );
    }
    let config = PivotConfig::new(["a", "b", "c", "d", "e"]).value_field("v", Aggregation::Sum);
    let mut root = build_pivot_tree(&rows, &config);

    // Expand everything.
    fn expand_all(node: &mut gridkit::pivot::PivotNode) {
        node.is_expanded = true;
        for child in &mut node.children {
            expand_all(child);
        }
    }
    expand_all(&mut root);

    let flat = flatten(&root, false);
    // 2 + 4 + 8 + 16 + 32 groups + 64 leaves + grand total.
    assert_eq!(flat.len(), 2 + 4 + 8 + 16 + 32 + 64 + 1);
    assert_eq!(flat.last().unwrap().data.get_number("v"), Some(64.0));
}

// ============================================================================
// Aggregation correctness law
// ============================================================================

#[test]
fn test_level0_groups_agree_with_direct_group_by_sum() {
    let mut rows = Vec::new();
    for i in 0..200 {
        rows.push(
            Row::new()
                .set("g", format!("g{}", i % 7))
                .set("v", (i * 3 % 17) as i64),
        );
    }

    let mut expected: HashMap<String, f64> = HashMap::new();
    for row in &rows {
        *expected.entry(row.display("g")).or_default() += row.get_number("v").unwrap();
    }

    let config = PivotConfig::new(["g"]).value_field("v", Aggregation::Sum);
    let root = build_pivot_tree(&rows, &config);
    let flat = flatten(&root, false);

    for row in flat.iter().filter(|r| r.kind == FlatRowKind::Normal && r.level == 0) {
        assert_eq!(
            row.data.get_number("v"),
            expected.get(&row.label).copied(),
            "group {} sum",
            row.label
        );
    }
}

// ============================================================================
// Virtualized pivot view
// ============================================================================

fn wide_dataset() -> Vec<Row> {
    // One group per letter, 30 leaves each.
    let mut rows = Vec::new();
    for g in ["A", "B", "C"] {
        for i in 0..30 {
            rows.push(Row::new().set("g", g).set("v", i as i64));
        }
    }
    rows
}

fn view(rows: &[Row], config: PivotConfig) -> PivotView {
    PivotView::new(rows, config, Arc::new(DefaultElementFactory), 10, 100, 2).unwrap()
}

#[test]
fn test_view_windows_over_flat_rows() {
    let config = PivotConfig::new(["g"])
        .value_field("v", Aggregation::Sum)
        .show_subtotals(false);
    let view = view(&wide_dataset(), config);
    // 3 groups (expanded) + 90 leaves + grand total.
    assert_eq!(view.row_count(), 94);

    view.update_visible_rows();
    let visible = view.visible_indexes();
    assert_eq!(visible.first(), Some(&0));
    assert!(visible.len() < 94, "only the window is mounted");

    view.handle_scroll(400);
    let visible = view.visible_indexes();
    assert_eq!(*visible.first().unwrap(), 38, "40 - buffer");
}

#[test]
fn test_view_toggle_reflattens_and_resizes() {
    let config = PivotConfig::new(["g"]).value_field("v", Aggregation::Sum);
    let view = view(&wide_dataset(), config);
    let before = view.row_count();
    let spacer_before = view.scroll().spacer_height();

    assert!(view.toggle("0"), "collapse group A");
    assert_eq!(view.row_count(), before - 30);
    assert!(view.scroll().spacer_height() < spacer_before);

    assert!(view.toggle("0"), "expand it back");
    assert_eq!(view.row_count(), before);
}

#[test]
fn test_sticky_group_row_appears_when_header_scrolls_out() {
    let config = PivotConfig::new(["g"]).value_field("v", Aggregation::Sum);
    let view = view(&wide_dataset(), config);

    view.update_visible_rows();
    assert!(view.sticky_row().is_none(), "group header still visible");

    // Scroll into the middle of group A's leaves.
    view.handle_scroll(150);
    let sticky = view.sticky_row().expect("sticky clone shown");
    assert_eq!(sticky.data("node-id").as_deref(), Some("0"));

    // The clone is a rendering-only duplicate: toggling goes through the id.
    assert!(view.toggle(&sticky.data("node-id").unwrap()));
}

#[test]
fn test_breadcrumb_shows_ancestor_chain() {
    let config = two_level_config();
    let view = view(&sales(), config);
    view.update_visible_rows();
    // Top row is group N itself: breadcrumb is its chain.
    assert_eq!(view.breadcrumb(), vec!["N"]);

    let root = build_pivot_tree(&sales(), &two_level_config());
    assert_eq!(ancestor_labels(&root, "0.1"), vec!["N", "Y"]);
    assert_eq!(ancestor_labels(&root, ""), Vec::<String>::new());
}

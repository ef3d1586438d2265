//! Flattening the pivot tree into render order.

use crate::model::Row;

use super::PivotNode;
use super::PivotNodeKind;

/// Whether a flat row came from a group node or a data leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlatRowType {
    /// A group node.
    Group,
    /// An original data row.
    Data,
}

/// The render role of a flat row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlatRowKind {
    /// A regular group or data row.
    Normal,
    /// A synthesized subtotal row, emitted after a group's children.
    Subtotal,
    /// The synthesized grand-total row at the end.
    GrandTotal,
}

/// One row of the flattened, in-render-order pivot sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    /// Id of the originating node (the group's id for subtotals, the
    /// root's for the grand total).
    pub node_id: String,
    /// Group or data.
    pub row_type: FlatRowType,
    /// Normal, subtotal or grand total.
    pub kind: FlatRowKind,
    /// Indent level.
    pub level: i32,
    /// Display label (the group value; empty for data rows).
    pub label: String,
    /// The node's aggregated or original row.
    pub data: Row,
    /// Current expansion state (meaningful for normal group rows).
    pub is_expanded: bool,
}

impl FlatRow {
    /// Whether toggling this row makes sense.
    pub fn is_expandable(&self) -> bool {
        self.row_type == FlatRowType::Group && self.kind == FlatRowKind::Normal
    }
}

enum StackEntry<'a> {
    Node(&'a PivotNode),
    /// Sentinel: emit the subtotal for this group once its children are done.
    Subtotal(&'a PivotNode),
}

/// Flattens the tree into render order with an explicit stack.
///
/// Each expanded node (the root excluded) emits one normal row. A group's
/// children are pushed in reverse so left-to-right order is preserved on
/// pop; the subtotal sentinel is pushed beneath them so it emits after
/// they finish. The grand-total row, built from the root's aggregate, is
/// appended last.
pub fn flatten(root: &PivotNode, show_subtotals: bool) -> Vec<FlatRow> {
    let mut out = Vec::new();
    let mut stack: Vec<StackEntry> = Vec::new();

    for child in root.children.iter().rev() {
        stack.push(StackEntry::Node(child));
    }

    while let Some(entry) = stack.pop() {
        match entry {
            StackEntry::Node(node) => {
                out.push(normal_row(node));
                if node.is_group() && node.is_expanded {
                    if show_subtotals {
                        stack.push(StackEntry::Subtotal(node));
                    }
                    for child in node.children.iter().rev() {
                        stack.push(StackEntry::Node(child));
                    }
                }
            }
            StackEntry::Subtotal(node) => out.push(FlatRow {
                node_id: node.id.clone(),
                row_type: FlatRowType::Group,
                kind: FlatRowKind::Subtotal,
                level: node.level + 1,
                label: node.label.clone(),
                data: node.data.clone(),
                is_expanded: false,
            }),
        }
    }

    out.push(FlatRow {
        node_id: root.id.clone(),
        row_type: FlatRowType::Group,
        kind: FlatRowKind::GrandTotal,
        level: 0,
        label: "Total".into(),
        data: root.data.clone(),
        is_expanded: false,
    });

    out
}

fn normal_row(node: &PivotNode) -> FlatRow {
    FlatRow {
        node_id: node.id.clone(),
        row_type: match node.kind {
            PivotNodeKind::Group => FlatRowType::Group,
            PivotNodeKind::Leaf => FlatRowType::Data,
        },
        kind: FlatRowKind::Normal,
        level: node.level,
        label: node.label.clone(),
        data: node.data.clone(),
        is_expanded: node.is_expanded,
    }
}

//! Pivot tree construction and aggregation.

use std::collections::HashMap;

use crate::data::round2;
use crate::model::CellValue;
use crate::model::Row;

use super::Aggregation;
use super::PivotConfig;
use super::ValueField;

/// Whether a node groups rows or carries one original row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotNodeKind {
    /// An aggregated group of rows.
    Group,
    /// One original data row.
    Leaf,
}

/// One node of the pivot tree.
///
/// Ids are dotted child-index paths (`"0.2.1"`), deterministic for a given
/// dataset and grouping; the root's id is empty. The root sits at level -1,
/// is always expanded and is never rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotNode {
    /// Dotted child-index path.
    pub id: String,
    /// Group or leaf.
    pub kind: PivotNodeKind,
    /// Nesting level; -1 for the root.
    pub level: i32,
    /// The group-by value this node represents; empty for leaves and root.
    pub label: String,
    /// Aggregated row for groups (and the grand total on the root); the
    /// original row for leaves.
    pub data: Row,
    /// Whether children are rendered.
    pub is_expanded: bool,
    /// Child nodes, in first-seen order.
    pub children: Vec<PivotNode>,
}

impl PivotNode {
    /// Whether this node is a group.
    pub fn is_group(&self) -> bool {
        self.kind == PivotNodeKind::Group
    }
}

/// Builds the pivot tree for a dataset.
///
/// Rows are grouped recursively by `config.row_groups`, with groups kept in
/// first-seen (insertion) order at every level. Rows beyond the last group
/// level become leaf nodes. The root aggregates the full input and feeds
/// the grand-total row.
///
/// Top-level groups start expanded; deeper groups start collapsed.
pub fn build_pivot_tree(rows: &[Row], config: &PivotConfig) -> PivotNode {
    PivotNode {
        id: String::new(),
        kind: PivotNodeKind::Group,
        level: -1,
        label: String::new(),
        data: aggregate_rows(rows, &config.value_fields),
        is_expanded: true,
        children: build_level(rows, 0, "", config),
    }
}

fn build_level(rows: &[Row], depth: usize, parent_id: &str, config: &PivotConfig) -> Vec<PivotNode> {
    if depth >= config.row_groups.len() {
        return rows
            .iter()
            .enumerate()
            .map(|(i, row)| PivotNode {
                id: child_id(parent_id, i),
                kind: PivotNodeKind::Leaf,
                level: depth as i32,
                label: String::new(),
                data: row.clone(),
                is_expanded: false,
                children: Vec::new(),
            })
            .collect();
    }

    let group_key = &config.row_groups[depth];
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<Row>> = HashMap::new();
    for row in rows {
        let value = row.display(group_key);
        if !groups.contains_key(&value) {
            order.push(value.clone());
        }
        groups.entry(value).or_default().push(row.clone());
    }

    order
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            let subset = groups.remove(&value).unwrap_or_default();
            let id = child_id(parent_id, i);
            let mut data = aggregate_rows(&subset, &config.value_fields);
            data.insert(group_key.clone(), CellValue::from(value.clone()));
            PivotNode {
                kind: PivotNodeKind::Group,
                level: depth as i32,
                label: value,
                data,
                is_expanded: depth == 0,
                children: build_level(&subset, depth + 1, &id, config),
                id,
            }
        })
        .collect()
}

fn child_id(parent: &str, index: usize) -> String {
    if parent.is_empty() {
        index.to_string()
    } else {
        format!("{parent}.{index}")
    }
}

/// Aggregates one value field set over a row subset.
pub(crate) fn aggregate_rows(rows: &[Row], fields: &[ValueField]) -> Row {
    let mut out = Row::new();
    for field in fields {
        let values: Vec<f64> = rows.iter().filter_map(|r| r.get_number(&field.key)).collect();
        let value = match field.aggregation {
            Aggregation::Count => CellValue::Int(rows.len() as i64),
            Aggregation::Sum => CellValue::Float(values.iter().sum()),
            Aggregation::Avg => {
                if values.is_empty() {
                    CellValue::Float(0.0)
                } else {
                    CellValue::Float(round2(values.iter().sum::<f64>() / values.len() as f64))
                }
            }
            Aggregation::Min => {
                CellValue::Float(values.iter().copied().fold(f64::INFINITY, f64::min))
            }
            Aggregation::Max => {
                CellValue::Float(values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            }
        };
        // Empty groups land on 0 rather than an infinity.
        let value = match value {
            CellValue::Float(f) if !f.is_finite() => CellValue::Float(0.0),
            other => other,
        };
        out.insert(field.key.clone(), value);
    }
    out
}

/// Flips the expansion state of a node, located by depth-first search.
/// Returns whether the node was found.
pub fn toggle_node(root: &mut PivotNode, node_id: &str) -> bool {
    if root.id == node_id {
        root.is_expanded = !root.is_expanded;
        return true;
    }
    for child in &mut root.children {
        if toggle_node(child, node_id) {
            return true;
        }
    }
    false
}

/// The labels of the group nodes on the path to `node_id`, outermost first.
///
/// Used for the breadcrumb. The node itself contributes its label when it
/// is a group.
pub fn ancestor_labels(root: &PivotNode, node_id: &str) -> Vec<String> {
    if node_id.is_empty() {
        return Vec::new();
    }
    let mut labels = Vec::new();
    let mut current = root;
    for part in node_id.split('.') {
        let Ok(index) = part.parse::<usize>() else {
            break;
        };
        let Some(child) = current.children.get(index) else {
            break;
        };
        if child.is_group() {
            labels.push(child.label.clone());
        }
        current = child;
    }
    labels
}

//! In-place column updates on existing DOM.

use std::sync::Arc;

use griddom::Node;
use griddom::NodeKind;

use crate::model::ResolvedColumn;
use crate::model::Row;

use super::factory::is_skeleton;
use super::factory::row_index;
use super::factory::DATA_COLUMN;
use super::ElementFactory;

/// Prefix of the per-column CSS custom properties on the wrapper.
pub const COLUMN_VAR_PREFIX: &str = "--grid-col-";

fn width_var(key: &str) -> String {
    format!("{COLUMN_VAR_PREFIX}{key}-width")
}

fn left_var(key: &str) -> String {
    format!("{COLUMN_VAR_PREFIX}{key}-left")
}

/// Applies a new resolved-column list to the mounted header, summary and
/// data rows without rebuilding them.
///
/// Widths land as one CSS custom property per column on the wrapper, so
/// cells pick them up through the cascade and a resize is O(columns)
/// instead of O(visible cells × columns). Frozen columns additionally get
/// a cumulative left offset property. Cells are reordered, removed for
/// newly hidden keys and created for newly visible ones, in place.
pub struct ColumnManager {
    wrapper: Node,
    header: Node,
    summary: Option<Node>,
    factory: Arc<dyn ElementFactory>,
}

impl ColumnManager {
    /// Creates a manager over the mounted chrome rows.
    pub fn new(
        wrapper: Node,
        header: Node,
        summary: Option<Node>,
        factory: Arc<dyn ElementFactory>,
    ) -> Self {
        Self {
            wrapper,
            header,
            summary,
            factory,
        }
    }

    /// Applies `columns` to the wrapper variables, the chrome rows and the
    /// given data rows.
    ///
    /// `row_lookup` resolves a row index back to its data so cells can be
    /// created for newly visible keys; `summary` feeds the summary cells.
    pub fn update(
        &self,
        columns: &[ResolvedColumn],
        rows: &[Node],
        row_lookup: &dyn Fn(usize) -> Option<Row>,
        summary: Option<&Row>,
    ) {
        self.apply_variables(columns);

        Self::sync_cells(&self.header, columns, &|col| self.factory.header_cell(col));
        if let Some(summary_row) = &self.summary {
            Self::sync_cells(summary_row, columns, &|col| {
                self.factory.summary_cell(col, summary)
            });
        }

        for row in rows {
            if is_skeleton(row) {
                Self::sync_cells(row, columns, &|col| {
                    Node::new(NodeKind::Cell).with_data(DATA_COLUMN, col.key())
                });
                continue;
            }
            let Some(index) = row_index(row) else {
                continue;
            };
            let Some(data) = row_lookup(index) else {
                continue;
            };
            Self::sync_cells(row, columns, &|col| self.factory.cell(col, &data));
        }
    }

    /// Rewrites the per-column width and frozen-offset variables.
    fn apply_variables(&self, columns: &[ResolvedColumn]) {
        self.wrapper.retain_vars_without_prefix(COLUMN_VAR_PREFIX);

        let mut frozen_left: u64 = 0;
        for col in columns {
            self.wrapper
                .set_var(width_var(col.key()), format!("{}px", col.width));
            if col.is_frozen {
                self.wrapper
                    .set_var(left_var(col.key()), format!("{frozen_left}px"));
                frozen_left += col.width as u64;
            }
        }
    }

    /// Reconciles one row's cells with the column list: drop cells for gone
    /// keys, create cells for new keys, reorder to match.
    fn sync_cells(row: &Node, columns: &[ResolvedColumn], make_cell: &dyn Fn(&ResolvedColumn) -> Node) {
        let children = row.children();
        for child in &children {
            let Some(key) = child.data(DATA_COLUMN) else {
                continue;
            };
            if !columns.iter().any(|c| c.key() == key) {
                row.remove_child(&child.id());
            }
        }

        let mut ordered_ids = Vec::with_capacity(columns.len());
        for col in columns {
            let existing = row
                .children()
                .into_iter()
                .find(|c| c.data(DATA_COLUMN).as_deref() == Some(col.key()));
            let cell = match existing {
                Some(cell) => cell,
                None => {
                    let cell = make_cell(col);
                    row.append_child(cell.clone());
                    cell
                }
            };
            ordered_ids.push(cell.id());
        }
        row.reorder_children(&ordered_ids);
    }
}

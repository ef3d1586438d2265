//! The element factory: the fixed operation set the engine renders through.

use griddom::Node;
use griddom::NodeKind;

use crate::model::ResolvedColumn;
use crate::model::Row;
use crate::pivot::FlatRow;
use crate::pivot::FlatRowKind;
use crate::pivot::ValueField;

/// Data attribute carrying a row's index.
pub const DATA_ROW_INDEX: &str = "row-index";
/// Data attribute marking skeleton rows.
pub const DATA_SKELETON: &str = "skeleton";
/// Data attribute carrying a cell's column key.
pub const DATA_COLUMN: &str = "col";

/// Creates the elements the engine mounts and diffs.
///
/// Implementations own all markup decisions; the engine only relies on the
/// `row-index`, `skeleton` and `col` data attributes it reads back during
/// diffing. Cell widths are not written per cell: cells reference the
/// per-column CSS custom properties the column manager maintains on the
/// wrapper.
pub trait ElementFactory: Send + Sync {
    /// The outermost wrapper element.
    fn wrapper(&self) -> Node;

    /// One header cell.
    fn header_cell(&self, column: &ResolvedColumn) -> Node;

    /// The header row.
    fn header_row(&self, columns: &[ResolvedColumn]) -> Node {
        let row = Node::new(NodeKind::HeaderRow);
        row.append_children(columns.iter().map(|c| self.header_cell(c)));
        row
    }

    /// One summary cell. `summary` is the current aggregate row, when known.
    fn summary_cell(&self, column: &ResolvedColumn, summary: Option<&Row>) -> Node;

    /// The summary row.
    fn summary_row(&self, columns: &[ResolvedColumn], summary: Option<&Row>) -> Node {
        let row = Node::new(NodeKind::SummaryRow);
        row.append_children(columns.iter().map(|c| self.summary_cell(c, summary)));
        row
    }

    /// One data cell.
    fn cell(&self, column: &ResolvedColumn, row: &Row) -> Node;

    /// A data row.
    fn data_row(&self, index: usize, row: &Row, columns: &[ResolvedColumn]) -> Node {
        let node = Node::new(NodeKind::Row).with_data(DATA_ROW_INDEX, index.to_string());
        node.append_children(columns.iter().map(|c| self.cell(c, row)));
        node
    }

    /// A placeholder row shown while the backing page loads.
    fn skeleton_row(&self, index: usize, columns: &[ResolvedColumn]) -> Node;

    /// A pivot flat row (group, data, subtotal or grand total).
    fn pivot_row(&self, index: usize, flat: &FlatRow, value_fields: &[ValueField]) -> Node;
}

/// Reads the row index a factory stamped onto a row element.
pub fn row_index(node: &Node) -> Option<usize> {
    node.data(DATA_ROW_INDEX)?.parse().ok()
}

/// Whether a row element is a skeleton placeholder.
pub fn is_skeleton(node: &Node) -> bool {
    node.data(DATA_SKELETON).as_deref() == Some("true")
}

/// The bundled headless factory.
///
/// Produces plain [`griddom`] nodes: enough structure for tests, demos and
/// hosts that mirror the tree themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultElementFactory;

impl ElementFactory for DefaultElementFactory {
    fn wrapper(&self) -> Node {
        Node::new(NodeKind::Wrapper)
    }

    fn header_cell(&self, column: &ResolvedColumn) -> Node {
        Node::new(NodeKind::Cell)
            .with_data(DATA_COLUMN, column.key())
            .with_text(column.column.title.clone())
    }

    fn summary_cell(&self, column: &ResolvedColumn, summary: Option<&Row>) -> Node {
        let text = summary
            .map(|row| row.display(column.key()))
            .unwrap_or_default();
        Node::new(NodeKind::Cell)
            .with_data(DATA_COLUMN, column.key())
            .with_text(text)
    }

    fn cell(&self, column: &ResolvedColumn, row: &Row) -> Node {
        Node::new(NodeKind::Cell)
            .with_data(DATA_COLUMN, column.key())
            .with_text(column.column.render_cell(row))
    }

    fn skeleton_row(&self, index: usize, columns: &[ResolvedColumn]) -> Node {
        let node = Node::new(NodeKind::SkeletonRow)
            .with_data(DATA_ROW_INDEX, index.to_string())
            .with_data(DATA_SKELETON, "true");
        node.append_children(
            columns
                .iter()
                .map(|c| Node::new(NodeKind::Cell).with_data(DATA_COLUMN, c.key())),
        );
        node
    }

    fn pivot_row(&self, index: usize, flat: &FlatRow, value_fields: &[ValueField]) -> Node {
        let node = Node::new(NodeKind::Row)
            .with_data(DATA_ROW_INDEX, index.to_string())
            .with_data("node-id", flat.node_id.clone())
            .with_data("level", flat.level.to_string())
            .with_data(
                "row-kind",
                match flat.kind {
                    FlatRowKind::Normal => "normal",
                    FlatRowKind::Subtotal => "subtotal",
                    FlatRowKind::GrandTotal => "grandtotal",
                },
            );
        if flat.is_expandable() {
            node.set_data("expanded", flat.is_expanded.to_string());
        }

        let label = Node::new(NodeKind::Cell)
            .with_data(DATA_COLUMN, "__group")
            .with_text(flat.label.clone());
        node.append_child(label);
        node.append_children(value_fields.iter().map(|field| {
            Node::new(NodeKind::Cell)
                .with_data(DATA_COLUMN, field.key.clone())
                .with_text(flat.data.display(&field.key))
        }));
        node
    }
}

//! Column descriptors.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use super::CellValue;
use super::Row;

/// Custom cell renderer: produces the display text for one cell.
pub type CellRenderer = Arc<dyn Fn(&CellValue, &Row) -> String + Send + Sync>;

/// Declared value type of a column.
///
/// Informs sorting and filter comparison; cells themselves stay dynamic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Text cells (the default).
    #[default]
    String,
    /// Numeric cells.
    Number,
    /// ISO-like date strings, compared lexicographically.
    Date,
    /// Boolean cells.
    Boolean,
}

/// Aggregate applied to a column in the summary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryType {
    /// No aggregate (the default).
    #[default]
    None,
    /// Sum of numeric cells.
    Sum,
    /// Average of numeric cells, rounded to 2 decimals.
    Avg,
    /// Row count.
    Count,
    /// Maximum numeric cell.
    Max,
    /// Minimum numeric cell.
    Min,
}

/// A user-supplied column descriptor.
///
/// `key` must be non-empty and unique across the grid's columns; this is
/// checked when the column model is constructed. Width may be given as a
/// fixed pixel value, a `flex` weight, or left auto; see the width solver
/// for how the three interact.
///
/// # Example
///
/// ```
/// use gridkit::model::{Column, DataType, SummaryType};
///
/// let col = Column::new("revenue", "Revenue")
///     .data_type(DataType::Number)
///     .summary(SummaryType::Sum)
///     .flex(2);
/// ```
#[derive(Clone)]
pub struct Column {
    /// Unique identifier.
    pub key: String,
    /// Display label.
    pub title: String,
    /// Fixed pixel width, if any.
    pub width: Option<u32>,
    /// Minimum pixel width.
    pub min_width: Option<u32>,
    /// Flex weight for proportional width distribution.
    pub flex: Option<u16>,
    /// Declared value type.
    pub data_type: DataType,
    /// Summary-row aggregate.
    pub summary_type: SummaryType,
    /// Optional custom cell renderer.
    pub renderer: Option<CellRenderer>,
}

impl Column {
    /// Creates a column with the given key and title.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            width: None,
            min_width: None,
            flex: None,
            data_type: DataType::String,
            summary_type: SummaryType::None,
            renderer: None,
        }
    }

    /// Sets a fixed pixel width.
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets the minimum pixel width.
    pub fn min_width(mut self, min_width: u32) -> Self {
        self.min_width = Some(min_width);
        self
    }

    /// Sets the flex weight.
    pub fn flex(mut self, flex: u16) -> Self {
        self.flex = Some(flex);
        self
    }

    /// Sets the declared value type.
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Sets the summary-row aggregate.
    pub fn summary(mut self, summary_type: SummaryType) -> Self {
        self.summary_type = summary_type;
        self
    }

    /// Installs a custom cell renderer.
    pub fn renderer(
        mut self,
        renderer: impl Fn(&CellValue, &Row) -> String + Send + Sync + 'static,
    ) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Display text for a cell of this column.
    pub fn render_cell(&self, row: &Row) -> String {
        let value = row.get(&self.key).cloned().unwrap_or(CellValue::Null);
        match &self.renderer {
            Some(render) => render(&value, row),
            None => value.display(),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("width", &self.width)
            .field("min_width", &self.min_width)
            .field("flex", &self.flex)
            .field("data_type", &self.data_type)
            .field("summary_type", &self.summary_type)
            .field("renderer", &self.renderer.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// A column after the state has been applied: definitive width and freeze.
#[derive(Debug, Clone)]
pub struct ResolvedColumn {
    /// The original descriptor.
    pub column: Column,
    /// Effective pixel width.
    pub width: u32,
    /// Whether the column is pinned to the left edge.
    pub is_frozen: bool,
}

impl ResolvedColumn {
    /// Shortcut for the column key.
    pub fn key(&self) -> &str {
        &self.column.key
    }
}

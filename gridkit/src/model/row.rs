//! Dynamic rows.

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use super::CellValue;

/// A dynamic row of cells keyed by column key.
///
/// Rows hold their cells as a `HashMap<String, CellValue>`; typed getters
/// provide convenient access. A missing cell and an explicit `Null` behave
/// identically for filtering and rendering.
///
/// # Example
///
/// ```
/// use gridkit::model::Row;
///
/// let row = Row::new()
///     .set("name", "Contoso")
///     .set("revenue", 1_000_000i64);
///
/// assert_eq!(row.get_str("name"), Some("Contoso"));
/// assert_eq!(row.get_number("revenue"), Some(1_000_000.0));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: HashMap<String, CellValue>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style cell assignment.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Inserts or replaces a cell.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Returns a reference to the cell value, if present.
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.get(key)
    }

    /// Returns `true` if the row contains the given cell.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// String view of a cell (only for `CellValue::String` cells).
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(CellValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of a cell, with string parsing.
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(CellValue::as_f64)
    }

    /// Boolean view of a cell.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.fields.get(key) {
            Some(CellValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Display stringification of a cell; missing cells render empty.
    pub fn display(&self, key: &str) -> String {
        self.fields
            .get(key)
            .map(CellValue::display)
            .unwrap_or_default()
    }

    /// Returns a reference to all cells.
    pub fn fields(&self) -> &HashMap<String, CellValue> {
        &self.fields
    }

    /// Number of cells in the row.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, CellValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

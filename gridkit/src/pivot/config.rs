//! Pivot configuration.

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;

/// Largest supported group nesting depth.
pub const MAX_ROW_GROUPS: usize = 5;

/// The aggregation applied to one value field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Sum of numeric cells (non-numeric cells are skipped).
    Sum,
    /// Average of numeric cells, rounded to 2 decimals.
    Avg,
    /// Row count of the group (ignores the field's cells).
    Count,
    /// Minimum numeric cell; 0 when the group has none.
    Min,
    /// Maximum numeric cell; 0 when the group has none.
    Max,
}

/// One aggregated value column of the pivot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueField {
    /// The column key to aggregate.
    pub key: String,
    /// How to aggregate it.
    pub aggregation: Aggregation,
}

impl ValueField {
    /// Creates a value field.
    pub fn new(key: impl Into<String>, aggregation: Aggregation) -> Self {
        Self {
            key: key.into(),
            aggregation,
        }
    }
}

/// Configuration of a pivot view.
///
/// # Example
///
/// ```
/// use gridkit::pivot::{Aggregation, PivotConfig};
///
/// let config = PivotConfig::new(["region", "city"])
///     .value_field("revenue", Aggregation::Sum)
///     .show_subtotals(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotConfig {
    /// Group-by column keys, outermost first. 1 to 5 levels.
    pub row_groups: Vec<String>,
    /// Aggregated value columns.
    pub value_fields: Vec<ValueField>,
    /// Whether each group emits a subtotal row after its children.
    pub show_subtotals: bool,
}

impl PivotConfig {
    /// Creates a config grouping by the given keys.
    pub fn new<I, S>(row_groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            row_groups: row_groups.into_iter().map(Into::into).collect(),
            value_fields: Vec::new(),
            show_subtotals: false,
        }
    }

    /// Adds a value field.
    pub fn value_field(mut self, key: impl Into<String>, aggregation: Aggregation) -> Self {
        self.value_fields.push(ValueField::new(key, aggregation));
        self
    }

    /// Enables or disables subtotal rows.
    pub fn show_subtotals(mut self, show: bool) -> Self {
        self.show_subtotals = show;
        self
    }

    /// Validates group depth and key shapes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.row_groups.is_empty() {
            return Err(ConfigError::InvalidPivot(
                "at least one row group is required".into(),
            ));
        }
        if self.row_groups.len() > MAX_ROW_GROUPS {
            return Err(ConfigError::InvalidPivot(format!(
                "at most {MAX_ROW_GROUPS} row groups are supported, got {}",
                self.row_groups.len()
            )));
        }
        if self.row_groups.iter().any(String::is_empty) {
            return Err(ConfigError::InvalidPivot("empty row group key".into()));
        }
        if self.value_fields.iter().any(|f| f.key.is_empty()) {
            return Err(ConfigError::InvalidPivot("empty value field key".into()));
        }
        Ok(())
    }
}

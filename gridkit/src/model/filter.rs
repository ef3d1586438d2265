//! Per-column filters.

use serde::Deserialize;
use serde::Serialize;

use super::CellValue;

/// A filter applied to one column.
///
/// Variants carry their own matching semantics via [`matches`](Self::matches);
/// the in-memory strategy evaluates them locally while the paged-remote
/// strategy forwards them inside the [`Query`](super::Query).
///
/// # Example
///
/// ```
/// use gridkit::model::{CellValue, ColumnFilter};
///
/// let filter = ColumnFilter::set(["B", "C"]);
/// assert!(filter.matches(&CellValue::from("B")));
/// assert!(!filter.matches(&CellValue::from("A")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ColumnFilter {
    /// Row passes iff the stringified cell is one of `values`.
    /// An empty set passes everything.
    Set {
        /// Accepted display values.
        values: Vec<String>,
    },
    /// Case-insensitive substring match.
    Text {
        /// The needle.
        value: String,
    },
    /// Lexicographic range over the cell's display string
    /// (assumes ISO-like date formatting).
    DateRange {
        /// Inclusive lower bound.
        #[serde(skip_serializing_if = "Option::is_none")]
        start: Option<String>,
        /// Inclusive upper bound.
        #[serde(skip_serializing_if = "Option::is_none")]
        end: Option<String>,
    },
    /// Inclusive numeric range: `min <= x <= max`.
    NumberRange {
        /// Inclusive lower bound.
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        /// Inclusive upper bound.
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
}

impl ColumnFilter {
    /// Creates a set filter.
    pub fn set<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnFilter::Set {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a text filter.
    pub fn text(value: impl Into<String>) -> Self {
        ColumnFilter::Text {
            value: value.into(),
        }
    }

    /// Creates a date-range filter.
    pub fn date_range(start: Option<&str>, end: Option<&str>) -> Self {
        ColumnFilter::DateRange {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
        }
    }

    /// Creates a number-range filter.
    pub fn number_range(min: Option<f64>, max: Option<f64>) -> Self {
        ColumnFilter::NumberRange { min, max }
    }

    /// Whether a cell value passes this filter.
    pub fn matches(&self, value: &CellValue) -> bool {
        match self {
            ColumnFilter::Set { values } => {
                if values.is_empty() {
                    return true;
                }
                let display = value.display();
                values.iter().any(|v| v == &display)
            }
            ColumnFilter::Text { value: needle } => {
                if needle.is_empty() {
                    return true;
                }
                value
                    .display()
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            }
            ColumnFilter::DateRange { start, end } => {
                let display = value.display();
                if let Some(start) = start {
                    if display.as_str() < start.as_str() {
                        return false;
                    }
                }
                if let Some(end) = end {
                    if display.as_str() > end.as_str() {
                        return false;
                    }
                }
                true
            }
            ColumnFilter::NumberRange { min, max } => {
                if min.is_none() && max.is_none() {
                    return true;
                }
                // A bounded range cannot match a non-numeric cell.
                let Some(x) = value.as_f64() else {
                    return false;
                };
                if let Some(min) = min {
                    if x < *min {
                        return false;
                    }
                }
                if let Some(max) = max {
                    if x > *max {
                        return false;
                    }
                }
                true
            }
        }
    }
}

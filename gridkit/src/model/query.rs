//! Query types passed to data strategies and remote loaders.

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use super::ColumnFilter;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// A sort over one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sort {
    /// Column key.
    pub key: String,
    /// Direction.
    pub direction: SortDirection,
}

impl Sort {
    /// Creates a sort.
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }
}

/// The state-level query handed to a data strategy (and, in server mode,
/// serialized to the injected page loader).
///
/// Serializes with camelCase keys and omitted absent fields, matching the
/// wire shape remote loaders expect:
/// `{sortKey?, sortDirection?, filterText?, columnFilters?}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Query {
    /// Sorted column key, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,
    /// Sort direction, present iff `sort_key` is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<SortDirection>,
    /// Global filter text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_text: Option<String>,
    /// Per-column filters, keyed by column key.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub column_filters: HashMap<String, ColumnFilter>,
}

impl Query {
    /// Returns `true` when the query neither sorts nor filters.
    pub fn is_empty(&self) -> bool {
        self.sort_key.is_none()
            && self
                .filter_text
                .as_deref()
                .map(|t| t.trim().is_empty())
                .unwrap_or(true)
            && self.column_filters.is_empty()
    }

    /// The sort as a pair, if any.
    pub fn sort(&self) -> Option<Sort> {
        match (&self.sort_key, self.sort_direction) {
            (Some(key), Some(direction)) => Some(Sort::new(key.clone(), direction)),
            _ => None,
        }
    }
}

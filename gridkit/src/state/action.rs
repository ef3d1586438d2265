//! The action catalog.

use serde::Deserialize;
use serde::Serialize;

use crate::model::ColumnFilter;
use crate::model::SortDirection;

/// Which data source backs the grid. Decided once at bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridMode {
    /// Fully in-memory dataset.
    #[default]
    Client,
    /// Paged-remote dataset.
    Server,
}

impl std::fmt::Display for GridMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridMode::Client => write!(f, "client"),
            GridMode::Server => write!(f, "server"),
        }
    }
}

/// The effect class a dispatched action routes to.
///
/// The action router owns the class → effect mapping; classification lives
/// on the action itself so the reducer and the router cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectClass {
    /// Changes what rows exist or their order; re-runs the query.
    Data,
    /// Changes column presentation; patches DOM in place.
    Columns,
    /// Changes the frame; full viewport rebuild.
    Structure,
    /// No render effect.
    StateOnly,
}

/// Every mutation the store accepts.
///
/// The reducer is exhaustive over this enum, so adding a variant without
/// handling it is a compile error.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Replace the sort.
    SortSet {
        /// Column key.
        key: String,
        /// Direction.
        direction: SortDirection,
    },
    /// Clear the sort.
    SortClear,
    /// Replace the global filter text (stored raw; trimming is up to consumers).
    SetFilterText(String),
    /// Set one column's filter, preserving the others.
    ColumnFilterSet {
        /// Column key.
        key: String,
        /// The filter.
        filter: ColumnFilter,
    },
    /// Clear one column's filter.
    ColumnFilterClear {
        /// Column key.
        key: String,
    },
    /// Replace the filtered total reported by the data strategy.
    SetTotalRows(usize),

    /// Override one column's width (clamped to at least 1px).
    ColumnResize {
        /// Column key.
        key: String,
        /// New width in pixels.
        width: u32,
    },
    /// Un-hide a column.
    ColumnShow {
        /// Column key.
        key: String,
    },
    /// Hide a column.
    ColumnHide {
        /// Column key.
        key: String,
    },
    /// Un-hide several columns.
    ColumnBatchShow {
        /// Column keys.
        keys: Vec<String>,
    },
    /// Hide several columns.
    ColumnBatchHide {
        /// Column keys.
        keys: Vec<String>,
    },
    /// Un-hide every column.
    ColumnsResetVisibility,

    /// Replace the column order.
    ///
    /// Unknown keys are dropped; known keys missing from the payload are
    /// appended in original order. Duplicate keys are a programmer error
    /// and panic.
    ColumnOrderSet {
        /// The new order.
        order: Vec<String>,
    },
    /// Set how many leading visible columns are frozen.
    SetFrozenCount(usize),
    /// The table frame was resized.
    TableResize {
        /// New table width in pixels.
        width: u32,
    },

    /// Record the bootstrap mode decision.
    SetMode(GridMode),
}

impl Action {
    /// The effect class this action routes to.
    pub fn effect_class(&self) -> EffectClass {
        match self {
            Action::SortSet { .. }
            | Action::SortClear
            | Action::SetFilterText(_)
            | Action::ColumnFilterSet { .. }
            | Action::ColumnFilterClear { .. }
            | Action::SetTotalRows(_) => EffectClass::Data,

            Action::ColumnResize { .. }
            | Action::ColumnShow { .. }
            | Action::ColumnHide { .. }
            | Action::ColumnBatchShow { .. }
            | Action::ColumnBatchHide { .. }
            | Action::ColumnsResetVisibility => EffectClass::Columns,

            Action::ColumnOrderSet { .. }
            | Action::SetFrozenCount(_)
            | Action::TableResize { .. } => EffectClass::Structure,

            Action::SetMode(_) => EffectClass::StateOnly,
        }
    }

    /// Stable tag name, used for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Action::SortSet { .. } => "SORT_SET",
            Action::SortClear => "SORT_CLEAR",
            Action::SetFilterText(_) => "SET_FILTER_TEXT",
            Action::ColumnFilterSet { .. } => "COLUMN_FILTER_SET",
            Action::ColumnFilterClear { .. } => "COLUMN_FILTER_CLEAR",
            Action::SetTotalRows(_) => "SET_TOTAL_ROWS",
            Action::ColumnResize { .. } => "COLUMN_RESIZE",
            Action::ColumnShow { .. } => "COLUMN_SHOW",
            Action::ColumnHide { .. } => "COLUMN_HIDE",
            Action::ColumnBatchShow { .. } => "COLUMN_BATCH_SHOW",
            Action::ColumnBatchHide { .. } => "COLUMN_BATCH_HIDE",
            Action::ColumnsResetVisibility => "COLUMNS_RESET_VISIBILITY",
            Action::ColumnOrderSet { .. } => "COLUMN_ORDER_SET",
            Action::SetFrozenCount(_) => "SET_FROZEN_COUNT",
            Action::TableResize { .. } => "TABLE_RESIZE",
            Action::SetMode(_) => "SET_MODE",
        }
    }
}

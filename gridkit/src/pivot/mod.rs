//! The pivot engine: grouped, aggregated tree views over the grid's data.

mod config;
mod flatten;
mod tree;
mod view;

pub use config::{Aggregation, PivotConfig, ValueField};
pub use flatten::{flatten, FlatRow, FlatRowKind, FlatRowType};
pub use tree::{ancestor_labels, build_pivot_tree, toggle_node, PivotNode, PivotNodeKind};
pub use view::PivotView;

//! Column resolution: original columns + state → laid-out columns.

use std::collections::HashSet;

use crate::error::ConfigError;
use crate::model::Column;
use crate::model::ResolvedColumn;
use crate::state::GridState;

use super::solve_widths;

/// The original column set plus the solved base widths.
///
/// Base widths are the fixed/flex/auto solution against the current
/// container width; they are re-solved on table resize. [`resolve`](Self::resolve)
/// is then a pure transform from state to the laid-out column list:
///
/// 1. drop hidden columns,
/// 2. order by `state.columns.order` (visible keys not listed keep their
///    original relative position, appended after the listed ones),
/// 3. width = override if present, else the base width,
/// 4. the first `frozen_count` columns are frozen.
pub struct ColumnModel {
    originals: Vec<Column>,
    base_widths: Vec<u32>,
}

impl ColumnModel {
    /// Creates the model, validating key uniqueness, and solves the base
    /// widths against `container_width`.
    pub fn new(originals: Vec<Column>, container_width: u32) -> Result<Self, ConfigError> {
        if originals.is_empty() {
            return Err(ConfigError::EmptyColumns);
        }
        let mut seen = HashSet::new();
        for col in &originals {
            if col.key.is_empty() {
                return Err(ConfigError::EmptyColumnKey);
            }
            if !seen.insert(col.key.as_str()) {
                return Err(ConfigError::DuplicateColumnKey(col.key.clone()));
            }
        }
        let base_widths = solve_widths(&originals, container_width);
        Ok(Self {
            originals,
            base_widths,
        })
    }

    /// Re-solves the base widths for a new container width.
    pub fn relayout(&mut self, container_width: u32) {
        self.base_widths = solve_widths(&self.originals, container_width);
    }

    /// The original column descriptors.
    pub fn originals(&self) -> &[Column] {
        &self.originals
    }

    /// All original keys, in declaration order.
    pub fn keys(&self) -> Vec<String> {
        self.originals.iter().map(|c| c.key.clone()).collect()
    }

    /// The solved base width for a key.
    pub fn base_width(&self, key: &str) -> Option<u32> {
        self.originals
            .iter()
            .position(|c| c.key == key)
            .map(|i| self.base_widths[i])
    }

    /// Resolves the visible, ordered, sized column list for a state.
    pub fn resolve(&self, state: &GridState) -> Vec<ResolvedColumn> {
        let hidden = &state.columns.hidden_keys;

        let visible: Vec<usize> = (0..self.originals.len())
            .filter(|&i| !hidden.contains(&self.originals[i].key))
            .collect();

        // Listed keys first, in state order; unlisted visible keys keep
        // original relative order after them.
        let mut ordered: Vec<usize> = Vec::with_capacity(visible.len());
        for key in &state.columns.order {
            if let Some(&i) = visible
                .iter()
                .find(|&&i| &self.originals[i].key == key)
            {
                if !ordered.contains(&i) {
                    ordered.push(i);
                }
            }
        }
        for &i in &visible {
            if !ordered.contains(&i) {
                ordered.push(i);
            }
        }

        ordered
            .into_iter()
            .enumerate()
            .map(|(pos, i)| {
                let column = self.originals[i].clone();
                let width = state
                    .columns
                    .width_overrides
                    .get(&column.key)
                    .copied()
                    .unwrap_or(self.base_widths[i]);
                ResolvedColumn {
                    column,
                    width,
                    is_frozen: pos < state.columns.frozen_count,
                }
            })
            .collect()
    }
}

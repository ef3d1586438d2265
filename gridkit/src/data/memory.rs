//! Fully in-memory data strategy.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::DataError;
use crate::model::CellValue;
use crate::model::Column;
use crate::model::Query;
use crate::model::Row;
use crate::model::SortDirection;
use crate::state::GridMode;

use super::summarize;
use super::DataStrategy;
use super::QueryOutcome;

#[derive(Debug)]
struct MemoryInner {
    /// The original dataset, untouched by queries.
    full: Vec<Row>,
    /// The current post-filter, post-sort view.
    filtered: Vec<Row>,
}

/// Data strategy holding the whole dataset in memory.
///
/// `apply_query` recomputes the filtered view from the full dataset each
/// time, which makes it idempotent; `get_row` is an index into that view.
/// `ensure_page_for_row` is a no-op since everything is always resident.
pub struct InMemoryStrategy {
    inner: RwLock<MemoryInner>,
    columns: Vec<Column>,
}

impl InMemoryStrategy {
    /// Creates the strategy over the full dataset.
    pub fn new(data: Vec<Row>, columns: Vec<Column>) -> Self {
        Self {
            inner: RwLock::new(MemoryInner {
                filtered: data.clone(),
                full: data,
            }),
            columns,
        }
    }

    fn row_passes(row: &Row, query: &Query) -> bool {
        if let Some(text) = query.filter_text.as_deref() {
            let needle = text.trim().to_lowercase();
            if !needle.is_empty() {
                let hit = row
                    .fields()
                    .values()
                    .any(|v| v.display().to_lowercase().contains(&needle));
                if !hit {
                    return false;
                }
            }
        }
        for (key, filter) in &query.column_filters {
            let value = row.get(key).cloned().unwrap_or(CellValue::Null);
            if !filter.matches(&value) {
                return false;
            }
        }
        true
    }

    fn compare(a: &Row, b: &Row, key: &str) -> Ordering {
        let (av, bv) = (a.get_number(key), b.get_number(key));
        match (av, bv) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => {
                let (ad, bd) = (a.display(key).to_lowercase(), b.display(key).to_lowercase());
                ad.cmp(&bd)
            }
        }
    }
}

#[async_trait]
impl DataStrategy for InMemoryStrategy {
    async fn bootstrap(&self) -> Result<usize, DataError> {
        Ok(self.total_rows())
    }

    fn get_row(&self, index: usize) -> Option<Row> {
        self.inner
            .read()
            .ok()
            .and_then(|g| g.filtered.get(index).cloned())
    }

    async fn ensure_page_for_row(&self, _index: usize) -> Result<(), DataError> {
        Ok(())
    }

    async fn apply_query(&self, query: Query) -> Result<QueryOutcome, DataError> {
        let Ok(mut guard) = self.inner.write() else {
            return Ok(QueryOutcome {
                total_rows: 0,
                should_reset_scroll: false,
            });
        };

        let mut filtered: Vec<Row> = guard
            .full
            .iter()
            .filter(|row| Self::row_passes(row, &query))
            .cloned()
            .collect();

        if let Some(sort) = query.sort() {
            filtered.sort_by(|a, b| {
                let ord = Self::compare(a, b, &sort.key);
                match sort.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        log::debug!(
            "in-memory query: {} of {} rows pass",
            filtered.len(),
            guard.full.len()
        );

        let total_rows = filtered.len();
        guard.filtered = filtered;
        Ok(QueryOutcome {
            total_rows,
            should_reset_scroll: true,
        })
    }

    async fn get_summary(&self, _query: &Query) -> Option<Row> {
        let rows = self.inner.read().ok()?.filtered.clone();
        summarize(&rows, &self.columns)
    }

    fn total_rows(&self) -> usize {
        self.inner.read().map(|g| g.filtered.len()).unwrap_or(0)
    }

    fn filter_options(&self, key: &str) -> Vec<String> {
        let Ok(guard) = self.inner.read() else {
            return Vec::new();
        };
        let distinct: BTreeSet<String> =
            guard.full.iter().map(|row| row.display(key)).collect();
        distinct.into_iter().collect()
    }

    fn collect_rows(&self) -> Vec<Row> {
        self.inner
            .read()
            .map(|g| g.filtered.clone())
            .unwrap_or_default()
    }

    fn mode(&self) -> GridMode {
        GridMode::Client
    }
}

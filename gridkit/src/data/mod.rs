//! Data strategies: a uniform contract over in-memory and paged-remote data.

mod bootstrap;
mod memory;
mod paged;
mod summary;

pub use bootstrap::{BootstrapOutcome, CLIENT_SIDE_MAX_ROWS};
pub use memory::InMemoryStrategy;
pub use paged::PagedRemoteStrategy;
pub use summary::summarize;

pub(crate) use bootstrap::run_bootstrap;
pub(crate) use summary::round2;

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde::Serialize;

use crate::error::DataError;
use crate::model::Query;
use crate::model::Row;
use crate::state::GridMode;

/// One page of rows from a remote loader.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    /// The page's rows.
    pub list: Vec<Row>,
    /// The filtered total for the whole query, not this page.
    pub total_rows: usize,
}

/// Result of applying a query to a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOutcome {
    /// The new filtered total.
    pub total_rows: usize,
    /// Whether the viewport should scroll back to the top.
    pub should_reset_scroll: bool,
}

/// Injected page loader: `(page_index, query) -> PageResponse`.
pub type PageFetcher =
    Arc<dyn Fn(usize, Query) -> BoxFuture<'static, Result<PageResponse, DataError>> + Send + Sync>;

/// Injected summary loader: `query -> summary row`.
pub type SummaryFetcher =
    Arc<dyn Fn(Query) -> BoxFuture<'static, Result<Row, DataError>> + Send + Sync>;

/// The uniform data-source contract.
///
/// Two variants exist: [`InMemoryStrategy`] holds the full dataset and
/// evaluates queries locally; [`PagedRemoteStrategy`] keeps an LRU page
/// cache over an injected loader and deduplicates in-flight fetches. The
/// router and viewport never care which one they talk to.
#[async_trait]
pub trait DataStrategy: Send + Sync {
    /// First contact with the data source; returns the initial total.
    async fn bootstrap(&self) -> Result<usize, DataError>;

    /// Synchronous, cheap row access. `None` means the backing page is not
    /// resident (server mode) or the index is out of range.
    fn get_row(&self, index: usize) -> Option<Row>;

    /// Ensures the page containing `index` is resident.
    ///
    /// Idempotent: a cached page resolves immediately and an in-flight
    /// fetch is awaited rather than re-issued. At most one load is ever in
    /// flight per `(page, query)` pair.
    async fn ensure_page_for_row(&self, index: usize) -> Result<(), DataError>;

    /// Applies a new query, replacing the strategy's view of the data.
    async fn apply_query(&self, query: Query) -> Result<QueryOutcome, DataError>;

    /// The aggregate summary row for the current view, or `None` when
    /// unavailable (no aggregates configured, or the remote loader failed).
    async fn get_summary(&self, query: &Query) -> Option<Row>;

    /// The current filtered total.
    fn total_rows(&self) -> usize;

    /// Distinct display values for a column, for filter UX. Server mode
    /// answers from resident pages only.
    fn filter_options(&self, key: &str) -> Vec<String>;

    /// Snapshot of the filtered view's resident rows, in index order.
    ///
    /// Client mode returns the whole filtered view; server mode only what
    /// is cached. Used by the pivot engine, which is client-side.
    fn collect_rows(&self) -> Vec<Row>;

    /// Which mode this strategy implements.
    fn mode(&self) -> GridMode;
}

//! The query coordinator: state query → data strategy → viewport reconcile.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::RwLock;

use griddom::Node;
use griddom::ScrollViewport;

use crate::columns::ColumnModel;
use crate::data::DataStrategy;
use crate::error::DataError;
use crate::model::Query;
use crate::model::Row;
use crate::render::ElementFactory;
use crate::render::Viewport;
use crate::state::Action;
use crate::state::Store;

/// Translates a state-level query into a data-strategy call and reconciles
/// the scroller, spacer and viewport afterwards.
///
/// Every applied query bumps the shared generation counter so fetches
/// issued under the previous query are discarded when they settle. Summary
/// refreshes are latest-wins: each request takes a sequence number and a
/// response landing after a newer request started is dropped.
pub struct QueryCoordinator {
    strategy: Arc<dyn DataStrategy>,
    store: Store,
    viewport: Viewport,
    scroll: ScrollViewport,
    generation: Arc<AtomicU64>,
    summary_seq: AtomicU64,
    summary_node: Option<Node>,
    summary_value: Arc<RwLock<Option<Row>>>,
    column_model: Arc<RwLock<ColumnModel>>,
    factory: Arc<dyn ElementFactory>,
}

impl QueryCoordinator {
    /// Creates a coordinator. `summary_node` is the mounted summary row,
    /// absent when summaries are disabled.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        strategy: Arc<dyn DataStrategy>,
        store: Store,
        viewport: Viewport,
        scroll: ScrollViewport,
        generation: Arc<AtomicU64>,
        summary_node: Option<Node>,
        column_model: Arc<RwLock<ColumnModel>>,
        factory: Arc<dyn ElementFactory>,
    ) -> Self {
        Self {
            strategy,
            store,
            viewport,
            scroll,
            generation,
            summary_seq: AtomicU64::new(0),
            summary_node,
            summary_value: Arc::new(RwLock::new(None)),
            column_model,
            factory,
        }
    }

    /// The most recently applied summary row, if any.
    pub fn summary(&self) -> Option<Row> {
        self.summary_value.read().ok()?.clone()
    }

    /// Shared handle to the latest summary value.
    pub(crate) fn summary_slot(&self) -> Arc<RwLock<Option<Row>>> {
        Arc::clone(&self.summary_value)
    }

    /// Applies a query end to end:
    ///
    /// 1. reset the scroll container (a new query anchors at the top),
    /// 2. bump the query generation,
    /// 3. run the strategy,
    /// 4. reconcile the total (dispatching `SetTotalRows` on change) and
    ///    rebuild the scroller + spacer,
    /// 5. refresh the viewport and fill the visible skeletons.
    pub async fn apply_query(&self, query: Query) -> Result<(), DataError> {
        log::debug!("apply_query: {query:?}");
        self.scroll.scroll_to_top();
        self.generation.fetch_add(1, Ordering::SeqCst);

        let outcome = self.strategy.apply_query(query).await?;

        if outcome.total_rows != self.store.state().data.total_rows {
            self.store.dispatch(Action::SetTotalRows(outcome.total_rows));
        }
        self.rebuild_scroller(outcome.total_rows);
        if outcome.should_reset_scroll {
            self.scroll.scroll_to_top();
        }

        self.viewport.refresh();
        self.viewport.fill_pending().await;
        Ok(())
    }

    /// Rebuilds the scroller and spacer for a new total.
    pub fn rebuild_scroller(&self, total_rows: usize) {
        let scroller = self.viewport.scroller().with_total_rows(total_rows);
        self.scroll.set_spacer_height(scroller.scroll_height());
        self.viewport.set_scroller(scroller);
    }

    /// Refreshes the summary row, latest-wins.
    pub async fn refresh_summary(&self, query: Query) {
        if self.summary_node.is_none() {
            return;
        }
        let seq = self.summary_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let summary = self.strategy.get_summary(&query).await;

        if self.summary_seq.load(Ordering::SeqCst) != seq {
            log::debug!("summary response {seq} superseded, dropping");
            return;
        }

        if let Ok(mut slot) = self.summary_value.write() {
            *slot = summary.clone();
        }

        if let Some(node) = &self.summary_node {
            let columns = {
                let Ok(model) = self.column_model.read() else {
                    return;
                };
                model.resolve(&self.store.state())
            };
            node.clear_children();
            node.append_children(
                columns
                    .iter()
                    .map(|col| self.factory.summary_cell(col, summary.as_ref())),
            );
        }
    }
}

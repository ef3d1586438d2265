//! Paged-remote data strategy.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::future::Shared;
use futures::FutureExt;

use crate::config::PageChangeCallback;
use crate::config::PageInfo;
use crate::error::DataError;
use crate::model::Query;
use crate::model::Row;
use crate::state::GridMode;

use super::DataStrategy;
use super::PageFetcher;
use super::QueryOutcome;
use super::SummaryFetcher;

type SharedLoad = Shared<BoxFuture<'static, Result<(), DataError>>>;

#[derive(Debug, Default)]
struct PagedState {
    pages: HashMap<usize, Vec<Row>>,
    /// Cached page indexes, least recently used first.
    recency: VecDeque<usize>,
    total_rows: usize,
    query: Query,
}

/// Data strategy over an injected remote page loader.
///
/// Holds a bounded page cache plus the set of in-flight loads. Concurrent
/// `ensure_page_for_row` calls for the same page share a single fetch; a
/// query change bumps the epoch so that loads still in flight for the old
/// query settle without touching the new cache.
///
/// Eviction is least-recently-used, bounded by `max_cached_pages`. Page 0
/// (the anchor of the current query) and pages with an in-flight fetch are
/// never evicted.
pub struct PagedRemoteStrategy {
    fetcher: PageFetcher,
    summary_fetcher: Option<SummaryFetcher>,
    page_size: usize,
    max_cached_pages: usize,
    state: Arc<RwLock<PagedState>>,
    loading: Arc<Mutex<HashMap<usize, (u64, SharedLoad)>>>,
    epoch: Arc<AtomicU64>,
    on_page_change: Option<PageChangeCallback>,
}

impl Clone for PagedRemoteStrategy {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            summary_fetcher: self.summary_fetcher.clone(),
            page_size: self.page_size,
            max_cached_pages: self.max_cached_pages,
            state: Arc::clone(&self.state),
            loading: Arc::clone(&self.loading),
            epoch: Arc::clone(&self.epoch),
            on_page_change: self.on_page_change.clone(),
        }
    }
}

impl PagedRemoteStrategy {
    /// Creates the strategy. `page_size` must be at least 1.
    pub fn new(
        fetcher: PageFetcher,
        page_size: usize,
        max_cached_pages: usize,
        summary_fetcher: Option<SummaryFetcher>,
        on_page_change: Option<PageChangeCallback>,
    ) -> Self {
        Self {
            fetcher,
            summary_fetcher,
            page_size: page_size.max(1),
            max_cached_pages: max_cached_pages.max(1),
            state: Arc::new(RwLock::new(PagedState::default())),
            loading: Arc::new(Mutex::new(HashMap::new())),
            epoch: Arc::new(AtomicU64::new(0)),
            on_page_change,
        }
    }

    /// Seeds page 0 and the total, used by the bootstrap policy to retain
    /// the probe page.
    pub fn seed_first_page(&self, rows: Vec<Row>, total_rows: usize) {
        if let Ok(mut state) = self.state.write() {
            state.pages.insert(0, rows);
            Self::touch(&mut state.recency, 0);
            state.total_rows = total_rows;
        }
    }

    /// The page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages currently resident.
    pub fn cached_page_count(&self) -> usize {
        self.state.read().map(|s| s.pages.len()).unwrap_or(0)
    }

    /// Whether a page is resident.
    pub fn is_page_cached(&self, page: usize) -> bool {
        self.state
            .read()
            .map(|s| s.pages.contains_key(&page))
            .unwrap_or(false)
    }

    fn touch(recency: &mut VecDeque<usize>, page: usize) {
        recency.retain(|&p| p != page);
        recency.push_back(page);
    }

    /// Marks a cached page as recently used. Returns whether it was cached.
    fn touch_cached(&self, page: usize) -> bool {
        if let Ok(mut state) = self.state.write() {
            if state.pages.contains_key(&page) {
                Self::touch(&mut state.recency, page);
                return true;
            }
        }
        false
    }

    /// Returns the in-flight load for `page`, starting one if none exists.
    fn begin_load(&self, page: usize) -> SharedLoad {
        let Ok(mut loading) = self.loading.lock() else {
            // Poisoned lock: run an unshared load.
            return self.make_load(page).boxed().shared();
        };
        if let Some((_, existing)) = loading.get(&page) {
            return existing.clone();
        }
        let shared = self.make_load(page).boxed().shared();
        let epoch = self.epoch.load(Ordering::SeqCst);
        loading.insert(page, (epoch, shared.clone()));
        shared
    }

    fn make_load(
        &self,
        page: usize,
    ) -> impl std::future::Future<Output = Result<(), DataError>> + Send + 'static {
        let this = self.clone();
        let epoch = self.epoch.load(Ordering::SeqCst);
        let query = self
            .state
            .read()
            .map(|s| s.query.clone())
            .unwrap_or_default();

        async move {
            log::debug!("fetching page {page} (epoch {epoch})");
            let result = (this.fetcher)(page, query).await;

            // Deregister, unless a newer query already replaced the slot.
            if let Ok(mut loading) = this.loading.lock() {
                if loading.get(&page).map(|(e, _)| *e) == Some(epoch) {
                    loading.remove(&page);
                }
            }

            let response = match result {
                Ok(response) => response,
                Err(err) => {
                    log::warn!("page {page} fetch failed: {err}");
                    return Err(err);
                }
            };

            if this.epoch.load(Ordering::SeqCst) != epoch {
                log::debug!("discarding page {page}: query changed while in flight");
                return Ok(());
            }

            let in_flight: Vec<usize> = this
                .loading
                .lock()
                .map(|l| l.keys().copied().collect())
                .unwrap_or_default();

            let loaded = response.list.len();
            let total_rows = {
                let Ok(mut state) = this.state.write() else {
                    return Ok(());
                };
                state.total_rows = response.total_rows;
                state.pages.insert(page, response.list);
                Self::touch(&mut state.recency, page);
                this.evict(&mut state, &in_flight);
                state.total_rows
            };

            if let Some(on_page_change) = &this.on_page_change {
                on_page_change(PageInfo {
                    page,
                    rows: loaded,
                    total_rows,
                });
            }
            Ok(())
        }
    }

    /// LRU eviction down to `max_cached_pages`, skipping the anchor page
    /// and pages whose fetch is in flight.
    fn evict(&self, state: &mut PagedState, in_flight: &[usize]) {
        while state.pages.len() > self.max_cached_pages {
            let victim = state
                .recency
                .iter()
                .copied()
                .find(|&p| p != 0 && !in_flight.contains(&p));
            match victim {
                Some(victim) => {
                    state.pages.remove(&victim);
                    state.recency.retain(|&p| p != victim);
                    log::debug!("evicted page {victim}");
                }
                None => break,
            }
        }
    }
}

#[async_trait]
impl DataStrategy for PagedRemoteStrategy {
    async fn bootstrap(&self) -> Result<usize, DataError> {
        if !self.is_page_cached(0) {
            self.ensure_page_for_row(0).await?;
        }
        Ok(self.total_rows())
    }

    fn get_row(&self, index: usize) -> Option<Row> {
        let page = index / self.page_size;
        let offset = index % self.page_size;
        let Ok(mut state) = self.state.write() else {
            return None;
        };
        let row = state.pages.get(&page)?.get(offset).cloned()?;
        Self::touch(&mut state.recency, page);
        Some(row)
    }

    async fn ensure_page_for_row(&self, index: usize) -> Result<(), DataError> {
        let page = index / self.page_size;
        if self.touch_cached(page) {
            return Ok(());
        }
        self.begin_load(page).await
    }

    async fn apply_query(&self, query: Query) -> Result<QueryOutcome, DataError> {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut loading) = self.loading.lock() {
            loading.clear();
        }
        if let Ok(mut state) = self.state.write() {
            state.pages.clear();
            state.recency.clear();
            state.query = query;
        }
        log::debug!("apply_query: epoch {epoch}, cache cleared");

        self.ensure_page_for_row(0).await?;
        Ok(QueryOutcome {
            total_rows: self.total_rows(),
            should_reset_scroll: true,
        })
    }

    async fn get_summary(&self, query: &Query) -> Option<Row> {
        let fetcher = self.summary_fetcher.as_ref()?;
        match fetcher(query.clone()).await {
            Ok(row) => Some(row),
            Err(err) => {
                log::warn!("summary fetch failed: {err}");
                None
            }
        }
    }

    fn total_rows(&self) -> usize {
        self.state.read().map(|s| s.total_rows).unwrap_or(0)
    }

    fn filter_options(&self, key: &str) -> Vec<String> {
        let Ok(state) = self.state.read() else {
            return Vec::new();
        };
        let distinct: std::collections::BTreeSet<String> = state
            .pages
            .values()
            .flatten()
            .map(|row| row.display(key))
            .collect();
        distinct.into_iter().collect()
    }

    fn collect_rows(&self) -> Vec<Row> {
        let Ok(state) = self.state.read() else {
            return Vec::new();
        };
        let mut pages: Vec<&usize> = state.pages.keys().collect();
        pages.sort();
        pages
            .into_iter()
            .flat_map(|p| state.pages[p].iter().cloned())
            .collect()
    }

    fn mode(&self) -> GridMode {
        GridMode::Server
    }
}

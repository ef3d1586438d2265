//! The viewport: incremental diffing of the visible row window.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::RwLock;

use griddom::Node;
use griddom::ScrollViewport;

use crate::data::DataStrategy;
use crate::model::ResolvedColumn;

use super::factory::is_skeleton;
use super::ElementFactory;
use super::RowWindow;
use super::Scroller;

/// What one `update_visible_rows` pass changed.
#[derive(Debug, Clone, Default)]
pub struct ViewportUpdate {
    /// The window that was rendered; `None` for an empty dataset.
    pub window: Option<RowWindow>,
    /// Indexes that got a fresh element this pass.
    pub created: Vec<usize>,
    /// Indexes whose element was dropped this pass.
    pub removed: Vec<usize>,
    /// Indexes currently showing a skeleton, awaiting a page fetch.
    pub pending: Vec<usize>,
}

struct ViewportInner {
    scroller: Scroller,
    /// Row index → mounted element. Exclusive owner of the mapping; any
    /// element outside it has no back-reference and is disposable.
    visible: HashMap<usize, Node>,
    columns: Vec<ResolvedColumn>,
    /// Indexes rendered as skeletons with a fetch under way.
    pending: HashSet<usize>,
}

/// Owns the visible-row map and the content layer.
///
/// `update_visible_rows` diffs the current window against the mapped
/// elements: rows already mounted are kept, missing rows are created (as
/// real rows when the strategy has the data, as skeletons otherwise), and
/// rows scrolled out are dropped. Creations land in one batched insertion.
///
/// Skeletons are later replaced through [`fill_row`](Self::fill_row), which
/// re-checks both the window and the query generation so a stale fetch can
/// never place stale content.
#[derive(Clone)]
pub struct Viewport {
    strategy: Arc<dyn DataStrategy>,
    factory: Arc<dyn ElementFactory>,
    scroll: ScrollViewport,
    content: Node,
    /// Bumped by the query coordinator on every `apply_query`.
    generation: Arc<AtomicU64>,
    inner: Arc<RwLock<ViewportInner>>,
}

impl Viewport {
    /// Creates a viewport over the given content layer.
    pub fn new(
        strategy: Arc<dyn DataStrategy>,
        factory: Arc<dyn ElementFactory>,
        scroll: ScrollViewport,
        content: Node,
        scroller: Scroller,
        columns: Vec<ResolvedColumn>,
        generation: Arc<AtomicU64>,
    ) -> Self {
        Self {
            strategy,
            factory,
            scroll,
            content,
            generation,
            inner: Arc::new(RwLock::new(ViewportInner {
                scroller,
                visible: HashMap::new(),
                columns,
                pending: HashSet::new(),
            })),
        }
    }

    /// The current query generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// The current scroller.
    pub fn scroller(&self) -> Scroller {
        self.inner
            .read()
            .map(|g| g.scroller)
            .unwrap_or_else(|_| Scroller::new(1, 0, 0, 0))
    }

    /// Swaps the scroller, e.g. after the total changed.
    pub fn set_scroller(&self, scroller: Scroller) {
        if let Ok(mut inner) = self.inner.write() {
            inner.scroller = scroller;
        }
    }

    /// Replaces the resolved column list used for new rows.
    pub fn set_columns(&self, columns: Vec<ResolvedColumn>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.columns = columns;
        }
    }

    /// Mounted row elements, in index order.
    pub fn visible_rows(&self) -> Vec<Node> {
        let Ok(inner) = self.inner.read() else {
            return Vec::new();
        };
        let mut rows: Vec<(usize, Node)> =
            inner.visible.iter().map(|(i, n)| (*i, n.clone())).collect();
        rows.sort_by_key(|(i, _)| *i);
        rows.into_iter().map(|(_, n)| n).collect()
    }

    /// Mounted row indexes, sorted.
    pub fn visible_indexes(&self) -> Vec<usize> {
        let Ok(inner) = self.inner.read() else {
            return Vec::new();
        };
        let mut indexes: Vec<usize> = inner.visible.keys().copied().collect();
        indexes.sort_unstable();
        indexes
    }

    /// The mounted element for a row, if any.
    pub fn row_element(&self, index: usize) -> Option<Node> {
        self.inner.read().ok()?.visible.get(&index).cloned()
    }

    /// Indexes awaiting a page fetch, sorted.
    pub fn pending_indexes(&self) -> Vec<usize> {
        let Ok(inner) = self.inner.read() else {
            return Vec::new();
        };
        let mut pending: Vec<usize> = inner.pending.iter().copied().collect();
        pending.sort_unstable();
        pending
    }

    /// Diffs the visible window against the mounted elements.
    pub fn update_visible_rows(&self) -> ViewportUpdate {
        let scroll_top = self.scroll.scroll_top();
        let Ok(mut inner) = self.inner.write() else {
            return ViewportUpdate::default();
        };

        let Some(window) = inner.scroller.window(scroll_top) else {
            let removed: Vec<usize> = inner.visible.keys().copied().collect();
            inner.visible.clear();
            inner.pending.clear();
            self.content.clear_children();
            self.scroll.set_translate_y(0);
            return ViewportUpdate {
                window: None,
                created: Vec::new(),
                removed,
                pending: Vec::new(),
            };
        };

        self.scroll.set_translate_y(window.translate_y);

        let mut created = Vec::new();
        let mut fresh_nodes = Vec::new();
        for index in window.indexes() {
            if inner.visible.contains_key(&index) {
                continue;
            }
            let node = match self.strategy.get_row(index) {
                Some(row) => self.factory.data_row(index, &row, &inner.columns),
                None => {
                    inner.pending.insert(index);
                    self.factory.skeleton_row(index, &inner.columns)
                }
            };
            inner.visible.insert(index, node.clone());
            fresh_nodes.push(node);
            created.push(index);
        }

        let mut stale: Vec<usize> = inner
            .visible
            .keys()
            .copied()
            .filter(|i| !window.contains(*i))
            .collect();
        stale.sort_unstable();
        for index in &stale {
            if let Some(node) = inner.visible.remove(index) {
                self.content.remove_child(&node.id());
            }
        }
        inner.pending.retain(|i| window.contains(*i));

        // One fragment insertion, then restore index order.
        self.content.append_children(fresh_nodes);
        let mut order: Vec<(usize, String)> = inner
            .visible
            .iter()
            .map(|(i, n)| (*i, n.id()))
            .collect();
        order.sort_by_key(|(i, _)| *i);
        let ids: Vec<String> = order.into_iter().map(|(_, id)| id).collect();
        self.content.reorder_children(&ids);

        let mut pending: Vec<usize> = inner.pending.iter().copied().collect();
        pending.sort_unstable();

        ViewportUpdate {
            window: Some(window),
            created,
            removed: stale,
            pending,
        }
    }

    /// Discards every mounted element and re-renders the window. Used after
    /// changes that invalidate row content globally.
    pub fn refresh(&self) -> ViewportUpdate {
        if let Ok(mut inner) = self.inner.write() {
            inner.visible.clear();
            inner.pending.clear();
            self.content.clear_children();
        }
        self.update_visible_rows()
    }

    /// Awaits the page behind `index` and swaps the skeleton for the real
    /// row, unless the result went stale.
    ///
    /// `generation` is the query generation captured when the fetch was
    /// issued; a mismatch against the current generation discards the
    /// result. The swap also re-checks that the index is still mounted,
    /// still inside the window and still a skeleton.
    pub async fn fill_row(&self, index: usize, generation: u64) {
        if let Err(err) = self.strategy.ensure_page_for_row(index).await {
            log::warn!("row {index}: page load failed: {err}");
            if let Ok(mut inner) = self.inner.write() {
                inner.pending.remove(&index);
            }
            return;
        }

        if self.generation.load(Ordering::SeqCst) != generation {
            log::debug!("row {index}: discarding fill from a previous query");
            return;
        }

        let scroll_top = self.scroll.scroll_top();
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        inner.pending.remove(&index);

        let in_window = inner
            .scroller
            .window(scroll_top)
            .map(|w| w.contains(index))
            .unwrap_or(false);
        if !in_window {
            return;
        }
        let Some(existing) = inner.visible.get(&index).cloned() else {
            return;
        };
        if !is_skeleton(&existing) {
            return;
        }
        let Some(row) = self.strategy.get_row(index) else {
            // The strategy discarded the page (stale epoch); the skeleton
            // stays and a later scroll retries.
            return;
        };

        let node = self.factory.data_row(index, &row, &inner.columns);
        self.content.replace_child(&existing.id(), node.clone());
        inner.visible.insert(index, node);
    }

    /// Sequentially fills every pending skeleton at the current generation.
    pub async fn fill_pending(&self) {
        let generation = self.generation();
        for index in self.pending_indexes() {
            self.fill_row(index, generation).await;
        }
    }
}

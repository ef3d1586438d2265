//! The grid facade: construction, two-phase initialization, public API.

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;

use griddom::Node;
use griddom::NodeKind;
use griddom::ScrollViewport;
use tokio::sync::watch;

use crate::columns::ColumnModel;
use crate::config::GridConfig;
use crate::data::run_bootstrap;
use crate::data::DataStrategy;
use crate::error::GridError;
use crate::model::Row;
use crate::model::SortDirection;
use crate::persist::KeyValueStore;
use crate::persist::MemoryStore;
use crate::persist::PersistenceAdapter;
use crate::pivot::PivotConfig;
use crate::pivot::PivotView;
use crate::query::QueryCoordinator;
use crate::render::ColumnManager;
use crate::render::DefaultElementFactory;
use crate::render::ElementFactory;
use crate::render::FrameGate;
use crate::render::Scroller;
use crate::render::Viewport;
use crate::render::ViewportUpdate;
use crate::router::ActionRouter;
use crate::router::TaskTracker;
use crate::state::Action;
use crate::state::GridMode;
use crate::state::GridState;
use crate::state::Store;
use crate::state::SubscriberId;

/// The mounted DOM skeleton.
struct GridDom {
    wrapper: Node,
    header: Node,
    summary: Option<Node>,
    body: Node,
    spacer: Node,
    content: Node,
}

#[derive(Debug, Default)]
struct SidePanelState {
    visible: bool,
    active: Option<String>,
}

/// Pre-ready dispatch queue.
///
/// `open` flips to `true` inside the same critical section that observes
/// `pending` empty during the initialization flush, so a dispatch racing
/// the flush from another thread either lands in the queue while the flush
/// still drains it, or sees the queue open and goes straight to the store.
/// An action can never be stranded between the two.
#[derive(Debug, Default)]
struct DispatchQueue {
    open: bool,
    pending: VecDeque<Action>,
}

/// Parts that only exist after async initialization.
struct GridRuntime {
    store: Store,
    strategy: Arc<dyn DataStrategy>,
    viewport: Viewport,
    coordinator: Arc<QueryCoordinator>,
}

struct GridCore {
    config: GridConfig,
    column_model: Arc<RwLock<ColumnModel>>,
    dom: GridDom,
    scroll: ScrollViewport,
    gate: FrameGate,
    generation: Arc<AtomicU64>,
    factory: Arc<dyn ElementFactory>,
    persistence: Option<Arc<PersistenceAdapter>>,
    tasks: TaskTracker,
    runtime: RwLock<Option<GridRuntime>>,
    queue: Mutex<DispatchQueue>,
    ready_tx: watch::Sender<bool>,
    ready_rx: watch::Receiver<bool>,
    init_error: RwLock<Option<GridError>>,
    destroyed: AtomicBool,
    side_panel: RwLock<SidePanelState>,
    subscription: Mutex<Option<SubscriberId>>,
}

/// A virtualized data grid.
///
/// Construction is two-phase because the total row count is discovered
/// asynchronously:
///
/// 1. **Sync phase** ([`new`](Self::new)): config validation, duplicate-key
///    check, DOM skeleton mount, placeholder scroller. Fatal problems
///    surface here.
/// 2. **Async phase** (spawned): persisted layout restore, the bootstrap
///    policy's mode decision, store/viewport/coordinator/router wiring and
///    the first render. [`ready`](Self::ready) resolves once this completes.
///
/// Any [`dispatch`](Self::dispatch) made before ready is queued and flushed
/// after.
///
/// # Example
///
/// ```no_run
/// use gridkit::{Column, DataGrid, GridConfig, Row, SortDirection};
///
/// # async fn demo() -> Result<(), gridkit::GridError> {
/// let grid = DataGrid::new(
///     GridConfig::new(vec![Column::new("name", "Name")])
///         .initial_data(vec![Row::new().set("name", "Ada")]),
/// )?;
/// grid.ready().await?;
/// grid.sort("name", SortDirection::Asc);
/// # Ok(())
/// # }
/// ```
pub struct DataGrid {
    core: Arc<GridCore>,
}

impl std::fmt::Debug for DataGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGrid").finish_non_exhaustive()
    }
}

impl DataGrid {
    /// Creates a grid with the bundled element factory and in-memory
    /// layout store, and spawns the async initialization.
    ///
    /// Requires a tokio runtime.
    pub fn new(config: GridConfig) -> Result<Self, GridError> {
        Self::with_parts(
            config,
            Arc::new(DefaultElementFactory),
            Arc::new(MemoryStore::new()),
        )
    }

    /// Creates a grid with a custom element factory and layout store.
    pub fn with_parts(
        config: GridConfig,
        factory: Arc<dyn ElementFactory>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, GridError> {
        config.validate()?;
        let column_model = ColumnModel::new(config.columns.clone(), config.effective_width())?;
        let column_model = Arc::new(RwLock::new(column_model));

        // Mount the DOM skeleton from the pre-restore state; the async
        // phase reapplies the restored layout in place.
        let mut initial = GridState::default();
        initial.columns.frozen_count = config.frozen_columns;
        let resolved = column_model
            .read()
            .map(|m| m.resolve(&initial))
            .unwrap_or_default();

        let wrapper = factory.wrapper();
        let header = factory.header_row(&resolved);
        let summary = config
            .show_summary
            .then(|| factory.summary_row(&resolved, None));
        let body = Node::new(NodeKind::Body);
        let spacer = Node::new(NodeKind::Spacer);
        let content = Node::new(NodeKind::Content);
        body.append_child(spacer.clone());
        body.append_child(content.clone());
        wrapper.append_child(header.clone());
        if let Some(summary) = &summary {
            wrapper.append_child(summary.clone());
        }
        wrapper.append_child(body.clone());

        let scroll = ScrollViewport::new(config.viewport_height());

        let persistence = config.table_id.as_ref().map(|table_id| {
            Arc::new(PersistenceAdapter::new(table_id.clone(), Arc::clone(&store)))
        });

        let (ready_tx, ready_rx) = watch::channel(false);
        let core = Arc::new(GridCore {
            config,
            column_model,
            dom: GridDom {
                wrapper,
                header,
                summary,
                body,
                spacer,
                content,
            },
            scroll,
            gate: FrameGate::new(),
            generation: Arc::new(AtomicU64::new(0)),
            factory,
            persistence,
            tasks: TaskTracker::default(),
            runtime: RwLock::new(None),
            queue: Mutex::new(DispatchQueue::default()),
            ready_tx,
            ready_rx,
            init_error: RwLock::new(None),
            destroyed: AtomicBool::new(false),
            side_panel: RwLock::new(SidePanelState::default()),
            subscription: Mutex::new(None),
        });

        let init_core = Arc::clone(&core);
        core.tasks.spawn(async move {
            if let Err(err) = Self::initialize(&init_core).await {
                log::error!("grid initialization failed: {err}");
                if let Ok(mut slot) = init_core.init_error.write() {
                    *slot = Some(err);
                }
            }
            let _ = init_core.ready_tx.send(true);
        });

        Ok(Self { core })
    }

    /// The async phase: restore, bootstrap, wire, first render, flush.
    async fn initialize(core: &Arc<GridCore>) -> Result<(), GridError> {
        let config = &core.config;
        let known_keys: Vec<String> = config.columns.iter().map(|c| c.key.clone()).collect();

        let mut initial = GridState::default();
        initial.columns.frozen_count = config.frozen_columns;
        initial.columns.order = known_keys.clone();

        if let Some(persistence) = &core.persistence {
            if let Some(widths) = persistence.load_column_widths().await {
                initial.columns.width_overrides = widths
                    .into_iter()
                    .filter(|(key, _)| known_keys.contains(key))
                    .collect();
            }
            if let Some(order) = persistence.load_column_order().await {
                let mut restored: Vec<String> = order
                    .into_iter()
                    .filter(|key| known_keys.contains(key))
                    .collect();
                for key in &known_keys {
                    if !restored.contains(key) {
                        restored.push(key.clone());
                    }
                }
                initial.columns.order = restored;
            }
            if let Some(width) = persistence.load_table_width().await {
                if let Ok(mut model) = core.column_model.write() {
                    model.relayout(width);
                }
            }
        }

        let outcome = run_bootstrap(config).await?;
        initial.mode = outcome.mode;
        initial.data.total_rows = outcome.total_rows;
        if let Some(on_mode_change) = &config.on_mode_change {
            on_mode_change(outcome.mode);
        }
        log::debug!(
            "grid ready: mode={}, total_rows={}",
            outcome.mode,
            outcome.total_rows
        );

        let store = Store::new(initial, known_keys);
        let resolved = core
            .column_model
            .read()
            .map(|m| m.resolve(&store.state()))
            .unwrap_or_default();

        let scroller = Scroller::new(
            config.row_height,
            outcome.total_rows,
            config.viewport_height(),
            config.buffer_rows,
        );
        core.scroll.set_spacer_height(scroller.scroll_height());

        let viewport = Viewport::new(
            Arc::clone(&outcome.strategy),
            Arc::clone(&core.factory),
            core.scroll.clone(),
            core.dom.content.clone(),
            scroller,
            resolved.clone(),
            Arc::clone(&core.generation),
        );

        let column_manager = Arc::new(ColumnManager::new(
            core.dom.wrapper.clone(),
            core.dom.header.clone(),
            core.dom.summary.clone(),
            Arc::clone(&core.factory),
        ));
        let lookup_strategy = Arc::clone(&outcome.strategy);
        column_manager.update(
            &resolved,
            &[],
            &move |index| lookup_strategy.get_row(index),
            None,
        );

        let coordinator = Arc::new(QueryCoordinator::new(
            Arc::clone(&outcome.strategy),
            store.clone(),
            viewport.clone(),
            core.scroll.clone(),
            Arc::clone(&core.generation),
            core.dom.summary.clone(),
            Arc::clone(&core.column_model),
            Arc::clone(&core.factory),
        ));

        let router = ActionRouter::new(
            Arc::clone(&coordinator),
            viewport.clone(),
            column_manager,
            Arc::clone(&core.column_model),
            Arc::clone(&outcome.strategy),
            core.persistence.clone(),
            core.tasks.clone(),
        );
        let subscription = store.subscribe(move |next, prev, action| {
            router.handle(next, prev, action);
        });
        if let Ok(mut slot) = core.subscription.lock() {
            *slot = Some(subscription);
        }

        viewport.update_visible_rows();
        viewport.fill_pending().await;

        if core.config.show_summary {
            let coordinator = Arc::clone(&coordinator);
            let query = store.state().query();
            core.tasks.spawn(async move {
                coordinator.refresh_summary(query).await;
            });
        }

        if let Ok(mut runtime) = core.runtime.write() {
            *runtime = Some(GridRuntime {
                store: store.clone(),
                strategy: outcome.strategy,
                viewport,
                coordinator,
            });
        }

        // Flush dispatches that arrived before ready. The queue opens in
        // the same critical section that finds it empty; a dispatch racing
        // this loop from another thread either adds to the queue while it
        // still drains, or finds it open and goes to the store directly.
        loop {
            let action = {
                let Ok(mut queue) = core.queue.lock() else {
                    break;
                };
                match queue.pending.pop_front() {
                    Some(action) => action,
                    None => {
                        queue.open = true;
                        break;
                    }
                }
            };
            store.dispatch(action);
        }

        Ok(())
    }

    // =========================================================================
    // Readiness and state
    // =========================================================================

    /// Resolves once async initialization finished, surfacing its error.
    pub async fn ready(&self) -> Result<(), GridError> {
        let mut rx = self.core.ready_rx.clone();
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                break;
            }
        }
        match self.core.init_error.read() {
            Ok(slot) => match slot.as_ref() {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            },
            Err(_) => Ok(()),
        }
    }

    /// Snapshot of the current state (default until ready).
    pub fn state(&self) -> GridState {
        self.with_runtime(|rt| rt.store.state()).unwrap_or_default()
    }

    /// The bootstrap mode decision.
    pub fn mode(&self) -> GridMode {
        self.state().mode
    }

    /// The current filtered total.
    pub fn total_rows(&self) -> usize {
        self.with_runtime(|rt| rt.strategy.total_rows())
            .unwrap_or(0)
    }

    fn with_runtime<T>(&self, f: impl FnOnce(&GridRuntime) -> T) -> Option<T> {
        self.core.runtime.read().ok()?.as_ref().map(f)
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Dispatches an action; queued until ready.
    pub fn dispatch(&self, action: Action) {
        if self.core.destroyed.load(Ordering::SeqCst) {
            log::warn!("dispatch on a destroyed grid ignored");
            return;
        }
        // Check-and-enqueue under one lock: once the queue reports open,
        // the runtime is guaranteed installed (it is set before the flush).
        {
            let Ok(mut queue) = self.core.queue.lock() else {
                return;
            };
            if !queue.open {
                queue.pending.push_back(action);
                return;
            }
        }
        self.with_runtime(|rt| rt.store.dispatch(action));
    }

    /// Convenience wrapper: sort by a column.
    pub fn sort(&self, key: impl Into<String>, direction: SortDirection) {
        self.dispatch(Action::SortSet {
            key: key.into(),
            direction,
        });
    }

    /// Convenience wrapper: clear the sort.
    pub fn clear_sort(&self) {
        self.dispatch(Action::SortClear);
    }

    /// Convenience wrapper: set the global filter text.
    pub fn filter(&self, text: impl Into<String>) {
        self.dispatch(Action::SetFilterText(text.into()));
    }

    // =========================================================================
    // Scrolling and rendering
    // =========================================================================

    /// Records a scroll position. Returns `true` when a render tick became
    /// pending and the host should schedule [`tick`](Self::tick) for the
    /// next frame; redundant scroll events coalesce into the pending tick.
    pub fn handle_scroll(&self, scroll_top: u64) -> bool {
        if self.core.destroyed.load(Ordering::SeqCst) {
            return false;
        }
        self.core.scroll.set_scroll_top(scroll_top);
        self.core.gate.request()
    }

    /// Runs the pending render tick: diffs the visible window and spawns
    /// page fills for any skeletons. No-op when nothing is pending.
    pub fn tick(&self) -> Option<ViewportUpdate> {
        if !self.core.gate.take() {
            return None;
        }
        self.with_runtime(|rt| {
            let update = rt.viewport.update_visible_rows();
            if !update.pending.is_empty() {
                let viewport = rt.viewport.clone();
                self.core.tasks.spawn(async move {
                    viewport.fill_pending().await;
                });
            }
            update
        })
    }

    /// Mounted row indexes, sorted.
    pub fn visible_row_indexes(&self) -> Vec<usize> {
        self.with_runtime(|rt| rt.viewport.visible_indexes())
            .unwrap_or_default()
    }

    /// Mounted row elements, in index order.
    pub fn visible_rows(&self) -> Vec<Node> {
        self.with_runtime(|rt| rt.viewport.visible_rows())
            .unwrap_or_default()
    }

    /// The mounted element for a row index, if any.
    pub fn row_element(&self, index: usize) -> Option<Node> {
        self.with_runtime(|rt| rt.viewport.row_element(index))
            .flatten()
    }

    /// A row from the data strategy, if resident.
    pub fn get_row(&self, index: usize) -> Option<Row> {
        self.with_runtime(|rt| rt.strategy.get_row(index)).flatten()
    }

    /// Distinct display values for a column (filter UX).
    pub fn filter_options(&self, key: &str) -> Vec<String> {
        self.with_runtime(|rt| rt.strategy.filter_options(key))
            .unwrap_or_default()
    }

    /// The latest summary row, if one was computed.
    pub fn summary(&self) -> Option<Row> {
        self.with_runtime(|rt| rt.coordinator.summary()).flatten()
    }

    /// The mounted wrapper element.
    pub fn wrapper(&self) -> Node {
        self.core.dom.wrapper.clone()
    }

    /// The scrollable body element (where a host attaches scroll listeners).
    pub fn body(&self) -> Node {
        self.core.dom.body.clone()
    }

    /// The header row element.
    pub fn header(&self) -> Node {
        self.core.dom.header.clone()
    }

    /// The summary row element, when summaries are enabled.
    pub fn summary_row(&self) -> Option<Node> {
        self.core.dom.summary.clone()
    }

    /// The spacer element that gives the body its scroll height; its height
    /// is mirrored by [`scroll`](Self::scroll)'s spacer height.
    pub fn spacer(&self) -> Node {
        self.core.dom.spacer.clone()
    }

    /// The scroll viewport.
    pub fn scroll(&self) -> &ScrollViewport {
        &self.core.scroll
    }

    /// Awaits every outstanding effect task (query applications, page
    /// fills, persistence writes). Primarily for tests and teardown.
    pub async fn settle(&self) {
        self.core.tasks.settle().await;
    }

    // =========================================================================
    // Pivot
    // =========================================================================

    /// Materializes a pivot view over the current filtered dataset.
    pub fn pivot_view(&self, config: PivotConfig) -> Result<PivotView, GridError> {
        let rows = self
            .with_runtime(|rt| rt.strategy.collect_rows())
            .unwrap_or_default();
        let view = PivotView::new(
            &rows,
            config,
            Arc::clone(&self.core.factory),
            self.core.config.row_height,
            self.core.config.viewport_height(),
            self.core.config.buffer_rows,
        )?;
        Ok(view)
    }

    // =========================================================================
    // Side panel
    // =========================================================================

    /// Shows a configured side panel by id. Returns whether it was shown.
    pub fn show_panel(&self, id: &str) -> bool {
        let Some(side_panel) = &self.core.config.side_panel else {
            return false;
        };
        if !side_panel.enabled || !side_panel.panels.iter().any(|p| p.id == id) {
            return false;
        }
        if let Ok(mut state) = self.core.side_panel.write() {
            state.visible = true;
            state.active = Some(id.to_string());
            return true;
        }
        false
    }

    /// Toggles side-panel visibility; `show` forces a state. Returns the
    /// new visibility.
    pub fn toggle_side_panel(&self, show: Option<bool>) -> bool {
        let enabled = self
            .core
            .config
            .side_panel
            .as_ref()
            .map(|sp| sp.enabled)
            .unwrap_or(false);
        if !enabled {
            return false;
        }
        if let Ok(mut state) = self.core.side_panel.write() {
            state.visible = show.unwrap_or(!state.visible);
            return state.visible;
        }
        false
    }

    /// The active side panel id, when visible.
    pub fn active_panel(&self) -> Option<String> {
        let state = self.core.side_panel.read().ok()?;
        if state.visible {
            state.active.clone()
        } else {
            None
        }
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Tears the grid down: unsubscribes the router, aborts outstanding
    /// tasks and discards the mounted DOM. The grid accepts no further
    /// dispatches.
    pub fn destroy(&self) {
        if self.core.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.core.tasks.abort_all();

        let subscription = self
            .core
            .subscription
            .lock()
            .ok()
            .and_then(|mut slot| slot.take());
        if let Some(id) = subscription {
            self.with_runtime(|rt| rt.store.unsubscribe(id));
        }

        if let Ok(mut runtime) = self.core.runtime.write() {
            *runtime = None;
        }
        self.core.dom.content.clear_children();
        self.core.dom.wrapper.clear_children();
        log::debug!("grid destroyed");
    }

    /// Whether [`destroy`](Self::destroy) ran.
    pub fn is_destroyed(&self) -> bool {
        self.core.destroyed.load(Ordering::SeqCst)
    }
}

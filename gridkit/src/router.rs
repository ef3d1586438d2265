//! The action router: one effect per dispatched action.

use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;

use tokio::task::JoinHandle;

use crate::columns::ColumnModel;
use crate::data::DataStrategy;
use crate::persist::PersistenceAdapter;
use crate::query::QueryCoordinator;
use crate::render::ColumnManager;
use crate::render::Viewport;
use crate::state::Action;
use crate::state::EffectClass;
use crate::state::GridState;

/// Tracks spawned effect tasks so tests and teardown can settle them.
#[derive(Clone, Default)]
pub(crate) struct TaskTracker {
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl TaskTracker {
    /// Spawns a tracked task. Requires a tokio runtime.
    pub fn spawn(&self, future: impl Future<Output = ()> + Send + 'static) {
        let handle = tokio::spawn(future);
        if let Ok(mut handles) = self.handles.lock() {
            handles.push(handle);
        }
    }

    /// Awaits every tracked task, including ones spawned while settling.
    pub async fn settle(&self) {
        loop {
            let handle = match self.handles.lock() {
                Ok(mut handles) => handles.pop(),
                Err(_) => None,
            };
            match handle {
                Some(handle) => {
                    let _ = handle.await;
                }
                None => break,
            }
        }
    }

    /// Aborts every tracked task.
    pub fn abort_all(&self) {
        if let Ok(mut handles) = self.handles.lock() {
            for handle in handles.drain(..) {
                handle.abort();
            }
        }
    }
}

/// Routes every store notification to exactly one effect.
///
/// The router is the single place rendering is triggered from state
/// changes; no subscriber renders directly. Each action class maps to one
/// handler:
/// - **data** → re-run the query through the coordinator (async, tracked);
/// - **columns** → patch column DOM in place and persist changed layout;
/// - **structure** → relayout and fully rebuild the viewport;
/// - **state-only** → nothing.
pub(crate) struct ActionRouter {
    coordinator: Arc<QueryCoordinator>,
    viewport: Viewport,
    column_manager: Arc<ColumnManager>,
    column_model: Arc<RwLock<ColumnModel>>,
    strategy: Arc<dyn DataStrategy>,
    persistence: Option<Arc<PersistenceAdapter>>,
    tasks: TaskTracker,
    summary: Arc<RwLock<Option<crate::model::Row>>>,
}

impl ActionRouter {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        coordinator: Arc<QueryCoordinator>,
        viewport: Viewport,
        column_manager: Arc<ColumnManager>,
        column_model: Arc<RwLock<ColumnModel>>,
        strategy: Arc<dyn DataStrategy>,
        persistence: Option<Arc<PersistenceAdapter>>,
        tasks: TaskTracker,
    ) -> Self {
        let summary = coordinator.summary_slot();
        Self {
            coordinator,
            viewport,
            column_manager,
            column_model,
            strategy,
            persistence,
            tasks,
            summary,
        }
    }

    /// Store subscriber entry point.
    pub fn handle(&self, next: &GridState, _prev: &GridState, action: &Action) {
        match action.effect_class() {
            EffectClass::Data => self.handle_data(next, action),
            EffectClass::Columns => self.handle_columns(next, action),
            EffectClass::Structure => self.handle_structure(next, action),
            EffectClass::StateOnly => {
                log::debug!("{}: state-only, no render effect", action.name());
            }
        }
    }

    fn handle_data(&self, next: &GridState, action: &Action) {
        // SetTotalRows is the coordinator reporting back; only the frame
        // geometry needs reconciling, re-querying would loop.
        if let Action::SetTotalRows(total) = action {
            self.coordinator.rebuild_scroller(*total);
            return;
        }

        let query = next.query();
        let coordinator = Arc::clone(&self.coordinator);
        self.tasks.spawn(async move {
            if let Err(err) = coordinator.apply_query(query.clone()).await {
                log::warn!("apply_query failed: {err}");
                return;
            }
            coordinator.refresh_summary(query).await;
        });
    }

    fn handle_columns(&self, next: &GridState, action: &Action) {
        let columns = {
            let Ok(model) = self.column_model.read() else {
                return;
            };
            model.resolve(next)
        };
        let rows = self.viewport.visible_rows();
        let summary = self.summary.read().ok().and_then(|s| s.clone());
        let strategy = Arc::clone(&self.strategy);
        self.column_manager.update(
            &columns,
            &rows,
            &move |index| strategy.get_row(index),
            summary.as_ref(),
        );
        self.viewport.set_columns(columns);

        if let (Some(persistence), Action::ColumnResize { .. }) = (&self.persistence, action) {
            let persistence = Arc::clone(persistence);
            let widths = next.columns.width_overrides.clone();
            self.tasks.spawn(async move {
                persistence.save_column_widths(&widths).await;
            });
        }
    }

    fn handle_structure(&self, next: &GridState, action: &Action) {
        match action {
            Action::TableResize { width } => {
                if let Ok(mut model) = self.column_model.write() {
                    model.relayout(*width);
                }
                if let Some(persistence) = &self.persistence {
                    let persistence = Arc::clone(persistence);
                    let width = *width;
                    self.tasks.spawn(async move {
                        persistence.save_table_width(width).await;
                    });
                }
            }
            Action::ColumnOrderSet { .. } => {
                if let Some(persistence) = &self.persistence {
                    let persistence = Arc::clone(persistence);
                    let order = next.columns.order.clone();
                    self.tasks.spawn(async move {
                        persistence.save_column_order(&order).await;
                    });
                }
            }
            _ => {}
        }

        // Full rebuild: clear row DOM, reapply the column layout, recompute
        // the scroller, re-render the window.
        let columns = {
            let Ok(model) = self.column_model.read() else {
                return;
            };
            model.resolve(next)
        };
        self.viewport.set_columns(columns.clone());
        let summary = self.summary.read().ok().and_then(|s| s.clone());
        let strategy = Arc::clone(&self.strategy);
        self.column_manager.update(
            &columns,
            &[],
            &move |index| strategy.get_row(index),
            summary.as_ref(),
        );

        self.coordinator.rebuild_scroller(next.data.total_rows);
        self.viewport.refresh();

        let viewport = self.viewport.clone();
        self.tasks.spawn(async move {
            viewport.fill_pending().await;
        });
    }
}

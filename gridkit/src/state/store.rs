//! The store: state shape, dispatch and subscriptions.

use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;

use crate::model::ColumnFilter;
use crate::model::Query;
use crate::model::Sort;

use super::action::Action;
use super::action::GridMode;
use super::reduce;

/// Data-level state: sort, filters and the filtered total.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataState {
    /// Current sort, if any.
    pub sort: Option<Sort>,
    /// Raw global filter text.
    pub filter_text: String,
    /// Per-column filters.
    pub column_filters: HashMap<String, ColumnFilter>,
    /// The filtered total reported by the data strategy, not the underlying
    /// dataset size.
    pub total_rows: usize,
}

/// Column-level state: order, width overrides, visibility, freezing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnsState {
    /// Display order of column keys.
    pub order: Vec<String>,
    /// Per-key pixel width overrides.
    pub width_overrides: HashMap<String, u32>,
    /// Hidden column keys.
    pub hidden_keys: HashSet<String>,
    /// How many leading visible columns are frozen.
    pub frozen_count: usize,
}

/// The store's value: the single source of truth for the grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridState {
    /// Data-level state.
    pub data: DataState,
    /// Column-level state.
    pub columns: ColumnsState,
    /// Bootstrap mode decision; immutable after initialization.
    pub mode: GridMode,
}

impl GridState {
    /// The query implied by the current data state.
    pub fn query(&self) -> Query {
        Query {
            sort_key: self.data.sort.as_ref().map(|s| s.key.clone()),
            sort_direction: self.data.sort.as_ref().map(|s| s.direction),
            filter_text: if self.data.filter_text.is_empty() {
                None
            } else {
                Some(self.data.filter_text.clone())
            },
            column_filters: self.data.column_filters.clone(),
        }
    }

    /// Number of currently visible columns given the known key set.
    pub fn visible_count(&self, known_keys: &[String]) -> usize {
        known_keys
            .iter()
            .filter(|k| !self.columns.hidden_keys.contains(*k))
            .count()
    }
}

/// A handle identifying one subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type SubscriberFn = dyn Fn(&GridState, &GridState, &Action) + Send + Sync;

struct StoreInner {
    state: RwLock<GridState>,
    subscribers: RwLock<Vec<(SubscriberId, Arc<SubscriberFn>)>>,
    /// Actions waiting to be applied; reentrant dispatches land here.
    queue: Mutex<VecDeque<Action>>,
    /// Set while a dispatch loop is draining the queue.
    notifying: AtomicBool,
    next_subscriber: AtomicU64,
    known_keys: Vec<String>,
}

/// Reducer-style state store with synchronous subscriber notification.
///
/// `dispatch` applies the reducer atomically and notifies every subscriber
/// with `(next, prev, action)` in dispatch order. A subscriber that
/// dispatches during notification does not recurse: the action is enqueued
/// and flushed after the current notification completes.
///
/// # Example
///
/// ```
/// use gridkit::state::{Action, Store};
/// use gridkit::model::SortDirection;
///
/// let store = Store::new(Default::default(), vec!["a".into()]);
/// let id = store.subscribe(|next, _prev, action| {
///     println!("{} -> {:?}", action.name(), next.data.sort);
/// });
/// store.dispatch(Action::SortSet { key: "a".into(), direction: SortDirection::Asc });
/// store.unsubscribe(id);
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Creates a store over the given initial state.
    ///
    /// `known_keys` is the full set of original column keys, used to
    /// normalize `ColumnOrderSet` payloads and clamp the frozen count.
    pub fn new(initial: GridState, known_keys: Vec<String>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(initial),
                subscribers: RwLock::new(Vec::new()),
                queue: Mutex::new(VecDeque::new()),
                notifying: AtomicBool::new(false),
                next_subscriber: AtomicU64::new(0),
                known_keys,
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> GridState {
        self.inner
            .state
            .read()
            .map(|g| g.clone())
            .unwrap_or_default()
    }

    /// The original column keys this store validates against.
    pub fn known_keys(&self) -> &[String] {
        &self.inner.known_keys
    }

    /// Registers a subscriber; returns its id for [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe(
        &self,
        f: impl Fn(&GridState, &GridState, &Action) + Send + Sync + 'static,
    ) -> SubscriberId {
        let id = SubscriberId(self.inner.next_subscriber.fetch_add(1, Ordering::SeqCst));
        if let Ok(mut subs) = self.inner.subscribers.write() {
            subs.push((id, Arc::new(f)));
        }
        id
    }

    /// Removes a subscriber.
    pub fn unsubscribe(&self, id: SubscriberId) {
        if let Ok(mut subs) = self.inner.subscribers.write() {
            subs.retain(|(sub_id, _)| *sub_id != id);
        }
    }

    /// Applies an action and synchronously notifies subscribers.
    ///
    /// Reentrant dispatches from within a notification are queued and
    /// flushed, in order, once the current notification returns.
    pub fn dispatch(&self, action: Action) {
        if let Ok(mut queue) = self.inner.queue.lock() {
            queue.push_back(action);
        }

        // Someone further up the stack is already draining; our action will
        // be picked up by that loop.
        if self.inner.notifying.swap(true, Ordering::SeqCst) {
            return;
        }

        loop {
            self.drain();
            self.inner.notifying.store(false, Ordering::SeqCst);

            // An action may have slipped in between the final drain pass and
            // the flag reset.
            let empty = self
                .inner
                .queue
                .lock()
                .map(|q| q.is_empty())
                .unwrap_or(true);
            if empty || self.inner.notifying.swap(true, Ordering::SeqCst) {
                break;
            }
        }
    }

    fn drain(&self) {
        loop {
            let action = match self.inner.queue.lock() {
                Ok(mut queue) => queue.pop_front(),
                Err(_) => None,
            };
            let Some(action) = action else {
                break;
            };

            let (prev, next) = {
                let Ok(mut state) = self.inner.state.write() else {
                    return;
                };
                let prev = state.clone();
                *state = reduce(&prev, &action, &self.inner.known_keys);
                (prev, state.clone())
            };

            log::debug!("dispatch {}: notifying subscribers", action.name());

            let subscribers: Vec<Arc<SubscriberFn>> = self
                .inner
                .subscribers
                .read()
                .map(|subs| subs.iter().map(|(_, f)| Arc::clone(f)).collect())
                .unwrap_or_default();

            for subscriber in subscribers {
                subscriber(&next, &prev, &action);
            }
        }
    }
}

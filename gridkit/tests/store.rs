use std::sync::Arc;
use std::sync::Mutex;

use gridkit::model::{ColumnFilter, Sort, SortDirection};
use gridkit::state::{Action, EffectClass, GridState, Store};

fn keys() -> Vec<String> {
    vec!["a".into(), "b".into(), "c".into()]
}

fn store() -> Store {
    Store::new(GridState::default(), keys())
}

// ============================================================================
// Dispatch and subscription
// ============================================================================

#[test]
fn test_dispatch_notifies_with_next_prev_action() {
    let store = store();
    let seen: Arc<Mutex<Vec<(String, String, String)>>> = Arc::new(Mutex::new(Vec::new()));

    let seen_clone = Arc::clone(&seen);
    store.subscribe(move |next, prev, action| {
        seen_clone.lock().unwrap().push((
            action.name().to_string(),
            prev.data.filter_text.clone(),
            next.data.filter_text.clone(),
        ));
    });

    store.dispatch(Action::SetFilterText("x".into()));
    store.dispatch(Action::SetFilterText("xy".into()));

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            ("SET_FILTER_TEXT".to_string(), "".to_string(), "x".to_string()),
            ("SET_FILTER_TEXT".to_string(), "x".to_string(), "xy".to_string()),
        ]
    );
}

#[test]
fn test_unsubscribe_stops_notifications() {
    let store = store();
    let count = Arc::new(Mutex::new(0));

    let count_clone = Arc::clone(&count);
    let id = store.subscribe(move |_, _, _| {
        *count_clone.lock().unwrap() += 1;
    });

    store.dispatch(Action::SortClear);
    store.unsubscribe(id);
    store.dispatch(Action::SortClear);

    assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
fn test_reentrant_dispatch_is_queued_not_recursive() {
    let store = store();
    let order: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    let inner_store = store.clone();
    let order_clone = Arc::clone(&order);
    store.subscribe(move |next, _prev, action| {
        order_clone.lock().unwrap().push(next.data.filter_text.clone());
        // Reentrant dispatch from within a notification: must be deferred.
        if matches!(action, Action::SetFilterText(t) if t == "first") {
            inner_store.dispatch(Action::SetFilterText("second".into()));
            // The nested action has not been applied yet at this point.
            assert_eq!(inner_store.state().data.filter_text, "first");
        }
    });

    store.dispatch(Action::SetFilterText("first".into()));

    assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    assert_eq!(store.state().data.filter_text, "second");
}

// ============================================================================
// Reducer contracts through the store
// ============================================================================

#[test]
fn test_sort_set_and_clear() {
    let store = store();
    store.dispatch(Action::SortSet {
        key: "a".into(),
        direction: SortDirection::Desc,
    });
    assert_eq!(
        store.state().data.sort,
        Some(Sort::new("a", SortDirection::Desc))
    );

    store.dispatch(Action::SortClear);
    assert_eq!(store.state().data.sort, None);
}

#[test]
fn test_column_filters_preserve_other_keys() {
    let store = store();
    store.dispatch(Action::ColumnFilterSet {
        key: "a".into(),
        filter: ColumnFilter::set(["1"]),
    });
    store.dispatch(Action::ColumnFilterSet {
        key: "b".into(),
        filter: ColumnFilter::text("x"),
    });
    store.dispatch(Action::ColumnFilterClear { key: "a".into() });

    let filters = store.state().data.column_filters;
    assert!(!filters.contains_key("a"));
    assert_eq!(filters.get("b"), Some(&ColumnFilter::text("x")));
}

#[test]
fn test_order_set_normalizes_payload() {
    let store = store();
    store.dispatch(Action::ColumnOrderSet {
        order: vec!["b".into(), "unknown".into()],
    });
    assert_eq!(store.state().columns.order, vec!["b", "a", "c"]);
}

#[test]
fn test_frozen_count_clamped_to_visible() {
    let store = store();
    store.dispatch(Action::SetFrozenCount(10));
    assert_eq!(store.state().columns.frozen_count, 3);

    store.dispatch(Action::ColumnBatchHide {
        keys: vec!["b".into(), "c".into()],
    });
    assert_eq!(store.state().columns.frozen_count, 1);
}

#[test]
fn test_visibility_reset() {
    let store = store();
    store.dispatch(Action::ColumnHide { key: "a".into() });
    store.dispatch(Action::ColumnHide { key: "b".into() });
    store.dispatch(Action::ColumnsResetVisibility);
    assert!(store.state().columns.hidden_keys.is_empty());
}

#[test]
fn test_order_invariant_holds_under_action_sequences() {
    // For all reachable states: order contains only known keys and
    // frozen_count <= visible count.
    let store = store();
    let actions = vec![
        Action::ColumnOrderSet {
            order: vec!["c".into(), "bogus".into()],
        },
        Action::ColumnHide { key: "a".into() },
        Action::SetFrozenCount(3),
        Action::ColumnOrderSet {
            order: vec!["b".into()],
        },
        Action::ColumnHide { key: "c".into() },
        Action::ColumnShow { key: "a".into() },
    ];
    for action in actions {
        store.dispatch(action);
        let state = store.state();
        for key in &state.columns.order {
            assert!(keys().contains(key), "unknown key {key:?} in order");
        }
        assert!(state.columns.frozen_count <= state.visible_count(&keys()));
    }
}

// ============================================================================
// Query construction and effect classes
// ============================================================================

#[test]
fn test_state_to_query() {
    let store = store();
    store.dispatch(Action::SortSet {
        key: "a".into(),
        direction: SortDirection::Asc,
    });
    store.dispatch(Action::SetFilterText("needle".into()));

    let query = store.state().query();
    assert_eq!(query.sort_key.as_deref(), Some("a"));
    assert_eq!(query.sort_direction, Some(SortDirection::Asc));
    assert_eq!(query.filter_text.as_deref(), Some("needle"));
}

#[test]
fn test_effect_classification() {
    assert_eq!(
        Action::SetFilterText("x".into()).effect_class(),
        EffectClass::Data
    );
    assert_eq!(
        Action::ColumnResize {
            key: "a".into(),
            width: 10
        }
        .effect_class(),
        EffectClass::Columns
    );
    assert_eq!(
        Action::ColumnOrderSet { order: vec![] }.effect_class(),
        EffectClass::Structure
    );
    assert_eq!(
        Action::SetMode(gridkit::GridMode::Server).effect_class(),
        EffectClass::StateOnly
    );
}

use gridkit::columns::{solve_widths, ColumnModel, DEFAULT_MIN_WIDTH};
use gridkit::model::Column;
use gridkit::state::{Action, GridState, Store};
use gridkit::ConfigError;

fn columns() -> Vec<Column> {
    vec![
        Column::new("a", "A").width(100),
        Column::new("b", "B").width(200),
        Column::new("c", "C").width(300),
        Column::new("d", "D").width(400),
    ]
}

fn shape(model: &ColumnModel, state: &GridState) -> Vec<(String, u32, bool)> {
    model
        .resolve(state)
        .into_iter()
        .map(|c| (c.key().to_string(), c.width, c.is_frozen))
        .collect()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_duplicate_keys_rejected() {
    let cols = vec![Column::new("a", "A"), Column::new("a", "Again")];
    assert_eq!(
        ColumnModel::new(cols, 1000).err(),
        Some(ConfigError::DuplicateColumnKey("a".into()))
    );
}

#[test]
fn test_empty_columns_rejected() {
    assert_eq!(
        ColumnModel::new(Vec::new(), 1000).err(),
        Some(ConfigError::EmptyColumns)
    );
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_default_state_resolves_in_original_order() {
    let model = ColumnModel::new(columns(), 1000).unwrap();
    let state = GridState::default();
    assert_eq!(
        shape(&model, &state),
        vec![
            ("a".into(), 100, false),
            ("b".into(), 200, false),
            ("c".into(), 300, false),
            ("d".into(), 400, false),
        ]
    );
}

#[test]
fn test_hidden_keys_are_dropped() {
    let model = ColumnModel::new(columns(), 1000).unwrap();
    let mut state = GridState::default();
    state.columns.hidden_keys.insert("b".into());

    let keys: Vec<String> = model
        .resolve(&state)
        .iter()
        .map(|c| c.key().to_string())
        .collect();
    assert_eq!(keys, vec!["a", "c", "d"]);
}

#[test]
fn test_all_hidden_resolves_empty() {
    let model = ColumnModel::new(columns(), 1000).unwrap();
    let mut state = GridState::default();
    for key in ["a", "b", "c", "d"] {
        state.columns.hidden_keys.insert(key.into());
    }
    assert!(model.resolve(&state).is_empty());
}

#[test]
fn test_order_applies_with_unlisted_keys_appended_stably() {
    let model = ColumnModel::new(columns(), 1000).unwrap();
    let mut state = GridState::default();
    // Only part of the keys listed: the rest keep original relative order.
    state.columns.order = vec!["d".into(), "b".into()];

    let keys: Vec<String> = model
        .resolve(&state)
        .iter()
        .map(|c| c.key().to_string())
        .collect();
    assert_eq!(keys, vec!["d", "b", "a", "c"]);
}

#[test]
fn test_width_overrides_take_precedence() {
    let model = ColumnModel::new(columns(), 1000).unwrap();
    let mut state = GridState::default();
    state.columns.width_overrides.insert("c".into(), 50);

    let resolved = model.resolve(&state);
    assert_eq!(resolved[2].width, 50);
    assert_eq!(resolved[0].width, 100, "others keep base widths");
}

#[test]
fn test_frozen_prefix() {
    let model = ColumnModel::new(columns(), 1000).unwrap();
    let mut state = GridState::default();
    state.columns.order = vec!["c".into(), "a".into()];
    state.columns.frozen_count = 2;

    let resolved = model.resolve(&state);
    let frozen: Vec<(&str, bool)> = resolved
        .iter()
        .map(|c| (c.key(), c.is_frozen))
        .collect();
    assert_eq!(
        frozen,
        vec![("c", true), ("a", true), ("b", false), ("d", false)]
    );
}

#[test]
fn test_all_frozen_when_count_equals_visible() {
    let model = ColumnModel::new(columns(), 1000).unwrap();
    let mut state = GridState::default();
    state.columns.frozen_count = 4;
    assert!(model.resolve(&state).iter().all(|c| c.is_frozen));
}

// ============================================================================
// Round-trip law
// ============================================================================

#[test]
fn test_resolve_unchanged_by_identity_order_and_width_revert() {
    // Applying COLUMN_ORDER_SET with the current order, then COLUMN_RESIZE
    // reverting every width, must leave resolution unchanged.
    let model = ColumnModel::new(columns(), 1000).unwrap();
    let store = Store::new(
        GridState::default(),
        columns().iter().map(|c| c.key.clone()).collect(),
    );
    store.dispatch(Action::ColumnOrderSet {
        order: vec!["b".into(), "d".into()],
    });
    store.dispatch(Action::ColumnResize {
        key: "a".into(),
        width: 77,
    });
    let before = shape(&model, &store.state());

    let current_order = store.state().columns.order.clone();
    store.dispatch(Action::ColumnOrderSet {
        order: current_order,
    });
    store.dispatch(Action::ColumnResize {
        key: "a".into(),
        width: 77,
    });

    assert_eq!(before, shape(&model, &store.state()));
}

// ============================================================================
// Width solver composition
// ============================================================================

#[test]
fn test_flex_and_auto_against_container() {
    let cols = vec![
        Column::new("fixed", "F").width(200),
        Column::new("flex", "X").flex(1),
        Column::new("auto", "A"),
    ];
    let widths = solve_widths(&cols, 800);
    assert_eq!(widths[0], 200);
    assert_eq!(widths[1], 600, "flex takes the whole remainder");
    assert_eq!(widths[2], DEFAULT_MIN_WIDTH, "auto clamps to the minimum");
}

#[test]
fn test_relayout_changes_base_widths() {
    let cols = vec![Column::new("x", "X"), Column::new("y", "Y")];
    let mut model = ColumnModel::new(cols, 1000).unwrap();
    assert_eq!(model.base_width("x"), Some(500));

    model.relayout(400);
    assert_eq!(model.base_width("x"), Some(200));
    assert_eq!(model.base_width("y"), Some(200));
}

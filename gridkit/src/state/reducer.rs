//! The reducer: pure state transitions.

use std::collections::HashSet;

use crate::model::Sort;

use super::action::Action;
use super::store::GridState;

/// Applies `action` to `state`, returning the next state.
///
/// Pure: the previous state is never mutated. `known_keys` is the original
/// column key set; payload keys outside it are dropped where the contract
/// says so.
///
/// # Panics
///
/// `ColumnOrderSet` with duplicate keys is a programmer error and panics.
pub(crate) fn reduce(state: &GridState, action: &Action, known_keys: &[String]) -> GridState {
    let mut next = state.clone();

    match action {
        Action::SortSet { key, direction } => {
            next.data.sort = Some(Sort::new(key.clone(), *direction));
        }
        Action::SortClear => {
            next.data.sort = None;
        }
        Action::SetFilterText(text) => {
            next.data.filter_text = text.clone();
        }
        Action::ColumnFilterSet { key, filter } => {
            next.data.column_filters.insert(key.clone(), filter.clone());
        }
        Action::ColumnFilterClear { key } => {
            next.data.column_filters.remove(key);
        }
        Action::SetTotalRows(total) => {
            next.data.total_rows = *total;
        }

        Action::ColumnResize { key, width } => {
            if known_keys.iter().any(|k| k == key) {
                next.columns
                    .width_overrides
                    .insert(key.clone(), (*width).max(1));
            } else {
                log::warn!("COLUMN_RESIZE for unknown column {key:?} ignored");
            }
        }
        Action::ColumnShow { key } => {
            next.columns.hidden_keys.remove(key);
        }
        Action::ColumnHide { key } => {
            if known_keys.iter().any(|k| k == key) {
                next.columns.hidden_keys.insert(key.clone());
            }
            clamp_frozen(&mut next, known_keys);
        }
        Action::ColumnBatchShow { keys } => {
            for key in keys {
                next.columns.hidden_keys.remove(key);
            }
        }
        Action::ColumnBatchHide { keys } => {
            for key in keys {
                if known_keys.iter().any(|k| k == key) {
                    next.columns.hidden_keys.insert(key.clone());
                }
            }
            clamp_frozen(&mut next, known_keys);
        }
        Action::ColumnsResetVisibility => {
            next.columns.hidden_keys.clear();
        }

        Action::ColumnOrderSet { order } => {
            next.columns.order = normalize_order(order, known_keys);
        }
        Action::SetFrozenCount(count) => {
            next.columns.frozen_count = *count;
            clamp_frozen(&mut next, known_keys);
        }
        Action::TableResize { .. } => {
            // The width is consumed by the router (relayout + persist);
            // nothing in the state changes.
        }

        Action::SetMode(mode) => {
            next.mode = *mode;
        }
    }

    next
}

/// Normalizes a `ColumnOrderSet` payload: drops unknown keys, appends known
/// keys missing from the payload in original order, panics on duplicates.
fn normalize_order(order: &[String], known_keys: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    for key in order {
        assert!(
            seen.insert(key.as_str()),
            "COLUMN_ORDER_SET payload contains duplicate key {key:?}"
        );
    }

    let mut normalized: Vec<String> = order
        .iter()
        .filter(|key| known_keys.contains(key))
        .cloned()
        .collect();
    if normalized.len() < order.len() {
        log::warn!(
            "COLUMN_ORDER_SET dropped {} unknown key(s)",
            order.len() - normalized.len()
        );
    }

    for key in known_keys {
        if !normalized.contains(key) {
            normalized.push(key.clone());
        }
    }
    normalized
}

fn clamp_frozen(state: &mut GridState, known_keys: &[String]) {
    let visible = state.visible_count(known_keys);
    if state.columns.frozen_count > visible {
        state.columns.frozen_count = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SortDirection;

    fn keys() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into()]
    }

    #[test]
    fn test_resize_clamps_to_one() {
        let state = GridState::default();
        let next = reduce(
            &state,
            &Action::ColumnResize {
                key: "a".into(),
                width: 0,
            },
            &keys(),
        );
        assert_eq!(next.columns.width_overrides["a"], 1);
    }

    #[test]
    fn test_order_set_drops_unknown_and_appends_missing() {
        let state = GridState::default();
        let next = reduce(
            &state,
            &Action::ColumnOrderSet {
                order: vec!["c".into(), "zzz".into(), "a".into()],
            },
            &keys(),
        );
        assert_eq!(next.columns.order, vec!["c", "a", "b"]);
    }

    #[test]
    #[should_panic(expected = "duplicate key")]
    fn test_order_set_panics_on_duplicates() {
        let state = GridState::default();
        reduce(
            &state,
            &Action::ColumnOrderSet {
                order: vec!["a".into(), "a".into()],
            },
            &keys(),
        );
    }

    #[test]
    fn test_hiding_clamps_frozen_count() {
        let mut state = GridState::default();
        state.columns.frozen_count = 3;
        let next = reduce(&state, &Action::ColumnHide { key: "c".into() }, &keys());
        assert_eq!(next.columns.frozen_count, 2);
    }

    #[test]
    fn test_sort_set_then_clear() {
        let state = GridState::default();
        let sorted = reduce(
            &state,
            &Action::SortSet {
                key: "a".into(),
                direction: SortDirection::Desc,
            },
            &keys(),
        );
        assert_eq!(
            sorted.data.sort,
            Some(Sort::new("a", SortDirection::Desc))
        );

        let cleared = reduce(&sorted, &Action::SortClear, &keys());
        assert_eq!(cleared.data.sort, None);
    }

    #[test]
    fn test_reducer_is_pure() {
        let state = GridState::default();
        let _ = reduce(&state, &Action::SetFilterText("x".into()), &keys());
        assert_eq!(state.data.filter_text, "");
    }
}

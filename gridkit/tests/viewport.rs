use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use griddom::{Node, NodeKind, ScrollViewport};
use gridkit::columns::ColumnModel;
use gridkit::data::{DataStrategy, InMemoryStrategy, PageFetcher, PageResponse, PagedRemoteStrategy};
use gridkit::model::{Column, Row};
use gridkit::render::{
    is_skeleton, row_index, ColumnManager, DefaultElementFactory, ElementFactory, FrameGate,
    Scroller, Viewport,
};
use gridkit::state::GridState;

fn dataset(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| Row::new().set("id", i as i64).set("name", format!("row {i}")))
        .collect()
}

fn columns() -> Vec<Column> {
    vec![Column::new("id", "Id").width(80), Column::new("name", "Name").width(200)]
}

fn resolved(state: &GridState) -> Vec<gridkit::model::ResolvedColumn> {
    ColumnModel::new(columns(), 1000).unwrap().resolve(state)
}

fn memory_viewport(rows: usize) -> (Viewport, ScrollViewport, Node) {
    let strategy: Arc<dyn DataStrategy> =
        Arc::new(InMemoryStrategy::new(dataset(rows), columns()));
    build_viewport(strategy, rows)
}

fn build_viewport(strategy: Arc<dyn DataStrategy>, total: usize) -> (Viewport, ScrollViewport, Node) {
    let scroll = ScrollViewport::new(400);
    let content = Node::new(NodeKind::Content);
    let scroller = Scroller::new(40, total, 400, 2);
    scroll.set_spacer_height(scroller.scroll_height());
    let viewport = Viewport::new(
        strategy,
        Arc::new(DefaultElementFactory),
        scroll.clone(),
        content.clone(),
        scroller,
        resolved(&GridState::default()),
        Arc::new(AtomicU64::new(0)),
    );
    (viewport, scroll, content)
}

// ============================================================================
// Window diffing
// ============================================================================

#[test]
fn test_first_update_mounts_the_window() {
    let (viewport, _scroll, content) = memory_viewport(1000);

    let update = viewport.update_visible_rows();
    let window = update.window.unwrap();
    assert_eq!((window.start, window.end), (0, 12));
    assert_eq!(viewport.visible_indexes(), (0..=12).collect::<Vec<_>>());
    assert_eq!(content.child_count(), 13);
    assert!(update.pending.is_empty(), "everything resident in memory");
}

#[test]
fn test_scroll_keeps_overlap_and_drops_the_rest() {
    let (viewport, scroll, content) = memory_viewport(1000);
    viewport.update_visible_rows();
    let before: Vec<String> = content.child_ids();

    // Scroll down by 4 rows: indexes 4..=16.
    scroll.set_scroll_top(160);
    let update = viewport.update_visible_rows();

    assert_eq!(viewport.visible_indexes(), (2..=16).collect::<Vec<_>>());
    assert_eq!(update.created, (13..=16).collect::<Vec<_>>());
    assert_eq!(update.removed, vec![0, 1]);

    // Kept rows reuse their elements.
    let after = content.child_ids();
    assert!(after.iter().take(5).all(|id| before.contains(id)));
}

#[test]
fn test_content_children_stay_in_index_order() {
    let (viewport, scroll, content) = memory_viewport(1000);
    viewport.update_visible_rows();
    scroll.set_scroll_top(4000);
    viewport.update_visible_rows();
    scroll.set_scroll_top(800);
    viewport.update_visible_rows();

    let indexes: Vec<usize> = content
        .children()
        .iter()
        .filter_map(row_index)
        .collect();
    let mut sorted = indexes.clone();
    sorted.sort_unstable();
    assert_eq!(indexes, sorted);
}

#[test]
fn test_empty_dataset_renders_nothing() {
    let (viewport, scroll, content) = memory_viewport(0);
    let update = viewport.update_visible_rows();
    assert!(update.window.is_none());
    assert_eq!(content.child_count(), 0);

    // Scrolling an empty grid must not crash.
    scroll.set_scroll_top(5000);
    viewport.update_visible_rows();
    assert_eq!(viewport.visible_indexes(), Vec::<usize>::new());
}

#[test]
fn test_refresh_discards_all_elements() {
    let (viewport, _scroll, _content) = memory_viewport(100);
    viewport.update_visible_rows();
    let before: Vec<String> = viewport.visible_rows().iter().map(Node::id).collect();

    viewport.refresh();
    let after: Vec<String> = viewport.visible_rows().iter().map(Node::id).collect();

    assert_eq!(before.len(), after.len());
    assert!(before.iter().all(|id| !after.contains(id)), "fresh elements");
}

#[test]
fn test_translate_y_tracks_window_start() {
    let (viewport, scroll, _content) = memory_viewport(1000);
    scroll.set_scroll_top(4000);
    let update = viewport.update_visible_rows();
    let window = update.window.unwrap();
    assert_eq!(scroll.translate_y(), window.translate_y);
    assert_eq!(window.translate_y, window.start as u64 * 40);
}

// ============================================================================
// Skeletons and fills
// ============================================================================

fn paged_fetcher(total: usize, page_size: usize, counter: Arc<AtomicUsize>) -> PageFetcher {
    Arc::new(move |page, _query| {
        counter.fetch_add(1, Ordering::SeqCst);
        let list: Vec<Row> = (page * page_size..((page + 1) * page_size).min(total))
            .map(|i| Row::new().set("id", i as i64).set("name", format!("row {i}")))
            .collect();
        async move {
            Ok(PageResponse {
                list,
                total_rows: total,
            })
        }
        .boxed()
    })
}

fn paged_viewport(total: usize) -> (Viewport, ScrollViewport, Arc<AtomicUsize>) {
    let counter = Arc::new(AtomicUsize::new(0));
    let strategy: Arc<dyn DataStrategy> = Arc::new(PagedRemoteStrategy::new(
        paged_fetcher(total, 50, Arc::clone(&counter)),
        50,
        10,
        None,
        None,
    ));
    let (viewport, scroll, _content) = build_viewport(strategy, total);
    (viewport, scroll, counter)
}

#[tokio::test]
async fn test_unloaded_rows_render_skeletons_then_fill() {
    let (viewport, _scroll, _counter) = paged_viewport(1000);

    let update = viewport.update_visible_rows();
    assert_eq!(update.pending, (0..=12).collect::<Vec<_>>());
    assert!(viewport
        .visible_rows()
        .iter()
        .all(is_skeleton));

    viewport.fill_pending().await;

    assert!(viewport.pending_indexes().is_empty());
    let rows = viewport.visible_rows();
    assert!(rows.iter().all(|r| !is_skeleton(r)));
    // Replacement kept index order and identity.
    assert_eq!(row_index(&rows[3]), Some(3));
}

#[tokio::test]
async fn test_every_window_index_is_mounted_or_pending() {
    let (viewport, scroll, _counter) = paged_viewport(1000);
    scroll.set_scroll_top(8000);
    let update = viewport.update_visible_rows();
    let window = update.window.unwrap();

    for index in window.indexes() {
        let mounted = viewport.row_element(index).is_some();
        let element_is_real = viewport
            .row_element(index)
            .map(|n| !is_skeleton(&n))
            .unwrap_or(false);
        assert!(
            element_is_real || (mounted && update.pending.contains(&index)),
            "index {index} neither resident nor pending"
        );
    }
}

#[tokio::test]
async fn test_stale_generation_fill_is_discarded() {
    let (viewport, _scroll, _counter) = paged_viewport(1000);
    viewport.update_visible_rows();
    let old_generation = viewport.generation();

    // A new query arrives: generation moves on and the viewport refreshes.
    // A fill issued under the old generation must not swap content in.
    viewport.fill_row(0, old_generation.wrapping_sub(1)).await;

    let row = viewport.row_element(0).unwrap();
    assert!(is_skeleton(&row), "stale fill left the skeleton in place");
}

#[tokio::test]
async fn test_fill_for_scrolled_out_row_is_dropped() {
    let (viewport, scroll, _counter) = paged_viewport(1000);
    viewport.update_visible_rows();
    let generation = viewport.generation();

    // Scroll far away before the fill lands.
    scroll.set_scroll_top(30_000);
    viewport.update_visible_rows();

    viewport.fill_row(0, generation).await;
    assert!(viewport.row_element(0).is_none());
}

// ============================================================================
// Frame gate
// ============================================================================

#[test]
fn test_frame_gate_coalesces_scroll_bursts() {
    let gate = FrameGate::new();
    let mut scheduled = 0;
    for _ in 0..25 {
        if gate.request() {
            scheduled += 1;
        }
    }
    assert_eq!(scheduled, 1, "one tick per frame regardless of event rate");

    assert!(gate.take());
    assert!(gate.request(), "next frame schedules again");
}

// ============================================================================
// Column manager
// ============================================================================

#[test]
fn test_column_manager_applies_width_variables() {
    let (viewport, _scroll, _content) = memory_viewport(100);
    viewport.update_visible_rows();

    let factory: Arc<dyn ElementFactory> = Arc::new(DefaultElementFactory);
    let wrapper = factory.wrapper();
    let state = GridState::default();
    let cols = resolved(&state);
    let header = factory.header_row(&cols);
    let manager = ColumnManager::new(wrapper.clone(), header, None, factory);

    manager.update(&cols, &viewport.visible_rows(), &|_| None, None);

    assert_eq!(wrapper.var("--grid-col-id-width").as_deref(), Some("80px"));
    assert_eq!(
        wrapper.var("--grid-col-name-width").as_deref(),
        Some("200px")
    );
}

#[test]
fn test_column_manager_frozen_offsets_strictly_increase() {
    let factory: Arc<dyn ElementFactory> = Arc::new(DefaultElementFactory);
    let wrapper = factory.wrapper();
    let mut state = GridState::default();
    state.columns.frozen_count = 2;
    let cols = resolved(&state);
    let header = factory.header_row(&cols);
    let manager = ColumnManager::new(wrapper.clone(), header, None, factory);

    manager.update(&cols, &[], &|_| None, None);

    assert_eq!(wrapper.var("--grid-col-id-left").as_deref(), Some("0px"));
    assert_eq!(wrapper.var("--grid-col-name-left").as_deref(), Some("80px"));
}

#[test]
fn test_column_manager_hides_and_reorders_cells_in_place() {
    let strategy: Arc<dyn DataStrategy> =
        Arc::new(InMemoryStrategy::new(dataset(100), columns()));
    let (viewport, _scroll, _content) = build_viewport(Arc::clone(&strategy), 100);
    viewport.update_visible_rows();

    let factory: Arc<dyn ElementFactory> = Arc::new(DefaultElementFactory);
    let state = GridState::default();
    let cols = resolved(&state);
    let wrapper = factory.wrapper();
    let header = factory.header_row(&cols);
    let manager = ColumnManager::new(wrapper.clone(), header.clone(), None, Arc::clone(&factory));

    // Reverse the order and hide "id".
    let mut next = GridState::default();
    next.columns.order = vec!["name".into(), "id".into()];
    let reordered = resolved(&next);
    let lookup = {
        let strategy = Arc::clone(&strategy);
        move |i: usize| strategy.get_row(i)
    };
    manager.update(&reordered, &viewport.visible_rows(), &lookup, None);

    let header_keys: Vec<String> = header
        .children()
        .iter()
        .filter_map(|c| c.data("col"))
        .collect();
    assert_eq!(header_keys, vec!["name", "id"]);

    let mut hidden = GridState::default();
    hidden.columns.hidden_keys.insert("id".into());
    let without_id = resolved(&hidden);
    manager.update(&without_id, &viewport.visible_rows(), &lookup, None);

    let header_keys: Vec<String> = header
        .children()
        .iter()
        .filter_map(|c| c.data("col"))
        .collect();
    assert_eq!(header_keys, vec!["name"]);
    assert_eq!(wrapper.var("--grid-col-id-width"), None, "stale vars removed");

    let first_row = viewport.visible_rows()[0].clone();
    let row_keys: Vec<String> = first_row
        .children()
        .iter()
        .filter_map(|c| c.data("col"))
        .collect();
    assert_eq!(row_keys, vec!["name"], "data-row cells follow");
}

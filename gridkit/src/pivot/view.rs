//! Virtualized rendering of the flattened pivot.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use griddom::Node;
use griddom::NodeKind;
use griddom::ScrollViewport;

use crate::error::ConfigError;
use crate::model::Row;
use crate::render::ElementFactory;
use crate::render::Scroller;

use super::ancestor_labels;
use super::build_pivot_tree;
use super::flatten;
use super::toggle_node;
use super::FlatRow;
use super::FlatRowKind;
use super::FlatRowType;
use super::PivotConfig;
use super::PivotNode;

struct PivotViewInner {
    config: PivotConfig,
    root: PivotNode,
    flat: Vec<FlatRow>,
    scroller: Scroller,
    visible: HashMap<usize, Node>,
}

/// A virtualized view over the flattened pivot rows.
///
/// Works on the same window principle as the main viewport, but over
/// `flat` rows that are always resident (the pivot is client-side). On
/// every visible-window update the view also maintains:
/// - a **sticky group overlay**: a rendering-only clone of the nearest
///   normal group row whose own position is scrolled above the viewport;
///   toggling on the clone delegates through its node id;
/// - a **breadcrumb**: the ancestor group chain of the first visible row.
pub struct PivotView {
    factory: Arc<dyn ElementFactory>,
    scroll: ScrollViewport,
    content: Node,
    sticky: Node,
    breadcrumb: Node,
    inner: Arc<RwLock<PivotViewInner>>,
}

impl PivotView {
    /// Builds the tree, flattens it and prepares an empty viewport.
    pub fn new(
        rows: &[Row],
        config: PivotConfig,
        factory: Arc<dyn ElementFactory>,
        row_height: u32,
        viewport_height: u32,
        buffer_rows: usize,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let root = build_pivot_tree(rows, &config);
        let flat = flatten(&root, config.show_subtotals);
        let scroller = Scroller::new(row_height, flat.len(), viewport_height, buffer_rows);

        let scroll = ScrollViewport::new(viewport_height);
        scroll.set_spacer_height(scroller.scroll_height());

        let sticky = Node::new(NodeKind::Overlay);
        sticky.set_hidden(true);
        let breadcrumb = Node::new(NodeKind::Overlay);

        Ok(Self {
            factory,
            scroll,
            content: Node::new(NodeKind::Content),
            sticky,
            breadcrumb,
            inner: Arc::new(RwLock::new(PivotViewInner {
                config,
                root,
                flat,
                scroller,
                visible: HashMap::new(),
            })),
        })
    }

    /// The scroll viewport driving this view.
    pub fn scroll(&self) -> &ScrollViewport {
        &self.scroll
    }

    /// The content layer holding the visible pivot rows.
    pub fn content(&self) -> &Node {
        &self.content
    }

    /// Snapshot of the flattened rows.
    pub fn flat_rows(&self) -> Vec<FlatRow> {
        self.inner
            .read()
            .map(|g| g.flat.clone())
            .unwrap_or_default()
    }

    /// Number of flat rows.
    pub fn row_count(&self) -> usize {
        self.inner.read().map(|g| g.flat.len()).unwrap_or(0)
    }

    /// Mounted flat-row indexes, sorted.
    pub fn visible_indexes(&self) -> Vec<usize> {
        let Ok(inner) = self.inner.read() else {
            return Vec::new();
        };
        let mut indexes: Vec<usize> = inner.visible.keys().copied().collect();
        indexes.sort_unstable();
        indexes
    }

    /// The sticky overlay clone, when one is showing.
    pub fn sticky_row(&self) -> Option<Node> {
        if self.sticky.hidden() {
            None
        } else {
            self.sticky.children().into_iter().next()
        }
    }

    /// The breadcrumb labels, outermost group first.
    pub fn breadcrumb(&self) -> Vec<String> {
        match self.breadcrumb.text() {
            Some(text) if !text.is_empty() => {
                text.split(" / ").map(str::to_string).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Scrolls to `scroll_top` and re-renders the window.
    pub fn handle_scroll(&self, scroll_top: u64) {
        self.scroll.set_scroll_top(scroll_top);
        self.update_visible_rows();
    }

    /// Diffs the visible window and refreshes the sticky row + breadcrumb.
    pub fn update_visible_rows(&self) {
        let scroll_top = self.scroll.scroll_top();
        let Ok(mut inner) = self.inner.write() else {
            return;
        };

        let Some(window) = inner.scroller.window(scroll_top) else {
            inner.visible.clear();
            self.content.clear_children();
            self.scroll.set_translate_y(0);
            self.sticky.set_hidden(true);
            self.breadcrumb.set_text("");
            return;
        };

        self.scroll.set_translate_y(window.translate_y);

        let mut fresh = Vec::new();
        for index in window.indexes() {
            if inner.visible.contains_key(&index) {
                continue;
            }
            let node =
                self.factory
                    .pivot_row(index, &inner.flat[index], &inner.config.value_fields);
            inner.visible.insert(index, node.clone());
            fresh.push(node);
        }

        let stale: Vec<usize> = inner
            .visible
            .keys()
            .copied()
            .filter(|i| !window.contains(*i))
            .collect();
        for index in stale {
            if let Some(node) = inner.visible.remove(&index) {
                self.content.remove_child(&node.id());
            }
        }

        self.content.append_children(fresh);
        let mut order: Vec<(usize, String)> = inner
            .visible
            .iter()
            .map(|(i, n)| (*i, n.id()))
            .collect();
        order.sort_by_key(|(i, _)| *i);
        let ids: Vec<String> = order.into_iter().map(|(_, id)| id).collect();
        self.content.reorder_children(&ids);

        self.update_sticky(&inner, scroll_top);
        self.update_breadcrumb(&inner, scroll_top);
    }

    /// Flips a node's expansion, re-flattens and re-renders.
    /// Returns whether the node was found.
    pub fn toggle(&self, node_id: &str) -> bool {
        let Ok(mut inner) = self.inner.write() else {
            return false;
        };
        if !toggle_node(&mut inner.root, node_id) {
            return false;
        }
        inner.flat = flatten(&inner.root, inner.config.show_subtotals);
        inner.scroller = inner.scroller.with_total_rows(inner.flat.len());
        self.scroll.set_spacer_height(inner.scroller.scroll_height());
        inner.visible.clear();
        self.content.clear_children();
        drop(inner);

        self.update_visible_rows();
        true
    }

    /// First row whose top edge is at or below the scroll position.
    fn top_index(inner: &PivotViewInner, scroll_top: u64) -> Option<usize> {
        if inner.flat.is_empty() {
            return None;
        }
        let index = (scroll_top / inner.scroller.row_height() as u64) as usize;
        Some(index.min(inner.flat.len() - 1))
    }

    fn update_sticky(&self, inner: &PivotViewInner, scroll_top: u64) {
        let Some(top) = Self::top_index(inner, scroll_top) else {
            self.sticky.set_hidden(true);
            return;
        };

        // Nearest normal group row strictly above the viewport.
        let anchor = (0..top).rev().find(|&i| {
            let row = &inner.flat[i];
            row.row_type == FlatRowType::Group && row.kind == FlatRowKind::Normal
        });

        match anchor {
            Some(index) => {
                let clone =
                    self.factory
                        .pivot_row(index, &inner.flat[index], &inner.config.value_fields);
                self.sticky.clear_children();
                self.sticky.append_child(clone);
                self.sticky.set_hidden(false);
            }
            None => {
                self.sticky.clear_children();
                self.sticky.set_hidden(true);
            }
        }
    }

    fn update_breadcrumb(&self, inner: &PivotViewInner, scroll_top: u64) {
        let labels = Self::top_index(inner, scroll_top)
            .map(|top| ancestor_labels(&inner.root, &inner.flat[top].node_id))
            .unwrap_or_default();
        self.breadcrumb.set_text(labels.join(" / "));
    }
}

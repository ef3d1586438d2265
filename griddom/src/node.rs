//! Element nodes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

fn generate_id(prefix: &str) -> String {
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id}")
}

/// The role of a node within a grid tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Outermost grid wrapper; carries the per-column CSS variables.
    Wrapper,
    /// The header row.
    HeaderRow,
    /// The aggregate summary row.
    SummaryRow,
    /// The scrollable body.
    Body,
    /// Invisible element that gives the body its full scroll height.
    Spacer,
    /// The translated layer that holds the visible rows.
    Content,
    /// A data row.
    Row,
    /// A placeholder row shown while its backing page loads.
    SkeletonRow,
    /// A single cell.
    Cell,
    /// A floating overlay (sticky group row, breadcrumb, side panel).
    Overlay,
}

#[derive(Debug)]
struct NodeInner {
    id: String,
    kind: NodeKind,
    text: Option<String>,
    /// `data-*` attributes.
    data: HashMap<String, String>,
    /// CSS custom properties (`--name: value`).
    vars: HashMap<String, String>,
    children: Vec<Node>,
    hidden: bool,
}

/// A shared handle to a retained element.
///
/// Cloning a `Node` clones the handle, not the element; all clones observe
/// the same mutations. Identity is the auto-generated `id`, which hosts use
/// to mirror mutations into their own element tree.
#[derive(Debug, Clone)]
pub struct Node {
    inner: Arc<RwLock<NodeInner>>,
}

impl Node {
    /// Creates a node of the given kind with a fresh id.
    pub fn new(kind: NodeKind) -> Self {
        Self::with_id(kind, generate_id("gd"))
    }

    /// Creates a node with an explicit id.
    pub fn with_id(kind: NodeKind, id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(NodeInner {
                id: id.into(),
                kind,
                text: None,
                data: HashMap::new(),
                vars: HashMap::new(),
                children: Vec::new(),
                hidden: false,
            })),
        }
    }

    /// Returns the node id.
    pub fn id(&self) -> String {
        self.inner
            .read()
            .map(|g| g.id.clone())
            .unwrap_or_default()
    }

    /// Returns the node kind.
    pub fn kind(&self) -> NodeKind {
        self.inner
            .read()
            .map(|g| g.kind)
            .unwrap_or(NodeKind::Overlay)
    }

    /// Returns `true` when both handles point at the same element.
    pub fn same(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Returns the text content, if any.
    pub fn text(&self) -> Option<String> {
        self.inner.read().ok().and_then(|g| g.text.clone())
    }

    /// Sets the text content.
    pub fn set_text(&self, text: impl Into<String>) {
        if let Ok(mut guard) = self.inner.write() {
            guard.text = Some(text.into());
        }
    }

    /// Builder form of [`set_text`](Self::set_text).
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    /// Returns whether the node is hidden.
    pub fn hidden(&self) -> bool {
        self.inner.read().map(|g| g.hidden).unwrap_or(false)
    }

    /// Shows or hides the node.
    pub fn set_hidden(&self, hidden: bool) {
        if let Ok(mut guard) = self.inner.write() {
            guard.hidden = hidden;
        }
    }

    // =========================================================================
    // Data attributes
    // =========================================================================

    /// Returns a `data-*` attribute.
    pub fn data(&self, key: &str) -> Option<String> {
        self.inner.read().ok().and_then(|g| g.data.get(key).cloned())
    }

    /// Sets a `data-*` attribute.
    pub fn set_data(&self, key: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut guard) = self.inner.write() {
            guard.data.insert(key.into(), value.into());
        }
    }

    /// Builder form of [`set_data`](Self::set_data).
    pub fn with_data(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_data(key, value);
        self
    }

    // =========================================================================
    // CSS custom properties
    // =========================================================================

    /// Returns a CSS custom property value.
    pub fn var(&self, name: &str) -> Option<String> {
        self.inner.read().ok().and_then(|g| g.vars.get(name).cloned())
    }

    /// Sets a CSS custom property.
    pub fn set_var(&self, name: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut guard) = self.inner.write() {
            guard.vars.insert(name.into(), value.into());
        }
    }

    /// Removes a CSS custom property.
    pub fn remove_var(&self, name: &str) {
        if let Ok(mut guard) = self.inner.write() {
            guard.vars.remove(name);
        }
    }

    /// Snapshot of all CSS custom properties.
    pub fn vars(&self) -> HashMap<String, String> {
        self.inner
            .read()
            .map(|g| g.vars.clone())
            .unwrap_or_default()
    }

    /// Removes every custom property whose name starts with `prefix`.
    pub fn retain_vars_without_prefix(&self, prefix: &str) {
        if let Ok(mut guard) = self.inner.write() {
            guard.vars.retain(|name, _| !name.starts_with(prefix));
        }
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Returns the number of children.
    pub fn child_count(&self) -> usize {
        self.inner.read().map(|g| g.children.len()).unwrap_or(0)
    }

    /// Snapshot of the child handles, in order.
    pub fn children(&self) -> Vec<Node> {
        self.inner
            .read()
            .map(|g| g.children.clone())
            .unwrap_or_default()
    }

    /// Child ids, in order.
    pub fn child_ids(&self) -> Vec<String> {
        self.children().iter().map(Node::id).collect()
    }

    /// Returns the direct child with the given id.
    pub fn child_by_id(&self, id: &str) -> Option<Node> {
        self.children().into_iter().find(|c| c.id() == id)
    }

    /// Appends a child.
    pub fn append_child(&self, child: Node) {
        if let Ok(mut guard) = self.inner.write() {
            guard.children.push(child);
        }
    }

    /// Appends several children in one batch.
    ///
    /// Hosts can mirror this as a single document-fragment insertion.
    pub fn append_children(&self, children: impl IntoIterator<Item = Node>) {
        if let Ok(mut guard) = self.inner.write() {
            guard.children.extend(children);
        }
    }

    /// Builder form of [`append_child`](Self::append_child).
    pub fn with_child(self, child: Node) -> Self {
        self.append_child(child);
        self
    }

    /// Inserts a child at the given index (clamped to the child count).
    pub fn insert_child(&self, index: usize, child: Node) {
        if let Ok(mut guard) = self.inner.write() {
            let index = index.min(guard.children.len());
            guard.children.insert(index, child);
        }
    }

    /// Removes the direct child with the given id, returning it.
    pub fn remove_child(&self, id: &str) -> Option<Node> {
        if let Ok(mut guard) = self.inner.write() {
            let pos = guard.children.iter().position(|c| c.id() == id)?;
            return Some(guard.children.remove(pos));
        }
        None
    }

    /// Replaces the direct child with the given id, returning the old child.
    pub fn replace_child(&self, id: &str, new: Node) -> Option<Node> {
        if let Ok(mut guard) = self.inner.write() {
            let pos = guard.children.iter().position(|c| c.id() == id)?;
            return Some(std::mem::replace(&mut guard.children[pos], new));
        }
        None
    }

    /// Removes all children.
    pub fn clear_children(&self) {
        if let Ok(mut guard) = self.inner.write() {
            guard.children.clear();
        }
    }

    /// Reorders children to match `ids`.
    ///
    /// Children listed in `ids` come first, in that order; children not
    /// listed keep their relative order after them. Unknown ids are ignored.
    pub fn reorder_children(&self, ids: &[String]) {
        if let Ok(mut guard) = self.inner.write() {
            let mut ordered = Vec::with_capacity(guard.children.len());
            for id in ids {
                if let Some(pos) = guard.children.iter().position(|c| &c.id() == id) {
                    ordered.push(guard.children.remove(pos));
                }
            }
            ordered.append(&mut guard.children);
            guard.children = ordered;
        }
    }

    /// Depth-first search for a descendant (or self) by id.
    pub fn find(&self, id: &str) -> Option<Node> {
        if self.id() == id {
            return Some(self.clone());
        }
        for child in self.children() {
            if let Some(found) = child.find(id) {
                return Some(found);
            }
        }
        None
    }
}

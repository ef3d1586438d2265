//! Scroll viewport model.

use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct ScrollInner {
    scroll_top: u64,
    viewport_height: u32,
    /// Full scroll height of the content (the spacer element's height).
    spacer_height: u64,
    /// Vertical offset applied to the content layer.
    translate_y: u64,
}

/// The scrollable body of a grid.
///
/// Tracks the scroll position, viewport height and the two pieces of
/// virtualization geometry: the spacer height (total scroll height) and the
/// translate offset of the content layer. `scroll_top` is always clamped to
/// the scrollable range, mirroring how a real scroll container behaves.
#[derive(Debug, Clone, Default)]
pub struct ScrollViewport {
    inner: Arc<RwLock<ScrollInner>>,
}

impl ScrollViewport {
    /// Creates a viewport with the given visible height.
    pub fn new(viewport_height: u32) -> Self {
        let vp = Self::default();
        vp.set_viewport_height(viewport_height);
        vp
    }

    /// Current scroll position.
    pub fn scroll_top(&self) -> u64 {
        self.inner.read().map(|g| g.scroll_top).unwrap_or(0)
    }

    /// Sets the scroll position, clamped to `[0, max_scroll_top]`.
    pub fn set_scroll_top(&self, scroll_top: u64) {
        if let Ok(mut guard) = self.inner.write() {
            let max = Self::max_scroll_top_inner(&guard);
            guard.scroll_top = scroll_top.min(max);
        }
    }

    /// Scrolls back to the top.
    pub fn scroll_to_top(&self) {
        self.set_scroll_top(0);
    }

    /// Visible height of the viewport.
    pub fn viewport_height(&self) -> u32 {
        self.inner.read().map(|g| g.viewport_height).unwrap_or(0)
    }

    /// Sets the visible height, re-clamping the scroll position.
    pub fn set_viewport_height(&self, height: u32) {
        if let Ok(mut guard) = self.inner.write() {
            guard.viewport_height = height;
            let max = Self::max_scroll_top_inner(&guard);
            guard.scroll_top = guard.scroll_top.min(max);
        }
    }

    /// Total scroll height of the content.
    pub fn spacer_height(&self) -> u64 {
        self.inner.read().map(|g| g.spacer_height).unwrap_or(0)
    }

    /// Sets the total scroll height, re-clamping the scroll position.
    pub fn set_spacer_height(&self, height: u64) {
        if let Ok(mut guard) = self.inner.write() {
            guard.spacer_height = height;
            let max = Self::max_scroll_top_inner(&guard);
            guard.scroll_top = guard.scroll_top.min(max);
        }
    }

    /// Current translate offset of the content layer.
    pub fn translate_y(&self) -> u64 {
        self.inner.read().map(|g| g.translate_y).unwrap_or(0)
    }

    /// Sets the translate offset of the content layer.
    pub fn set_translate_y(&self, offset: u64) {
        if let Ok(mut guard) = self.inner.write() {
            guard.translate_y = offset;
        }
    }

    /// Largest valid scroll position.
    pub fn max_scroll_top(&self) -> u64 {
        self.inner
            .read()
            .map(|g| Self::max_scroll_top_inner(&g))
            .unwrap_or(0)
    }

    fn max_scroll_top_inner(guard: &ScrollInner) -> u64 {
        guard.spacer_height.saturating_sub(guard.viewport_height as u64)
    }
}

//! Rendering: window math, the viewport, column DOM updates.

mod columns;
mod factory;
mod frame;
mod scroller;
mod viewport;

pub use columns::ColumnManager;
pub use factory::{is_skeleton, row_index, DefaultElementFactory, ElementFactory};
pub use frame::FrameGate;
pub use scroller::{RowWindow, Scroller};
pub use viewport::{Viewport, ViewportUpdate};

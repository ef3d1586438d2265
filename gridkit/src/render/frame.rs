//! Frame-tick coalescing for scroll events.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Coalesces scroll events into at most one render tick per frame.
///
/// The scroll handler calls [`request`](Self::request); only the call that
/// flips the gate from idle to pending should schedule a tick. Redundant
/// scroll events while a tick is pending collapse into it. The tick itself
/// calls [`take`](Self::take) to consume the pending flag before running.
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    pending: Arc<AtomicBool>,
}

impl FrameGate {
    /// Creates an idle gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a tick. Returns `true` when the caller must schedule one;
    /// `false` when a tick is already pending.
    pub fn request(&self) -> bool {
        !self.pending.swap(true, Ordering::SeqCst)
    }

    /// Consumes the pending flag. Returns `true` when a tick was pending.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::SeqCst)
    }

    /// Whether a tick is pending.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }
}

//! Start/end callbacks that let a UI layer show a busy indicator.
//!
//! # Design
//! The dispatcher calls [`ScreenHook::enter`] right before issuing a call.
//! That fires `on_start` and returns a guard whose `Drop` fires `on_end`,
//! so `on_end` runs exactly once however the call finishes: response,
//! failure, timeout, or the send future being dropped mid-flight.

use std::fmt;
use std::sync::Arc;

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Caller-owned pair of lifecycle callbacks. Cloning is cheap.
///
/// Callbacks run on whichever task drives the send future and must not
/// block.
#[derive(Clone, Default)]
pub struct ScreenHook {
    on_start: Option<Callback>,
    on_end: Option<Callback>,
}

impl ScreenHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_start = Some(Arc::new(callback));
        self
    }

    pub fn on_end(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_end = Some(Arc::new(callback));
        self
    }

    /// Fire `on_start` and return the guard that fires `on_end` when dropped.
    pub fn enter(&self) -> HookGuard {
        if let Some(on_start) = &self.on_start {
            on_start();
        }
        HookGuard {
            on_end: self.on_end.clone(),
        }
    }
}

impl fmt::Debug for ScreenHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenHook")
            .field("on_start", &self.on_start.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

/// Fires the hook's `on_end` callback once, on drop.
#[must_use = "dropping the guard fires on_end immediately"]
pub struct HookGuard {
    on_end: Option<Callback>,
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        if let Some(on_end) = self.on_end.take() {
            on_end();
        }
    }
}

//! Where the sample's results and busy state end up.
//!
//! # Design
//! The core only emits `on_start` / `on_end`. [`BusyIndicator`] turns those
//! into an in-flight count so overlapping requests show one loading state,
//! and [`DisplaySink`] receives one summary line per finished request.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use apiclient_core::ScreenHook;
use tracing::{error, info};

use crate::Verb;

pub trait DisplaySink: Send + Sync {
    fn success(&self, verb: Verb, summary: &str);
    fn failure(&self, verb: Verb, message: &str);
}

/// Writes results through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DisplaySink for LogSink {
    fn success(&self, verb: Verb, summary: &str) {
        info!(%verb, "{verb} response: {summary}");
    }

    fn failure(&self, verb: Verb, message: &str) {
        error!(%verb, "{verb} request failed: {message}");
    }
}

/// Shared loading-screen state driven by request hooks.
#[derive(Debug, Clone, Default)]
pub struct BusyIndicator {
    in_flight: Arc<AtomicUsize>,
}

impl BusyIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    /// A hook that counts this request while it is in flight.
    pub fn hook(&self) -> ScreenHook {
        let start = Arc::clone(&self.in_flight);
        let end = Arc::clone(&self.in_flight);
        ScreenHook::new()
            .on_start(move || {
                if start.fetch_add(1, Ordering::SeqCst) == 0 {
                    info!("loading screen shown");
                }
            })
            .on_end(move || {
                if end.fetch_sub(1, Ordering::SeqCst) == 1 {
                    info!("loading screen hidden");
                }
            })
    }
}

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counters tracking webhook dispatch outcomes.
///
/// All counters use relaxed ordering. For a consistent point-in-time view,
/// call [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Webhook deliveries received.
    pub received: AtomicU64,
    /// Events a handler processed successfully.
    pub handled: AtomicU64,
    /// Events whose handler returned an error.
    pub handler_failed: AtomicU64,
    /// Snap events no handler is registered for.
    pub unrecognized: AtomicU64,
    /// Envelopes whose message type is not a snap event.
    pub unhandled_message_type: AtomicU64,
    /// Envelopes or payloads that could not be decoded.
    pub decode_failed: AtomicU64,
}

impl DispatchMetrics {
    pub fn increment_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_handled(&self) {
        self.handled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_handler_failed(&self) {
        self.handler_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_unrecognized(&self) {
        self.unrecognized.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_unhandled_message_type(&self) {
        self.unhandled_message_type.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_decode_failed(&self) {
        self.decode_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> DispatchMetricsSnapshot {
        DispatchMetricsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            handled: self.handled.load(Ordering::Relaxed),
            handler_failed: self.handler_failed.load(Ordering::Relaxed),
            unrecognized: self.unrecognized.load(Ordering::Relaxed),
            unhandled_message_type: self.unhandled_message_type.load(Ordering::Relaxed),
            decode_failed: self.decode_failed.load(Ordering::Relaxed),
        }
    }
}

/// A plain-data snapshot of [`DispatchMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchMetricsSnapshot {
    pub received: u64,
    pub handled: u64,
    pub handler_failed: u64,
    pub unrecognized: u64,
    pub unhandled_message_type: u64,
    pub decode_failed: u64,
}

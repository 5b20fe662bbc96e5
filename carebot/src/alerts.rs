//! Alert sinks.
//!
//! - `TracingAlertSink` - log line per alert, level by severity
//! - `AlertHistory` - bounded in-memory history, newest first
//! - `FanOutSink` - delivers to every subscribed sink
//! - `ChannelAlertSink` - forwards into an unbounded tokio channel
//!
//! None of them block or report failures to the caller.

use carebot_common::alert::{AlertEvent, AlertSink, Severity};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

// ─── Tracing ────────────────────────────────────────────────────────

/// Logs every alert: info, warn or error by severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn notify(&self, event: AlertEvent) {
        match event.severity {
            Severity::Info => info!("📢 [INFO] {}", event.message),
            Severity::Warning => warn!(
                requires_manual = event.requires_manual,
                "📢 [WARNING] {}", event.message
            ),
            Severity::Critical => error!(
                requires_manual = event.requires_manual,
                "📢 [CRITICAL] {}", event.message
            ),
        }
    }
}

// ─── History ────────────────────────────────────────────────────────

/// Bounded alert history; the oldest entry is dropped when full.
#[derive(Debug)]
pub struct AlertHistory {
    capacity: usize,
    events: Mutex<VecDeque<AlertEvent>>,
}

impl AlertHistory {
    /// History keeping at most `capacity` alerts (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            events: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Up to `limit` alerts, newest first.
    pub fn recent(&self, limit: usize) -> Vec<AlertEvent> {
        self.events.lock().iter().rev().take(limit).cloned().collect()
    }

    /// Stored alerts.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Nothing stored yet.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Maximum number of stored alerts.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl AlertSink for AlertHistory {
    fn notify(&self, event: AlertEvent) {
        let mut events = self.events.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }
}

// ─── Fan-out ────────────────────────────────────────────────────────

/// Subscriber list; every alert goes to every sink, in subscription order.
#[derive(Default)]
pub struct FanOutSink {
    sinks: RwLock<Vec<Arc<dyn AlertSink>>>,
}

impl FanOutSink {
    /// Fan-out over an initial set of sinks.
    pub fn new(sinks: Vec<Arc<dyn AlertSink>>) -> Self {
        Self {
            sinks: RwLock::new(sinks),
        }
    }

    /// Add a sink.
    pub fn subscribe(&self, sink: Arc<dyn AlertSink>) {
        self.sinks.write().push(sink);
    }

    /// Number of sinks.
    pub fn len(&self) -> usize {
        self.sinks.read().len()
    }

    /// No sinks.
    pub fn is_empty(&self) -> bool {
        self.sinks.read().is_empty()
    }
}

impl AlertSink for FanOutSink {
    fn notify(&self, event: AlertEvent) {
        let sinks = self.sinks.read().clone();
        for sink in sinks {
            sink.notify(event.clone());
        }
    }
}

// ─── Channel ────────────────────────────────────────────────────────

/// Forwards alerts into a tokio channel, e.g. for a dashboard broadcaster.
#[derive(Debug, Clone)]
pub struct ChannelAlertSink {
    tx: mpsc::UnboundedSender<AlertEvent>,
}

impl ChannelAlertSink {
    /// Sink plus the receiving end.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AlertEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl AlertSink for ChannelAlertSink {
    fn notify(&self, event: AlertEvent) {
        if let Err(e) = self.tx.send(event) {
            debug!("Alert receiver gone, dropped: {}", e.0.message);
        }
    }
}

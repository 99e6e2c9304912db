//! Incremental delivery of discovered items.
//!
//! A [`ResultStream`] fans each discovery out to every registered
//! subscriber in registration order, so a consumer can render partial
//! results during a long scan instead of waiting for completion. Delivery
//! is over unbounded channels: the emitter never blocks, subscribers drain
//! at their own pace, and items already delivered are never retracted.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::SystemTime;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use optiscan_common::report::{DiscoveredItem, Discovery};

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Default)]
pub struct ResultStream {
    subscribers: Mutex<Vec<UnboundedSender<DiscoveredItem>>>,
    closed: AtomicBool,
}

impl ResultStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber. Items emitted before subscription are
    /// not replayed; subscribing to a closed stream yields immediate
    /// end-of-stream.
    pub fn subscribe(&self) -> UnboundedReceiver<DiscoveredItem> {
        let (tx, rx) = mpsc::unbounded_channel();
        if !self.closed.load(Ordering::Acquire) {
            self.subscribers.lock().unwrap().push(tx);
        }
        rx
    }

    /// Wraps `payload` in the envelope and delivers it to all live
    /// subscribers, pruning any whose receiver is gone.
    pub fn emit(&self, source_tool: &str, payload: Discovery) {
        let item = DiscoveredItem {
            id: NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed),
            source_tool: source_tool.to_string(),
            discovered_at: SystemTime::now(),
            payload,
        };

        self.subscribers
            .lock()
            .unwrap()
            .retain(|tx| tx.send(item.clone()).is_ok());
    }

    /// Drops all subscriber senders so receivers observe end-of-stream
    /// once they have drained what was already delivered.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.subscribers.lock().unwrap().clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}

//! In-process broadcast of delivered signals to live subscriptions.

use crate::signal::Signal;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::trace;

/// Which signals a subscriber wants relayed.
enum Filter {
    All,
    Only(Vec<Signal>),
}

impl Filter {
    fn matches(&self, signal: Signal) -> bool {
        match self {
            Self::All => true,
            Self::Only(set) => set.contains(&signal),
        }
    }
}

struct Entry {
    filter: Filter,
    tx: mpsc::Sender<Signal>,
}

/// Broadcast registry above the process-wide signal handlers.
///
/// The platform owns a single handler per signal; this registry multiplexes
/// it, cloning every delivered signal to every matching subscriber so that
/// independent concurrent waiters each receive their own notification.
#[derive(Default)]
pub(crate) struct Fanout {
    subscribers: Mutex<HashMap<u64, Entry>>,
    next_id: AtomicU64,
}

impl Fanout {
    /// Adds a subscriber with a capacity-1 queue. Empty `signals` matches
    /// everything.
    pub(crate) fn register(&self, signals: &[Signal]) -> (u64, mpsc::Receiver<Signal>) {
        let (tx, rx) = mpsc::channel(1);
        let filter = if signals.is_empty() {
            Filter::All
        } else {
            Filter::Only(signals.to_vec())
        };
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().insert(id, Entry { filter, tx });
        trace!(id, "subscription registered");
        (id, rx)
    }

    /// Removes a subscriber. Idempotent.
    pub(crate) fn unregister(&self, id: u64) {
        if self.subscribers.lock().remove(&id).is_some() {
            trace!(id, "subscription released");
        }
    }

    /// Delivers `signal` to every matching subscriber.
    pub(crate) fn broadcast(&self, signal: Signal) {
        let subscribers = self.subscribers.lock();
        for entry in subscribers.values().filter(|e| e.filter.matches(signal)) {
            // A full slot means an undelivered signal is already pending;
            // further deliveries coalesce into it.
            let _ = entry.tx.try_send(signal);
        }
    }

    /// Number of live subscribers.
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

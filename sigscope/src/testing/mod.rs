//! Test doubles for the delivery subsystem.
//!
//! This module provides:
//! - [`ManualDelivery`], a delivery subsystem driven by hand
//!
//! It runs the same fan-out registry as the OS-backed delivery, with signals
//! raised by the test instead of the platform, so waits and scopes can be
//! exercised in isolation with no process-wide signal handlers involved.

use crate::delivery::{Fanout, SignalDelivery, Subscription};
use crate::signal::Signal;
use std::fmt;
use std::sync::Arc;

/// A delivery subsystem driven by hand.
///
/// Clones share the same registry, so a clone moved into a task raises
/// signals to subscriptions created through the original.
#[derive(Clone, Default)]
pub struct ManualDelivery {
    fanout: Arc<Fanout>,
}

impl ManualDelivery {
    /// Creates a delivery with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Broadcasts `signal` to every currently matching subscription.
    pub fn raise(&self, signal: Signal) {
        self.fanout.broadcast(signal);
    }

    /// Number of live subscriptions.
    ///
    /// Zero once every wait and scope has released its registration.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.fanout.subscriber_count()
    }
}

impl SignalDelivery for ManualDelivery {
    fn subscribe(&self, signals: &[Signal]) -> Subscription {
        Subscription::new(Arc::clone(&self.fanout), signals)
    }
}

impl fmt::Debug for ManualDelivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualDelivery")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

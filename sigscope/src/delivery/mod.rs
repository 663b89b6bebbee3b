//! The signal delivery subsystem.
//!
//! This module provides:
//! - [`SignalDelivery`], the injectable subscribe/unsubscribe collaborator
//! - [`Subscription`], a registration owning a single-slot delivery queue
//! - [`OsDelivery`], the process-backed implementation
//!
//! Delivery is broadcast, never consume-once: every live subscription whose
//! filter matches a delivered signal receives its own copy.

mod fanout;
mod os;

pub(crate) use fanout::Fanout;
pub use os::OsDelivery;

use crate::signal::Signal;
use std::fmt;
use std::io;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Failure to stand up signal delivery.
///
/// Registration with the OS is the only environmental failure surface in this
/// crate; it is reported once, at construction of the delivery subsystem.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The process-level signal handler could not be registered.
    #[error("signal registration failed: {0}")]
    Registration(#[from] io::Error),
}

/// A source of signal subscriptions.
///
/// An empty signal set subscribes to every deliverable signal. Subscribing
/// never fails; any interaction with the OS happens when the implementation
/// is constructed.
pub trait SignalDelivery: Send + Sync {
    /// Registers interest in `signals` and returns the live registration.
    fn subscribe(&self, signals: &[Signal]) -> Subscription;
}

/// A live registration with the delivery subsystem.
///
/// Owns a single-slot queue, so a signal raised concurrently with the
/// registration is not lost, and at most one delivery is ever pending. The
/// registration is released when the subscription is dropped, on every exit
/// path of the call that created it; it must not outlive that call.
pub struct Subscription {
    rx: mpsc::Receiver<Signal>,
    fanout: Arc<Fanout>,
    id: u64,
}

impl Subscription {
    pub(crate) fn new(fanout: Arc<Fanout>, signals: &[Signal]) -> Self {
        let (id, rx) = fanout.register(signals);
        Self { rx, fanout, id }
    }

    /// Waits for the next delivered signal.
    ///
    /// Returns `None` only if the delivery subsystem has been torn down.
    pub async fn recv(&mut self) -> Option<Signal> {
        self.rx.recv().await
    }

    /// Releases the registration.
    ///
    /// Dropping the subscription does the same; this consumer exists for call
    /// sites that want the release to be explicit.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.fanout.unregister(self.id);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

//! Process-backed signal delivery relayed from the OS.

use super::{DeliveryError, Fanout, SignalDelivery, Subscription};
use crate::signal::Signal;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Signal delivery backed by the process's real signal handlers.
///
/// One OS-level stream per deliverable signal is registered up front, each
/// relayed into a shared fan-out registry. Any number of concurrent
/// subscriptions each receive their own copy of every matching signal, and
/// [`subscribe`](SignalDelivery::subscribe) itself can never fail: the only
/// environmental failure, handler registration, surfaces once from
/// [`new`](Self::new).
///
/// Dropping the delivery stops the relay tasks. Live subscriptions keep their
/// queues but observe no further signals.
pub struct OsDelivery {
    fanout: Arc<Fanout>,
    stop: CancellationToken,
}

impl OsDelivery {
    /// Registers the process-level handlers and starts the relay tasks.
    ///
    /// Must be called within a tokio runtime.
    pub fn new() -> Result<Self, DeliveryError> {
        let fanout = Arc::new(Fanout::default());
        let stop = CancellationToken::new();
        spawn_relays(&fanout, &stop)?;
        Ok(Self { fanout, stop })
    }
}

impl SignalDelivery for OsDelivery {
    fn subscribe(&self, signals: &[Signal]) -> Subscription {
        Subscription::new(Arc::clone(&self.fanout), signals)
    }
}

impl Drop for OsDelivery {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

impl fmt::Debug for OsDelivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OsDelivery")
            .field("subscriber_count", &self.fanout.subscriber_count())
            .finish()
    }
}

#[cfg(unix)]
fn spawn_relays(fanout: &Arc<Fanout>, stop: &CancellationToken) -> Result<(), DeliveryError> {
    use tokio::signal::unix::signal;

    for sig in Signal::ALL {
        let mut stream = signal(sig.as_kind())?;
        let fanout = Arc::clone(fanout);
        let stop = stop.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = stop.cancelled() => break,
                    received = stream.recv() => match received {
                        Some(()) => {
                            debug!(signal = %sig, "relaying signal");
                            fanout.broadcast(sig);
                        }
                        None => {
                            warn!(signal = %sig, "signal stream closed");
                            break;
                        }
                    }
                }
            }
        });
    }
    Ok(())
}

#[cfg(not(unix))]
fn spawn_relays(fanout: &Arc<Fanout>, stop: &CancellationToken) -> Result<(), DeliveryError> {
    // Only Ctrl-C is deliverable here; registration happens inside the task
    // on first await, so construction cannot observe it fail.
    let fanout = Arc::clone(fanout);
    let stop = stop.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = stop.cancelled() => break,
                received = tokio::signal::ctrl_c() => match received {
                    Ok(()) => {
                        debug!(signal = %Signal::Interrupt, "relaying signal");
                        fanout.broadcast(Signal::Interrupt);
                    }
                    Err(error) => {
                        warn!(%error, "ctrl-c listener failed");
                        break;
                    }
                }
            }
        }
    });
    Ok(())
}

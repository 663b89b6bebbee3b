//! Blocking wait for the first of: a delivered signal, or cancellation.

use crate::cancellation::CancelContext;
use crate::delivery::SignalDelivery;
use crate::signal::Signal;
use tracing::trace;

/// Waits until one of `signals` is delivered or `ctx` is canceled.
///
/// Returns the received signal, or `None` if the context was done first:
/// already canceled on entry, canceled mid-wait, or past its deadline. If
/// `signals` is empty, every deliverable signal is relayed.
///
/// Multiple concurrent calls with overlapping or identical signal sets work
/// correctly: each call holds its own subscription and receives its own copy
/// of every matching signal. The subscription is released on every exit path,
/// including when the returned future is dropped mid-wait.
///
/// This function never times out on its own; time-bounding is the caller's
/// responsibility, composed through the context (see
/// [`CancelContext::child_with_timeout`]). A signal arriving at the same
/// instant the context is canceled may resolve either way; callers must not
/// assume an ordering between the two.
pub async fn wait<D>(delivery: &D, ctx: &CancelContext, signals: &[Signal]) -> Option<Signal>
where
    D: SignalDelivery + ?Sized,
{
    let mut subscription = delivery.subscribe(signals);
    tokio::select! {
        received = subscription.recv() => {
            trace!(signal = ?received, "wait resolved by delivery");
            received
        }
        () = ctx.cancelled() => None,
    }
}

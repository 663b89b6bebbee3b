//! Cancellable execution scopes that cancel on subscribed signals.

use crate::cancellation::{CancelCause, CancelContext, CancelHandle};
use crate::delivery::{SignalDelivery, Subscription};
use crate::signal::Signal;
use std::future::Future;
use tracing::debug;

/// Cancels the scope's child with the neutral cause on every exit path,
/// including unwinds and mid-`run` drops of the scope future. First-cause-wins
/// keeps a signal cause intact.
struct ScopeCleanup {
    handle: CancelHandle,
}

impl Drop for ScopeCleanup {
    fn drop(&mut self) {
        self.handle.cancel(CancelCause::Canceled);
    }
}

/// Runs `run` inside a child of `parent` that is canceled when one of
/// `signals` is delivered, returning `run`'s output unmodified.
///
/// The child context supports cancel-with-cause: when a subscribed signal
/// arrives, the child is canceled with [`CancelCause::Signal`], retrievable
/// afterwards through [`CancelContext::signal_cause`]. Parent-driven
/// cancellation leaves no signal cause. An empty `signals` slice watches every
/// deliverable signal, the same policy as [`wait`](crate::wait).
///
/// This function never fails on its own account; it surfaces exactly what
/// `run` returns, for both `Ok` and `Err`. Its only side effects are the
/// child's cancellation and the subscription lifecycle: once `run` returns,
/// the child is canceled with the neutral [`CancelCause::Canceled`] if no
/// signal got there first, and the subscription is released before this
/// function returns.
pub async fn run_with_signals<D, F, Fut, T, E>(
    delivery: &D,
    parent: &CancelContext,
    signals: &[Signal],
    run: F,
) -> Result<T, E>
where
    D: SignalDelivery + ?Sized,
    F: FnOnce(CancelContext) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let (child, handle) = parent.child_labeled(scope_label(parent, signals));
    let subscription = delivery.subscribe(signals);
    let cleanup = ScopeCleanup {
        handle: handle.clone(),
    };

    // No listener if cancellation already happened before the registration
    // completed; the subscription is released right here instead.
    let listener = if child.is_cancelled() {
        drop(subscription);
        None
    } else {
        Some(tokio::spawn(listen(subscription, child.clone(), handle)))
    };

    let result = run(child).await;

    drop(cleanup);
    if let Some(task) = listener {
        // Terminates promptly: the cleanup cancel above wakes its select.
        let _ = task.await;
    }
    result
}

/// One select per scope: deliver-then-cancel, or stand down once the child is
/// already done.
async fn listen(mut subscription: Subscription, ctx: CancelContext, handle: CancelHandle) {
    tokio::select! {
        received = subscription.recv() => {
            if let Some(signal) = received {
                debug!(%signal, scope = %ctx, "canceling scope on signal");
                handle.cancel(CancelCause::Signal(signal));
            }
        }
        () = ctx.cancelled() => {}
    }
}

fn scope_label(parent: &CancelContext, signals: &[Signal]) -> String {
    let names: Vec<&str> = signals.iter().map(|s| s.name()).collect();
    if names.is_empty() {
        format!("signal-scope({})", parent.label())
    } else {
        format!("signal-scope({}, [{}])", parent.label(), names.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualDelivery;

    #[tokio::test]
    async fn test_scope_returns_run_success_unmodified() {
        let delivery = ManualDelivery::new();
        let root = CancelContext::new();

        let result: Result<u32, String> =
            run_with_signals(&delivery, &root, &[Signal::Interrupt], |_ctx| async move {
                Ok(42)
            })
            .await;

        assert_eq!(result, Ok(42));
    }

    #[tokio::test]
    async fn test_scope_returns_run_error_unmodified() {
        let delivery = ManualDelivery::new();
        let root = CancelContext::new();

        let result: Result<(), String> =
            run_with_signals(&delivery, &root, &[Signal::Interrupt], |_ctx| async move {
                Err("worker failed".to_string())
            })
            .await;

        assert_eq!(result, Err("worker failed".to_string()));
    }

    #[tokio::test]
    async fn test_signal_cancels_child_with_cause() {
        let delivery = ManualDelivery::new();
        let root = CancelContext::new();

        let result: Result<Option<Signal>, ()> = run_with_signals(
            &delivery,
            &root,
            &[Signal::Interrupt],
            |ctx| {
                let delivery = delivery.clone();
                async move {
                    delivery.raise(Signal::Interrupt);
                    ctx.cancelled().await;
                    assert!(ctx.cause().unwrap().is_canceled());
                    Ok(ctx.signal_cause())
                }
            },
        )
        .await;

        assert_eq!(result, Ok(Some(Signal::Interrupt)));
    }

    #[tokio::test]
    async fn test_parent_cancellation_leaves_no_signal_cause() {
        let delivery = ManualDelivery::new();
        let root = CancelContext::new();
        let (parent, parent_handle) = root.child();

        let result: Result<Option<Signal>, ()> = run_with_signals(
            &delivery,
            &parent,
            &[Signal::Interrupt],
            |ctx| async move {
                parent_handle.cancel(CancelCause::Canceled);
                ctx.cancelled().await;
                Ok(ctx.signal_cause())
            },
        )
        .await;

        assert_eq!(result, Ok(None));
    }

    #[tokio::test]
    async fn test_child_is_canceled_neutrally_after_run_returns() {
        let delivery = ManualDelivery::new();
        let root = CancelContext::new();

        let mut escaped = None;
        let _: Result<(), ()> =
            run_with_signals(&delivery, &root, &[Signal::Interrupt], |ctx| {
                escaped = Some(ctx);
                async move { Ok(()) }
            })
            .await;

        let ctx = escaped.unwrap();
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.cause(), Some(CancelCause::Canceled));
        assert_eq!(ctx.signal_cause(), None);
    }

    #[tokio::test]
    async fn test_subscription_released_once_scope_returns() {
        let delivery = ManualDelivery::new();
        let root = CancelContext::new();

        let _: Result<(), ()> =
            run_with_signals(&delivery, &root, &[Signal::Interrupt], |_ctx| async move {
                Ok(())
            })
            .await;

        assert_eq!(delivery.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_already_canceled_parent_still_runs_and_cleans_up() {
        let delivery = ManualDelivery::new();
        let root = CancelContext::new();
        let (parent, handle) = root.child();
        handle.cancel(CancelCause::Canceled);

        let result: Result<bool, ()> = run_with_signals(
            &delivery,
            &parent,
            &[Signal::Interrupt],
            |ctx| async move { Ok(ctx.is_cancelled()) },
        )
        .await;

        assert_eq!(result, Ok(true));
        assert_eq!(delivery.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_unsubscribed_signal_does_not_cancel_scope() {
        let delivery = ManualDelivery::new();
        let root = CancelContext::new();

        let result: Result<bool, ()> = run_with_signals(
            &delivery,
            &root,
            &[Signal::Terminate],
            |ctx| {
                let delivery = delivery.clone();
                async move {
                    delivery.raise(Signal::Interrupt);
                    tokio::task::yield_now().await;
                    Ok(ctx.is_cancelled())
                }
            },
        )
        .await;

        assert_eq!(result, Ok(false));
    }

    #[tokio::test]
    async fn test_scope_label_composition() {
        let delivery = ManualDelivery::new();
        let root = CancelContext::named("app");

        let label: Result<String, ()> = run_with_signals(
            &delivery,
            &root,
            &[Signal::Interrupt, Signal::Terminate],
            |ctx| async move { Ok(ctx.label().to_string()) },
        )
        .await;

        assert_eq!(label, Ok("signal-scope(app, [SIGINT SIGTERM])".to_string()));
    }

    #[tokio::test]
    async fn test_wildcard_scope_label() {
        let delivery = ManualDelivery::new();
        let root = CancelContext::named("app");

        let label: Result<String, ()> =
            run_with_signals(&delivery, &root, &[], |ctx| async move {
                Ok(ctx.label().to_string())
            })
            .await;

        assert_eq!(label, Ok("signal-scope(app)".to_string()));
    }
}

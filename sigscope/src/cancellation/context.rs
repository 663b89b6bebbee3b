//! Cancelable execution contexts with cause propagation.

use super::cause::CancelCause;
use crate::signal::Signal;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Write-once slot for the recorded cause. First writer wins.
#[derive(Default)]
struct CauseSlot {
    value: RwLock<Option<CancelCause>>,
}

impl CauseSlot {
    fn try_set(&self, cause: CancelCause) -> bool {
        let mut slot = self.value.write();
        if slot.is_none() {
            *slot = Some(cause);
            true
        } else {
            false
        }
    }

    fn get(&self) -> Option<CancelCause> {
        *self.value.read()
    }
}

struct Inner {
    token: CancellationToken,
    cause: CauseSlot,
    parent: Option<Arc<Inner>>,
    label: String,
}

/// A propagatable, cancelable handle over a scope of execution.
///
/// Contexts form a hierarchy: canceling a parent cancels every derived child.
/// A derived child can additionally be canceled with an explicit
/// [`CancelCause`] through its [`CancelHandle`]; the cause is write-once and
/// shared read-only with every clone of the context.
///
/// The done-notification ([`cancelled`](Self::cancelled)) fires once and is
/// observable by any number of concurrent waiters.
///
/// Each context carries a `label` set at construction, rendered by `Display`.
#[derive(Clone)]
pub struct CancelContext {
    inner: Arc<Inner>,
}

/// The cancel function for a derived [`CancelContext`].
///
/// Cloneable; [`cancel`](Self::cancel) is idempotent. The first cause wins
/// and later calls are no-ops, including after parent-driven cancellation.
#[derive(Clone)]
pub struct CancelHandle {
    inner: Arc<Inner>,
}

impl CancelContext {
    /// Creates a root context that is never canceled.
    #[must_use]
    pub fn new() -> Self {
        Self::named("background")
    }

    /// Creates a root context with an explicit label.
    #[must_use]
    pub fn named(label: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                token: CancellationToken::new(),
                cause: CauseSlot::default(),
                parent: None,
                label: label.into(),
            }),
        }
    }

    /// The label this context was constructed with.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Derives a child context that can be canceled with an explicit cause.
    ///
    /// The child inherits this context's label and is also canceled whenever
    /// this context is.
    #[must_use]
    pub fn child(&self) -> (Self, CancelHandle) {
        self.child_labeled(self.inner.label.clone())
    }

    /// Derives a child context with its own label.
    #[must_use]
    pub fn child_labeled(&self, label: impl Into<String>) -> (Self, CancelHandle) {
        let inner = Arc::new(Inner {
            token: self.inner.token.child_token(),
            cause: CauseSlot::default(),
            parent: Some(Arc::clone(&self.inner)),
            label: label.into(),
        });
        (
            Self {
                inner: Arc::clone(&inner),
            },
            CancelHandle { inner },
        )
    }

    /// Derives a child context that cancels itself with
    /// [`CancelCause::DeadlineExceeded`] once `timeout` elapses.
    ///
    /// Must be called within a tokio runtime.
    #[must_use]
    pub fn child_with_timeout(&self, timeout: Duration) -> (Self, CancelHandle) {
        let (ctx, handle) = self.child();
        let watch = ctx.clone();
        let deadline = handle.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(timeout) => {
                    deadline.cancel(CancelCause::DeadlineExceeded);
                }
                () = watch.cancelled() => {}
            }
        });
        (ctx, handle)
    }

    /// Completes once this context is canceled.
    ///
    /// Fires immediately if cancellation already happened; observable by any
    /// number of concurrent waiters.
    pub async fn cancelled(&self) {
        self.inner.token.cancelled().await;
    }

    /// Whether this context has been canceled, directly or through a parent.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// The cause this context was canceled with, or `None` while it is live.
    ///
    /// For parent-driven cancellation this is the nearest recorded cause up
    /// the parent chain; a canceled context with no recorded cause anywhere
    /// reports [`CancelCause::Canceled`].
    #[must_use]
    pub fn cause(&self) -> Option<CancelCause> {
        if !self.is_cancelled() {
            return None;
        }
        let mut current = Some(&self.inner);
        while let Some(inner) = current {
            if let Some(cause) = inner.cause.get() {
                return Some(cause);
            }
            current = inner.parent.as_ref();
        }
        Some(CancelCause::Canceled)
    }

    /// The signal that canceled this context, if cancellation was caused by
    /// one.
    ///
    /// Returns `None` for any other cancellation reason: parent-driven,
    /// deadline expiry, or not canceled at all.
    #[must_use]
    pub fn signal_cause(&self) -> Option<Signal> {
        match self.cause() {
            Some(CancelCause::Signal(signal)) => Some(signal),
            _ => None,
        }
    }
}

impl Default for CancelContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CancelContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.label)
    }
}

impl fmt::Debug for CancelContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelContext")
            .field("label", &self.inner.label)
            .field("cancelled", &self.is_cancelled())
            .field("cause", &self.cause())
            .finish()
    }
}

impl CancelHandle {
    /// Cancels the derived context with `cause`.
    ///
    /// No-op if the context is already canceled, by this handle or through
    /// its parent; the first recorded cause is kept.
    pub fn cancel(&self, cause: CancelCause) {
        if self.inner.token.is_cancelled() {
            return;
        }
        if self.inner.cause.try_set(cause) {
            debug!(context = %self.inner.label, %cause, "context canceled");
            self.inner.token.cancel();
        }
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("label", &self.inner.label)
            .field("cancelled", &self.inner.token.is_cancelled())
            .finish()
    }
}

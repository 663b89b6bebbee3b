//! Why a context was canceled.

use crate::signal::Signal;
use thiserror::Error;

/// The reason a [`CancelContext`](super::CancelContext) was canceled.
///
/// A cause is attached at the moment of cancellation and is immutable
/// afterwards: a context is canceled by exactly one cause, set at most once
/// (first writer wins). The [`Signal`](CancelCause::Signal) variant composes
/// the canonical canceled condition with the triggering signal, so a generic
/// [`is_canceled`](CancelCause::is_canceled) check still succeeds while the
/// specific signal stays retrievable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CancelCause {
    /// Canceled without a specific trigger: scope cleanup, or an explicit
    /// cancel with no signal involved.
    #[error("operation canceled")]
    Canceled,

    /// A deadline attached to the context expired.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// A subscribed signal arrived.
    #[error("operation canceled ({0})")]
    Signal(Signal),
}

impl CancelCause {
    /// Whether this cause represents a cancellation, as opposed to a deadline
    /// expiry.
    ///
    /// True for [`Canceled`](Self::Canceled) and any
    /// [`Signal`](Self::Signal) cause.
    #[must_use]
    pub const fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled | Self::Signal(_))
    }

    /// The signal that triggered the cancellation, if there was one.
    #[must_use]
    pub const fn signal(&self) -> Option<Signal> {
        match self {
            Self::Signal(signal) => Some(*signal),
            Self::Canceled | Self::DeadlineExceeded => None,
        }
    }
}

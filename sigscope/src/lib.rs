//! # Sigscope
//!
//! Signal-aware cancellation scopes for graceful process shutdown.
//!
//! Sigscope bridges asynchronous OS signal delivery into cooperative
//! cancellation:
//!
//! - **Signal waiting**: block until one of a chosen set of signals arrives
//!   or a cancellation context is done
//! - **Cancellable scopes**: run a unit of work inside a child context that
//!   is canceled by a subscribed signal, and recover which signal it was
//! - **Cause propagation**: write-once cancellation causes that compose with
//!   generic is-canceled checks
//! - **Injected delivery**: OS registration is a swappable collaborator, so
//!   everything is testable against an in-memory fake
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sigscope::prelude::*;
//!
//! let delivery = OsDelivery::new()?;
//! let root = CancelContext::new();
//!
//! let signals = [Signal::Interrupt, Signal::Terminate];
//! let result = run_with_signals(&delivery, &root, &signals, |ctx| async move {
//!     serve(ctx.clone()).await?;
//!     if let Some(signal) = ctx.signal_cause() {
//!         tracing::info!(%signal, "shut down by signal");
//!     }
//!     Ok(())
//! })
//! .await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod delivery;
pub mod scope;
pub mod signal;
pub mod testing;
pub mod waiter;


pub use scope::run_with_signals;
pub use waiter::wait;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::{CancelCause, CancelContext, CancelHandle};
    pub use crate::delivery::{DeliveryError, OsDelivery, SignalDelivery, Subscription};
    pub use crate::scope::run_with_signals;
    pub use crate::signal::Signal;
    pub use crate::waiter::wait;
}

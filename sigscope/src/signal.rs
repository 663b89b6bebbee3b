//! Opaque identifiers for OS-level asynchronous interrupt events.

use std::fmt;

#[cfg(unix)]
use tokio::signal::unix::SignalKind;

/// An asynchronous OS-level interrupt event.
///
/// The platform supplies the concrete set; this is the portable vocabulary the
/// delivery subsystem can relay. Values are equality-comparable and cheap to
/// copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Terminal hangup (`SIGHUP`).
    Hangup,
    /// Interactive interrupt, Ctrl-C (`SIGINT`).
    Interrupt,
    /// Interactive quit (`SIGQUIT`).
    Quit,
    /// Broken pipe (`SIGPIPE`).
    Pipe,
    /// Timer expiry (`SIGALRM`).
    Alarm,
    /// Termination request (`SIGTERM`).
    Terminate,
    /// User-defined signal 1 (`SIGUSR1`).
    User1,
    /// User-defined signal 2 (`SIGUSR2`).
    User2,
}

impl Signal {
    /// Every signal the delivery subsystem can relay.
    ///
    /// Subscribing with an empty signal set is equivalent to subscribing to
    /// this whole set.
    pub const ALL: [Self; 8] = [
        Self::Hangup,
        Self::Interrupt,
        Self::Quit,
        Self::Pipe,
        Self::Alarm,
        Self::Terminate,
        Self::User1,
        Self::User2,
    ];

    /// The conventional signal name, e.g. `"SIGINT"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hangup => "SIGHUP",
            Self::Interrupt => "SIGINT",
            Self::Quit => "SIGQUIT",
            Self::Pipe => "SIGPIPE",
            Self::Alarm => "SIGALRM",
            Self::Terminate => "SIGTERM",
            Self::User1 => "SIGUSR1",
            Self::User2 => "SIGUSR2",
        }
    }

    /// The tokio stream kind this signal registers as.
    #[cfg(unix)]
    pub(crate) fn as_kind(self) -> SignalKind {
        match self {
            Self::Hangup => SignalKind::hangup(),
            Self::Interrupt => SignalKind::interrupt(),
            Self::Quit => SignalKind::quit(),
            Self::Pipe => SignalKind::pipe(),
            Self::Alarm => SignalKind::alarm(),
            Self::Terminate => SignalKind::terminate(),
            Self::User1 => SignalKind::user_defined1(),
            Self::User2 => SignalKind::user_defined2(),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

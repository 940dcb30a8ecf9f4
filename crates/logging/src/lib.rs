#![deny(missing_docs)]

//! # Overview
//!
//! Leveled diagnostics shared by every crate in the transfer core. Two
//! consumption paths are supported:
//!
//! - Crates that want structured logs call [`tracing`]'s own macros directly
//!   (gated behind this crate's `tracing` feature, which is on by default);
//!   [`init_subscriber`] installs an [`tracing_subscriber`] filter derived
//!   from a [`Verbosity`] level so a binary doesn't need to hand-roll one.
//! - Library consumers that embed the core without installing a `tracing`
//!   subscriber still observe diagnostics through [`record`]/[`drain`], a
//!   leveled [`Message`] queue independent of any subscriber. The session
//!   handshake's MOTD lines (spec §4.2) and per-file warnings are delivered
//!   this way when no subscriber is present.
//!
//! # Design
//!
//! [`Verbosity`] maps `-v` repeat counts to a threshold; [`Verbosity::allows`]
//! is the single predicate both paths consult so the two never disagree about
//! what should be visible.

use std::sync::Mutex;

/// Severity of a logged [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Always shown; session-ending failures.
    Error,
    /// Always shown; recoverable per-file problems.
    Warning,
    /// Shown once `-v` is passed at least once.
    Info,
    /// Shown once `-v` is passed at least twice.
    Debug,
}

/// Verbosity threshold derived from a count of `-v` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Verbosity(pub u8);

impl Verbosity {
    /// Quietest level: only errors and warnings are visible.
    pub const QUIET: Self = Self(0);

    /// Builds a verbosity threshold from a `-v` repeat count.
    #[must_use]
    pub fn from_flag_count(count: u8) -> Self {
        Self(count)
    }

    /// Returns whether a message at `level` should be surfaced.
    #[must_use]
    pub fn allows(self, level: Level) -> bool {
        match level {
            Level::Error | Level::Warning => true,
            Level::Info => self.0 >= 1,
            Level::Debug => self.0 >= 2,
        }
    }
}

/// A single leveled diagnostic line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Severity of the message.
    pub level: Level,
    /// Human-readable text, already formatted.
    pub text: String,
}

static QUEUE: Mutex<Vec<Message>> = Mutex::new(Vec::new());

/// Records `message` into the in-process queue for consumers without a
/// `tracing` subscriber. Also forwards to `tracing` when the feature is
/// enabled, so both paths stay in sync without double bookkeeping by callers.
pub fn record(level: Level, text: impl Into<String>) {
    let text = text.into();

    #[cfg(feature = "tracing")]
    {
        match level {
            Level::Error => tracing::error!("{text}"),
            Level::Warning => tracing::warn!("{text}"),
            Level::Info => tracing::info!("{text}"),
            Level::Debug => tracing::debug!("{text}"),
        }
    }

    if let Ok(mut queue) = QUEUE.lock() {
        queue.push(Message { level, text });
    }
}

/// Drains and returns every message recorded since the last drain.
pub fn drain() -> Vec<Message> {
    QUEUE.lock().map(|mut q| std::mem::take(&mut *q)).unwrap_or_default()
}

/// Installs a `tracing-subscriber` filter whose threshold matches `verbosity`.
/// A no-op when the `tracing` feature is disabled or a global subscriber is
/// already installed.
#[cfg(feature = "tracing")]
pub fn init_subscriber(verbosity: Verbosity) {
    use tracing_subscriber::EnvFilter;

    let directive = match verbosity.0 {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(not(feature = "tracing"))]
/// Installs a `tracing-subscriber` filter whose threshold matches `verbosity`.
/// A no-op when the `tracing` feature is disabled.
pub fn init_subscriber(_verbosity: Verbosity) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_thresholds_match_flag_counts() {
        assert!(Verbosity::QUIET.allows(Level::Error));
        assert!(Verbosity::QUIET.allows(Level::Warning));
        assert!(!Verbosity::QUIET.allows(Level::Info));
        assert!(!Verbosity::QUIET.allows(Level::Debug));

        let v1 = Verbosity::from_flag_count(1);
        assert!(v1.allows(Level::Info));
        assert!(!v1.allows(Level::Debug));

        let v2 = Verbosity::from_flag_count(2);
        assert!(v2.allows(Level::Debug));
    }

    #[test]
    fn record_and_drain_round_trips() {
        drain();
        record(Level::Warning, "disk almost full");
        record(Level::Info, "connected");
        let messages = drain();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].level, Level::Warning);
        assert!(drain().is_empty());
    }
}

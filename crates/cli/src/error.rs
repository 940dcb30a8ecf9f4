//! Errors raised while parsing command-line arguments or running a session.

/// Errors produced by [`crate::target`] and [`crate::run`].
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A command-line argument could not be parsed.
    #[error(transparent)]
    Args(#[from] clap::Error),
    /// A remote target spec (`host::module/path` or `rsync://host/module/path`)
    /// was malformed.
    #[error("malformed remote target {0:?}: {1}")]
    MalformedTarget(String, &'static str),
    /// Neither SOURCE nor DESTINATION was given, so there's nothing to sync
    /// and nothing to connect to.
    #[error("both SOURCE and DESTINATION are required")]
    NoRemoteTarget,
    /// `--daemon` was passed without `--config`.
    #[error("--daemon requires --config <path>")]
    MissingDaemonConfig,
    /// Daemon configuration, secrets, or connection handling failed.
    #[error(transparent)]
    Daemon(#[from] daemon::DaemonError),
    /// A local transfer (neither side names a remote module) failed.
    #[error(transparent)]
    Session(#[from] rsync_core::CoreError),
}

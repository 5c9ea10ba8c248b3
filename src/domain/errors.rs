// Domain-level errors. Capacity exhaustion is not represented here: a full slot
// table or an empty battery is a normal "skipped" outcome.

use crate::domain::ports::TaskKind;

/// Errors raised when a concurrent task cannot be created.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// No async runtime is reachable from the calling thread.
    #[error("no runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// The launcher declined to start the task.
    #[error("launch refused for {0} task")]
    Refused(TaskKind),
}

/// Errors that abort a run before gameplay starts.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// One of the long-lived loops could not be created.
    #[error("failed to start {name} loop: {source}")]
    LoopLaunch {
        name: &'static str,
        #[source]
        source: LaunchError,
    },

    /// The presentation surface could not be prepared.
    #[error("terminal setup failed: {0}")]
    Terminal(#[from] std::io::Error),
}

use futures::future::BoxFuture;
use std::fmt;
use std::io;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::domain::errors::LaunchError;
use crate::domain::snapshot::Snapshot;
use crate::domain::state::Action;

/// Kinds of tasks the core asks a launcher to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Actor,
    Projectile,
    Reloader,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Actor => "actor",
            Self::Projectile => "projectile",
            Self::Reloader => "reloader",
        };
        f.write_str(name)
    }
}

// Port for creating concurrent tasks; creation may fail and callers roll back.
pub trait TaskLauncher: Send + Sync {
    fn launch(
        &self,
        kind: TaskKind,
        task: BoxFuture<'static, ()>,
    ) -> Result<JoinHandle<()>, LaunchError>;
}

// Port for the presentation surface. Calls are serialized by the publisher and
// must return promptly; the snapshot is read-only.
pub trait PresentationSink: Send {
    /// Current surface size in cells (width, height).
    fn measure(&mut self) -> io::Result<(i32, i32)>;

    fn present(&mut self, snapshot: &Snapshot) -> io::Result<()>;
}

// Port for the input collaborator; blocks for at most `timeout`.
pub trait InputSource: Send {
    fn poll_action(&mut self, timeout: Duration) -> io::Result<Option<Action>>;
}

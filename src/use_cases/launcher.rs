use crate::domain::{LaunchError, TaskKind, TaskLauncher};
use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::trace;

/// Spawns entity tasks on the runtime the caller is running inside.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLauncher;

impl TaskLauncher for TokioLauncher {
    fn launch(
        &self,
        kind: TaskKind,
        task: BoxFuture<'static, ()>,
    ) -> Result<JoinHandle<()>, LaunchError> {
        let handle = Handle::try_current()?;
        trace!(%kind, "launching task");
        Ok(handle.spawn(task))
    }
}

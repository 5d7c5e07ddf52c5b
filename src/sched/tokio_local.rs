use tokio::task::JoinHandle;

use crate::sched::{CommitFn, CommitHandle, CommitSpawner};

/// Tokio-backed spawner for hosts that run a current-thread runtime.
///
/// Commits are spawned with `tokio::task::spawn_local` and yield once
/// before running, so all writes issued in the current tick coalesce.
/// Cancellation aborts the task; a task aborted before its first poll
/// never runs its commit body.
///
/// Must be used from within a [`tokio::task::LocalSet`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLocalSpawner;

impl CommitSpawner for TokioLocalSpawner {
    fn spawn_commit(&self, commit: CommitFn) -> Box<dyn CommitHandle> {
        let handle = tokio::task::spawn_local(async move {
            tokio::task::yield_now().await;
            commit();
        });
        Box::new(TokioCommitHandle { handle })
    }
}

struct TokioCommitHandle {
    handle: JoinHandle<()>,
}

impl CommitHandle for TokioCommitHandle {
    fn cancel(&mut self) -> bool {
        self.handle.abort();
        true
    }
}

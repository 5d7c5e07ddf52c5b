//! The asynchronous commit primitive.
//!
//! A write never applies itself; it schedules a commit deferred by one
//! macro-tick so that every write landing in the same tick folds into a
//! single batched merge. The runtime owns at most one outstanding commit at
//! a time and replaces it on every accepted write.
//!
//! Cancellation is a capability, not a type check: [`CommitHandle::cancel`]
//! returns `false` when the underlying primitive cannot cancel. That mode is
//! degraded but safe — the fire handler re-reads the buffer and the unmount
//! latch at fire time, so a superseded task that runs anyway finds nothing
//! left to do.

mod manual;
mod tokio_local;

pub use manual::ManualSpawner;
pub use tokio_local::TokioLocalSpawner;

/// A commit body handed to a spawner. Runs at most once.
pub type CommitFn = Box<dyn FnOnce()>;

/// Token for one outstanding scheduled commit.
pub trait CommitHandle {
    /// Attempt to prevent the scheduled commit from firing.
    ///
    /// Returns `false` when the primitive does not support cancellation.
    /// Callers must treat that as a no-op, not a failure.
    fn cancel(&mut self) -> bool;
}

/// Schedules commit bodies onto the host's event loop.
///
/// Implementations must defer execution by at least one macro-tick: a
/// commit never runs synchronously inside the write that scheduled it.
pub trait CommitSpawner {
    fn spawn_commit(&self, commit: CommitFn) -> Box<dyn CommitHandle>;
}

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::sched::{CommitFn, CommitHandle, CommitSpawner};

/// Deterministic spawner driven by the host's own tick loop.
///
/// Scheduled commits queue up until the host calls [`run_pending`]
/// (typically once per frame or event-loop turn). Useful for hosts without
/// an async runtime, and for tests that need exact control over when the
/// "macro-tick" elapses.
///
/// [`ManualSpawner::uncancellable`] builds a variant whose handles refuse
/// cancellation, mimicking an async primitive without cancel support. The
/// superseded commit then fires anyway; correctness relies on the fire
/// handler re-reading current state.
///
/// [`run_pending`]: ManualSpawner::run_pending
#[derive(Clone)]
pub struct ManualSpawner {
    queue: Rc<RefCell<Vec<Slot>>>,
    cancellable: bool,
}

struct Slot {
    commit: Option<CommitFn>,
    cancelled: Rc<Cell<bool>>,
}

impl ManualSpawner {
    /// A spawner whose handles support cancellation.
    pub fn new() -> Self {
        Self {
            queue: Rc::new(RefCell::new(Vec::new())),
            cancellable: true,
        }
    }

    /// A spawner whose handles refuse cancellation (degraded mode).
    pub fn uncancellable() -> Self {
        Self {
            cancellable: false,
            ..Self::new()
        }
    }

    /// Number of queued commits that have not been cancelled.
    pub fn scheduled(&self) -> usize {
        self.queue
            .borrow()
            .iter()
            .filter(|slot| !slot.cancelled.get())
            .count()
    }

    /// Run every queued, non-cancelled commit in schedule order.
    ///
    /// Returns how many commit bodies actually ran. Commits scheduled
    /// while running are queued for the next call.
    pub fn run_pending(&self) -> usize {
        let slots = std::mem::take(&mut *self.queue.borrow_mut());
        let mut fired = 0;
        for mut slot in slots {
            if slot.cancelled.get() {
                continue;
            }
            if let Some(commit) = slot.commit.take() {
                commit();
                fired += 1;
            }
        }
        fired
    }
}

impl Default for ManualSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitSpawner for ManualSpawner {
    fn spawn_commit(&self, commit: CommitFn) -> Box<dyn CommitHandle> {
        let cancelled = Rc::new(Cell::new(false));
        self.queue.borrow_mut().push(Slot {
            commit: Some(commit),
            cancelled: Rc::clone(&cancelled),
        });
        Box::new(ManualHandle {
            cancelled,
            cancellable: self.cancellable,
        })
    }
}

struct ManualHandle {
    cancelled: Rc<Cell<bool>>,
    cancellable: bool,
}

impl CommitHandle for ManualHandle {
    fn cancel(&mut self) -> bool {
        if !self.cancellable {
            return false;
        }
        self.cancelled.set(true);
        true
    }
}

//! The deferred-state coalescing engine.
//!
//! Each component instance owns one [`DeferredState`]. Writes through a
//! [`FieldAccessor`](crate::field::FieldAccessor) land in a per-instance
//! deferred buffer and schedule a single commit, deferred by one macro-tick;
//! further writes in the same tick cancel and replace that commit, so the
//! whole tick's writes fold into one batched merge against the host's live
//! state. A teardown latch makes every later commit attempt inert.
//!
//! # Invariants
//!
//! 1. At most one outstanding commit token per instance; every accepted
//!    write cancels the previous token before installing a new one.
//! 2. The buffer holds the most recent write per field; a firing commit
//!    clears exactly the fields it applied.
//! 3. Once unmounting, no commit mutates live state; buffered writes are
//!    inert.
//! 4. Live state is mutated by the commit fire handler only, never by a
//!    field write directly.
//!
//! Everything here is single-threaded: buffer, token, and latch are owned
//! exclusively by their instance, shared through `Rc`, never across threads.

mod marker;
mod teardown;

pub use marker::ChangeMarker;
pub use teardown::TeardownHooks;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::{ConfigStore, LogConfig};
use crate::field::{FieldConfig, ReadOutcome};
use crate::host::{StateHost, StateMap};
use crate::sched::{CommitHandle, CommitSpawner};

/// Per-component-instance deferred state.
///
/// Cheap to clone; clones share the same buffer, pending commit, and
/// unmount latch. The inner runtime is created lazily on the first field
/// access, so instances that never touch a declared field pay nothing.
#[derive(Clone)]
pub struct DeferredState {
    shared: Rc<Shared>,
}

struct Shared {
    host: Rc<RefCell<dyn StateHost>>,
    spawner: Rc<dyn CommitSpawner>,
    log: LogConfig,
    // Latched here rather than on the runtime so an unmount that races
    // ahead of the first field access still suppresses later commits.
    unmounted: Cell<bool>,
    runtime: RefCell<Option<Rc<StateRuntime>>>,
}

impl DeferredState {
    pub fn new(
        host: Rc<RefCell<dyn StateHost>>,
        spawner: Rc<dyn CommitSpawner>,
        log: LogConfig,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                host,
                spawner,
                log,
                unmounted: Cell::new(false),
                runtime: RefCell::new(None),
            }),
        }
    }

    /// Like [`new`](Self::new), reading the diagnostic flags from a shared
    /// config store.
    pub fn from_store(
        host: Rc<RefCell<dyn StateHost>>,
        spawner: Rc<dyn CommitSpawner>,
        store: &ConfigStore,
    ) -> Self {
        Self::new(host, spawner, store.get().log)
    }

    /// The instance runtime, created on first access.
    pub(crate) fn runtime(&self) -> Rc<StateRuntime> {
        if let Some(runtime) = self.shared.runtime.borrow().as_ref() {
            return Rc::clone(runtime);
        }
        let runtime = Rc::new(StateRuntime::new(
            Rc::clone(&self.shared.host),
            Rc::clone(&self.shared.spawner),
            self.shared.log,
            self.shared.unmounted.get(),
        ));
        *self.shared.runtime.borrow_mut() = Some(Rc::clone(&runtime));
        runtime
    }

    fn existing_runtime(&self) -> Option<Rc<StateRuntime>> {
        self.shared.runtime.borrow().clone()
    }

    /// Force an immediate synchronous commit: cancel the pending scheduled
    /// one and apply the buffer inline.
    ///
    /// Idempotent — a second call with no intervening writes finds an empty
    /// buffer and does nothing. No-op before the first field access.
    pub fn commit_now(&self) {
        if let Some(runtime) = self.existing_runtime() {
            runtime.commit_now();
        }
    }

    /// Current change marker. Advances on every accepted write.
    pub fn marker(&self) -> ChangeMarker {
        self.existing_runtime()
            .map(|runtime| runtime.marker())
            .unwrap_or_default()
    }

    /// Whether a scheduled commit is outstanding.
    pub fn has_pending_commit(&self) -> bool {
        self.existing_runtime()
            .map(|runtime| runtime.has_pending_commit())
            .unwrap_or(false)
    }

    pub fn is_unmounting(&self) -> bool {
        self.shared.unmounted.get()
    }

    /// Begin teardown: flips the unmount latch and cancels any pending
    /// commit. Every later scheduled or explicit commit is inert.
    /// Idempotent.
    pub fn begin_unmount(&self) {
        self.shared.unmounted.set(true);
        if let Some(runtime) = self.existing_runtime() {
            runtime.begin_unmount();
        }
    }

    /// Register the unmount guard alongside the host's own teardown
    /// callbacks. The guard composes with them — it never replaces or
    /// reorders what the host registered.
    pub fn install_unmount_guard(&self, hooks: &mut TeardownHooks) {
        let state = self.clone();
        hooks.push(move || state.begin_unmount());
    }
}

/// The per-instance bookkeeping behind [`DeferredState`].
pub(crate) struct StateRuntime {
    host: Rc<RefCell<dyn StateHost>>,
    spawner: Rc<dyn CommitSpawner>,
    log: LogConfig,
    inner: RefCell<RuntimeInner>,
}

struct RuntimeInner {
    deferred: StateMap,
    pending: Option<Box<dyn CommitHandle>>,
    unmounting: bool,
    marker: ChangeMarker,
}

impl StateRuntime {
    fn new(
        host: Rc<RefCell<dyn StateHost>>,
        spawner: Rc<dyn CommitSpawner>,
        log: LogConfig,
        unmounting: bool,
    ) -> Self {
        Self {
            host,
            spawner,
            log,
            inner: RefCell::new(RuntimeInner {
                deferred: StateMap::new(),
                pending: None,
                unmounting,
                marker: ChangeMarker::default(),
            }),
        }
    }

    /// Pending value for `field`, if one is buffered.
    pub(crate) fn buffered(&self, field: &str) -> Option<serde_json::Value> {
        self.inner.borrow().deferred.get(field).cloned()
    }

    /// Read `field` from live state, seeding it from the initializer when
    /// missing. Creates live state if the host never initialized it — the
    /// tagged `Recovered` path.
    pub(crate) fn read_live(&self, field: &str, config: &FieldConfig) -> ReadOutcome {
        let mut host = self.host.borrow_mut();
        match host.live_state_mut() {
            Some(live) => {
                let value = match live.get(field) {
                    Some(value) => value.clone(),
                    None => {
                        let value = config.initial_value();
                        live.insert(field.to_owned(), value.clone());
                        value
                    }
                };
                ReadOutcome::Nominal(value)
            }
            None => {
                if self.log.warn_on_implicit_state_init {
                    tracing::warn!(
                        field,
                        "initializing empty live state from a field getter; \
                         make sure the host component sets up its state before \
                         deferred fields are read"
                    );
                }
                let value = config.initial_value();
                host.init_live_state().insert(field.to_owned(), value.clone());
                ReadOutcome::Recovered(value)
            }
        }
    }

    /// Buffer an accepted write and schedule its commit, replacing any
    /// commit already outstanding.
    pub(crate) fn record_write(self: &Rc<Self>, field: &str, value: serde_json::Value) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.marker.advance();
            inner.deferred.insert(field.to_owned(), value);
        }
        self.reschedule_commit();
    }

    fn reschedule_commit(self: &Rc<Self>) {
        let mut inner = self.inner.borrow_mut();
        Self::cancel_pending(&mut inner, self.log);

        // The commit body re-reads the buffer and the unmount latch at
        // fire time; an uncancelled superseded task finds nothing to do.
        let weak = Rc::downgrade(self);
        let handle = self.spawner.spawn_commit(Box::new(move || {
            if let Some(runtime) = weak.upgrade() {
                runtime.apply_deferred();
            }
        }));
        inner.pending = Some(handle);
    }

    fn cancel_pending(inner: &mut RuntimeInner, log: LogConfig) {
        if let Some(mut handle) = inner.pending.take() {
            if !handle.cancel() && log.warn_on_uncancellable_async {
                tracing::warn!(
                    "pending state commit could not be cancelled; the \
                     superseded commit will fire against current buffer state"
                );
            }
        }
    }

    /// The commit fire handler: apply the entire current buffer to live
    /// state in one batched merge, then clear it. Discards the buffer
    /// silently once unmounting.
    fn apply_deferred(&self) {
        let delta = {
            let mut inner = self.inner.borrow_mut();
            inner.pending = None;
            if inner.unmounting {
                inner.deferred = StateMap::new();
                return;
            }
            if inner.deferred.is_empty() {
                return;
            }
            std::mem::take(&mut inner.deferred)
        };
        self.host.borrow_mut().merge_state(delta);
    }

    pub(crate) fn commit_now(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            Self::cancel_pending(&mut inner, self.log);
        }
        self.apply_deferred();
    }

    pub(crate) fn begin_unmount(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.unmounting {
            return;
        }
        inner.unmounting = true;
        Self::cancel_pending(&mut inner, self.log);
    }

    pub(crate) fn marker(&self) -> ChangeMarker {
        self.inner.borrow().marker
    }

    pub(crate) fn has_pending_commit(&self) -> bool {
        self.inner.borrow().pending.is_some()
    }
}

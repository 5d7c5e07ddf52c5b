//! The host-framework collaborator seam.
//!
//! The coalescing runtime never owns the rendered state. It talks to the
//! enclosing UI framework through [`StateHost`]: reading the live state
//! object, creating it when a getter runs before the host set it up, and
//! applying whole-buffer merges. [`MapHost`] is a minimal map-backed
//! implementation for hosts that keep state as plain field→value data, and
//! for tests.

use serde_json::Value;

/// The field→value mapping used for live state and commit deltas.
pub type StateMap = serde_json::Map<String, Value>;

/// A component instance's rendered-state surface, owned by the host
/// framework.
///
/// The runtime mutates live state through exactly two paths: field seeding
/// inside a getter (`init_live_state` plus an insert) and the commit fire
/// handler's batched [`merge_state`](StateHost::merge_state). Field writes
/// never touch live state directly.
pub trait StateHost {
    /// The externally visible state object, if the host has initialized it.
    fn live_state(&self) -> Option<&StateMap>;

    /// Mutable access to the live state, if initialized.
    fn live_state_mut(&mut self) -> Option<&mut StateMap>;

    /// Create the live state as an empty mapping and return it.
    ///
    /// This is the explicit recovery path for getters that run before the
    /// host set up its state. Implementations must be idempotent: if state
    /// already exists, return it unchanged.
    fn init_live_state(&mut self) -> &mut StateMap;

    /// Apply a whole commit delta in one batched merge, atomically with
    /// respect to the host's own render cycle.
    ///
    /// The runtime always hands over the entire deferred buffer; it never
    /// issues one merge per field.
    fn merge_state(&mut self, delta: StateMap);
}

/// Map-backed [`StateHost`] for hosts without a richer state object.
#[derive(Debug, Default)]
pub struct MapHost {
    state: Option<StateMap>,
}

impl MapHost {
    /// A host whose live state does not exist yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A host with an already-initialized (empty) live state.
    pub fn with_empty_state() -> Self {
        Self {
            state: Some(StateMap::new()),
        }
    }

    /// A host seeded with existing state.
    pub fn with_state(state: StateMap) -> Self {
        Self { state: Some(state) }
    }

    /// Current value of a live field, if present.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.state.as_ref().and_then(|s| s.get(name))
    }
}

impl StateHost for MapHost {
    fn live_state(&self) -> Option<&StateMap> {
        self.state.as_ref()
    }

    fn live_state_mut(&mut self) -> Option<&mut StateMap> {
        self.state.as_mut()
    }

    fn init_live_state(&mut self) -> &mut StateMap {
        self.state.get_or_insert_with(StateMap::new)
    }

    fn merge_state(&mut self, delta: StateMap) {
        let live = self.state.get_or_insert_with(StateMap::new);
        for (field, value) in delta {
            live.insert(field, value);
        }
    }
}

//! Shared test host and builders.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use anystate::{CommitSpawner, DeferredState, LogConfig, StateHost, StateMap};
use serde_json::Value;

/// Host that records every batched merge it receives, so tests can assert
/// "exactly one commit fired" instead of inspecting final state only.
pub struct RecordingHost {
    pub state: Option<StateMap>,
    pub merges: Vec<StateMap>,
}

impl RecordingHost {
    /// Host whose live state does not exist yet.
    pub fn uninitialized() -> Self {
        Self {
            state: None,
            merges: Vec::new(),
        }
    }

    /// Host with an already-initialized empty live state.
    pub fn with_empty_state() -> Self {
        Self {
            state: Some(StateMap::new()),
            merges: Vec::new(),
        }
    }

    pub fn live(&self, field: &str) -> Option<Value> {
        self.state.as_ref().and_then(|s| s.get(field)).cloned()
    }
}

impl StateHost for RecordingHost {
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
        self.merges.push(delta.clone());
        let live = self.state.get_or_insert_with(StateMap::new);
        for (field, value) in delta {
            live.insert(field, value);
        }
    }
}

pub fn shared_host(host: RecordingHost) -> Rc<RefCell<RecordingHost>> {
    Rc::new(RefCell::new(host))
}

/// Build a DeferredState over a recording host with default (quiet) flags.
pub fn deferred_state(
    host: &Rc<RefCell<RecordingHost>>,
    spawner: Rc<dyn CommitSpawner>,
) -> DeferredState {
    DeferredState::new(host.clone(), spawner, LogConfig::default())
}

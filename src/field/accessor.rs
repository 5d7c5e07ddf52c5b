use std::rc::Rc;

use serde_json::Value;

use crate::field::config::{FieldConfig, TransformContext};
use crate::runtime::DeferredState;

/// Result of a field read.
///
/// `Recovered` tags the self-healing path where live state did not exist
/// yet and the getter created it, so callers can distinguish the two
/// without parsing log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Value came from the deferred buffer or (possibly just-seeded)
    /// existing live state.
    Nominal(Value),
    /// Live state was absent; the getter created it and seeded the field.
    Recovered(Value),
}

impl ReadOutcome {
    pub fn into_value(self) -> Value {
        match self {
            ReadOutcome::Nominal(value) | ReadOutcome::Recovered(value) => value,
        }
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, ReadOutcome::Recovered(_))
    }
}

/// Result of a field write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Buffered and a commit scheduled.
    Accepted,
    /// Vetoed by the field's transform; nothing was buffered or scheduled.
    Suppressed,
}

/// The get/set pair backing one declared state field.
///
/// Created once per component type via [`register_field`] and shared by all
/// instances; per-instance bookkeeping lives in the [`DeferredState`] each
/// call receives.
#[derive(Clone)]
pub struct FieldAccessor {
    name: Rc<str>,
    config: FieldConfig,
}

/// Build the accessor pair for a declared field.
pub fn register_field(name: impl Into<String>, config: FieldConfig) -> FieldAccessor {
    FieldAccessor {
        name: Rc::from(name.into()),
        config,
    }
}

impl FieldAccessor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the field with read-your-writes semantics.
    ///
    /// The deferred buffer is consulted first, independent of whether a
    /// commit has fired; otherwise the value comes from live state, seeded
    /// from the initializer when missing.
    pub fn get(&self, state: &DeferredState) -> ReadOutcome {
        let runtime = state.runtime();
        if let Some(buffered) = runtime.buffered(&self.name) {
            return ReadOutcome::Nominal(buffered);
        }
        runtime.read_live(&self.name, &self.config)
    }

    /// Shorthand for `get(state).into_value()`.
    pub fn value(&self, state: &DeferredState) -> Value {
        self.get(state).into_value()
    }

    /// Write the field.
    ///
    /// The value is buffered, the change marker advances, and the pending
    /// commit (if any) is cancelled and replaced — live state is untouched
    /// until that commit fires. A transform veto discards the write before
    /// any of that happens.
    pub fn set(&self, state: &DeferredState, value: impl Into<Value>) -> WriteOutcome {
        let runtime = state.runtime();

        let mut cx = TransformContext::default();
        let value = self.config.apply_transform(value.into(), &mut cx);
        if cx.is_stopped() {
            return WriteOutcome::Suppressed;
        }

        runtime.record_write(&self.name, value);
        WriteOutcome::Accepted
    }
}

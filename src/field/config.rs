use std::rc::Rc;

use serde_json::Value;

/// Write-interceptor signature: receives the incoming value, may rewrite it
/// or veto the write through the context.
pub type TransformFn = dyn Fn(Value, &mut TransformContext) -> Value;

/// Per-field declaration, shared across every instance of a component type.
///
/// Immutable after registration. The initializer runs lazily, only when a
/// getter has to seed a field that live state does not contain yet.
#[derive(Clone, Default)]
pub struct FieldConfig {
    initializer: Option<Rc<dyn Fn() -> Value>>,
    transform: Option<Rc<TransformFn>>,
}

impl FieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the field with a fixed initial value.
    pub fn with_initial(self, value: Value) -> Self {
        self.with_initial_fn(move || value.clone())
    }

    /// Seed the field with a lazily computed initial value.
    pub fn with_initial_fn(mut self, initializer: impl Fn() -> Value + 'static) -> Self {
        self.initializer = Some(Rc::new(initializer));
        self
    }

    /// Intercept every write. The transform may rewrite the value or call
    /// [`TransformContext::stop`] to discard the write entirely.
    pub fn with_transform(
        mut self,
        transform: impl Fn(Value, &mut TransformContext) -> Value + 'static,
    ) -> Self {
        self.transform = Some(Rc::new(transform));
        self
    }

    /// Compute the field's initial value. Fields without an initializer
    /// start out null.
    pub(crate) fn initial_value(&self) -> Value {
        match &self.initializer {
            Some(init) => init(),
            None => Value::Null,
        }
    }

    pub(crate) fn apply_transform(&self, value: Value, cx: &mut TransformContext) -> Value {
        match &self.transform {
            Some(transform) => transform(value, cx),
            None => value,
        }
    }
}

/// Passed to a field's transform on every write.
#[derive(Debug, Default)]
pub struct TransformContext {
    stopped: bool,
}

impl TransformContext {
    /// Veto the write. Nothing is buffered, no commit is scheduled, and the
    /// change marker does not advance. A designed no-op, not an error.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_initializer_yields_null() {
        assert_eq!(FieldConfig::new().initial_value(), Value::Null);
    }

    #[test]
    fn initializer_runs_per_call() {
        let config = FieldConfig::new().with_initial_fn(|| json!("x"));
        assert_eq!(config.initial_value(), json!("x"));
        assert_eq!(config.initial_value(), json!("x"));
    }

    #[test]
    fn transform_can_rewrite() {
        let config = FieldConfig::new().with_transform(|v, _cx| json!(v.as_i64().unwrap() * 2));
        let mut cx = TransformContext::default();
        assert_eq!(config.apply_transform(json!(3), &mut cx), json!(6));
        assert!(!cx.is_stopped());
    }
}

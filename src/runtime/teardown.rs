/// Ordered list of per-instance teardown callbacks.
///
/// Replaces wrap-and-reassign teardown patching: the host's own teardown
/// behavior and the unmount guard both register here and every callback
/// runs, in registration order, when the component begins teardown.
///
/// `fire` may be invoked more than once; hooks that must only act once
/// (like the unmount guard) are themselves idempotent.
#[derive(Default)]
pub struct TeardownHooks {
    hooks: Vec<Box<dyn FnMut()>>,
}

impl TeardownHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. Order of registration is order of invocation.
    pub fn push(&mut self, hook: impl FnMut() + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Invoke every registered callback in order.
    pub fn fire(&mut self) {
        for hook in &mut self.hooks {
            hook();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn hooks_run_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut hooks = TeardownHooks::new();
        for label in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            hooks.push(move || order.borrow_mut().push(label));
        }
        hooks.fire();
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn fire_on_empty_list_is_a_noop() {
        let mut hooks = TeardownHooks::new();
        assert!(hooks.is_empty());
        hooks.fire();
    }
}

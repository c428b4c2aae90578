//! Ambient, tree-scoped registry propagation.
//!
//! A scope derives its registry by copying the nearest ancestor's mapping
//! and overlaying any injected instances, then makes it visible to
//! everything run inside the closure. Ancestors and siblings never observe
//! the derived mapping; containers lazily created inside a scope stay in
//! that scope's registry.

use std::cell::RefCell;
use std::rc::Rc;

use tether_core::{ContainerRegistry, DynContainer};

/// A registry as shared by one scope with everything below it.
pub type SharedRegistry = Rc<RefCell<ContainerRegistry>>;

thread_local! {
    static SCOPE_STACK: RefCell<Vec<SharedRegistry>> = const { RefCell::new(Vec::new()) };
}

/// Runs `f` under a scope that inherits the nearest registry unchanged, or
/// starts from an empty one at the root of the tree.
pub fn with_scope<R>(f: impl FnOnce() -> R) -> R {
    with_injected(Vec::new(), f)
}

/// Runs `f` under a scope whose registry is a copy of the nearest one with
/// `inject` overlaid: each instance is keyed by its own state type,
/// overwriting any inherited entry. Later duplicates win.
pub fn with_injected<R>(inject: Vec<DynContainer>, f: impl FnOnce() -> R) -> R {
    let mut derived = SCOPE_STACK.with(|stack| {
        stack
            .borrow()
            .last()
            .map(|shared| shared.borrow().clone())
            .unwrap_or_default()
    });
    for container in inject {
        derived.seed(container);
    }

    // Frame guard (ensures pop on unwind)
    struct Frame;
    impl Drop for Frame {
        fn drop(&mut self) {
            SCOPE_STACK.with(|stack| {
                stack.borrow_mut().pop();
            });
        }
    }
    SCOPE_STACK.with(|stack| {
        stack
            .borrow_mut()
            .push(Rc::new(RefCell::new(derived)))
    });
    let _frame = Frame;
    f()
}

/// The registry of the nearest enclosing scope, if any.
pub fn current_registry() -> Option<SharedRegistry> {
    SCOPE_STACK.with(|stack| stack.borrow().last().cloned())
}

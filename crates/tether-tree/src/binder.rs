use std::cell::Cell;
use std::rc::Rc;

use futures::FutureExt;
use futures::future;
use thiserror::Error;

use tether_core::{Dependency, DynContainer, Listener, UpdateFuture};

use crate::context::current_registry;

/// Structural wiring mistakes surfaced while binding.
///
/// These fail synchronously and loudly: a silent fallback would hide the
/// mistake until some unrelated subtree misbehaves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// No registry scope is in effect at resolution time.
    #[error("no registry scope is in effect; wrap this subtree in `with_scope`")]
    NoScope,
    /// The binding request listed no containers.
    #[error("binding request is empty; list at least one container")]
    EmptyBinding,
}

/// A tree node that subscribes to the containers it depends on and reacts
/// through the host's `on_update` hook when any of them notifies.
///
/// The hook is the host framework's "schedule a re-render of this node"
/// entry point; its future must resolve once the re-render has committed.
/// While the node is mounted every notification goes through the hook.
/// After [`DependencyBinder::unmount`] a late notification resolves
/// immediately without scheduling any work.
pub struct DependencyBinder {
    held: Vec<DynContainer>,
    listener: Listener,
    unmounted: Rc<Cell<bool>>,
}

impl DependencyBinder {
    pub fn new(on_update: impl Fn() -> UpdateFuture + 'static) -> Self {
        let unmounted = Rc::new(Cell::new(false));
        let listener: Listener = Rc::new({
            let unmounted = unmounted.clone();
            move || {
                if unmounted.get() {
                    return future::ready(Ok(())).boxed_local();
                }
                on_update()
            }
        });
        Self {
            held: Vec::new(),
            listener,
            unmounted,
        }
    }

    /// Runs one binding step.
    ///
    /// Every previously held subscription is released first, then `request`
    /// is resolved against the ambient registry (instances are used as-is,
    /// types are resolved or lazily created), the binder subscribes to each
    /// resolved container, and `render` runs with the instances in request
    /// order. After this returns, the binder is subscribed to exactly the
    /// containers it rendered with — re-binding never grows listener lists.
    pub fn bind<R>(
        &mut self,
        request: &[Dependency],
        render: impl FnOnce(&[DynContainer]) -> R,
    ) -> Result<R, BindError> {
        for container in self.held.drain(..) {
            container.unsubscribe(&self.listener);
        }
        let Some(shared) = current_registry() else {
            return Err(BindError::NoScope);
        };
        if request.is_empty() {
            return Err(BindError::EmptyBinding);
        }

        let mut resolved = Vec::with_capacity(request.len());
        {
            let mut registry = shared.borrow_mut();
            for dependency in request {
                let container = dependency.resolve(&mut registry);
                // unsubscribe first so duplicate entries register once
                container.unsubscribe(&self.listener);
                container.subscribe(&self.listener);
                resolved.push(container);
            }
        }
        self.held = resolved;
        Ok(render(&self.held))
    }

    /// Terminal transition: the unmounted flag is set before any listener is
    /// removed, so a notification landing mid-teardown short-circuits.
    pub fn unmount(&mut self) {
        self.unmounted.set(true);
        for container in self.held.drain(..) {
            container.unsubscribe(&self.listener);
        }
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted.get()
    }

    /// Containers currently held, in request order.
    pub fn held(&self) -> &[DynContainer] {
        &self.held
    }
}

impl Drop for DependencyBinder {
    fn drop(&mut self) {
        self.unmount();
    }
}

use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};
use smallvec::SmallVec;

use crate::error::StateError;

/// A state value a container can hold.
///
/// `Patch` is the partial-update shape; `apply` folds one patch into the
/// current value as a shallow merge (each populated field replaces its
/// counterpart, everything else stays untouched). Implementors pick the
/// partial shape that fits — per-field `Option`s for records, the plain
/// value for single-field states.
pub trait State: Clone + 'static {
    type Patch;

    fn apply(&mut self, patch: Self::Patch);
}

/// Outcome of an updater passed to [`StateContainer::mutate`].
pub enum Update<S: State> {
    /// Merge the patch into the current state, then notify listeners.
    Patch(S::Patch),
    /// Leave the state as it is but still notify listeners.
    ///
    /// This is the updater-handed-back-the-current-state case: the merge is
    /// skipped, the notification is not.
    Touch,
    /// No-op: no merge, no notification, immediate completion.
    Skip,
}

/// Completion future of an update listener.
pub type UpdateFuture = LocalBoxFuture<'static, Result<(), StateError>>;

/// An asynchronous, zero-argument update listener.
///
/// Listeners are registered and removed by pointer identity: hold on to the
/// `Rc` you subscribed with if you intend to unsubscribe later.
pub type Listener = Rc<dyn Fn() -> UpdateFuture>;

/// Identity of a container, stable across handle clones and type erasure.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ContainerId(usize);

struct Inner<S> {
    state: RefCell<S>,
    listeners: RefCell<SmallVec<[Listener; 2]>>,
}

/// A shared container holding one state value and its update listeners.
///
/// Cloning the handle shares the container; the state itself is never
/// cloned by `clone()`. A container lives for as long as any handle does —
/// a registry entry, a binder, or an outside reference — and is torn down
/// by the last drop, never explicitly.
pub struct StateContainer<S: State>(Rc<Inner<S>>);

impl<S: State> Clone for StateContainer<S> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<S: State + Default> Default for StateContainer<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: State> StateContainer<S> {
    pub fn new(state: S) -> Self {
        Self(Rc::new(Inner {
            state: RefCell::new(state),
            listeners: RefCell::new(SmallVec::new()),
        }))
    }

    /// Identity shared by every clone of this handle.
    pub fn id(&self) -> ContainerId {
        ContainerId(Rc::as_ptr(&self.0) as usize)
    }

    pub fn get(&self) -> S {
        self.0.state.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.0.state.borrow())
    }

    /// Registers `listener` at the front of the list, so the most recent
    /// subscriber is launched first on the next notification. Launch order
    /// only affects scheduling: listeners run concurrently.
    pub fn subscribe(&self, listener: &Listener) {
        self.0.listeners.borrow_mut().insert(0, listener.clone());
    }

    /// Removes `listener` by pointer identity. Removing a listener that was
    /// never registered is a silent no-op.
    pub fn unsubscribe(&self, listener: &Listener) {
        self.0
            .listeners
            .borrow_mut()
            .retain(|registered| !Rc::ptr_eq(registered, listener));
    }

    pub fn listener_count(&self) -> usize {
        self.0.listeners.borrow().len()
    }

    /// Applies `update` and notifies every listener.
    ///
    /// All listener futures are obtained up front and awaited together, so
    /// listeners react concurrently and the call resolves only once every
    /// one of them has settled. A failing listener fails the aggregate
    /// without cancelling or deregistering the others.
    pub async fn mutate(&self, update: impl FnOnce(&S) -> Update<S>) -> Result<(), StateError> {
        self.mutate_then(update, |_| {}).await
    }

    /// Like [`StateContainer::mutate`], with a completion callback.
    ///
    /// `on_complete` observes the (possibly updated) state once every
    /// listener has finished; on [`Update::Skip`] it runs immediately with
    /// the unchanged state. It is not invoked when the notification fails.
    pub async fn mutate_then(
        &self,
        update: impl FnOnce(&S) -> Update<S>,
        on_complete: impl FnOnce(&S),
    ) -> Result<(), StateError> {
        let decided = {
            let state = self.0.state.borrow();
            update(&state)
        };
        match decided {
            Update::Skip => {
                on_complete(&self.0.state.borrow());
                return Ok(());
            }
            Update::Patch(patch) => self.0.state.borrow_mut().apply(patch),
            Update::Touch => {}
        }

        // Snapshot before launching: listeners may (un)subscribe while the
        // notification is in flight without touching this round.
        let snapshot: SmallVec<[Listener; 2]> = self.0.listeners.borrow().clone();
        let launched: Vec<UpdateFuture> = snapshot.iter().map(|listener| listener()).collect();
        let settled = future::join_all(launched).await;
        for outcome in settled {
            outcome?;
        }

        on_complete(&self.0.state.borrow());
        Ok(())
    }

    /// Shorthand for `mutate(move |_| Update::Patch(patch))`.
    pub async fn patch(&self, patch: S::Patch) -> Result<(), StateError> {
        self.mutate(move |_| Update::Patch(patch)).await
    }
}

/// A listener whose reaction is synchronous; completion is immediate.
pub fn sync_listener(react: impl Fn() + 'static) -> Listener {
    Rc::new(move || {
        react();
        future::ready(Ok(())).boxed_local()
    })
}

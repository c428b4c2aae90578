use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

use crate::container::{ContainerId, Listener, State, StateContainer};

/// Object-safe view of a [`StateContainer`], independent of its state type.
///
/// Binders and registries handle containers through this trait; the typed
/// handle is recovered with [`downcast`].
pub trait AnyContainer: 'static {
    /// Registry key: the `TypeId` of the state type.
    fn state_key(&self) -> TypeId;
    /// Short runtime type name of the state, used for property naming.
    fn label(&self) -> &'static str;
    fn id(&self) -> ContainerId;
    fn subscribe(&self, listener: &Listener);
    fn unsubscribe(&self, listener: &Listener);
    fn as_any(&self) -> &dyn Any;
}

/// A shared, type-erased container handle.
pub type DynContainer = Rc<dyn AnyContainer>;

impl<S: State> AnyContainer for StateContainer<S> {
    fn state_key(&self) -> TypeId {
        TypeId::of::<S>()
    }

    fn label(&self) -> &'static str {
        short_type_name::<S>()
    }

    fn id(&self) -> ContainerId {
        StateContainer::id(self)
    }

    fn subscribe(&self, listener: &Listener) {
        StateContainer::subscribe(self, listener)
    }

    fn unsubscribe(&self, listener: &Listener) {
        StateContainer::unsubscribe(self, listener)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Erases a typed handle for injection or custom wiring.
pub fn erase<S: State>(container: &StateContainer<S>) -> DynContainer {
    Rc::new(container.clone())
}

/// Recovers the typed handle behind an erased one.
pub fn downcast<S: State>(container: &DynContainer) -> Option<StateContainer<S>> {
    container.as_any().downcast_ref::<StateContainer<S>>().cloned()
}

fn short_type_name<S: 'static>() -> &'static str {
    let full = std::any::type_name::<S>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Tree-scoped mapping from state type to container instance.
///
/// At most one instance lives under each key; once created it is reused for
/// the rest of the registry's lifetime. Cloning is shallow — entries are
/// handle clones — so a derived registry shares instances with its ancestor
/// until an entry is overwritten.
#[derive(Default, Clone)]
pub struct ContainerRegistry {
    entries: HashMap<TypeId, DynContainer>,
}

impl ContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the container for `S`, default-constructing and caching it
    /// on first use. Resolving the same type twice against the same
    /// registry yields reference-identical instances.
    pub fn resolve<S: State + Default>(&mut self) -> StateContainer<S> {
        let slot = self.slot::<S>();
        if let Some(container) = downcast::<S>(&slot) {
            return container;
        }
        // Unreachable through the public surface: every entry is keyed by
        // its own state type. Rebuild the slot rather than hand out a
        // mismatched handle.
        log::warn!(
            "registry slot for {} held a foreign container; rebuilding it",
            short_type_name::<S>()
        );
        let fresh = StateContainer::new(S::default());
        self.entries.insert(TypeId::of::<S>(), Rc::new(fresh.clone()));
        fresh
    }

    fn slot<S: State + Default>(&mut self) -> DynContainer {
        self.entries
            .entry(TypeId::of::<S>())
            .or_insert_with(|| Rc::new(StateContainer::new(S::default())) as DynContainer)
            .clone()
    }

    /// Caches `container` under its own state type, overwriting any prior
    /// entry. This is the overlay primitive behind scope injection.
    pub fn seed(&mut self, container: DynContainer) {
        self.entries.insert(container.state_key(), container);
    }

    /// Typed convenience over [`ContainerRegistry::seed`].
    pub fn seed_container<S: State>(&mut self, container: &StateContainer<S>) {
        self.seed(erase(container));
    }

    /// Lookup without creating.
    pub fn get<S: State>(&self) -> Option<StateContainer<S>> {
        self.entries.get(&TypeId::of::<S>()).and_then(downcast::<S>)
    }

    pub fn contains<S: State>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<S>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One entry of a binding request: a container type to resolve (creating on
/// first use) or a pre-built instance used as-is.
///
/// An instance entry is never placed in the registry by a binder; seed it
/// through scope injection if descendants should resolve it.
#[derive(Clone)]
pub enum Dependency {
    Resolve(fn(&mut ContainerRegistry) -> DynContainer),
    Instance(DynContainer),
}

impl Dependency {
    /// Request the registry's container for `S`.
    pub fn of<S: State + Default>() -> Self {
        Dependency::Resolve(|registry| registry.slot::<S>())
    }

    /// Request this exact instance.
    pub fn instance<S: State>(container: &StateContainer<S>) -> Self {
        Dependency::Instance(erase(container))
    }

    pub fn resolve(&self, registry: &mut ContainerRegistry) -> DynContainer {
        match self {
            Dependency::Resolve(resolve) => resolve(registry),
            Dependency::Instance(container) => container.clone(),
        }
    }
}

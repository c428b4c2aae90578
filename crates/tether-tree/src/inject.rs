use std::rc::Rc;

use tether_core::{Dependency, DynContainer, UpdateFuture};

use crate::binder::{BindError, DependencyBinder};

/// Resolved containers exposed as named properties, in request order.
pub type PropertyMap = Vec<(String, DynContainer)>;

/// Maps resolved instances (positionally) to the properties handed to the
/// wrapped component.
pub type PropertyMapper = Rc<dyn Fn(&[DynContainer]) -> PropertyMap>;

/// Adapts a component that wants containers as named properties onto a
/// [`DependencyBinder`].
///
/// Without a mapper, each resolved container is exposed under the
/// lower-camel-cased short name of its state type (`CounterState` becomes
/// `counterState`). A mapper replaces that naming wholesale. The display
/// name carries the wrapped component's name for introspection, in the
/// conventional `inject(...)` form.
pub struct PropertyInjector<R> {
    binder: DependencyBinder,
    request: Vec<Dependency>,
    component: Rc<dyn Fn(&PropertyMap) -> R>,
    mapper: Option<PropertyMapper>,
    display_name: String,
}

impl<R> PropertyInjector<R> {
    pub fn new(
        request: Vec<Dependency>,
        component: impl Fn(&PropertyMap) -> R + 'static,
        on_update: impl Fn() -> UpdateFuture + 'static,
    ) -> Self {
        Self {
            binder: DependencyBinder::new(on_update),
            request,
            component: Rc::new(component),
            mapper: None,
            display_name: "inject(Component)".to_owned(),
        }
    }

    /// Replaces the default property naming.
    pub fn with_mapper(
        mut self,
        mapper: impl Fn(&[DynContainer]) -> PropertyMap + 'static,
    ) -> Self {
        self.mapper = Some(Rc::new(mapper));
        self
    }

    pub fn with_display_name(mut self, wrapped: impl Into<String>) -> Self {
        self.display_name = format!("inject({})", wrapped.into());
        self
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// One binding step: resolve, subscribe, and render the wrapped
    /// component with its property map.
    pub fn render(&mut self) -> Result<R, BindError> {
        let component = self.component.clone();
        let mapper = self.mapper.clone();
        self.binder.bind(&self.request, |resolved| {
            let properties = match &mapper {
                Some(map) => map(resolved),
                None => default_properties(resolved),
            };
            component(&properties)
        })
    }

    pub fn unmount(&mut self) {
        self.binder.unmount();
    }

    pub fn binder(&self) -> &DependencyBinder {
        &self.binder
    }
}

fn default_properties(resolved: &[DynContainer]) -> PropertyMap {
    resolved
        .iter()
        .map(|container| (lower_camel(container.label()), container.clone()))
        .collect()
}

/// First character lowercased, remainder untouched.
fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

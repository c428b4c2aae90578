//! # Scopes, binders, and property injection
//!
//! The tree-facing half of tether. `tether-core` owns containers and the
//! registry; this crate wires them into a component tree:
//!
//! - [`with_scope`] / [`with_injected`] — derive the registry visible to a
//!   subtree (copy of the nearest ancestor's, plus injected instances).
//! - [`DependencyBinder`] — a node that resolves its container
//!   dependencies, subscribes to them, and reacts through a host hook.
//! - [`PropertyInjector`] — the adapter that feeds resolved containers to a
//!   component as named properties.
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use futures::FutureExt;
//! use futures::executor::block_on;
//! use tether_core::{Dependency, State, Update, downcast};
//! use tether_tree::{DependencyBinder, with_scope};
//!
//! #[derive(Clone, Default)]
//! struct CounterState {
//!     count: u32,
//! }
//!
//! impl State for CounterState {
//!     type Patch = u32;
//!     fn apply(&mut self, count: u32) {
//!         self.count = count;
//!     }
//! }
//!
//! let renders = Rc::new(Cell::new(0));
//! with_scope(|| {
//!     let mut binder = DependencyBinder::new({
//!         let renders = renders.clone();
//!         move || {
//!             renders.set(renders.get() + 1);
//!             futures::future::ready(Ok(())).boxed_local()
//!         }
//!     });
//!
//!     let shown = binder
//!         .bind(&[Dependency::of::<CounterState>()], |resolved| {
//!             downcast::<CounterState>(&resolved[0]).map(|c| c.get().count)
//!         })
//!         .unwrap();
//!     assert_eq!(shown, Some(0));
//!
//!     let counter = downcast::<CounterState>(&binder.held()[0]).unwrap();
//!     block_on(counter.mutate(|s| Update::Patch(s.count + 1))).unwrap();
//!     assert_eq!(renders.get(), 1);
//!     assert_eq!(counter.get().count, 1);
//! });
//! ```
//!
//! Binding fails loudly when no scope is in effect — a missing scope is a
//! structural wiring mistake, not a condition to paper over.

pub mod binder;
pub mod context;
pub mod inject;

pub use binder::*;
pub use context::*;
pub use inject::*;

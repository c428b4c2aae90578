//! # Containers, listeners, and the registry
//!
//! Tether keeps shared application state in **containers** that live outside
//! the component tree. This crate is the host-independent half: containers
//! and their update listeners, plus the type-keyed registry that lazily
//! constructs and deduplicates them. Tree wiring — scopes, binders,
//! property injection — lives in `tether-tree`.
//!
//! ## Containers
//!
//! A [`StateContainer`] pairs one state value with an ordered list of
//! asynchronous update listeners. Mutation is a three-way decision
//! ([`Update`]): merge a patch and notify, notify without merging, or skip
//! both. The returned future resolves only once every listener has
//! finished reacting.
//!
//! ```rust
//! use tether_core::*;
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
//! let counter = StateContainer::new(CounterState::default());
//! futures::executor::block_on(async {
//!     counter
//!         .mutate(|s| Update::Patch(s.count + 1))
//!         .await
//!         .unwrap();
//! });
//! assert_eq!(counter.get().count, 1);
//! ```
//!
//! ## Listeners
//!
//! A [`Listener`] is a zero-argument callback returning a completion
//! future. All listeners of a container are launched together on every
//! non-skip mutation; the mutation's own future joins them all, and one
//! failure fails the join without cancelling the rest. Registration and
//! removal go by pointer identity:
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use tether_core::*;
//!
//! #[derive(Clone, Default)]
//! struct Flag(bool);
//! impl State for Flag {
//!     type Patch = bool;
//!     fn apply(&mut self, on: bool) {
//!         self.0 = on;
//!     }
//! }
//!
//! let flag = StateContainer::new(Flag::default());
//! let seen = Rc::new(Cell::new(0));
//! let listener = sync_listener({
//!     let seen = seen.clone();
//!     move || seen.set(seen.get() + 1)
//! });
//!
//! flag.subscribe(&listener);
//! futures::executor::block_on(flag.patch(true)).unwrap();
//! flag.unsubscribe(&listener);
//! futures::executor::block_on(flag.patch(false)).unwrap();
//! assert_eq!(seen.get(), 1);
//! ```
//!
//! ## Registry
//!
//! A [`ContainerRegistry`] maps state types to container instances,
//! default-constructing each on first resolution and reusing it afterwards.
//! Cloning a registry is shallow, which is what scope overlay in
//! `tether-tree` builds on.

pub mod container;
pub mod error;
pub mod registry;
pub mod tests;

pub use container::*;
pub use error::*;
pub use registry::*;

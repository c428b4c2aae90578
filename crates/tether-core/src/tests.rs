#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use futures::FutureExt;
    use futures::channel::oneshot;
    use futures::executor::{LocalPool, block_on};
    use futures::future;
    use futures::task::LocalSpawnExt;

    use crate::container::*;
    use crate::error::StateError;
    use crate::registry::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    struct CounterState {
        count: u32,
    }

    impl State for CounterState {
        type Patch = u32;
        fn apply(&mut self, count: u32) {
            self.count = count;
        }
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    struct ProfileState {
        name: String,
        age: u32,
    }

    struct ProfilePatch {
        name: Option<String>,
        age: Option<u32>,
    }

    impl State for ProfileState {
        type Patch = ProfilePatch;
        fn apply(&mut self, patch: ProfilePatch) {
            if let Some(name) = patch.name {
                self.name = name;
            }
            if let Some(age) = patch.age {
                self.age = age;
            }
        }
    }

    fn recording_listener(order: &Rc<RefCell<Vec<&'static str>>>, tag: &'static str) -> Listener {
        let order = order.clone();
        Rc::new(move || {
            order.borrow_mut().push(tag);
            future::ready(Ok(())).boxed_local()
        })
    }

    fn failing_listener(message: &'static str) -> Listener {
        Rc::new(move || future::ready(Err(StateError::listener(message))).boxed_local())
    }

    /// Completes only once the paired sender fires; counts completions.
    fn gated_listener(receiver: oneshot::Receiver<()>, done: &Rc<Cell<usize>>) -> Listener {
        let receiver = RefCell::new(Some(receiver));
        let done = done.clone();
        Rc::new(move || {
            let receiver = receiver.borrow_mut().take();
            let done = done.clone();
            async move {
                if let Some(receiver) = receiver {
                    let _ = receiver.await;
                }
                done.set(done.get() + 1);
                Ok(())
            }
            .boxed_local()
        })
    }

    #[test]
    fn patches_fold_left_in_call_order() {
        let profile = StateContainer::new(ProfileState::default());
        block_on(async {
            profile
                .patch(ProfilePatch { name: Some("ada".into()), age: None })
                .await
                .unwrap();
            profile
                .patch(ProfilePatch { name: None, age: Some(36) })
                .await
                .unwrap();
            profile
                .patch(ProfilePatch { name: Some("grace".into()), age: None })
                .await
                .unwrap();
        });
        assert_eq!(profile.get(), ProfileState { name: "grace".into(), age: 36 });
    }

    #[test]
    fn skip_completes_immediately_without_notifying() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let counter = StateContainer::new(CounterState { count: 7 });
        counter.subscribe(&recording_listener(&order, "listener"));

        let observed = Rc::new(Cell::new(None));
        block_on(counter.mutate_then(
            |_| Update::Skip,
            {
                let observed = observed.clone();
                move |state: &CounterState| observed.set(Some(state.count))
            },
        ))
        .unwrap();

        assert_eq!(observed.get(), Some(7));
        assert!(order.borrow().is_empty());
        assert_eq!(counter.get().count, 7);
    }

    #[test]
    fn touch_notifies_without_merging() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let counter = StateContainer::new(CounterState { count: 7 });
        counter.subscribe(&recording_listener(&order, "listener"));

        block_on(counter.mutate(|_| Update::Touch)).unwrap();

        assert_eq!(*order.borrow(), vec!["listener"]);
        assert_eq!(counter.get().count, 7);
    }

    #[test]
    fn unsubscribed_listener_is_not_invoked() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let counter = StateContainer::new(CounterState::default());
        let listener = recording_listener(&order, "listener");

        counter.subscribe(&listener);
        counter.unsubscribe(&listener);
        block_on(counter.patch(1)).unwrap();

        assert!(order.borrow().is_empty());
        assert_eq!(counter.listener_count(), 0);
    }

    #[test]
    fn unsubscribing_an_unknown_listener_is_a_noop() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let counter = StateContainer::new(CounterState::default());
        counter.subscribe(&recording_listener(&order, "kept"));

        counter.unsubscribe(&recording_listener(&order, "stranger"));

        assert_eq!(counter.listener_count(), 1);
    }

    #[test]
    fn most_recent_subscriber_launches_first() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let counter = StateContainer::new(CounterState::default());
        counter.subscribe(&recording_listener(&order, "first"));
        counter.subscribe(&recording_listener(&order, "second"));

        block_on(counter.patch(1)).unwrap();

        assert_eq!(*order.borrow(), vec!["second", "first"]);
    }

    #[test]
    fn one_failing_listener_fails_the_join_but_not_the_others() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let counter = StateContainer::new(CounterState::default());
        counter.subscribe(&recording_listener(&order, "healthy"));
        counter.subscribe(&failing_listener("boom"));

        let outcome = block_on(counter.patch(3));

        assert_eq!(outcome, Err(StateError::listener("boom")));
        assert_eq!(*order.borrow(), vec!["healthy"]);
        // state was merged before the listeners were launched
        assert_eq!(counter.get().count, 3);
        // the failing listener is not deregistered
        assert_eq!(counter.listener_count(), 2);
    }

    #[test]
    fn on_complete_runs_after_every_listener() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let counter = StateContainer::new(CounterState::default());
        counter.subscribe(&recording_listener(&order, "listener"));

        block_on(counter.mutate_then(|state| Update::Patch(state.count + 1), {
            let order = order.clone();
            move |state: &CounterState| {
                assert_eq!(state.count, 1);
                order.borrow_mut().push("complete");
            }
        }))
        .unwrap();

        assert_eq!(*order.borrow(), vec!["listener", "complete"]);
    }

    #[test]
    fn on_complete_is_skipped_when_the_join_fails() {
        let counter = StateContainer::new(CounterState::default());
        counter.subscribe(&failing_listener("boom"));

        let completed = Rc::new(Cell::new(false));
        let outcome = block_on(counter.mutate_then(|_| Update::Touch, {
            let completed = completed.clone();
            move |_: &CounterState| completed.set(true)
        }));

        assert!(outcome.is_err());
        assert!(!completed.get());
    }

    #[test]
    fn mutate_resolves_only_after_every_listener_settles() {
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();

        let counter = StateContainer::new(CounterState::default());
        let (release_a, gate_a) = oneshot::channel();
        let (release_b, gate_b) = oneshot::channel();
        let finished = Rc::new(Cell::new(0));
        counter.subscribe(&gated_listener(gate_a, &finished));
        counter.subscribe(&gated_listener(gate_b, &finished));

        let done = Rc::new(Cell::new(false));
        spawner
            .spawn_local({
                let counter = counter.clone();
                let done = done.clone();
                async move {
                    counter.mutate(|s| Update::Patch(s.count + 1)).await.unwrap();
                    done.set(true);
                }
            })
            .unwrap();

        pool.run_until_stalled();
        assert!(!done.get());
        release_a.send(()).unwrap();
        pool.run_until_stalled();
        assert!(!done.get());
        assert_eq!(finished.get(), 1);
        release_b.send(()).unwrap();
        pool.run_until_stalled();
        assert!(done.get());
        assert_eq!(finished.get(), 2);
        assert_eq!(counter.get().count, 1);
    }

    #[test]
    fn sync_listener_reacts_once_per_mutation() {
        let counter = StateContainer::new(CounterState::default());
        let seen = Rc::new(Cell::new(0));
        counter.subscribe(&sync_listener({
            let seen = seen.clone();
            move || seen.set(seen.get() + 1)
        }));

        block_on(async {
            counter.patch(1).await.unwrap();
            counter.patch(2).await.unwrap();
        });

        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn resolving_twice_reuses_the_instance() {
        let mut registry = ContainerRegistry::new();
        let first = registry.resolve::<CounterState>();
        let second = registry.resolve::<CounterState>();

        assert_eq!(first.id(), second.id());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn cloned_registry_shares_entries_but_not_later_growth() {
        let mut parent = ContainerRegistry::new();
        let shared = parent.resolve::<CounterState>();

        let mut child = parent.clone();
        assert_eq!(child.resolve::<CounterState>().id(), shared.id());

        let _grown = child.resolve::<ProfileState>();
        assert!(child.contains::<ProfileState>());
        assert!(!parent.contains::<ProfileState>());
    }

    #[test]
    fn seeding_overwrites_the_cached_entry() {
        let mut parent = ContainerRegistry::new();
        let cached = parent.resolve::<CounterState>();

        let injected = StateContainer::new(CounterState { count: 40 });
        let mut overlay = parent.clone();
        overlay.seed_container(&injected);

        assert_eq!(overlay.resolve::<CounterState>().id(), injected.id());
        // the ancestor's cached resolution is unaffected
        assert_eq!(parent.resolve::<CounterState>().id(), cached.id());
    }

    #[test]
    fn dependency_of_resolves_through_the_registry() {
        let mut registry = ContainerRegistry::new();
        let erased = Dependency::of::<CounterState>().resolve(&mut registry);

        assert_eq!(erased.id(), registry.resolve::<CounterState>().id());
        assert_eq!(erased.label(), "CounterState");
    }

    #[test]
    fn instance_dependency_bypasses_the_registry() {
        let mut registry = ContainerRegistry::new();
        let outside = StateContainer::new(CounterState { count: 9 });
        let erased = Dependency::instance(&outside).resolve(&mut registry);

        assert_eq!(erased.id(), outside.id());
        assert!(!registry.contains::<CounterState>());
    }

    #[test]
    fn downcast_recovers_the_typed_handle() {
        let container = StateContainer::new(CounterState { count: 5 });
        let erased: DynContainer = Rc::new(container.clone());

        let typed = downcast::<CounterState>(&erased).unwrap();
        assert_eq!(typed.id(), container.id());
        assert_eq!(typed.get().count, 5);
        assert!(downcast::<ProfileState>(&erased).is_none());
    }
}

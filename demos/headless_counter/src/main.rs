//! A headless counter: two binders and an injector sharing one container
//! through a registry scope, driven from a plain executor.

use futures::FutureExt;
use futures::executor::block_on;
use futures::future;

use tether_core::{Dependency, State, StateContainer, StateError, Update, downcast};
use tether_tree::{
    DependencyBinder, PropertyInjector, PropertyMap, current_registry, with_scope,
};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct CounterState {
    count: u32,
}

struct CounterPatch {
    count: Option<u32>,
}

impl State for CounterState {
    type Patch = CounterPatch;
    fn apply(&mut self, patch: CounterPatch) {
        if let Some(count) = patch.count {
            self.count = count;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    with_scope(|| -> Result<(), Box<dyn std::error::Error>> {
        let counter: StateContainer<CounterState> = current_registry()
            .expect("with_scope provides a registry")
            .borrow_mut()
            .resolve();

        let mut label = DependencyBinder::new({
            let counter = counter.clone();
            move || {
                println!("label  | count = {}", counter.get().count);
                future::ready(Ok(())).boxed_local()
            }
        });
        let mut gauge = DependencyBinder::new({
            let counter = counter.clone();
            move || {
                let count = counter.get().count;
                println!("gauge  | {}", "#".repeat(count as usize));
                future::ready(Ok(())).boxed_local()
            }
        });

        let request = [Dependency::of::<CounterState>()];
        label.bind(&request, |resolved| {
            println!("label  | mounted over {}", resolved[0].label());
        })?;
        gauge.bind(&request, |resolved| {
            println!("gauge  | mounted over {}", resolved[0].label());
        })?;

        block_on(async {
            for _ in 0..3 {
                counter
                    .mutate(|s| Update::Patch(CounterPatch { count: Some(s.count + 1) }))
                    .await?;
            }
            // sentinel no-op: nobody re-renders
            counter.mutate(|_| Update::Skip).await?;
            Ok::<(), StateError>(())
        })?;

        gauge.unmount();
        println!("gauge  | unmounted");
        block_on(counter.mutate(|s| Update::Patch(CounterPatch { count: Some(s.count + 10) })))?;

        // The same container again, exposed as a named property.
        let mut readout = PropertyInjector::new(
            vec![Dependency::of::<CounterState>()],
            |properties: &PropertyMap| {
                for (name, container) in properties {
                    if let Some(counter) = downcast::<CounterState>(container) {
                        println!("inject | {} = {}", name, counter.get().count);
                    }
                }
            },
            || future::ready(Ok(())).boxed_local(),
        )
        .with_display_name("CounterReadout");
        println!("inject | rendering {}", readout.display_name());
        readout.render()?;

        log::info!("final count: {}", counter.get().count);
        Ok(())
    })
}

//! Reactive Core - Cells, effects and mount hooks.
//!
//! The observer contract that drives re-evaluation:
//! - [`State`] - A shared, exclusively-locked value that notifies on write
//! - [`Dependency`] - Anything an [`Effect`] can be registered with
//! - [`Effect`] - A deferred callback, run on a worker, never concurrently with itself
//! - [`AutoMount`] / [`ManualMount`] - One-shot "first activation" gates
//!
//! # Threading
//!
//! Firing a dependency records the trigger synchronously and hands each effect
//! to the worker pool (see [`worker::dispatch`]). The caller never waits for an
//! effect to finish.
//!
//! ```ignore
//! use spark_tui_core::reactive::{Dependency, Effect, State};
//!
//! let count = State::new(0);
//! let seen = count.clone();
//! let effect = Effect::new(move || println!("count is now {}", seen.get()));
//! count.register(&effect);
//!
//! count.set(1); // effect runs once on a worker
//! ```

mod effect;
mod mount;
mod state;
pub mod worker;

pub use effect::*;
pub use mount::*;
pub use state::*;

use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, treating poisoning as fatal.
///
/// A poisoned guard means a writer panicked mid-mutation. The value can no
/// longer be trusted by any holder, so the process stops here.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => {
            tracing::error!("exclusive-access guard poisoned, aborting");
            std::process::abort()
        }
    }
}

//! Reactive cells.
//!
//! [`State<T>`] is the only sanctioned way to share mutable data across
//! threads in this crate. Every holder sees the same value; every completed
//! write notifies subscribers exactly once.
//!
//! # Writes
//!
//! | Operation              | Fires                                 |
//! |------------------------|---------------------------------------|
//! | `set(v)`               | always, once                          |
//! | `read_write_access()`  | once on release, only if mutably used |
//! | `mark_updated()`       | always, once; value untouched         |
//! | `get()` / `with(..)`   | never                                 |

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::effect::{Dependency, Effect, Subscribers};
use super::lock;

struct StateInner<T> {
    value: Mutex<T>,
    dirty: AtomicBool,
    subscribers: Subscribers,
}

/// A shared, exclusively-locked value that notifies subscribers on change.
pub struct State<T> {
    inner: Arc<StateInner<T>>,
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + 'static> State<T> {
    /// Create a cell holding `value`. Starts clean.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(StateInner {
                value: Mutex::new(value),
                dirty: AtomicBool::new(false),
                subscribers: Subscribers::new(),
            }),
        }
    }

    /// Read through a closure without firing.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = lock(&self.inner.value);
        f(&value)
    }

    /// Scoped exclusive access. Fires once on release if the value was
    /// borrowed mutably.
    pub fn read_write_access(&self) -> StateGuard<'_, T> {
        StateGuard {
            guard: Some(lock(&self.inner.value)),
            state: self,
            mutated: false,
        }
    }

    /// Replace the value and fire.
    pub fn set(&self, value: T) {
        {
            let mut current = lock(&self.inner.value);
            *current = value;
        }
        self.fire();
    }

    /// Apply `f` to the value and fire.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        {
            let mut current = lock(&self.inner.value);
            f(&mut current);
        }
        self.fire();
    }

    /// Fire without touching the value.
    ///
    /// For mutations made through an aliased handle the cell cannot see.
    pub fn mark_updated(&self) {
        self.fire();
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::SeqCst)
    }

    /// Reset the dirty flag, returning its previous value.
    pub fn clear_dirty(&self) -> bool {
        self.inner.dirty.swap(false, Ordering::SeqCst)
    }

    /// Number of live effects registered on this cell.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    /// Share this cell as a type-erased dependency.
    pub fn dependency(&self) -> Arc<dyn Dependency> {
        Arc::new(self.clone())
    }

    fn fire(&self) {
        self.inner.dirty.store(true, Ordering::SeqCst);
        let notified = self.inner.subscribers.notify();
        tracing::trace!(notified, "state fired");
    }
}

impl<T: Clone + Send + 'static> State<T> {
    /// Clone the current value out.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }
}

impl<T: Default + Send + 'static> Default for State<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Send + 'static> Dependency for State<T> {
    fn register(&self, effect: &Effect) {
        self.inner.subscribers.add(effect);
    }
}

impl<T: std::fmt::Debug + Send + 'static> std::fmt::Debug for State<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with(|value| {
            f.debug_struct("State")
                .field("value", value)
                .field("dirty", &self.is_dirty())
                .finish()
        })
    }
}

// =============================================================================
// Guard
// =============================================================================

/// Exclusive view returned by [`State::read_write_access`].
///
/// The lock is released before subscribers are notified.
pub struct StateGuard<'a, T: Send + 'static> {
    guard: Option<MutexGuard<'a, T>>,
    state: &'a State<T>,
    mutated: bool,
}

impl<T: Send + 'static> Deref for StateGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.guard {
            Some(guard) => guard,
            None => unreachable!("guard is only taken in drop"),
        }
    }
}

impl<T: Send + 'static> DerefMut for StateGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.mutated = true;
        match &mut self.guard {
            Some(guard) => guard,
            None => unreachable!("guard is only taken in drop"),
        }
    }
}

impl<T: Send + 'static> Drop for StateGuard<'_, T> {
    fn drop(&mut self) {
        drop(self.guard.take());
        if self.mutated {
            self.state.fire();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(2);
    const QUIET: Duration = Duration::from_millis(100);

    fn watch<T: Clone + Send + 'static>(state: &State<T>) -> (Effect, mpsc::Receiver<T>) {
        let (tx, rx) = mpsc::channel();
        let observed = state.clone();
        let effect = Effect::new(move || {
            tx.send(observed.get()).ok();
        });
        state.register(&effect);
        (effect, rx)
    }

    #[test]
    fn test_new_is_clean() {
        let state = State::new(5);
        assert!(!state.is_dirty());
        assert_eq!(state.get(), 5);
    }

    #[test]
    fn test_set_fires_once() {
        let state = State::new(0);
        let (_effect, rx) = watch(&state);

        state.set(1);

        assert_eq!(rx.recv_timeout(WAIT), Ok(1));
        assert!(rx.recv_timeout(QUIET).is_err(), "set must fire exactly once");
        assert!(state.is_dirty());
    }

    #[test]
    fn test_reads_do_not_fire() {
        let state = State::new(String::from("a"));
        let (effect, _rx) = watch(&state);

        let _ = state.get();
        let _ = state.with(|s| s.len());
        {
            let guard = state.read_write_access();
            assert_eq!(guard.as_str(), "a");
        }

        assert_eq!(effect.trigger_count(), 0);
        assert!(!state.is_dirty());
    }

    #[test]
    fn test_guard_fires_after_mutation() {
        let state = State::new(vec![1, 2]);
        let (effect, rx) = watch(&state);

        {
            let mut guard = state.read_write_access();
            guard.push(3);
            guard.push(4);
        }

        assert_eq!(rx.recv_timeout(WAIT), Ok(vec![1, 2, 3, 4]));
        assert_eq!(effect.trigger_count(), 1, "one release, one notification");
    }

    #[test]
    fn test_mark_updated_fires_without_change() {
        let state = State::new(7);
        let (effect, rx) = watch(&state);

        state.mark_updated();

        assert_eq!(rx.recv_timeout(WAIT), Ok(7));
        assert_eq!(effect.trigger_count(), 1);
    }

    #[test]
    fn test_clear_dirty() {
        let state = State::new(0);
        state.set(1);
        assert!(state.clear_dirty());
        assert!(!state.is_dirty());
    }

    #[test]
    fn test_dropped_effect_unsubscribes() {
        let state = State::new(0);
        let (effect, _rx) = watch(&state);
        assert_eq!(state.subscriber_count(), 1);

        drop(effect);
        assert_eq!(state.subscriber_count(), 0);
        state.set(1);
    }

    #[test]
    fn test_clones_share_value() {
        let a = State::new(1);
        let b = a.clone();
        b.set(2);
        assert_eq!(a.get(), 2);
    }

    proptest::proptest! {
        #[test]
        fn prop_each_set_triggers_once(sets in 0usize..12, reads in 0usize..12) {
            let state = State::new(0usize);
            let effect = Effect::new(|| {});
            state.register(&effect);

            for i in 0..sets {
                state.set(i);
                for _ in 0..reads {
                    let _ = state.get();
                }
            }

            proptest::prop_assert_eq!(effect.trigger_count(), sets as u64);
        }
    }
}

//! Mount hooks - "is this the first activation" gates.
//!
//! Both are ordinary [`Dependency`]s. They give setup-only effects one-shot
//! semantics:
//!
//! - [`AutoMount`] is born fired. An effect registered on it is triggered
//!   immediately, once.
//! - [`ManualMount`] starts unfired. [`ManualMount::mount`] fires it exactly
//!   once; from then on it behaves like [`AutoMount`].

use std::sync::{Arc, Mutex};

use super::effect::{Dependency, Effect, WeakEffect};
use super::lock;

/// A gate that has already fired.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoMount;

impl Dependency for AutoMount {
    fn register(&self, effect: &Effect) {
        effect.trigger();
    }
}

#[derive(Default)]
struct ManualState {
    fired: bool,
    pending: Vec<WeakEffect>,
}

/// A gate fired by an explicit [`mount`](ManualMount::mount) call.
#[derive(Clone, Default)]
pub struct ManualMount {
    state: Arc<Mutex<ManualState>>,
}

impl ManualMount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the gate. Only the first call has any effect.
    ///
    /// Returns `true` if this call performed the transition.
    pub fn mount(&self) -> bool {
        let pending = {
            let mut state = lock(&self.state);
            if state.fired {
                return false;
            }
            state.fired = true;
            std::mem::take(&mut state.pending)
        };

        tracing::debug!(effects = pending.len(), "manual mount fired");
        for effect in pending.iter().filter_map(WeakEffect::upgrade) {
            effect.trigger();
        }
        true
    }

    pub fn is_mounted(&self) -> bool {
        lock(&self.state).fired
    }
}

impl Dependency for ManualMount {
    fn register(&self, effect: &Effect) {
        {
            let mut state = lock(&self.state);
            if !state.fired {
                state.pending.push(effect.downgrade());
                return;
            }
        }
        effect.trigger();
    }
}

impl std::fmt::Debug for ManualMount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualMount")
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_mount_triggers_on_register() {
        let effect = Effect::new(|| {});
        AutoMount.register(&effect);
        assert_eq!(effect.trigger_count(), 1);
    }

    #[test]
    fn test_manual_mount_waits_for_call() {
        let gate = ManualMount::new();
        let effect = Effect::new(|| {});
        gate.register(&effect);

        assert_eq!(effect.trigger_count(), 0);
        assert!(!gate.is_mounted());

        assert!(gate.mount());
        assert_eq!(effect.trigger_count(), 1);
    }

    #[test]
    fn test_manual_mount_is_one_shot() {
        let gate = ManualMount::new();
        let effect = Effect::new(|| {});
        gate.register(&effect);

        assert!(gate.mount());
        assert!(!gate.mount(), "second mount is a no-op");
        assert_eq!(effect.trigger_count(), 1);
    }

    #[test]
    fn test_register_after_mount_triggers_immediately() {
        let gate = ManualMount::new();
        gate.mount();

        let effect = Effect::new(|| {});
        gate.register(&effect);
        assert_eq!(effect.trigger_count(), 1);
    }
}

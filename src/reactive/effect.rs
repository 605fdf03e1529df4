//! Effects and the dependency contract.
//!
//! An [`Effect`] is a deferred unit of work. A [`Dependency`] accepts effect
//! registrations and must trigger every registered effect when it changes.
//!
//! Dependencies hold effects weakly. Whoever created the effect (a scope, a
//! context, a test) owns it; once that owner drops it, the registration dies
//! and is pruned on the next notification.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use super::{lock, worker};

static NEXT_EFFECT_ID: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// Dependency
// =============================================================================

/// Anything an [`Effect`] can subscribe to.
pub trait Dependency: Send + Sync {
    /// Register `effect`. Every later change must trigger it.
    fn register(&self, effect: &Effect);
}

impl<D: Dependency + ?Sized> Dependency for Arc<D> {
    fn register(&self, effect: &Effect) {
        (**self).register(effect);
    }
}

// =============================================================================
// Effect
// =============================================================================

type Callback = Box<dyn FnMut() + Send>;

struct EffectInner {
    id: u64,
    callback: Mutex<Callback>,
    /// Incremented synchronously by every trigger, before dispatch.
    triggers: AtomicU64,
    runs: AtomicU64,
}

impl EffectInner {
    /// A panicking callback is re-raised only after the guard is released,
    /// so the next trigger still gets to run.
    fn run(&self) {
        let mut callback = self.callback.lock().unwrap_or_else(PoisonError::into_inner);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (callback)()));
        drop(callback);

        match outcome {
            Ok(()) => {
                self.runs.fetch_add(1, Ordering::SeqCst);
            }
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}

/// A callback guarded for concurrent invocation.
///
/// Cloning shares the same effect. Two triggers never run the callback at the
/// same time; the second waits for the first. Triggering from inside the
/// callback is fine, calling [`Effect::run_now`] from inside it deadlocks.
#[derive(Clone)]
pub struct Effect {
    inner: Arc<EffectInner>,
}

impl Effect {
    pub fn new(callback: impl FnMut() + Send + 'static) -> Self {
        Self {
            inner: Arc::new(EffectInner {
                id: NEXT_EFFECT_ID.fetch_add(1, Ordering::Relaxed),
                callback: Mutex::new(Box::new(callback)),
                triggers: AtomicU64::new(0),
                runs: AtomicU64::new(0),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Record a trigger and run the callback on a worker.
    ///
    /// Returns as soon as the job is queued.
    pub fn trigger(&self) {
        let generation = self.inner.triggers.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(effect = self.inner.id, generation, "effect triggered");

        let inner = Arc::clone(&self.inner);
        worker::dispatch(move || inner.run());
    }

    /// Run the callback on the calling thread.
    pub fn run_now(&self) {
        self.inner.run();
    }

    /// Number of triggers recorded so far.
    pub fn trigger_count(&self) -> u64 {
        self.inner.triggers.load(Ordering::SeqCst)
    }

    /// Number of completed callback runs.
    pub fn run_count(&self) -> u64 {
        self.inner.runs.load(Ordering::SeqCst)
    }

    pub fn downgrade(&self) -> WeakEffect {
        WeakEffect {
            id: self.inner.id,
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.inner.id)
            .field("triggers", &self.trigger_count())
            .field("runs", &self.run_count())
            .finish()
    }
}

/// Non-owning handle to an [`Effect`].
#[derive(Clone)]
pub struct WeakEffect {
    id: u64,
    inner: Weak<EffectInner>,
}

impl WeakEffect {
    pub fn upgrade(&self) -> Option<Effect> {
        self.inner.upgrade().map(|inner| Effect { inner })
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

// =============================================================================
// Subscribers
// =============================================================================

/// The registration list every dependency embeds.
#[derive(Default)]
pub struct Subscribers {
    effects: Mutex<Vec<WeakEffect>>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `effect`. Registering the same effect twice is a no-op.
    pub fn add(&self, effect: &Effect) {
        let mut effects = lock(&self.effects);
        if effects.iter().any(|weak| weak.id == effect.id()) {
            return;
        }
        effects.push(effect.downgrade());
    }

    /// Trigger every live effect. Returns how many were triggered.
    ///
    /// The list lock is released before any effect is triggered.
    pub fn notify(&self) -> usize {
        let live: Vec<Effect> = {
            let mut effects = lock(&self.effects);
            effects.retain(WeakEffect::is_alive);
            effects.iter().filter_map(WeakEffect::upgrade).collect()
        };

        for effect in &live {
            effect.trigger();
        }
        live.len()
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        lock(&self.effects).iter().filter(|weak| weak.is_alive()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers").field("live", &self.len()).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

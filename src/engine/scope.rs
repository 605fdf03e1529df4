//! Scopes - Ordered slots of children and text.
//!
//! A [`Scope`] is where a component keeps its children. Two variants:
//!
//! - **Static**: built once, never changes.
//! - **Dynamic**: a builder plus a dependency set. When any dependency fires,
//!   the scope throws away every slot and runs the builder again. Child
//!   identity is not preserved across rebuilds.
//!
//! # Rebuild generations
//!
//! A dynamic scope owns one [`Effect`]. Each firing bumps the effect's
//! trigger count synchronously and queues one worker rebuild for that
//! trigger. Firings are not coalesced: two dependencies firing back to back
//! rebuild twice, and the last rebuild to run wins. The render path calls
//! [`Scope::refresh`] before drawing, which catches up to the newest
//! trigger. A worker job whose trigger the render path already covered
//! does nothing.
//!
//! ```text
//! state.set(..) ──> effect.trigger()  (triggers: 3)
//!                        │
//!          ┌─────────────┴──────────────┐
//!    render: refresh()            worker job for trigger 3
//!    built 2 < 3 → rebuild        built 3 >= 3 → skip
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::component::Component;
use super::context::Context;
use super::runtime::Runtime;
use crate::error::BuildError;
use crate::reactive::{lock, Dependency, Effect};
use crate::renderer::{DrawContext, ViewWrapper};

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Produces an expression slot's text at draw time.
pub type SlotExpr = Arc<dyn Fn() -> String + Send + Sync>;

/// Re-runnable builder of a dynamic scope.
pub type BuildFn = Arc<dyn Fn(&mut ScopeBuilder) -> Result<(), BuildError> + Send + Sync>;

// =============================================================================
// Slots
// =============================================================================

/// One entry of a scope.
#[derive(Clone)]
pub enum Slot {
    /// A child component, optionally decorated.
    Child {
        context: Context,
        wrapper: Option<ViewWrapper>,
    },
    /// Literal text.
    Text(String),
    /// Text evaluated on every draw.
    Expr(SlotExpr),
    /// A nested scope, kept in place so source order survives rebuilds.
    Scope(Scope),
}

impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::Child { context, wrapper } => f
                .debug_struct("Child")
                .field("context", &context.id())
                .field("wrapped", &wrapper.is_some())
                .finish(),
            Slot::Text(content) => f.debug_tuple("Text").field(content).finish(),
            Slot::Expr(_) => f.write_str("Expr(..)"),
            Slot::Scope(scope) => f.debug_tuple("Scope").field(&scope.id()).finish(),
        }
    }
}

// =============================================================================
// ScopeBuilder
// =============================================================================

/// Collects slots while a scope (re)builds.
pub struct ScopeBuilder {
    runtime: Runtime,
    slots: Vec<Slot>,
}

impl ScopeBuilder {
    pub(crate) fn new(runtime: Runtime) -> Self {
        Self {
            runtime,
            slots: Vec::new(),
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Materialize `component` and append it.
    pub fn child(&mut self, component: impl Component) -> Result<Context, BuildError> {
        self.child_boxed(Box::new(component), None)
    }

    /// Materialize `component` and append it, drawn through `wrapper`.
    pub fn child_with(
        &mut self,
        component: impl Component,
        wrapper: ViewWrapper,
    ) -> Result<Context, BuildError> {
        self.child_boxed(Box::new(component), Some(wrapper))
    }

    pub fn child_boxed(
        &mut self,
        component: Box<dyn Component>,
        wrapper: Option<ViewWrapper>,
    ) -> Result<Context, BuildError> {
        let context = Context::mount(self.runtime.clone(), component)?;
        self.slots.push(Slot::Child {
            context: context.clone(),
            wrapper,
        });
        Ok(context)
    }

    pub fn text(&mut self, content: impl Into<String>) {
        self.slots.push(Slot::Text(content.into()));
    }

    /// Text recomputed every time the scope draws.
    pub fn expr(&mut self, f: impl Fn() -> String + Send + Sync + 'static) {
        self.slots.push(Slot::Expr(Arc::new(f)));
    }

    /// A nested static scope at this position.
    pub fn nested(
        &mut self,
        build: impl FnOnce(&mut ScopeBuilder) -> Result<(), BuildError>,
    ) -> Result<Scope, BuildError> {
        let scope = Scope::build_static(self.runtime.clone(), build)?;
        self.slots.push(Slot::Scope(scope.clone()));
        Ok(scope)
    }

    /// A nested dynamic scope at this position.
    pub fn dynamic(
        &mut self,
        deps: Vec<Arc<dyn Dependency>>,
        build: impl Fn(&mut ScopeBuilder) -> Result<(), BuildError> + Send + Sync + 'static,
    ) -> Result<Scope, BuildError> {
        let scope = Scope::build_dynamic(self.runtime.clone(), Arc::new(build), deps)?;
        self.slots.push(Slot::Scope(scope.clone()));
        Ok(scope)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn finish(self) -> Vec<Slot> {
        self.slots
    }
}

// =============================================================================
// Scope
// =============================================================================

struct Dynamic {
    build: BuildFn,
    effect: Effect,
    /// Trigger generation the current slots were built for. Held for the
    /// whole rebuild so two rebuilds never interleave.
    built: Mutex<u64>,
}

impl Dynamic {
    /// Builder panics are caught under this guard, so poisoning only means
    /// an earlier unwind got past it. The counter is still valid.
    fn built(&self) -> MutexGuard<'_, u64> {
        self.built.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct ScopeInner {
    id: u64,
    runtime: Runtime,
    slots: Mutex<Vec<Slot>>,
    dynamic: Option<Dynamic>,
}

/// An ordered list of slots owned by a [`Context`].
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl Scope {
    /// Run `build` once and keep the result.
    pub fn build_static(
        runtime: Runtime,
        build: impl FnOnce(&mut ScopeBuilder) -> Result<(), BuildError>,
    ) -> Result<Scope, BuildError> {
        let mut builder = ScopeBuilder::new(runtime.clone());
        build(&mut builder)?;

        Ok(Scope {
            inner: Arc::new(ScopeInner {
                id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
                runtime,
                slots: Mutex::new(builder.finish()),
                dynamic: None,
            }),
        })
    }

    /// Register a rebuild effect with every dependency, then build.
    ///
    /// The effect holds the scope weakly: dropping the last [`Scope`] handle
    /// ends the subscription.
    pub fn build_dynamic(
        runtime: Runtime,
        build: BuildFn,
        deps: Vec<Arc<dyn Dependency>>,
    ) -> Result<Scope, BuildError> {
        let inner = Arc::new_cyclic(|weak: &Weak<ScopeInner>| {
            let weak = weak.clone();
            // One effect run per trigger, in trigger order.
            let mut trigger = 0u64;
            let effect = Effect::new(move || {
                trigger += 1;
                if let Some(inner) = weak.upgrade() {
                    Scope { inner }.rebuild_to(trigger);
                }
            });

            ScopeInner {
                id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
                runtime,
                slots: Mutex::new(Vec::new()),
                dynamic: Some(Dynamic {
                    build,
                    effect,
                    built: Mutex::new(0),
                }),
            }
        });
        let scope = Scope { inner };

        if let Some(dynamic) = &scope.inner.dynamic {
            let mut built = dynamic.built();
            for dep in &deps {
                dep.register(&dynamic.effect);
            }
            *built = dynamic.effect.trigger_count();
            let slots = scope.run_builder(&dynamic.build)?;
            scope.replace_slots(slots);
        }
        Ok(scope)
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn is_dynamic(&self) -> bool {
        self.inner.dynamic.is_some()
    }

    /// Trigger generation of the current contents. Always 0 for static scopes.
    pub fn generation(&self) -> u64 {
        self.inner
            .dynamic
            .as_ref()
            .map_or(0, |dynamic| *dynamic.built())
    }

    /// Whether a dependency fired since the last build.
    pub fn is_stale(&self) -> bool {
        self.inner.dynamic.as_ref().is_some_and(|dynamic| {
            dynamic.effect.trigger_count() > *dynamic.built()
        })
    }

    /// Rebuild if a dependency fired since the last build.
    ///
    /// Returns `true` if this call rebuilt. A failed or panicking rebuild is
    /// logged and leaves the scope empty.
    pub fn refresh(&self) -> bool {
        match &self.inner.dynamic {
            Some(dynamic) => self.rebuild_to(dynamic.effect.trigger_count()),
            None => false,
        }
    }

    /// Rebuild for trigger `target` unless the contents already cover it.
    fn rebuild_to(&self, target: u64) -> bool {
        let Some(dynamic) = &self.inner.dynamic else {
            return false;
        };

        let mut built = dynamic.built();
        if target <= *built {
            return false;
        }
        *built = target;

        tracing::debug!(scope = self.inner.id, generation = target, "rebuilding dynamic scope");
        let previous = self.replace_slots(Vec::new());
        drop(previous);

        match panic::catch_unwind(AssertUnwindSafe(|| self.run_builder(&dynamic.build))) {
            Ok(Ok(slots)) => {
                self.replace_slots(slots);
            }
            Ok(Err(error)) => {
                tracing::error!(scope = self.inner.id, generation = target, %error, "dynamic scope rebuild failed");
            }
            Err(_) => {
                tracing::error!(scope = self.inner.id, generation = target, "dynamic scope builder panicked");
            }
        }
        true
    }

    /// Copy of the current slots.
    pub fn slots(&self) -> Vec<Slot> {
        lock(&self.inner.slots).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.inner.slots).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Child contexts in slot order, including those of nested scopes.
    pub fn children(&self) -> Vec<Context> {
        let mut children = Vec::new();
        self.collect_children(&mut children);
        children
    }

    fn collect_children(&self, out: &mut Vec<Context>) {
        for slot in self.slots() {
            match slot {
                Slot::Child { context, .. } => out.push(context),
                Slot::Scope(scope) => scope.collect_children(out),
                Slot::Text(_) | Slot::Expr(_) => {}
            }
        }
    }

    /// Draw every slot in order, refreshing first.
    ///
    /// Text goes at the allocation cursor; each child gets the remaining
    /// area and is nested at its offset.
    pub fn draw(&self, dc: &mut DrawContext) {
        self.refresh();

        for slot in self.slots() {
            match slot {
                Slot::Text(content) => dc.line(&content),
                Slot::Expr(expr) => dc.line(&expr()),
                Slot::Scope(scope) => scope.draw(dc),
                Slot::Child { context, wrapper } => {
                    let mut sub = dc.child(dc.remaining());
                    match wrapper {
                        Some(wrapper) => wrapper.wrap(&context.view(), &mut sub),
                        None => context.draw(&mut sub),
                    }
                    dc.nest(sub);
                }
            }
        }
    }

    fn run_builder(&self, build: &BuildFn) -> Result<Vec<Slot>, BuildError> {
        let mut builder = ScopeBuilder::new(self.inner.runtime.clone());
        build(&mut builder)?;
        Ok(builder.finish())
    }

    fn replace_slots(&self, slots: Vec<Slot>) -> Vec<Slot> {
        std::mem::replace(&mut *lock(&self.inner.slots), slots)
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.inner.id)
            .field("dynamic", &self.is_dynamic())
            .field("slots", &self.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::State;
    use crate::renderer::View;
    use crate::types::Area;
    use std::time::{Duration, Instant};

    fn label(content: &'static str) -> impl Component {
        move |_cx: &Context| Ok::<_, BuildError>(View::text(content))
    }

    fn draw(scope: &Scope) -> Vec<String> {
        let mut dc = DrawContext::new(Area::sized(20, 10));
        scope.draw(&mut dc);
        dc.texts()
    }

    fn wait_until(mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if done() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        done()
    }

    #[test]
    fn test_static_scope_keeps_order() {
        let scope = Scope::build_static(Runtime::new(), |b| {
            b.text("a");
            b.child(label("b"))?;
            b.expr(|| "c".to_string());
            Ok(())
        })
        .unwrap();

        assert!(!scope.is_dynamic());
        assert_eq!(draw(&scope), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dynamic_scope_rebuilds_on_render() {
        let count = State::new(3usize);
        let source = count.clone();
        let scope = Scope::build_dynamic(
            Runtime::new(),
            Arc::new(move |b| {
                for _ in 0..source.get() {
                    b.child(label("row"))?;
                }
                Ok(())
            }),
            vec![count.dependency()],
        )
        .unwrap();

        let before: Vec<_> = scope.children().iter().map(Context::id).collect();
        assert_eq!(before.len(), 3);

        count.set(5);
        assert_eq!(draw(&scope).len(), 5);

        let after: Vec<_> = scope.children().iter().map(Context::id).collect();
        assert_eq!(after.len(), 5);
        assert!(before.iter().all(|id| !after.contains(id)), "children are replaced");
    }

    #[test]
    fn test_worker_rebuild_without_render() {
        let flag = State::new(false);
        let source = flag.clone();
        let scope = Scope::build_dynamic(
            Runtime::new(),
            Arc::new(move |b| {
                if source.get() {
                    b.text("on");
                }
                Ok(())
            }),
            vec![flag.dependency()],
        )
        .unwrap();
        assert!(scope.is_empty());

        flag.set(true);
        assert!(wait_until(|| scope.len() == 1));
        assert_eq!(scope.generation(), 1);
    }

    #[test]
    fn test_refresh_is_idempotent_per_generation() {
        let state = State::new(0);
        let runs = Arc::new(AtomicU64::new(0));
        let runs_in = runs.clone();
        let scope = Scope::build_dynamic(
            Runtime::new(),
            Arc::new(move |_| {
                runs_in.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
            vec![state.dependency()],
        )
        .unwrap();

        state.set(1);
        scope.refresh();
        scope.refresh();
        assert!(wait_until(|| scope.inner.dynamic.as_ref().is_some_and(|d| d.effect.run_count() == 1)));

        assert_eq!(runs.load(Ordering::SeqCst), 2, "initial build plus one rebuild");
        assert!(!scope.is_stale());
    }

    #[test]
    fn test_each_trigger_rebuilds_without_render() {
        let a = State::new(0);
        let b = State::new(0);
        let runs = Arc::new(AtomicU64::new(0));
        let runs_in = runs.clone();
        let scope = Scope::build_dynamic(
            Runtime::new(),
            Arc::new(move |_: &mut ScopeBuilder| -> Result<(), BuildError> {
                runs_in.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
            vec![a.dependency(), b.dependency()],
        )
        .unwrap();

        a.set(1);
        b.set(1);
        assert!(wait_until(|| scope.inner.dynamic.as_ref().is_some_and(|d| d.effect.run_count() == 2)));

        assert_eq!(runs.load(Ordering::SeqCst), 3, "initial build plus one rebuild per firing");
        assert_eq!(scope.generation(), 2);
    }

    #[test]
    fn test_panicking_builder_does_not_wedge_scope() {
        let value = State::new(0);
        let source = value.clone();
        let scope = Scope::build_dynamic(
            Runtime::new(),
            Arc::new(move |b: &mut ScopeBuilder| -> Result<(), BuildError> {
                let n = source.get();
                if n == 1 {
                    panic!("builder failed for {n}");
                }
                b.text(n.to_string());
                Ok(())
            }),
            vec![value.dependency()],
        )
        .unwrap();
        let effect = scope.inner.dynamic.as_ref().map(|d| d.effect.clone()).unwrap();

        value.set(1);
        assert!(wait_until(|| effect.run_count() == 1));
        assert!(draw(&scope).is_empty());

        value.set(2);
        assert!(wait_until(|| effect.run_count() == 2));
        assert_eq!(draw(&scope), vec!["2"]);
        assert!(!scope.is_stale());
    }

    #[test]
    fn test_wrapped_child_is_drawn_through_wrapper() {
        let scope = Scope::build_static(Runtime::new(), |b| {
            b.child_with(label("in"), ViewWrapper::padding(1))?;
            Ok(())
        })
        .unwrap();

        let mut dc = DrawContext::new(Area::sized(10, 4));
        scope.draw(&mut dc);
        let lines = dc.to_lines();

        assert_eq!(lines[0], "");
        assert_eq!(lines[1], " in");
        assert!(matches!(&scope.slots()[0], Slot::Child { wrapper: Some(_), .. }));
    }

    #[test]
    fn test_initial_build_error_is_returned() {
        let result = Scope::build_dynamic(
            Runtime::new(),
            Arc::new(|_| Err(BuildError::UnboundName("x".into()))),
            Vec::new(),
        );
        assert!(matches!(result, Err(BuildError::UnboundName(_))));
    }

    #[test]
    fn test_failed_rebuild_leaves_scope_empty() {
        let fail = State::new(false);
        let source = fail.clone();
        let scope = Scope::build_dynamic(
            Runtime::new(),
            Arc::new(move |b| {
                if source.get() {
                    return Err(BuildError::UnknownComponent("gone".into()));
                }
                b.text("ok");
                Ok(())
            }),
            vec![fail.dependency()],
        )
        .unwrap();

        fail.set(true);
        assert!(draw(&scope).is_empty());
    }

    #[test]
    fn test_dropped_scope_unsubscribes() {
        let state = State::new(0);
        let scope = Scope::build_dynamic(
            Runtime::new(),
            Arc::new(|_| Ok(())),
            vec![state.dependency()],
        )
        .unwrap();
        assert_eq!(state.subscriber_count(), 1);

        drop(scope);
        assert_eq!(state.subscriber_count(), 0);
    }
}

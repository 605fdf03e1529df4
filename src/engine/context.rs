//! Context - One live component instance.
//!
//! A [`Context`] is created when its parent scope materializes a component
//! and lives exactly as long as that scope keeps it. It owns:
//!
//! - its child [`Scope`]s, in creation order
//! - its event handlers, keyed by event type
//! - cells made with [`use_state`](Context::use_state)
//! - effects made with [`use_effect`](Context::use_effect) / [`on_mount`](Context::on_mount)
//! - the [`View`] its component returned
//!
//! Dropping the last handle drops all of that: child contexts, cells,
//! effects (and with them every subscription) and the widget id.
//!
//! ```ignore
//! let counter = |cx: &Context| {
//!     let count = cx.use_state(0);
//!     let shown = count.clone();
//!     cx.scope(|b| {
//!         b.expr(move || format!("count: {}", shown.get()));
//!         Ok(())
//!     })?;
//!     cx.on::<Increment>(move |_, _| count.update(|n| *n += 1));
//!     Ok(cx.children_view())
//! };
//! ```

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use super::component::Component;
use super::events::HandlerTable;
use super::runtime::Runtime;
use super::scope::{Scope, ScopeBuilder};
use crate::error::BuildError;
use crate::pipeline::{Command, CommandExecutor};
use crate::primitives::{Env, Node};
use crate::reactive::{lock, AutoMount, Dependency, Effect, State};
use crate::renderer::{DrawContext, View};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

struct ContextInner {
    id: u64,
    runtime: Runtime,
    scopes: Mutex<Vec<Scope>>,
    handlers: HandlerTable,
    locals: Mutex<Vec<Box<dyn Any + Send>>>,
    effects: Mutex<Vec<Effect>>,
    view: OnceLock<View>,
}

impl Drop for ContextInner {
    fn drop(&mut self) {
        self.runtime.widgets().release(self.id);
    }
}

/// Handle to a live component instance. Clones share the instance.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl Context {
    /// Create an instance of `component` and run its render.
    pub fn mount(runtime: Runtime, component: Box<dyn Component>) -> Result<Context, BuildError> {
        let context = Context {
            inner: Arc::new(ContextInner {
                id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
                runtime: runtime.clone(),
                scopes: Mutex::new(Vec::new()),
                handlers: HandlerTable::default(),
                locals: Mutex::new(Vec::new()),
                effects: Mutex::new(Vec::new()),
                view: OnceLock::new(),
            }),
        };
        runtime
            .widgets()
            .register(runtime.widgets().generate_id(), &context);

        let view = component.render(&context)?;
        // Render runs once per instance, so the cell is always empty here.
        let _ = context.inner.view.set(view);
        Ok(context)
    }

    /// Instance id, unique for the process.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn runtime(&self) -> &Runtime {
        &self.inner.runtime
    }

    pub fn widget_id(&self) -> String {
        self.inner
            .runtime
            .widgets()
            .id_of(self.inner.id)
            .unwrap_or_default()
    }

    /// Replace this instance's widget id.
    pub fn set_id(&self, id: impl Into<String>) {
        self.inner.runtime.widgets().register(id, self);
    }

    pub fn downgrade(&self) -> WeakContext {
        WeakContext {
            id: self.inner.id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub(super) fn handlers(&self) -> &HandlerTable {
        &self.inner.handlers
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    /// Add a static scope built by `build`.
    pub fn scope(
        &self,
        build: impl FnOnce(&mut ScopeBuilder) -> Result<(), BuildError>,
    ) -> Result<Scope, BuildError> {
        let scope = Scope::build_static(self.inner.runtime.clone(), build)?;
        lock(&self.inner.scopes).push(scope.clone());
        Ok(scope)
    }

    /// Add a dynamic scope, rebuilt whenever a dependency in `deps` fires.
    pub fn dynamic(
        &self,
        deps: Vec<Arc<dyn Dependency>>,
        build: impl Fn(&mut ScopeBuilder) -> Result<(), BuildError> + Send + Sync + 'static,
    ) -> Result<Scope, BuildError> {
        let scope = Scope::build_dynamic(self.inner.runtime.clone(), Arc::new(build), deps)?;
        lock(&self.inner.scopes).push(scope.clone());
        Ok(scope)
    }

    /// Add a static scope holding a declarative tree.
    pub fn nodes(&self, nodes: &[Node], env: &Env) -> Result<Scope, BuildError> {
        self.scope(|builder| builder.nodes(nodes, env))
    }

    pub fn scopes(&self) -> Vec<Scope> {
        lock(&self.inner.scopes).clone()
    }

    /// Immediate children across every scope, in slot order.
    pub fn children(&self) -> Vec<Context> {
        self.scopes()
            .iter()
            .flat_map(Scope::children)
            .collect()
    }

    // =========================================================================
    // Hooks
    // =========================================================================

    /// A cell owned by this instance.
    pub fn use_state<T: Send + 'static>(&self, initial: T) -> State<T> {
        let state = State::new(initial);
        lock(&self.inner.locals).push(Box::new(state.clone()));
        state
    }

    /// An effect owned by this instance, registered with every dependency.
    pub fn use_effect(
        &self,
        deps: Vec<Arc<dyn Dependency>>,
        callback: impl FnMut() + Send + 'static,
    ) -> Effect {
        let effect = Effect::new(callback);
        lock(&self.inner.effects).push(effect.clone());
        for dep in &deps {
            dep.register(&effect);
        }
        effect
    }

    /// Run `callback` once, on a worker, right after setup.
    pub fn on_mount(&self, callback: impl FnMut() + Send + 'static) -> Effect {
        let gate: Arc<dyn Dependency> = Arc::new(AutoMount);
        self.use_effect(vec![gate], callback)
    }

    /// Handle events of type `E` delivered to this instance.
    pub fn on<E: Any>(&self, handler: impl Fn(&E, &Context) + Send + Sync + 'static) {
        self.inner.handlers.add(handler);
    }

    /// Number of handlers for `E` on this instance.
    pub fn handler_count<E: Any>(&self) -> usize {
        self.inner.handlers.count::<E>()
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// The view returned by this instance's component.
    pub fn view(&self) -> View {
        self.inner.view.get().cloned().unwrap_or_else(View::empty)
    }

    pub fn draw(&self, dc: &mut DrawContext) {
        self.view().draw(dc);
    }

    /// A view drawing every scope of this instance in order.
    ///
    /// The view holds the instance weakly and draws nothing once it is gone.
    pub fn children_view(&self) -> View {
        let weak = Arc::downgrade(&self.inner);
        View::new(move |dc| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let scopes = lock(&inner.scopes).clone();
            for scope in scopes {
                scope.draw(dc);
            }
        })
    }

    // =========================================================================
    // Commands
    // =========================================================================

    pub fn commands(&self) -> Arc<dyn CommandExecutor> {
        self.inner.runtime.commands()
    }

    /// Ask the engine loop to stop after the current cycle.
    pub fn stop(&self) {
        self.commands().execute(Command::Stop);
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Context {}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.inner.id)
            .field("widget_id", &self.widget_id())
            .field("scopes", &lock(&self.inner.scopes).len())
            .finish()
    }
}

/// Non-owning handle to a [`Context`].
#[derive(Clone)]
pub struct WeakContext {
    id: u64,
    inner: Weak<ContextInner>,
}

impl WeakContext {
    pub fn upgrade(&self) -> Option<Context> {
        self.inner.upgrade().map(|inner| Context { inner })
    }

    /// Instance id of the context this handle pointed at.
    pub fn context_id(&self) -> u64 {
        self.id
    }
}

impl std::fmt::Debug for WeakContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakContext")
            .field("id", &self.id)
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Widget Registry - Id lookup for live contexts.
//!
//! Manages the mapping between widget ids and component instances:
//! - Every [`Context`] gets a generated id (`c0`, `c1`, ...) when it mounts
//! - [`Context::set_id`] swaps it for a caller-chosen id
//! - The entry is released when the context is dropped
//!
//! Entries hold contexts weakly; the registry never keeps a component alive.
//! Owned by the [`Runtime`](super::Runtime), never global.

use std::collections::HashMap;
use std::sync::Mutex;

use super::context::{Context, WeakContext};
use crate::reactive::lock;

#[derive(Default)]
struct RegistryState {
    /// Widget id to context.
    by_id: HashMap<String, WeakContext>,
    /// Context id to widget id.
    by_context: HashMap<u64, String>,
    /// Counter for generated ids.
    next: usize,
}

/// Id ↔ context mapping for one runtime.
#[derive(Default)]
pub struct WidgetRegistry {
    state: Mutex<RegistryState>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh `c{n}` id.
    pub fn generate_id(&self) -> String {
        let mut state = lock(&self.state);
        let id = format!("c{}", state.next);
        state.next += 1;
        id
    }

    /// Map `id` to `context`, replacing whatever id the context had.
    ///
    /// An id already held by another live context is taken over.
    pub fn register(&self, id: impl Into<String>, context: &Context) {
        let id = id.into();
        let mut state = lock(&self.state);

        if let Some(previous) = state.by_context.remove(&context.id()) {
            state.by_id.remove(&previous);
        }
        if let Some(displaced) = state.by_id.insert(id.clone(), context.downgrade()) {
            if displaced.context_id() != context.id() {
                tracing::debug!(id = %id, "widget id reassigned");
                state.by_context.remove(&displaced.context_id());
            }
        }
        state.by_context.insert(context.id(), id);
    }

    /// The live context registered under `id`.
    pub fn lookup(&self, id: &str) -> Option<Context> {
        lock(&self.state).by_id.get(id).and_then(WeakContext::upgrade)
    }

    /// The widget id of the context with this instance id.
    pub fn id_of(&self, context_id: u64) -> Option<String> {
        lock(&self.state).by_context.get(&context_id).cloned()
    }

    /// Forget a context. Called when it is dropped.
    pub fn release(&self, context_id: u64) {
        let mut state = lock(&self.state);
        if let Some(id) = state.by_context.remove(&context_id) {
            state.by_id.remove(&id);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.state).by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = lock(&self.state).by_id.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl std::fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::{Context, Runtime};
    use crate::error::BuildError;
    use crate::renderer::View;

    fn mount(runtime: &Runtime) -> Context {
        Context::mount(
            runtime.clone(),
            Box::new(|_cx: &Context| Ok::<_, BuildError>(View::empty())),
        )
        .unwrap()
    }

    #[test]
    fn test_generated_ids() {
        let runtime = Runtime::new();
        let a = mount(&runtime);
        let b = mount(&runtime);

        assert_eq!(a.widget_id(), "c0");
        assert_eq!(b.widget_id(), "c1");
        assert_eq!(runtime.lookup("c1").map(|cx| cx.id()), Some(b.id()));
    }

    #[test]
    fn test_set_id_replaces_generated() {
        let runtime = Runtime::new();
        let cx = mount(&runtime);
        cx.set_id("header");

        assert!(runtime.lookup("c0").is_none());
        assert_eq!(runtime.lookup("header").map(|found| found.id()), Some(cx.id()));
        assert_eq!(cx.widget_id(), "header");
    }

    #[test]
    fn test_drop_releases_id() {
        let runtime = Runtime::new();
        let cx = mount(&runtime);
        cx.set_id("gone");
        assert_eq!(runtime.widgets().len(), 1);

        drop(cx);
        assert!(runtime.lookup("gone").is_none());
        assert!(runtime.widgets().is_empty());
    }

    #[test]
    fn test_id_takeover() {
        let runtime = Runtime::new();
        let first = mount(&runtime);
        let second = mount(&runtime);
        first.set_id("main");
        second.set_id("main");

        assert_eq!(runtime.lookup("main").map(|cx| cx.id()), Some(second.id()));
        assert_eq!(runtime.widgets().id_of(first.id()), None);

        // Dropping the displaced context must not evict the new holder.
        drop(first);
        assert!(runtime.lookup("main").is_some());
    }
}

//! Runtime - The registries shared by one component tree.
//!
//! Every [`Context`] carries the runtime it was mounted with. Nothing in the
//! engine is global: two runtimes (two engines, or two tests) never see each
//! other's components, ids or stop requests.

use std::sync::Arc;

use super::component::ComponentRegistry;
use super::context::Context;
use super::registry::WidgetRegistry;
use crate::pipeline::{CommandExecutor, EngineHandle};

struct RuntimeInner {
    components: ComponentRegistry,
    widgets: WidgetRegistry,
    handle: EngineHandle,
}

/// Shared handle to the registries and the command channel.
#[derive(Clone)]
pub struct Runtime {
    inner: Arc<RuntimeInner>,
}

impl Runtime {
    /// A runtime with the built-in components and a fresh command handle.
    pub fn new() -> Self {
        Self::with_components(ComponentRegistry::with_builtins())
    }

    pub fn with_components(components: ComponentRegistry) -> Self {
        Self {
            inner: Arc::new(RuntimeInner {
                components,
                widgets: WidgetRegistry::new(),
                handle: EngineHandle::new(),
            }),
        }
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.inner.components
    }

    pub fn widgets(&self) -> &WidgetRegistry {
        &self.inner.widgets
    }

    /// The live context registered under `id`.
    pub fn lookup(&self, id: &str) -> Option<Context> {
        self.inner.widgets.lookup(id)
    }

    /// The engine control handle.
    pub fn handle(&self) -> &EngineHandle {
        &self.inner.handle
    }

    /// Command sink reachable from every context.
    pub fn commands(&self) -> Arc<dyn CommandExecutor> {
        Arc::new(self.inner.handle.clone())
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("components", &self.inner.components)
            .field("widgets", &self.inner.widgets)
            .field("handle", &self.inner.handle)
            .finish()
    }
}

//! Components and the component registry.
//!
//! A [`Component`] renders once per instance: it receives the new
//! [`Context`], sets up state, scopes and handlers, and returns the
//! [`View`] that draws it. Plain closures are components too.
//!
//! The [`ComponentRegistry`] maps names used in a declarative tree to
//! constructors, and validates props against declared [`Param`]s before any
//! constructor runs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::context::Context;
use crate::error::BuildError;
use crate::primitives::{BoxPrimitive, Children, Param, PropSet, Text};
use crate::reactive::lock;
use crate::renderer::View;

/// A component definition.
pub trait Component: Send + Sync + 'static {
    /// Build the instance behind `cx` and return how it draws.
    fn render(&self, cx: &Context) -> Result<View, BuildError>;
}

impl<F> Component for F
where
    F: Fn(&Context) -> Result<View, BuildError> + Send + Sync + 'static,
{
    fn render(&self, cx: &Context) -> Result<View, BuildError> {
        self(cx)
    }
}

/// A component constructible from a declarative tree.
pub trait ComponentProps: Component + Sized {
    /// Name used by [`Node::component`](crate::primitives::Node::component).
    const NAME: &'static str;

    /// Declared parameters, checked before [`from_props`](Self::from_props).
    fn params() -> Vec<Param>;

    /// Build from validated props. Consumed props may be taken out of `props`.
    fn from_props(props: &mut PropSet, children: Children) -> Result<Self, BuildError>;
}

/// Constructor stored in the registry.
pub type Factory =
    Arc<dyn Fn(&mut PropSet, Children) -> Result<Box<dyn Component>, BuildError> + Send + Sync>;

#[derive(Clone)]
struct Registration {
    params: Vec<Param>,
    factory: Factory,
}

/// Name → constructor table.
#[derive(Default)]
pub struct ComponentRegistry {
    entries: Mutex<HashMap<String, Registration>>,
}

impl ComponentRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `text` and `box` components.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register::<Text>();
        registry.register::<BoxPrimitive>();
        registry
    }

    /// Register a typed component under its [`ComponentProps::NAME`].
    pub fn register<C: ComponentProps>(&self) {
        self.register_fn(C::NAME, C::params(), |props, children| {
            C::from_props(props, children).map(|component| Box::new(component) as Box<dyn Component>)
        });
    }

    /// Register a constructor by hand. Replaces an existing entry.
    pub fn register_fn(
        &self,
        name: impl Into<String>,
        params: Vec<Param>,
        factory: impl Fn(&mut PropSet, Children) -> Result<Box<dyn Component>, BuildError>
            + Send
            + Sync
            + 'static,
    ) {
        let name = name.into();
        tracing::trace!(component = %name, "component registered");
        lock(&self.entries).insert(
            name,
            Registration {
                params,
                factory: Arc::new(factory),
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        lock(&self.entries).contains_key(name)
    }

    pub fn params(&self, name: &str) -> Option<Vec<Param>> {
        lock(&self.entries).get(name).map(|entry| entry.params.clone())
    }

    /// Validate `props` against `name`'s parameters and construct it.
    pub fn construct(
        &self,
        name: &str,
        mut props: PropSet,
        children: Children,
    ) -> Result<Box<dyn Component>, BuildError> {
        let entry = lock(&self.entries)
            .get(name)
            .cloned()
            .ok_or_else(|| BuildError::UnknownComponent(name.to_string()))?;

        props.validate(name, &entry.params)?;
        (entry.factory)(&mut props, children)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.entries).keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::ValueKind;

    struct Badge {
        label: String,
    }

    impl Component for Badge {
        fn render(&self, _cx: &Context) -> Result<View, BuildError> {
            Ok(View::text(format!("[{}]", self.label)))
        }
    }

    impl ComponentProps for Badge {
        const NAME: &'static str = "badge";

        fn params() -> Vec<Param> {
            vec![Param::required("label", ValueKind::Str)]
        }

        fn from_props(props: &mut PropSet, _children: Children) -> Result<Self, BuildError> {
            Ok(Badge {
                label: props.take_string("label").unwrap_or_default(),
            })
        }
    }

    #[test]
    fn test_builtins_registered() {
        let registry = ComponentRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["box", "text"]);
    }

    #[test]
    fn test_unknown_component() {
        let registry = ComponentRegistry::new();
        let err = registry
            .construct("nope", PropSet::new(), Children::none())
            .err();
        assert_eq!(err, Some(BuildError::UnknownComponent("nope".into())));
    }

    #[test]
    fn test_construct_validates_before_factory() {
        let registry = ComponentRegistry::new();
        registry.register::<Badge>();

        let missing = registry.construct("badge", PropSet::new(), Children::none()).err();
        assert!(matches!(missing, Some(BuildError::MissingProp { .. })));

        let ok = registry.construct("badge", PropSet::new().with("label", "new"), Children::none());
        assert!(ok.is_ok());
    }

    #[test]
    fn test_register_fn_replaces() {
        let registry = ComponentRegistry::new();
        registry.register::<Badge>();
        registry.register_fn("badge", Vec::new(), |_, _| {
            Ok(Box::new(|_cx: &Context| Ok::<_, BuildError>(View::empty())) as Box<dyn Component>)
        });

        assert_eq!(registry.params("badge"), Some(Vec::new()));
    }
}

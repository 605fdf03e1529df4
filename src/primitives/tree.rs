//! Declarative tree - Pure data describing a UI.
//!
//! Any producer (hand-written code, a parser, a macro) can emit a
//! `Vec<Node>`. Nothing here is live: a [`ScopeBuilder`] turns nodes into
//! component instances (see [`ScopeBuilder::nodes`]).
//!
//! ```text
//! Component "box" { padding: 1 }
//! ├── Text "Items:"
//! └── Iteration (item in items) [deps: items]
//!     └── Component "text" { content: item }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::types::{PropExpr, Value};
use crate::engine::ScopeBuilder;
use crate::error::BuildError;
use crate::reactive::{Dependency, ManualMount};

/// Text computed from the binding environment.
pub type ExprFn = Arc<dyn Fn(&Env) -> String + Send + Sync>;
/// Branch selector of a conditional block.
pub type PredicateFn = Arc<dyn Fn(&Env) -> bool + Send + Sync>;
/// Items of an iteration block.
pub type SourceFn = Arc<dyn Fn(&Env) -> Vec<Value> + Send + Sync>;

// =============================================================================
// Env
// =============================================================================

/// Name bindings visible while a subtree materializes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Env {
    bindings: HashMap<String, Value>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// This environment plus one binding. Shadows an existing name.
    pub fn with(&self, name: impl Into<String>, value: impl Into<Value>) -> Env {
        let mut env = self.clone();
        env.bindings.insert(name.into(), value.into());
        env
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn get(&self, name: &str) -> Result<&Value, BuildError> {
        self.lookup(name)
            .ok_or_else(|| BuildError::UnboundName(name.to_string()))
    }

    /// Bind `value` through `pattern`.
    pub fn bind(&mut self, pattern: &Pattern, value: Value) -> Result<(), BuildError> {
        match pattern {
            Pattern::Name(name) => {
                self.bindings.insert(name.clone(), value);
                Ok(())
            }
            Pattern::Tuple(names) => match value {
                Value::List(items) if items.len() == names.len() => {
                    for (name, item) in names.iter().zip(items) {
                        self.bindings.insert(name.clone(), item);
                    }
                    Ok(())
                }
                other => Err(BuildError::Pattern {
                    pattern: pattern.to_string(),
                    found: other.kind(),
                }),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// How an iteration binds each item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// `item`
    Name(String),
    /// `(key, value)`, destructuring a list of the same length.
    Tuple(Vec<String>),
}

impl Pattern {
    pub fn name(name: impl Into<String>) -> Self {
        Pattern::Name(name.into())
    }

    pub fn tuple<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Pattern::Tuple(names.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Name(name) => f.write_str(name),
            Pattern::Tuple(names) => write!(f, "({})", names.join(", ")),
        }
    }
}

// =============================================================================
// Node
// =============================================================================

/// One element of a declarative tree.
#[derive(Clone)]
pub enum Node {
    /// Literal text.
    Text(String),
    /// Text computed from the environment.
    Expr(ExprFn),
    /// A registered component.
    Component {
        target: String,
        props: Vec<(String, PropExpr)>,
        children: Vec<Node>,
    },
    /// `then` or `otherwise`, re-chosen whenever a dependency fires.
    Conditional {
        deps: Vec<Arc<dyn Dependency>>,
        predicate: PredicateFn,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    /// `body` once per source item, rebuilt whenever a dependency fires.
    Iteration {
        deps: Vec<Arc<dyn Dependency>>,
        pattern: Pattern,
        source: SourceFn,
        body: Vec<Node>,
    },
    /// Fires a manual mount gate when materialized.
    MountTrigger(ManualMount),
}

impl Node {
    pub fn text(content: impl Into<String>) -> Node {
        Node::Text(content.into())
    }

    pub fn expr(f: impl Fn(&Env) -> String + Send + Sync + 'static) -> Node {
        Node::Expr(Arc::new(f))
    }

    /// Show the value bound to `name`.
    pub fn binding(name: impl Into<String>) -> Node {
        let name = name.into();
        Node::expr(move |env| {
            env.lookup(&name)
                .map(ToString::to_string)
                .unwrap_or_default()
        })
    }

    pub fn component(target: impl Into<String>) -> ComponentNode {
        ComponentNode {
            target: target.into(),
            props: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn conditional(
        deps: Vec<Arc<dyn Dependency>>,
        predicate: impl Fn(&Env) -> bool + Send + Sync + 'static,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    ) -> Node {
        Node::Conditional {
            deps,
            predicate: Arc::new(predicate),
            then,
            otherwise,
        }
    }

    pub fn iteration(
        deps: Vec<Arc<dyn Dependency>>,
        pattern: Pattern,
        source: impl Fn(&Env) -> Vec<Value> + Send + Sync + 'static,
        body: Vec<Node>,
    ) -> Node {
        Node::Iteration {
            deps,
            pattern,
            source: Arc::new(source),
            body,
        }
    }

    pub fn mount_trigger(gate: &ManualMount) -> Node {
        Node::MountTrigger(gate.clone())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(content) => f.debug_tuple("Text").field(content).finish(),
            Node::Expr(_) => f.write_str("Expr(..)"),
            Node::Component {
                target,
                props,
                children,
            } => f
                .debug_struct("Component")
                .field("target", target)
                .field("props", props)
                .field("children", children)
                .finish(),
            Node::Conditional {
                deps,
                then,
                otherwise,
                ..
            } => f
                .debug_struct("Conditional")
                .field("deps", &deps.len())
                .field("then", then)
                .field("otherwise", otherwise)
                .finish(),
            Node::Iteration {
                deps,
                pattern,
                body,
                ..
            } => f
                .debug_struct("Iteration")
                .field("deps", &deps.len())
                .field("pattern", pattern)
                .field("body", body)
                .finish(),
            Node::MountTrigger(gate) => f.debug_tuple("MountTrigger").field(gate).finish(),
        }
    }
}

/// Builder for [`Node::Component`].
#[derive(Debug, Clone)]
pub struct ComponentNode {
    target: String,
    props: Vec<(String, PropExpr)>,
    children: Vec<Node>,
}

impl ComponentNode {
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props
            .push((name.into(), PropExpr::Literal(value.into())));
        self
    }

    /// A prop taking the value bound to `binding`.
    pub fn bind(mut self, name: impl Into<String>, binding: impl Into<String>) -> Self {
        self.props
            .push((name.into(), PropExpr::Binding(binding.into())));
        self
    }

    pub fn computed(
        mut self,
        name: impl Into<String>,
        compute: impl Fn(&Env) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.props
            .push((name.into(), PropExpr::Computed(Arc::new(compute))));
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn build(self) -> Node {
        Node::Component {
            target: self.target,
            props: self.props,
            children: self.children,
        }
    }
}

impl From<ComponentNode> for Node {
    fn from(node: ComponentNode) -> Self {
        node.build()
    }
}

// =============================================================================
// Children
// =============================================================================

/// The child nodes handed to a component constructor, with the environment
/// they were declared in.
#[derive(Debug, Clone, Default)]
pub struct Children {
    nodes: Vec<Node>,
    env: Env,
}

impl Children {
    pub fn new(nodes: Vec<Node>, env: Env) -> Self {
        Self { nodes, env }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Materialize the children into `builder`, in declaration order.
    pub fn materialize(&self, builder: &mut ScopeBuilder) -> Result<(), BuildError> {
        builder.nodes(&self.nodes, &self.env)
    }
}

//! Declarative tree to scope materialization.
//!
//! One walk over a node list, appending to a [`ScopeBuilder`]:
//!
//! | Node           | Becomes                                             |
//! |----------------|-----------------------------------------------------|
//! | `Text`         | literal slot                                        |
//! | `Expr`         | expression slot, evaluated against the env per draw |
//! | `Component`    | registry lookup, prop check, child context          |
//! | `Conditional`  | nested dynamic scope choosing a branch per build    |
//! | `Iteration`    | nested dynamic scope with one body per item         |
//! | `MountTrigger` | fires the gate                                      |
//!
//! Any [`BuildError`] aborts the walk; the caller decides what that means
//! (a failed initial build propagates, a failed rebuild leaves the scope
//! empty).

use super::tree::{Children, Env, Node};
use super::types::PropSet;
use crate::engine::ScopeBuilder;
use crate::error::BuildError;

impl ScopeBuilder {
    /// Materialize `nodes` in order.
    pub fn nodes(&mut self, nodes: &[Node], env: &Env) -> Result<(), BuildError> {
        for node in nodes {
            self.node(node, env)?;
        }
        Ok(())
    }

    fn node(&mut self, node: &Node, env: &Env) -> Result<(), BuildError> {
        match node {
            Node::Text(content) => self.text(content.clone()),

            Node::Expr(expr) => {
                let expr = expr.clone();
                let env = env.clone();
                self.expr(move || expr(&env));
            }

            Node::Component {
                target,
                props,
                children,
            } => {
                let mut prop_set = PropSet::new();
                for (name, value) in props {
                    prop_set.insert(name.clone(), value.evaluate(env)?);
                }
                let component = self.runtime().components().construct(
                    target,
                    prop_set,
                    Children::new(children.clone(), env.clone()),
                )?;
                self.child_boxed(component, None)?;
            }

            Node::Conditional {
                deps,
                predicate,
                then,
                otherwise,
            } => {
                let predicate = predicate.clone();
                let (then, otherwise) = (then.clone(), otherwise.clone());
                let env = env.clone();
                self.dynamic(deps.clone(), move |builder| {
                    let branch = if predicate(&env) { &then } else { &otherwise };
                    builder.nodes(branch, &env)
                })?;
            }

            Node::Iteration {
                deps,
                pattern,
                source,
                body,
            } => {
                let (pattern, source, body) = (pattern.clone(), source.clone(), body.clone());
                let env = env.clone();
                self.dynamic(deps.clone(), move |builder| {
                    for item in source(&env) {
                        let mut item_env = env.clone();
                        item_env.bind(&pattern, item)?;
                        builder.nodes(&body, &item_env)?;
                    }
                    Ok(())
                })?;
            }

            Node::MountTrigger(gate) => {
                gate.mount();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Context, Runtime};
    use crate::primitives::{Pattern, Value, ValueKind};
    use crate::reactive::{Dependency, Effect, ManualMount, State};
    use crate::renderer::{DrawContext, View};
    use crate::types::Area;

    fn mount(nodes: Vec<Node>) -> Result<Context, BuildError> {
        Context::mount(
            Runtime::new(),
            Box::new(move |cx: &Context| -> Result<View, BuildError> {
                cx.nodes(&nodes, &Env::new())?;
                Ok(cx.children_view())
            }),
        )
    }

    fn lines(cx: &Context) -> Vec<String> {
        let mut dc = DrawContext::new(Area::sized(24, 8));
        cx.draw(&mut dc);
        dc.texts()
    }

    #[test]
    fn test_text_only_round_trip() {
        let cx = mount(vec![Node::text("a"), Node::text("b"), Node::text("c")]).unwrap();
        assert_eq!(lines(&cx), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_component_props_and_children() {
        let cx = mount(vec![
            Node::component("box")
                .prop("title", "T")
                .child(Node::component("text").prop("content", "inside"))
                .build(),
        ])
        .unwrap();
        assert_eq!(lines(&cx), vec!["T", "inside"]);
    }

    #[test]
    fn test_unknown_component_fails_build() {
        let err = mount(vec![Node::component("missing").build()]).unwrap_err();
        assert_eq!(err, BuildError::UnknownComponent("missing".into()));
    }

    #[test]
    fn test_prop_type_mismatch_fails_build() {
        let err = mount(vec![Node::component("text").prop("content", 5).build()]).unwrap_err();
        assert_eq!(
            err,
            BuildError::PropType {
                component: "text".into(),
                prop: "content".into(),
                expected: ValueKind::Str,
                found: ValueKind::Int,
            }
        );
    }

    #[test]
    fn test_binding_prop_unbound() {
        let err = mount(vec![Node::component("text").bind("content", "nope").build()]).unwrap_err();
        assert_eq!(err, BuildError::UnboundName("nope".into()));
    }

    #[test]
    fn test_conditional_switches_branch() {
        let flag = State::new(false);
        let read = flag.clone();
        let cx = mount(vec![Node::conditional(
            vec![flag.dependency()],
            move |_| read.get(),
            vec![Node::text("then")],
            vec![Node::text("else")],
        )])
        .unwrap();

        assert_eq!(lines(&cx), vec!["else"]);
        flag.set(true);
        assert_eq!(lines(&cx), vec!["then"]);
    }

    #[test]
    fn test_iteration_binds_items_in_order() {
        let items = State::new(vec!["x", "y"]);
        let read = items.clone();
        let cx = mount(vec![
            Node::text("before"),
            Node::iteration(
                vec![items.dependency()],
                Pattern::name("item"),
                move |_| read.get().into_iter().map(Value::from).collect(),
                vec![Node::component("text").bind("content", "item").build()],
            ),
            Node::text("after"),
        ])
        .unwrap();

        assert_eq!(lines(&cx), vec!["before", "x", "y", "after"]);
        items.set(vec!["p", "q", "r"]);
        assert_eq!(lines(&cx), vec!["before", "p", "q", "r", "after"]);
    }

    #[test]
    fn test_iteration_tuple_pattern() {
        let cx = mount(vec![Node::iteration(
            Vec::new(),
            Pattern::tuple(["k", "v"]),
            |_| vec![Value::from(vec![Value::from("a"), Value::from(1)])],
            vec![Node::expr(|env| {
                format!(
                    "{}={}",
                    env.lookup("k").map(ToString::to_string).unwrap_or_default(),
                    env.lookup("v").map(ToString::to_string).unwrap_or_default()
                )
            })],
        )])
        .unwrap();

        assert_eq!(lines(&cx), vec!["a=1"]);
    }

    #[test]
    fn test_mount_trigger_fires_gate() {
        let gate = ManualMount::new();
        let effect = Effect::new(|| {});
        gate.register(&effect);

        let _cx = mount(vec![Node::mount_trigger(&gate)]).unwrap();
        assert!(gate.is_mounted());
        assert_eq!(effect.trigger_count(), 1);
    }

    #[test]
    fn test_expr_reads_env() {
        let cx = Context::mount(
            Runtime::new(),
            Box::new(|cx: &Context| -> Result<View, BuildError> {
                cx.nodes(&[Node::binding("name")], &Env::new().with("name", "env"))?;
                Ok(cx.children_view())
            }),
        )
        .unwrap();
        assert_eq!(lines(&cx), vec!["env"]);
    }
}

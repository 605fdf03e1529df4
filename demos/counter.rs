//! Counter Example - Reactive cells, a declarative tree and keyboard input.
//!
//! - `+` / `-` change the counter
//! - `h` appends the current value to the history list
//! - `q` or Ctrl+C exits
//!
//! Run with: cargo run --example counter

use std::time::Duration;

use spark_tui_core::{
    BuildError, Context, CrosstermBackend, Engine, EngineConfig, EngineLoop, Env,
    KeyboardEvent, Node, Pattern, RenderMode, Value, View,
};

fn counter(cx: &Context) -> Result<View, BuildError> {
    let count = cx.use_state(0i64);
    let history = cx.use_state(Vec::<i64>::new());

    let shown = count.clone();
    let parity = count.clone();
    let entries = history.clone();

    let tree = vec![
        Node::component("box")
            .prop("title", "spark-tui-core counter")
            .prop("padding", 1)
            .child(Node::expr(move |_| format!("Counter: {}", shown.get())))
            .child(Node::conditional(
                vec![count.dependency()],
                move |_| parity.get() % 2 == 0,
                vec![Node::text("(even)")],
                vec![Node::text("(odd)")],
            ))
            .child(Node::text("History:"))
            .child(Node::iteration(
                vec![history.dependency()],
                Pattern::tuple(["index", "value"]),
                move |_| {
                    entries
                        .get()
                        .into_iter()
                        .enumerate()
                        .map(|(index, value)| Value::from(vec![Value::from(index), Value::from(value)]))
                        .collect()
                },
                vec![Node::expr(|env| {
                    let field = |name| env.lookup(name).map(ToString::to_string).unwrap_or_default();
                    format!("  {}. {}", field("index"), field("value"))
                })],
            ))
            .child(Node::text("+/- change, h record, q quit"))
            .build(),
    ];
    cx.nodes(&tree, &Env::new())?;

    cx.on::<KeyboardEvent>(move |event, cx| {
        if !event.is_press() {
            return;
        }
        match event.key.as_str() {
            "+" => count.update(|n| *n += 1),
            "-" => count.update(|n| *n -= 1),
            "h" => {
                let value = count.get();
                history.update(|items| items.push(value));
            }
            "q" => cx.stop(),
            _ => {}
        }
    });

    Ok(cx.children_view())
}

fn main() {
    let config = EngineConfig::default()
        .render_mode(RenderMode::Fullscreen)
        .frame_interval(Duration::from_millis(16));
    let mut engine = EngineLoop::new(CrosstermBackend::stdout(), config);

    if let Err(err) = engine.run(Box::new(counter)) {
        eprintln!("counter failed: {err}");
    }
}

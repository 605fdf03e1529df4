//! Text Primitive - Display text.
//!
//! A pure display component. Cannot have children.
//!
//! # Reactivity
//!
//! Content can be a static string or a getter. A getter is evaluated on
//! every draw, so text reading a [`State`](crate::reactive::State) follows
//! it without rebuilding anything.
//!
//! # Example
//!
//! ```ignore
//! use spark_tui_core::primitives::Text;
//!
//! // Static text
//! builder.child(Text::new("Hello, World!"))?;
//!
//! // Reactive text
//! let count = cx.use_state(0);
//! let shown = count.clone();
//! builder.child(Text::getter(move || format!("Count: {}", shown.get())))?;
//!
//! count.set(42); // next draw shows "Count: 42"
//! ```

use std::sync::Arc;

use super::tree::Children;
use super::types::{Param, PropSet, ValueKind};
use crate::engine::{Component, ComponentProps, Context};
use crate::error::BuildError;
use crate::renderer::View;

/// Where a text component gets its content.
#[derive(Clone)]
pub enum TextContent {
    Static(String),
    Getter(Arc<dyn Fn() -> String + Send + Sync>),
}

impl TextContent {
    pub fn get(&self) -> String {
        match self {
            TextContent::Static(content) => content.clone(),
            TextContent::Getter(getter) => getter(),
        }
    }
}

/// The built-in `text` component.
#[derive(Clone)]
pub struct Text {
    content: TextContent,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: TextContent::Static(content.into()),
        }
    }

    pub fn getter(getter: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self {
            content: TextContent::Getter(Arc::new(getter)),
        }
    }
}

impl Component for Text {
    fn render(&self, _cx: &Context) -> Result<View, BuildError> {
        Ok(match &self.content {
            TextContent::Static(content) => View::text(content.clone()),
            TextContent::Getter(getter) => {
                let getter = getter.clone();
                View::new(move |dc| dc.line(&getter()))
            }
        })
    }
}

impl ComponentProps for Text {
    const NAME: &'static str = "text";

    fn params() -> Vec<Param> {
        vec![Param::required("content", ValueKind::Str)]
    }

    fn from_props(props: &mut PropSet, _children: Children) -> Result<Self, BuildError> {
        Ok(Text::new(props.take_string("content").unwrap_or_default()))
    }
}

impl std::fmt::Debug for Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.content {
            TextContent::Static(content) => f.debug_tuple("Text").field(content).finish(),
            TextContent::Getter(_) => f.write_str("Text(<getter>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Runtime;
    use crate::reactive::State;
    use crate::renderer::DrawContext;
    use crate::types::Area;

    fn draw(cx: &Context) -> Vec<String> {
        let mut dc = DrawContext::new(Area::sized(20, 4));
        cx.draw(&mut dc);
        dc.to_lines()
    }

    #[test]
    fn test_static_text() {
        let cx = Context::mount(Runtime::new(), Box::new(Text::new("hello"))).unwrap();
        assert_eq!(draw(&cx)[0], "hello");
    }

    #[test]
    fn test_getter_follows_state() {
        let count = State::new(1);
        let shown = count.clone();
        let cx = Context::mount(
            Runtime::new(),
            Box::new(Text::getter(move || format!("n={}", shown.get()))),
        )
        .unwrap();

        assert_eq!(draw(&cx)[0], "n=1");
        count.set(2);
        assert_eq!(draw(&cx)[0], "n=2");
    }

    #[test]
    fn test_from_props() {
        let mut props = PropSet::new().with("content", "from tree");
        let text = Text::from_props(&mut props, Children::none()).unwrap();
        assert_eq!(text.content.get(), "from tree");
    }
}

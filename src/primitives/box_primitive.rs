//! Box Primitive - Container component.
//!
//! The fundamental container. Draws its children top to bottom, optionally
//! under a title line and inset by padding.
//!
//! # Example
//!
//! ```ignore
//! use spark_tui_core::primitives::{BoxPrimitive, Node};
//!
//! let tree = vec![
//!     Node::component("box")
//!         .prop("padding", 1)
//!         .prop("title", "Items")
//!         .child(Node::component("text").prop("content", "Hello!"))
//!         .build(),
//! ];
//! ```

use super::tree::Children;
use super::types::{Param, PropSet, ValueKind};
use crate::engine::{Component, ComponentProps, Context};
use crate::error::BuildError;
use crate::renderer::{View, ViewWrapper};

/// The built-in `box` component.
#[derive(Debug, Clone, Default)]
pub struct BoxPrimitive {
    padding: u16,
    title: Option<String>,
    children: Children,
}

impl BoxPrimitive {
    pub fn new(children: Children) -> Self {
        Self {
            children,
            ..Self::default()
        }
    }

    pub fn padding(mut self, padding: u16) -> Self {
        self.padding = padding;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Component for BoxPrimitive {
    fn render(&self, cx: &Context) -> Result<View, BuildError> {
        cx.scope(|builder| self.children.materialize(builder))?;

        let mut view = cx.children_view();
        if self.padding > 0 {
            view = wrap(view, ViewWrapper::padding(self.padding));
        }
        if let Some(title) = &self.title {
            view = wrap(view, ViewWrapper::titled(title.clone()));
        }
        Ok(view)
    }
}

fn wrap(inner: View, wrapper: ViewWrapper) -> View {
    View::new(move |dc| wrapper.wrap(&inner, dc))
}

impl ComponentProps for BoxPrimitive {
    const NAME: &'static str = "box";

    fn params() -> Vec<Param> {
        vec![
            Param::optional("padding", ValueKind::Int),
            Param::optional("title", ValueKind::Str),
        ]
    }

    fn from_props(props: &mut PropSet, children: Children) -> Result<Self, BuildError> {
        let padding = props
            .take_int("padding")
            .map_or(0, |padding| u16::try_from(padding.max(0)).unwrap_or(u16::MAX));
        Ok(BoxPrimitive {
            padding,
            title: props.take_string("title"),
            children,
        })
    }
}

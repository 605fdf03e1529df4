//! Views - cached render closures.
//!
//! A [`View`] draws into a [`DrawContext`]. A [`ViewWrapper`] decorates a
//! child's view at the slot that holds it, without the child knowing.

use std::sync::Arc;

use super::draw::DrawContext;
use crate::types::Area;

/// A render closure producing draw instructions for a region.
#[derive(Clone)]
pub struct View(Arc<dyn Fn(&mut DrawContext) + Send + Sync>);

impl View {
    pub fn new(draw: impl Fn(&mut DrawContext) + Send + Sync + 'static) -> Self {
        Self(Arc::new(draw))
    }

    /// A view that draws nothing.
    pub fn empty() -> Self {
        Self::new(|_| {})
    }

    /// A view that writes one line of text at the allocation cursor.
    pub fn text(content: impl Into<String>) -> Self {
        let content = content.into();
        Self::new(move |dc| dc.line(&content))
    }

    pub fn draw(&self, dc: &mut DrawContext) {
        (self.0)(dc);
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("View(..)")
    }
}

/// Decorates the view of the child held in a scope slot.
///
/// The wrapper receives the child's view and the child's draw context and
/// decides where (and whether) the child draws.
#[derive(Clone)]
pub struct ViewWrapper(Arc<dyn Fn(&View, &mut DrawContext) + Send + Sync>);

impl ViewWrapper {
    pub fn new(wrap: impl Fn(&View, &mut DrawContext) + Send + Sync + 'static) -> Self {
        Self(Arc::new(wrap))
    }

    /// Draw the child inset by `amount` cells on every side.
    pub fn padding(amount: u16) -> Self {
        Self::new(move |inner, dc| {
            let mut padded = dc.child(dc.area().at_origin().inset(amount));
            inner.draw(&mut padded);

            if let Some(used) = padded.allocated() {
                let bottom = padded
                    .area()
                    .y
                    .saturating_add(used.bottom())
                    .saturating_add(amount)
                    .min(dc.area().height);
                dc.reserve(Area::sized(dc.area().width, bottom));
            }
            dc.nest(padded);
        })
    }

    /// Draw a line of text above the child.
    pub fn titled(title: impl Into<String>) -> Self {
        let title = title.into();
        Self::new(move |inner, dc| {
            dc.line(&title);
            let mut body = dc.child(dc.remaining());
            inner.draw(&mut body);
            dc.nest(body);
        })
    }

    pub fn wrap(&self, inner: &View, dc: &mut DrawContext) {
        (self.0)(inner, dc);
    }
}

impl std::fmt::Debug for ViewWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ViewWrapper(..)")
    }
}

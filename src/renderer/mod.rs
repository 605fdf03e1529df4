//! Renderer - Draw instructions and views.
//!
//! - [`DrawContext`] - Instruction accumulator for one region
//! - [`View`] - A cached render closure
//! - [`ViewWrapper`] - Decorates a child's view at its slot
//!
//! Backends consume a composed [`DrawContext`] via [`DrawContext::flatten`]
//! or [`DrawContext::to_lines`].

mod draw;
mod view;

pub use draw::*;
pub use view::*;

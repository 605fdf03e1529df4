//! TUI Primitives - Declarative trees and built-in components.
//!
//! This module provides:
//! - [`Node`] - The declarative tree any producer can emit
//! - [`Value`] / [`PropSet`] / [`Param`] - Dynamically typed props
//! - [`Env`] / [`Pattern`] - Name bindings for iteration and expressions
//! - [`Text`] - Text display, registered as `text`
//! - [`BoxPrimitive`] - Container with padding and title, registered as `box`
//! - [`AsyncState`] / [`WhenOptions`] - Typed control flow helpers
//!
//! # Materialization
//!
//! A tree becomes live when a scope builder walks it:
//!
//! ```ignore
//! let tree = vec![
//!     Node::text("Todos:"),
//!     Node::iteration(
//!         vec![todos.dependency()],
//!         Pattern::name("todo"),
//!         move |_| todos_read.get().into_iter().map(Value::from).collect(),
//!         vec![Node::component("text").bind("content", "todo").build()],
//!     ),
//! ];
//!
//! cx.nodes(&tree, &Env::new())?;
//! ```
//!
//! Props are checked against the target's declared parameters before the
//! constructor runs; every violation is a [`BuildError`](crate::BuildError).

mod box_primitive;
mod control_flow;
mod materialize;
mod text;
mod tree;
mod types;

pub use box_primitive::BoxPrimitive;
pub use control_flow::{AsyncState, BranchFn, WhenOptions};
pub use text::{Text, TextContent};
pub use tree::*;
pub use types::*;

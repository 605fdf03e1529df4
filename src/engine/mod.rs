//! TUI Engine - Component instances, scopes and registries.
//!
//! The engine manages the live component tree:
//! - [`Component`]: A definition that renders into a [`Context`]
//! - [`Context`]: One live instance, owning scopes, handlers, cells, effects
//! - [`Scope`]: Ordered slots, static or rebuilt from dependencies
//! - [`ComponentRegistry`]: Name → constructor, with prop validation
//! - [`WidgetRegistry`]: Widget id → live context
//! - [`Runtime`]: The registries and command channel one tree shares
//!
//! # Architecture
//!
//! ```text
//! Context (root)
//! ├── Scope (static)
//! │   ├── Text "header"
//! │   ├── Child → Context
//! │   └── Scope (dynamic, deps: [items])
//! │       ├── Child → Context
//! │       └── Child → Context
//! └── View (draws the scopes above)
//! ```
//!
//! Ownership flows strictly downward. Effects reach back to their scope
//! through a `Weak`, and dependencies hold effects weakly, so dropping a
//! context releases its whole subtree and every subscription it made.

mod component;
mod context;
mod events;
mod registry;
mod runtime;
mod scope;

pub use component::*;
pub use context::*;
pub use registry::*;
pub use runtime::*;
pub use scope::*;

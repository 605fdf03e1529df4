//! # spark-tui-core
//!
//! Reactive rendering core for terminal UIs.
//!
//! ## Architecture
//!
//! A UI is a tree of live component instances ([`Context`]s). Each context
//! owns ordered [`Scope`]s; a dynamic scope is rebuilt whenever one of its
//! dependencies ([`State`] cells, mount gates) fires. Drawing composes one
//! [`DrawContext`] per cycle, which the [`EngineLoop`] hands to a
//! [`Backend`].
//!
//! ```text
//! Vec<Node> ──materialize──▶ Context ─┬─ Scope (static)
//!                                     └─ Scope (dynamic) ◀── Effect ◀── State::set
//!          EngineLoop: draw root → Backend::draw → poll_input → emit → stop?
//! ```
//!
//! Effects, concurrent events and user background jobs run on the rayon
//! pool. Rendering happens on the thread that called [`Engine::run`].
//!
//! ## Modules
//!
//! - [`reactive`] - Cells, effects, mount gates, the worker pool
//! - [`engine`] - Contexts, scopes, component and widget registries
//! - [`primitives`] - Declarative trees, props, built-in `text` and `box`
//! - [`renderer`] - Draw instructions, views, rasterization
//! - [`pipeline`] - Engine loop, backends, commands, timing
//! - [`input`] - Keyboard and resize events
//! - [`types`] - Geometry
//!
//! ## Logging
//!
//! Everything is instrumented with `tracing`. The library never installs a
//! subscriber.

pub mod engine;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod primitives;
pub mod reactive;
pub mod renderer;
pub mod types;

// Re-export commonly used items
pub use types::Area;

pub use error::{BackendError, BuildError};

pub use reactive::{AutoMount, Dependency, Effect, ManualMount, State};

pub use engine::{
    Component, ComponentProps, ComponentRegistry, Context, Runtime, Scope, ScopeBuilder,
    WidgetRegistry,
};

pub use primitives::{
    AsyncState, BoxPrimitive, Children, Env, Node, Param, Pattern, PropExpr, PropSet, Text,
    Value, ValueKind, WhenOptions,
};

pub use renderer::{DrawContext, DrawInstruction, View, ViewWrapper};

pub use pipeline::{
    Backend, Command, CommandExecutor, CrosstermBackend, Engine, EngineConfig, EngineLoop,
    EngineState, RenderMode, TestBackend, TimingEngine, TimingReport,
};

pub use input::{InputEvent, KeyState, KeyboardEvent, Modifiers, ResizeEvent};

//! Render Pipeline - From a root component to a backend, cycle by cycle.
//!
//! # Pipeline Architecture
//!
//! ```text
//! Root Context → View → DrawContext (per cycle) → Backend::draw
//!      ▲                                             │
//!      └────── emit(KeyboardEvent) ◀── poll_input ◀──┘
//! ```
//!
//! ## Pieces
//!
//! - [`EngineLoop`] - The render thread's loop, Idle → Running → Stopped
//! - [`TimingEngine`] - Bounded run with a [`TimingReport`]
//! - [`Backend`] - Output device plus input source
//!   ([`CrosstermBackend`], [`TestBackend`])
//! - [`Command`] / [`CommandExecutor`] / [`EngineHandle`] - Stop requests
//!   from anywhere in the tree
//! - [`EngineConfig`] - Render mode, pacing, limits

mod backend;
mod command;
mod config;
mod engine;
mod terminal;
mod timing;

pub use backend::{Backend, TestBackend};
pub use command::{Command, CommandExecutor, EngineHandle};
pub use config::{EngineConfig, RenderMode};
pub use engine::{CycleObserver, Engine, EngineLoop, EngineState};
pub use terminal::CrosstermBackend;
pub use timing::{TimingEngine, TimingReport};

//! Engine Loop - Mounts the root and drives render / input cycles.
//!
//! # State machine
//!
//! ```text
//! Idle ──run──▶ Running ──stop / max cycles / error──▶ Stopped
//! ```
//!
//! `Stopped` is terminal: a second `run` returns [`BackendError::Stopped`].
//!
//! # One cycle
//!
//! 1. Ask the backend for the drawable area
//! 2. Draw the root into a fresh [`DrawContext`] (stale dynamic scopes
//!    rebuild here)
//! 3. Hand the frame to the backend
//! 4. Poll input once; emit it synchronously to the root
//! 5. Stop if a [`Command::Stop`](super::Command::Stop) is pending
//!
//! The backend is restored before any error is returned.

use std::time::{Duration, Instant};

use super::backend::Backend;
use super::command::EngineHandle;
use super::config::EngineConfig;
use crate::engine::{Component, Context, Runtime};
use crate::error::BackendError;
use crate::input::{InputEvent, KeyboardEvent, Modifiers};
use crate::renderer::DrawContext;

/// Anything that can run a root component to completion.
pub trait Engine {
    fn run(&mut self, root: Box<dyn Component>) -> Result<(), BackendError>;
}

/// Lifecycle of an engine loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Stopped,
}

/// Notified after every completed cycle.
pub trait CycleObserver {
    fn cycle_finished(&mut self, cycle: u64, elapsed: Duration);
}

impl CycleObserver for () {
    fn cycle_finished(&mut self, _cycle: u64, _elapsed: Duration) {}
}

/// The render thread's loop over one [`Backend`].
pub struct EngineLoop<B: Backend> {
    backend: B,
    config: EngineConfig,
    runtime: Runtime,
    state: EngineState,
    cycles: u64,
}

impl<B: Backend> EngineLoop<B> {
    pub fn new(backend: B, config: EngineConfig) -> Self {
        Self::with_runtime(backend, config, Runtime::new())
    }

    /// Use a runtime with components registered up front.
    pub fn with_runtime(backend: B, config: EngineConfig, runtime: Runtime) -> Self {
        Self {
            backend,
            config,
            runtime,
            state: EngineState::Idle,
            cycles: 0,
        }
    }

    /// The runtime the root will be mounted with.
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn handle(&self) -> &EngineHandle {
        self.runtime.handle()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Cycles completed by the last run.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Run, reporting each cycle to `observer`.
    pub fn run_observed(
        &mut self,
        root: Box<dyn Component>,
        observer: &mut dyn CycleObserver,
    ) -> Result<(), BackendError> {
        if self.state != EngineState::Idle {
            return Err(BackendError::Stopped);
        }
        self.transition(EngineState::Running);

        let result = self.enter_and_cycle(root, observer);
        let restored = self.backend.restore();
        self.transition(EngineState::Stopped);

        if let Err(err) = &result {
            tracing::error!(error = %err, cycles = self.cycles, "engine run failed");
        }
        result?;
        restored?;
        Ok(())
    }

    fn enter_and_cycle(
        &mut self,
        root: Box<dyn Component>,
        observer: &mut dyn CycleObserver,
    ) -> Result<(), BackendError> {
        self.backend.enter(&self.config)?;
        let root = Context::mount(self.runtime.clone(), root)?;

        loop {
            let started = Instant::now();
            self.cycle(&root)?;
            self.cycles += 1;
            observer.cycle_finished(self.cycles, started.elapsed());

            if self.handle().stop_requested() {
                tracing::debug!(cycles = self.cycles, "stop command honored");
                break;
            }
            if self.config.max_cycles.is_some_and(|max| self.cycles >= max) {
                tracing::debug!(cycles = self.cycles, "cycle limit reached");
                break;
            }

            let elapsed = started.elapsed();
            if elapsed < self.config.frame_interval {
                std::thread::sleep(self.config.frame_interval - elapsed);
            }
        }
        Ok(())
    }

    fn cycle(&mut self, root: &Context) -> Result<(), BackendError> {
        let area = self.backend.size()?;
        let mut frame = DrawContext::new(area);
        root.draw(&mut frame);
        self.backend.draw(frame)?;

        if let Some(event) = self.backend.poll_input(self.config.input_poll_timeout)? {
            self.dispatch(root, event);
        }
        Ok(())
    }

    fn dispatch(&self, root: &Context, event: InputEvent) {
        match event {
            InputEvent::Key(key) => {
                if self.config.exit_on_ctrl_c && key.matches("c", Modifiers::CTRL) {
                    root.stop();
                }
                root.emit::<KeyboardEvent>(&key);
            }
            InputEvent::Resize(resize) => {
                tracing::trace!(width = resize.width, height = resize.height, "resize");
                root.emit(&resize);
            }
        }
    }

    fn transition(&mut self, to: EngineState) {
        tracing::debug!(from = ?self.state, to = ?to, "engine state");
        self.state = to;
    }
}

impl<B: Backend> Engine for EngineLoop<B> {
    fn run(&mut self, root: Box<dyn Component>) -> Result<(), BackendError> {
        self.run_observed(root, &mut ())
    }
}

//! Commands - How components talk back to the engine loop.
//!
//! Every [`Context`](crate::engine::Context) reaches the same
//! [`CommandExecutor`] through its runtime. The engine loop owns the
//! matching [`EngineHandle`] and checks it once per cycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A request to the engine loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// End the run after the current cycle.
    Stop,
}

/// Sink for [`Command`]s. Callable from any thread.
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, command: Command);
}

/// Shared flags between the engine loop and everything that can command it.
///
/// Cloning shares the flags.
#[derive(Clone, Debug, Default)]
pub struct EngineHandle {
    stop: Arc<AtomicBool>,
}

impl EngineHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a stop is pending.
    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Clear a pending stop.
    pub fn reset(&self) {
        self.stop.store(false, Ordering::SeqCst);
    }
}

impl CommandExecutor for EngineHandle {
    fn execute(&self, command: Command) {
        match command {
            Command::Stop => {
                if !self.stop.swap(true, Ordering::SeqCst) {
                    tracing::info!("stop requested");
                }
            }
        }
    }
}

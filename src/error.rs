//! Error types.
//!
//! Two families surface to callers:
//! - [`BuildError`] - a malformed declarative tree or prop set, raised while a
//!   scope materializes. Fatal to that subtree's build.
//! - [`BackendError`] - the output device failed, or the engine could not
//!   start. Returned from [`Engine::run`](crate::pipeline::Engine::run).
//!
//! Poisoned locks are not represented here: they abort the process.

use std::io;

use thiserror::Error;

use crate::primitives::ValueKind;

/// Construction-time contract violation in a declarative tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("unknown component `{0}`")]
    UnknownComponent(String),

    #[error("component `{component}` has no parameter named `{prop}`")]
    UnknownProp { component: String, prop: String },

    #[error("component `{component}` requires prop `{prop}`")]
    MissingProp { component: String, prop: String },

    #[error("prop `{prop}` of `{component}` expects {expected}, got {found}")]
    PropType {
        component: String,
        prop: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("`{0}` is not bound in this scope")]
    UnboundName(String),

    #[error("pattern `{pattern}` cannot destructure {found}")]
    Pattern { pattern: String, found: ValueKind },
}

/// Failure of the output device or of the engine run itself.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("root component failed to build: {0}")]
    Build(#[from] BuildError),

    #[error("engine already stopped")]
    Stopped,
}

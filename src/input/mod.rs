//! Input - Events a backend reads and the engine loop emits to the root.
//!
//! - [`KeyboardEvent`] / [`Modifiers`] / [`KeyState`] - Key presses
//! - [`ResizeEvent`] - Terminal size changes
//! - [`InputEvent`] - What [`Backend::poll_input`](crate::pipeline::Backend::poll_input) returns
//! - [`convert_event`] - Crossterm to [`InputEvent`]

mod convert;
mod keyboard;

pub use convert::{convert_event, convert_key_event};
pub use keyboard::*;

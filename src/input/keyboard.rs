//! Keyboard events.
//!
//! The engine loop emits one [`KeyboardEvent`] per key read from the
//! backend, synchronously, to the root context. Components subscribe with
//! [`Context::on`](crate::engine::Context::on):
//!
//! ```ignore
//! cx.on::<KeyboardEvent>(move |event, cx| {
//!     if event.is_press() && event.key == "q" {
//!         cx.stop();
//!     }
//! });
//! ```

// =============================================================================
// Modifiers
// =============================================================================

bitflags::bitflags! {
    /// Modifier keys held during a key event.
    ///
    /// Combine with bitwise OR: `Modifiers::CTRL | Modifiers::SHIFT`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const NONE = 0;
        const CTRL = 1 << 0;
        const ALT = 1 << 1;
        const SHIFT = 1 << 2;
        const META = 1 << 3;
    }
}

impl Modifiers {
    pub fn ctrl(&self) -> bool {
        self.contains(Self::CTRL)
    }

    pub fn alt(&self) -> bool {
        self.contains(Self::ALT)
    }

    pub fn shift(&self) -> bool {
        self.contains(Self::SHIFT)
    }
}

/// Key event state (press, repeat, release)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

// =============================================================================
// Events
// =============================================================================

/// Keyboard event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyboardEvent {
    /// The key that was pressed (e.g., "a", "Enter", "ArrowUp")
    pub key: String,
    pub modifiers: Modifiers,
    pub state: KeyState,
}

impl KeyboardEvent {
    /// A plain key press.
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_modifiers(key, Modifiers::NONE)
    }

    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            state: KeyState::Press,
        }
    }

    pub fn is_press(&self) -> bool {
        self.state == KeyState::Press
    }

    /// True for a press of `key` with exactly `modifiers` held.
    pub fn matches(&self, key: &str, modifiers: Modifiers) -> bool {
        self.is_press() && self.key == key && self.modifiers == modifiers
    }
}

/// Terminal resized to a new size, in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResizeEvent {
    pub width: u16,
    pub height: u16,
}

/// Anything a backend can hand to the engine loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyboardEvent),
    Resize(ResizeEvent),
}

impl From<KeyboardEvent> for InputEvent {
    fn from(event: KeyboardEvent) -> Self {
        InputEvent::Key(event)
    }
}

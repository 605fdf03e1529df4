//! Engine configuration.

use std::time::Duration;

/// Where the engine draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Alternate screen, full terminal.
    #[default]
    Fullscreen,
    /// Normal buffer below the cursor; terminal scrollback keeps working.
    Inline,
}

/// Knobs for an [`EngineLoop`](super::EngineLoop).
///
/// ```ignore
/// let config = EngineConfig::default()
///     .render_mode(RenderMode::Inline)
///     .frame_interval(Duration::from_millis(33));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub render_mode: RenderMode,
    /// Minimum time between cycle starts.
    pub frame_interval: Duration,
    /// How long one cycle waits for input.
    pub input_poll_timeout: Duration,
    /// Stop on its own after this many cycles.
    pub max_cycles: Option<u64>,
    pub mouse_capture: bool,
    /// Ctrl+C requests a stop before the key reaches components.
    pub exit_on_ctrl_c: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::Fullscreen,
            frame_interval: Duration::from_millis(16),
            input_poll_timeout: Duration::from_millis(16),
            max_cycles: None,
            mouse_capture: false,
            exit_on_ctrl_c: true,
        }
    }
}

impl EngineConfig {
    pub fn render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn input_poll_timeout(mut self, timeout: Duration) -> Self {
        self.input_poll_timeout = timeout;
        self
    }

    pub fn max_cycles(mut self, cycles: u64) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    pub fn mouse_capture(mut self, enabled: bool) -> Self {
        self.mouse_capture = enabled;
        self
    }

    pub fn exit_on_ctrl_c(mut self, enabled: bool) -> Self {
        self.exit_on_ctrl_c = enabled;
        self
    }
}

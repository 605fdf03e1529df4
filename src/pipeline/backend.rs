//! Backends - Where composed frames go and where input comes from.
//!
//! The engine loop talks to exactly one [`Backend`]:
//!
//! ```text
//! enter ─▶ ( size ─▶ draw(frame) ─▶ poll_input ) * ─▶ restore
//! ```
//!
//! [`TestBackend`] keeps everything in memory: frames are rasterized to lines
//! and input is replayed from a script.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use super::config::EngineConfig;
use crate::input::{InputEvent, KeyboardEvent};
use crate::renderer::DrawContext;
use crate::types::Area;

/// An output device plus its input source.
pub trait Backend {
    /// Drawable area for the next frame.
    fn size(&self) -> io::Result<Area>;

    /// Present one composed frame.
    fn draw(&mut self, frame: DrawContext) -> io::Result<()>;

    /// Wait up to `timeout` for one input event.
    fn poll_input(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>>;

    /// Take over the device.
    fn enter(&mut self, config: &EngineConfig) -> io::Result<()>;

    /// Give the device back. Called once per run, on success and on error.
    fn restore(&mut self) -> io::Result<()>;
}

// =============================================================================
// TestBackend
// =============================================================================

/// In-memory backend for tests and headless runs.
///
/// ```ignore
/// let backend = TestBackend::new(20, 3).with_input(KeyboardEvent::new("+"));
/// let mut engine = EngineLoop::new(backend, EngineConfig::default().max_cycles(2));
/// engine.run(Box::new(counter))?;
/// assert_eq!(engine.backend().frames()[1][0], "count: 1");
/// ```
#[derive(Debug, Default)]
pub struct TestBackend {
    area: Area,
    frames: Vec<Vec<String>>,
    script: VecDeque<Option<InputEvent>>,
    entered: bool,
    restore_count: usize,
    fail_draw_at: Option<usize>,
}

impl TestBackend {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            area: Area::sized(width, height),
            ..Self::default()
        }
    }

    /// Queue an event for the next poll.
    pub fn with_input(mut self, event: impl Into<InputEvent>) -> Self {
        self.push_input(event);
        self
    }

    /// Queue a poll that returns nothing.
    pub fn with_idle(mut self) -> Self {
        self.script.push_back(None);
        self
    }

    /// Fail the draw of frame number `frame` (zero-based) with an I/O error.
    pub fn failing_draw_at(mut self, frame: usize) -> Self {
        self.fail_draw_at = Some(frame);
        self
    }

    pub fn push_input(&mut self, event: impl Into<InputEvent>) {
        self.script.push_back(Some(event.into()));
    }

    /// Queue one key press per string.
    pub fn push_keys(&mut self, keys: &[&str]) {
        for key in keys {
            self.push_input(KeyboardEvent::new(*key));
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.area = Area::sized(width, height);
    }

    /// Every frame drawn so far, as rows of text.
    pub fn frames(&self) -> &[Vec<String>] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&[String]> {
        self.frames.last().map(Vec::as_slice)
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }

    pub fn restore_count(&self) -> usize {
        self.restore_count
    }

    /// Scripted polls not yet consumed.
    pub fn pending_input(&self) -> usize {
        self.script.len()
    }
}

impl Backend for TestBackend {
    fn size(&self) -> io::Result<Area> {
        Ok(self.area)
    }

    fn draw(&mut self, frame: DrawContext) -> io::Result<()> {
        if self.fail_draw_at == Some(self.frames.len()) {
            return Err(io::Error::other("scripted draw failure"));
        }
        self.frames.push(frame.to_lines());
        Ok(())
    }

    fn poll_input(&mut self, _timeout: Duration) -> io::Result<Option<InputEvent>> {
        Ok(self.script.pop_front().flatten())
    }

    fn enter(&mut self, _config: &EngineConfig) -> io::Result<()> {
        self.entered = true;
        Ok(())
    }

    fn restore(&mut self) -> io::Result<()> {
        self.entered = false;
        self.restore_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ResizeEvent;

    #[test]
    fn test_records_frames_as_lines() {
        let mut backend = TestBackend::new(6, 2);
        let mut frame = DrawContext::new(backend.size().unwrap());
        frame.text(1, 1, "hi");
        backend.draw(frame).unwrap();

        assert_eq!(backend.frames(), &[vec![String::new(), " hi".to_string()]]);
    }

    #[test]
    fn test_script_replays_in_order() {
        let mut backend = TestBackend::new(1, 1)
            .with_input(KeyboardEvent::new("a"))
            .with_idle()
            .with_input(InputEvent::Resize(ResizeEvent {
                width: 2,
                height: 2,
            }));

        let timeout = Duration::ZERO;
        assert_eq!(
            backend.poll_input(timeout).unwrap(),
            Some(InputEvent::Key(KeyboardEvent::new("a")))
        );
        assert_eq!(backend.poll_input(timeout).unwrap(), None);
        assert!(matches!(
            backend.poll_input(timeout).unwrap(),
            Some(InputEvent::Resize(_))
        ));
        assert_eq!(backend.poll_input(timeout).unwrap(), None);
    }

    #[test]
    fn test_scripted_draw_failure() {
        let mut backend = TestBackend::new(1, 1).failing_draw_at(0);
        let err = backend.draw(DrawContext::new(Area::sized(1, 1))).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(backend.frames().is_empty());
    }
}

//! Terminal backend over crossterm.
//!
//! Handles entering/exiting raw mode, the alternate screen, mouse capture and
//! cursor visibility, and writes frames row by row.
//!
//! # Render modes
//!
//! - `Fullscreen` - alternate screen, frames start at the top-left corner
//! - `Inline` - normal buffer, frames start at the row the cursor was on
//!   when the run began; terminal scrollback keeps working

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{self, Hide, MoveTo, Show};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use crossterm::style::Print;
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use super::backend::Backend;
use super::config::{EngineConfig, RenderMode};
use crate::input::{InputEvent, convert_event};
use crate::renderer::DrawContext;
use crate::types::Area;

/// Crossterm-driven terminal backend.
///
/// Restores the terminal on drop if a run did not get to. Each terminal
/// change is recorded as soon as it succeeds, and restoring undoes exactly
/// those, so a failed enter still leaves a usable terminal.
pub struct CrosstermBackend<W: Write = Stdout> {
    out: W,
    mode: RenderMode,
    raw_mode: bool,
    alternate_screen: bool,
    cursor_hidden: bool,
    mouse_enabled: bool,
    /// First terminal row owned by the frame.
    origin_row: u16,
    /// Rows written by the last frame.
    frame_rows: u16,
}

impl CrosstermBackend<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> CrosstermBackend<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            mode: RenderMode::Fullscreen,
            raw_mode: false,
            alternate_screen: false,
            cursor_hidden: false,
            mouse_enabled: false,
            origin_row: 0,
            frame_rows: 0,
        }
    }

    /// Whether any terminal change is still in effect.
    pub fn is_entered(&self) -> bool {
        self.raw_mode || self.alternate_screen || self.cursor_hidden || self.mouse_enabled
    }

    fn enter_fullscreen(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.raw_mode = true;
        execute!(self.out, EnterAlternateScreen)?;
        self.alternate_screen = true;
        execute!(self.out, Hide)?;
        self.cursor_hidden = true;
        execute!(self.out, Clear(ClearType::All))?;
        self.origin_row = 0;
        Ok(())
    }

    fn enter_inline(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.raw_mode = true;
        execute!(self.out, Hide)?;
        self.cursor_hidden = true;
        self.origin_row = cursor::position().map_or(0, |(_, row)| row);
        Ok(())
    }

    /// Undo every recorded change. Keeps going past failures and reports
    /// the first one.
    fn exit(&mut self) -> io::Result<()> {
        let mut result = Ok(());
        if std::mem::take(&mut self.mouse_enabled) {
            result = result.and(execute!(self.out, DisableMouseCapture));
        }
        if std::mem::take(&mut self.alternate_screen) {
            result = result.and(execute!(self.out, LeaveAlternateScreen));
        } else if self.mode == RenderMode::Inline && self.frame_rows > 0 {
            let below = self.origin_row.saturating_add(self.frame_rows);
            result = result.and(execute!(self.out, MoveTo(0, below), Print("\r\n")));
        }
        if std::mem::take(&mut self.cursor_hidden) {
            result = result.and(execute!(self.out, Show));
        }
        if std::mem::take(&mut self.raw_mode) {
            result = result.and(terminal::disable_raw_mode());
        }
        result
    }
}

impl<W: Write> Backend for CrosstermBackend<W> {
    fn size(&self) -> io::Result<Area> {
        let (width, height) = terminal::size()?;
        Ok(Area::sized(width, height.saturating_sub(self.origin_row)))
    }

    fn draw(&mut self, frame: DrawContext) -> io::Result<()> {
        let lines = frame.to_lines();
        self.frame_rows = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        for (row, line) in (0u16..).zip(lines) {
            queue!(
                self.out,
                MoveTo(0, self.origin_row.saturating_add(row)),
                Print(line),
                Clear(ClearType::UntilNewLine)
            )?;
        }
        self.out.flush()
    }

    fn poll_input(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>> {
        if event::poll(timeout)? {
            Ok(convert_event(event::read()?))
        } else {
            Ok(None)
        }
    }

    fn enter(&mut self, config: &EngineConfig) -> io::Result<()> {
        self.mode = config.render_mode;
        match self.mode {
            RenderMode::Fullscreen => self.enter_fullscreen()?,
            RenderMode::Inline => self.enter_inline()?,
        }

        if config.mouse_capture {
            execute!(self.out, EnableMouseCapture)?;
            self.mouse_enabled = true;
        }
        tracing::debug!(mode = ?self.mode, origin_row = self.origin_row, "terminal entered");
        Ok(())
    }

    fn restore(&mut self) -> io::Result<()> {
        if !self.is_entered() {
            return Ok(());
        }
        self.exit()?;
        tracing::debug!(mode = ?self.mode, "terminal restored");
        Ok(())
    }
}

impl<W: Write> Drop for CrosstermBackend<W> {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            tracing::warn!(error = %err, "failed to restore terminal on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(backend: &CrosstermBackend<Vec<u8>>) -> String {
        String::from_utf8_lossy(&backend.out).into_owned()
    }

    #[test]
    fn test_restore_without_enter_writes_nothing() {
        let mut backend = CrosstermBackend::new(Vec::new());
        backend.restore().unwrap();

        assert!(!backend.is_entered());
        assert!(backend.out.is_empty());
    }

    #[test]
    fn test_restore_undoes_partial_enter() {
        // Enter got as far as the alternate screen and the hidden cursor.
        let mut backend = CrosstermBackend::new(Vec::new());
        backend.alternate_screen = true;
        backend.cursor_hidden = true;
        assert!(backend.is_entered());

        backend.restore().unwrap();

        let out = written(&backend);
        assert!(out.contains("\x1b[?1049l"), "alternate screen left: {out:?}");
        assert!(out.contains("\x1b[?25h"), "cursor shown: {out:?}");
        assert!(!out.contains("\x1b[?1000l"), "mouse was never enabled: {out:?}");
        assert!(!backend.is_entered());
    }

    #[test]
    fn test_restore_is_not_repeated() {
        let mut backend = CrosstermBackend::new(Vec::new());
        backend.cursor_hidden = true;
        backend.restore().unwrap();
        let first = backend.out.len();

        backend.restore().unwrap();
        assert_eq!(backend.out.len(), first);
    }
}

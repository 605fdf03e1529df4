//! Core types for spark-tui-core.
//!
//! Geometry shared by the render pipeline and the backends. All values are in
//! terminal grid cells.

// =============================================================================
// Area
// =============================================================================

/// A rectangular region of the grid.
///
/// Coordinates are relative to whatever owns the area: a
/// [`DrawContext`](crate::renderer::DrawContext) records everything relative to
/// its own origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Area {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Area {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// An area of the given size anchored at the origin.
    pub const fn sized(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// One past the last column.
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// One past the last row.
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Smallest area covering both.
    pub fn union(&self, other: &Area) -> Area {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Area {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Shift by an offset.
    pub const fn translate(&self, dx: u16, dy: u16) -> Area {
        Area {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            width: self.width,
            height: self.height,
        }
    }

    /// Same size, origin at (0, 0).
    pub const fn at_origin(&self) -> Area {
        Self::sized(self.width, self.height)
    }

    /// Rows `from..` of this area, in this area's own frame.
    pub fn rows_from(&self, from: u16) -> Area {
        let from = from.min(self.height);
        Area::new(0, from, self.width, self.height - from)
    }

    /// Shrink on every side by `amount`, in this area's own frame.
    pub fn inset(&self, amount: u16) -> Area {
        let horizontal = amount.saturating_mul(2).min(self.width);
        let vertical = amount.saturating_mul(2).min(self.height);
        Area::new(
            amount.min(self.width),
            amount.min(self.height),
            self.width - horizontal,
            self.height - vertical,
        )
    }

    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

//! Draw contexts and draw instructions.
//!
//! A [`DrawContext`] accumulates instructions for one rectangular [`Area`].
//! Everything recorded inside it is relative to its own origin; nesting a
//! child context records the child's offset once, and [`DrawContext::flatten`]
//! applies each offset exactly once per level.
//!
//! # Allocation
//!
//! The context tracks the union of everything placed in it (`allocated`).
//! The allocation cursor is the first row below that union. There is no
//! layout policy here: children simply stack from the cursor down.
//!
//! ```text
//! root (0,0 80x24)
//! ├── Text   (0,0) "header"
//! ├── Nested (0,1) child (80x23)
//! │   └── Text (0,0) "body"        -> absolute (0,1)
//! └── Text   (0,2) "footer"
//! ```

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::view::View;
use crate::types::Area;

// =============================================================================
// Instructions
// =============================================================================

/// One atomic operation of the render pipeline.
#[derive(Debug, Clone)]
pub enum DrawInstruction {
    /// Text starting at a point.
    Text { x: u16, y: u16, content: String },
    /// A view drawn lazily inside a sub-area.
    View { area: Area, view: View },
    /// A child context placed at an offset.
    Nested { x: u16, y: u16, context: DrawContext },
}

/// A piece of text at an absolute position, produced by flattening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub x: u16,
    pub y: u16,
    pub content: String,
}

// =============================================================================
// DrawContext
// =============================================================================

/// Instruction accumulator scoped to one region.
#[derive(Debug, Clone)]
pub struct DrawContext {
    area: Area,
    allocated: Option<Area>,
    instructions: Vec<DrawInstruction>,
}

impl DrawContext {
    /// A context for `area`. The area's origin is where this context sits in
    /// its parent; its own contents start at (0, 0).
    pub fn new(area: Area) -> Self {
        Self {
            area,
            allocated: None,
            instructions: Vec::new(),
        }
    }

    pub fn area(&self) -> Area {
        self.area
    }

    /// Union of every region occupied so far, in this context's frame.
    pub fn allocated(&self) -> Option<Area> {
        self.allocated
    }

    pub fn instructions(&self) -> &[DrawInstruction] {
        &self.instructions
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// First free row below everything allocated.
    pub fn cursor(&self) -> u16 {
        self.allocated.map_or(0, |area| area.bottom())
    }

    /// The unallocated rows below the cursor.
    pub fn remaining(&self) -> Area {
        self.area.at_origin().rows_from(self.cursor())
    }

    /// Mark a region as occupied without drawing into it.
    pub fn reserve(&mut self, area: Area) {
        self.allocated = Some(match self.allocated {
            Some(current) => current.union(&area),
            None => area,
        });
    }

    /// Place text at a point.
    pub fn text(&mut self, x: u16, y: u16, content: impl Into<String>) {
        let content = content.into();
        let width = u16::try_from(content.width()).unwrap_or(u16::MAX);
        self.reserve(Area::new(x, y, width, 1));
        self.instructions.push(DrawInstruction::Text { x, y, content });
    }

    /// Place text at the cursor, one row per line.
    pub fn line(&mut self, content: &str) {
        for line in content.split('\n') {
            let y = self.cursor();
            self.text(0, y, line);
        }
    }

    /// Record a view to be drawn inside `area`. The whole area is reserved.
    pub fn view(&mut self, area: Area, view: View) {
        self.reserve(area);
        self.instructions.push(DrawInstruction::View { area, view });
    }

    /// A fresh context for a sub-area of this one.
    pub fn child(&self, area: Area) -> DrawContext {
        DrawContext::new(area)
    }

    /// Place a child context at its area's offset.
    ///
    /// Only what the child actually allocated is reserved here.
    pub fn nest(&mut self, context: DrawContext) {
        let (x, y) = (context.area.x, context.area.y);
        if let Some(used) = context.allocated {
            self.reserve(used.translate(x, y));
        }
        self.instructions
            .push(DrawInstruction::Nested { x, y, context });
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Every text run, in instruction order, relative to this context's origin.
    pub fn flatten(&self) -> Vec<TextRun> {
        let mut runs = Vec::new();
        self.flatten_into(0, 0, &mut runs);
        runs
    }

    fn flatten_into(&self, dx: u16, dy: u16, runs: &mut Vec<TextRun>) {
        for instruction in &self.instructions {
            match instruction {
                DrawInstruction::Text { x, y, content } => runs.push(TextRun {
                    x: x.saturating_add(dx),
                    y: y.saturating_add(dy),
                    content: content.clone(),
                }),
                DrawInstruction::View { area, view } => {
                    let mut sub = DrawContext::new(*area);
                    view.draw(&mut sub);
                    sub.flatten_into(
                        area.x.saturating_add(dx),
                        area.y.saturating_add(dy),
                        runs,
                    );
                }
                DrawInstruction::Nested { x, y, context } => {
                    context.flatten_into(x.saturating_add(dx), y.saturating_add(dy), runs);
                }
            }
        }
    }

    /// Text content only, in instruction order.
    pub fn texts(&self) -> Vec<String> {
        self.flatten().into_iter().map(|run| run.content).collect()
    }

    /// Rasterize into rows of this context's size, trailing spaces trimmed.
    ///
    /// Runs are clipped to the area. Wide characters take two cells.
    pub fn to_lines(&self) -> Vec<String> {
        let width = usize::from(self.area.width);
        let height = usize::from(self.area.height);
        let mut grid: Vec<Vec<Option<char>>> = vec![vec![Some(' '); width]; height];

        for run in self.flatten() {
            let Some(row) = grid.get_mut(usize::from(run.y)) else {
                continue;
            };
            let mut column = usize::from(run.x);
            for ch in run.content.chars() {
                let cells = ch.width().unwrap_or(0);
                if cells == 0 {
                    continue;
                }
                if column + cells > width {
                    break;
                }
                row[column] = Some(ch);
                for continuation in 1..cells {
                    row[column + continuation] = None;
                }
                column += cells;
            }
        }

        grid.into_iter()
            .map(|row| {
                let line: String = row.into_iter().flatten().collect();
                line.trim_end().to_string()
            })
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_advance_cursor() {
        let mut dc = DrawContext::new(Area::sized(20, 5));
        dc.line("one");
        dc.line("two\nthree");

        assert_eq!(dc.cursor(), 3);
        assert_eq!(dc.texts(), vec!["one", "two", "three"]);
        assert_eq!(dc.allocated(), Some(Area::new(0, 0, 5, 3)));
    }

    #[test]
    fn test_nested_offset_applied_once() {
        let mut root = DrawContext::new(Area::sized(20, 10));
        root.line("header");

        let mut child = root.child(root.remaining());
        child.text(2, 1, "inner");

        let mut grandchild = child.child(Area::new(1, 2, 10, 2));
        grandchild.text(0, 0, "deep");
        child.nest(grandchild);

        root.nest(child);

        let runs = root.flatten();
        assert_eq!(
            runs,
            vec![
                TextRun { x: 0, y: 0, content: "header".into() },
                TextRun { x: 2, y: 2, content: "inner".into() },
                TextRun { x: 1, y: 3, content: "deep".into() },
            ]
        );
    }

    #[test]
    fn test_nest_reserves_only_used_rows() {
        let mut root = DrawContext::new(Area::sized(10, 10));
        let mut child = root.child(root.remaining());
        child.line("a");
        root.nest(child);
        root.line("b");

        assert_eq!(root.cursor(), 2);
        assert_eq!(root.to_lines()[..2], ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_empty_child_reserves_nothing() {
        let mut root = DrawContext::new(Area::sized(10, 4));
        let child = root.child(root.remaining());
        root.nest(child);

        assert_eq!(root.allocated(), None);
        assert_eq!(root.cursor(), 0);
    }

    #[test]
    fn test_view_instruction_draws_lazily() {
        let mut root = DrawContext::new(Area::sized(10, 4));
        root.view(Area::new(3, 1, 5, 2), View::text("lazy"));

        assert_eq!(root.cursor(), 3, "view reserves its whole area");
        assert_eq!(
            root.flatten(),
            vec![TextRun { x: 3, y: 1, content: "lazy".into() }]
        );
    }

    #[test]
    fn test_to_lines_clips_and_handles_wide_chars() {
        let mut dc = DrawContext::new(Area::sized(4, 2));
        dc.text(0, 0, "abcdef");
        dc.text(0, 1, "日本語");
        dc.text(0, 5, "offscreen");

        assert_eq!(dc.to_lines(), vec!["abcd", "日本"]);
    }
}

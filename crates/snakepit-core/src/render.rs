//! Read-only projection of snakes onto a character surface.
//!
//! The game draws through curses; here a [`Surface`] is anything that accepts
//! a glyph at a cell. Writes may fail (curses refuses the bottom-right cell)
//! and callers discard those failures per cell.

/// What a body segment looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Glyph {
    Head,
    Body,
    /// Tail segment earned from biting
    Rattle,
}

impl Glyph {
    pub fn as_char(self) -> char {
        match self {
            Glyph::Head => 'S',
            Glyph::Body => 's',
            Glyph::Rattle => '.',
        }
    }
}

/// Colour family for a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Snake,
    /// Warning colour (red in the terminal)
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentStyle {
    pub tone: Tone,
    /// Set once a snake has reached its maximum length
    pub bold: bool,
}

/// A cell write the surface refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceError {
    pub row: i32,
    pub col: i32,
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot write cell ({}, {})", self.row, self.col)
    }
}

impl std::error::Error for SurfaceError {}

pub trait Surface {
    fn put(&mut self, row: i32, col: i32, glyph: Glyph, style: SegmentStyle)
        -> Result<(), SurfaceError>;
}

/// Plain character grid, for headless runs and tests.
///
/// Like curses, it refuses writes to the bottom-right cell.
#[derive(Debug, Clone)]
pub struct TextSurface {
    width: usize,
    height: usize,
    cells: Vec<char>,
    styles: Vec<Option<SegmentStyle>>,
}

impl TextSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![' '; width * height],
            styles: vec![None; width * height],
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(' ');
        self.styles.fill(None);
    }

    fn index(&self, row: i32, col: i32) -> Option<usize> {
        let (row, col) = (usize::try_from(row).ok()?, usize::try_from(col).ok()?);
        (row < self.height && col < self.width).then(|| row * self.width + col)
    }

    pub fn char_at(&self, row: i32, col: i32) -> Option<char> {
        self.index(row, col).map(|i| self.cells[i])
    }

    pub fn style_at(&self, row: i32, col: i32) -> Option<SegmentStyle> {
        self.index(row, col).and_then(|i| self.styles[i])
    }
}

impl Surface for TextSurface {
    fn put(
        &mut self,
        row: i32,
        col: i32,
        glyph: Glyph,
        style: SegmentStyle,
    ) -> Result<(), SurfaceError> {
        let last = self.width * self.height;
        match self.index(row, col) {
            Some(i) if i + 1 != last => {
                self.cells[i] = glyph.as_char();
                self.styles[i] = Some(style);
                Ok(())
            }
            _ => Err(SurfaceError { row, col }),
        }
    }
}

impl std::fmt::Display for TextSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.width.max(1)) {
            let line: String = row.iter().collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

//! Board state: positions, colors, cells, and level loading.

use crate::shuffle::ShuffleEngine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A coordinate on the board. `x` is the column, `y` is the row; `y` grows
/// downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Block color. The set is closed; the integer and tag mappings below are
/// the only representations used at the I/O boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Blue,
    Yellow,
    Green,
    Purple,
    Pink,
}

impl Color {
    /// The full palette, in pattern-index order.
    pub const ALL: [Color; 6] = [
        Color::Red,
        Color::Blue,
        Color::Yellow,
        Color::Green,
        Color::Purple,
        Color::Pink,
    ];

    /// 1-based index used by level patterns (0 means an empty cell).
    pub fn index(self) -> u8 {
        match self {
            Color::Red => 1,
            Color::Blue => 2,
            Color::Yellow => 3,
            Color::Green => 4,
            Color::Purple => 5,
            Color::Pink => 6,
        }
    }

    /// Color for a 1-based pattern index.
    pub fn from_index(index: u8) -> Option<Self> {
        let slot = index.checked_sub(1)? as usize;
        Self::ALL.get(slot).copied()
    }

    /// Single-character tag used by [`Board::from_rows`] and `Display`.
    pub fn tag(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Blue => 'B',
            Color::Yellow => 'Y',
            Color::Green => 'G',
            Color::Purple => 'P',
            Color::Pink => 'K',
        }
    }

    /// Color for a tag character.
    pub fn from_tag(tag: char) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.tag() == tag)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Red => write!(f, "Red"),
            Color::Blue => write!(f, "Blue"),
            Color::Yellow => write!(f, "Yellow"),
            Color::Green => write!(f, "Green"),
            Color::Purple => write!(f, "Purple"),
            Color::Pink => write!(f, "Pink"),
        }
    }
}

/// A single grid cell. `Empty` cells are the clickable triggers; a cell is
/// never in any other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Filled(Color),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn color(self) -> Option<Color> {
        match self {
            Cell::Empty => None,
            Cell::Filled(color) => Some(color),
        }
    }
}

/// Reasons a level pattern is rejected at load time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("board dimensions must be nonzero, got {width}x{height}")]
    ZeroDimension { width: usize, height: usize },
    #[error("pattern has {got} entries, but the board holds only {capacity}")]
    PatternTooLong { got: usize, capacity: usize },
    #[error("color index {index} at pattern entry {at} is outside 1..={max}")]
    BadColorIndex { index: u8, at: usize, max: u8 },
    #[error("row {row} is {got} cells wide, expected {expected}")]
    RaggedRow { row: usize, got: usize, expected: usize },
    #[error("unknown cell tag {tag:?} in row {row}")]
    BadTag { tag: char, row: usize },
}

/// The authoritative board: dimensions plus exactly one cell per coordinate.
///
/// The engine exclusively owns mutation; callers read snapshots to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// An all-empty board.
    pub fn empty(width: usize, height: usize) -> Result<Self, LoadError> {
        if width == 0 || height == 0 {
            return Err(LoadError::ZeroDimension { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        })
    }

    /// Load a level pattern: row-major integers, `0` = empty trigger slot,
    /// `1..=6` = color index. Patterns shorter than `width * height` leave
    /// the remaining cells empty; longer patterns are rejected.
    pub fn from_pattern(width: usize, height: usize, pattern: &[u8]) -> Result<Self, LoadError> {
        let mut board = Self::empty(width, height)?;
        if pattern.len() > board.cells.len() {
            return Err(LoadError::PatternTooLong {
                got: pattern.len(),
                capacity: board.cells.len(),
            });
        }
        for (at, &code) in pattern.iter().enumerate() {
            if code == 0 {
                continue;
            }
            let color = Color::from_index(code).ok_or(LoadError::BadColorIndex {
                index: code,
                at,
                max: Color::ALL.len() as u8,
            })?;
            board.cells[at] = Cell::Filled(color);
        }
        Ok(board)
    }

    /// Parse a board from tag rows, `.` marking an empty cell. All rows must
    /// be the same width. The inverse of the `Display` rendering.
    pub fn from_rows(rows: &[&str]) -> Result<Self, LoadError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut board = Self::empty(width, height)?;
        for (y, row) in rows.iter().enumerate() {
            let got = row.chars().count();
            if got != width {
                return Err(LoadError::RaggedRow {
                    row: y,
                    got,
                    expected: width,
                });
            }
            for (x, tag) in row.chars().enumerate() {
                if tag == '.' {
                    continue;
                }
                let color = Color::from_tag(tag).ok_or(LoadError::BadTag { tag, row: y })?;
                board.cells[y * width + x] = Cell::Filled(color);
            }
        }
        Ok(board)
    }

    /// Fill a fresh board at random for free play: each cell is filled with
    /// probability `fill_ratio` using a color drawn from `palette`.
    pub fn random(
        width: usize,
        height: usize,
        palette: &[Color],
        fill_ratio: f32,
        shuffler: &mut ShuffleEngine,
    ) -> Result<Self, LoadError> {
        assert!(!palette.is_empty(), "palette must not be empty");
        let mut board = Self::empty(width, height)?;
        for cell in &mut board.cells {
            if shuffler.chance(fill_ratio) {
                *cell = Cell::Filled(*shuffler.choose(palette));
            }
        }
        Ok(board)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    #[inline]
    fn idx(&self, pos: Position) -> usize {
        pos.y * self.width + pos.x
    }

    /// The cell at `pos`. Panics when `pos` is out of range; use [`Board::get`]
    /// for unvalidated coordinates.
    pub fn cell(&self, pos: Position) -> Cell {
        assert!(self.in_bounds(pos), "{pos} is outside the board");
        self.cells[self.idx(pos)]
    }

    pub fn get(&self, pos: Position) -> Option<Cell> {
        if self.in_bounds(pos) {
            Some(self.cells[self.idx(pos)])
        } else {
            None
        }
    }

    pub(crate) fn set(&mut self, pos: Position, cell: Cell) {
        assert!(self.in_bounds(pos), "{pos} is outside the board");
        let idx = self.idx(pos);
        self.cells[idx] = cell;
    }

    /// Every filled coordinate in row-major order. This order is the contract
    /// for reshuffle assignments.
    pub fn filled_positions(&self) -> Vec<Position> {
        self.positions_where(|cell| !cell.is_empty())
    }

    /// Every empty (trigger) coordinate in row-major order.
    pub fn empty_positions(&self) -> Vec<Position> {
        self.positions_where(Cell::is_empty)
    }

    /// Filled coordinates with their colors, in row-major order.
    pub fn filled_cells(&self) -> Vec<(Position, Color)> {
        self.filled_positions()
            .into_iter()
            .filter_map(|pos| self.cell(pos).color().map(|color| (pos, color)))
            .collect()
    }

    /// Distinct colors currently on the board, in palette order.
    pub fn palette(&self) -> Vec<Color> {
        Color::ALL
            .iter()
            .copied()
            .filter(|&color| self.cells.contains(&Cell::Filled(color)))
            .collect()
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    pub fn empty_count(&self) -> usize {
        self.cells.len() - self.filled_count()
    }

    fn positions_where(&self, keep: impl Fn(Cell) -> bool) -> Vec<Position> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Position::new(x, y);
                if keep(self.cells[self.idx(pos)]) {
                    out.push(pos);
                }
            }
        }
        out
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let tag = match self.cells[y * self.width + x] {
                    Cell::Empty => '.',
                    Cell::Filled(color) => color.tag(),
                };
                write!(f, "{tag}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

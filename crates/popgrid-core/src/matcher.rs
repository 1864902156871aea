//! Directional match detection from a trigger cell.

use crate::board::{Board, Color, Position};
use serde::{Deserialize, Serialize};

/// The four cardinal probe directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step as `(dx, dy)`; `y` grows downward.
    fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Same-color cells discovered from one trigger's directional probes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchGroup {
    pub color: Color,
    /// Members in probe order (up, down, left, right).
    pub cells: Vec<Position>,
}

/// Finds the nearest block in each cardinal direction from a trigger cell
/// and groups the candidates by color.
///
/// Pure queries only; destruction is the caller's job.
#[derive(Debug, Clone)]
pub struct MatchFinder {
    min_match_size: usize,
}

impl Default for MatchFinder {
    fn default() -> Self {
        Self::new(2)
    }
}

impl MatchFinder {
    pub fn new(min_match_size: usize) -> Self {
        assert!(min_match_size >= 2, "a match needs at least two blocks");
        Self { min_match_size }
    }

    /// Walk from `from` one step at a time in `direction`, skipping empty
    /// cells, until a block is found or the board edge is reached.
    pub fn probe(
        &self,
        board: &Board,
        from: Position,
        direction: Direction,
    ) -> Option<(Position, Color)> {
        let (dx, dy) = direction.delta();
        let mut x = from.x as isize + dx;
        let mut y = from.y as isize + dy;
        while x >= 0 && y >= 0 && (x as usize) < board.width() && (y as usize) < board.height() {
            let pos = Position::new(x as usize, y as usize);
            if let Some(color) = board.cell(pos).color() {
                return Some((pos, color));
            }
            x += dx;
            y += dy;
        }
        None
    }

    /// Every qualifying color group reachable from `trigger`.
    ///
    /// `trigger` must name an in-range empty cell; probing a block is a
    /// caller bug and panics.
    pub fn match_groups(&self, board: &Board, trigger: Position) -> Vec<MatchGroup> {
        assert!(board.in_bounds(trigger), "trigger {trigger} is outside the board");
        assert!(
            board.cell(trigger).is_empty(),
            "trigger {trigger} is not an empty cell"
        );

        let candidates: Vec<(Position, Color)> = Direction::ALL
            .iter()
            .filter_map(|&direction| self.probe(board, trigger, direction))
            .collect();

        let mut groups: Vec<MatchGroup> = Vec::new();
        for &(_, color) in &candidates {
            if groups.iter().any(|group| group.color == color) {
                continue;
            }
            let cells: Vec<Position> = candidates
                .iter()
                .filter(|&&(_, c)| c == color)
                .map(|&(pos, _)| pos)
                .collect();
            if cells.len() >= self.min_match_size {
                groups.push(MatchGroup { color, cells });
            }
        }
        groups
    }

    /// The union of all qualifying groups from `trigger`: the cells the
    /// caller should destroy. Empty means the tap is a no-op.
    pub fn find_matches(&self, board: &Board, trigger: Position) -> Vec<Position> {
        self.match_groups(board, trigger)
            .into_iter()
            .flat_map(|group| group.cells)
            .collect()
    }
}

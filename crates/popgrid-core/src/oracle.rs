//! Global solvability checks over a board snapshot.

use crate::board::{Board, Cell, Color, Position};
use crate::matcher::MatchFinder;
use serde::{Deserialize, Serialize};

/// A playable move: the trigger to select and the cells it would clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveHint {
    pub trigger: Position,
    pub cells: Vec<Position>,
}

/// Answers "does any trigger on this board yield a qualifying match?" —
/// against the live board to detect deadlock, or against a hypothetical
/// color assignment to validate a candidate reshuffle before committing.
#[derive(Debug, Clone)]
pub struct SolvabilityOracle {
    finder: MatchFinder,
}

impl Default for SolvabilityOracle {
    fn default() -> Self {
        Self::new(2)
    }
}

impl SolvabilityOracle {
    pub fn new(min_match_size: usize) -> Self {
        Self {
            finder: MatchFinder::new(min_match_size),
        }
    }

    /// True when at least one trigger cell yields a qualifying match.
    pub fn has_any_move(&self, board: &Board) -> bool {
        self.find_move(board).is_some()
    }

    /// The first playable move in row-major scan order, if any.
    pub fn find_move(&self, board: &Board) -> Option<MoveHint> {
        for trigger in board.empty_positions() {
            let cells = self.finder.find_matches(board, trigger);
            if !cells.is_empty() {
                return Some(MoveHint { trigger, cells });
            }
        }
        None
    }

    /// Test a candidate color assignment without touching the real board.
    ///
    /// `assignment` recolors the board's filled positions in row-major order;
    /// which cells are filled does not change.
    pub fn is_solvable_with(&self, board: &Board, assignment: &[Color]) -> bool {
        let positions = board.filled_positions();
        assert_eq!(
            positions.len(),
            assignment.len(),
            "assignment must cover every filled cell"
        );
        let mut candidate = board.clone();
        for (&pos, &color) in positions.iter().zip(assignment) {
            candidate.set(pos, Cell::Filled(color));
        }
        self.has_any_move(&candidate)
    }
}

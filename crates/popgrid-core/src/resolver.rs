//! Deadlock classification and recovery.
//!
//! When the oracle reports no remaining move, the resolver classifies the
//! surviving blocks and applies one of: auto-clear, color collapse, random
//! reshuffle, or half-palette redistribution, retrying until the board is
//! playable again or recovery is proven impossible.

use crate::board::{Board, Cell, Color, Position};
use crate::oracle::SolvabilityOracle;
use crate::shuffle::{permutations, ShuffleEngine};
use serde::{Deserialize, Serialize};

/// Why recovery gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailReason {
    /// The surviving blocks form one contiguous straight line; no
    /// recoloring can ever produce a match.
    DegenerateLine,
    /// The retry cap was reached with the board still unplayable.
    RetriesExhausted,
}

/// Lifecycle state of one board session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Active,
    Won,
    Failed(FailReason),
}

/// A single recovery step, returned for the caller to animate before the
/// next transition. Recovery never changes which cells are filled; it only
/// changes which color occupies each existing filled coordinate (auto-clear
/// excepted, which destroys the final block outright).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryAction {
    /// The last surviving block was force-cleared. A lone block can never
    /// match, so it counts as cleared rather than as a failure.
    AutoClear { pos: Position, color: Color },
    /// All surviving blocks were repainted to one color.
    Collapse { cells: Vec<Position>, color: Color },
    /// The existing colors were redistributed across the filled positions,
    /// in row-major position order.
    Reshuffle { assignment: Vec<Color> },
    /// Color variety was cut down to `palette` before redistributing.
    HalfPalette {
        palette: Vec<Color>,
        assignment: Vec<Color>,
    },
}

/// Recovery thresholds and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Largest block count resolved by collapsing to a single color.
    pub collapse_max: usize,
    /// Largest block count for which a reshuffle is proven solvable by
    /// exhaustive permutation search before committing. Above this the
    /// resolver assumes a random reshuffle will work.
    pub exhaustive_max: usize,
    /// Recovery attempts before declaring failure.
    pub max_retries: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            collapse_max: 3,
            exhaustive_max: 5,
            max_retries: 3,
        }
    }
}

/// The recovery policy state machine.
pub struct DeadlockResolver {
    config: ResolverConfig,
    oracle: SolvabilityOracle,
}

impl DeadlockResolver {
    pub fn new(config: ResolverConfig, oracle: SolvabilityOracle) -> Self {
        Self { config, oracle }
    }

    /// Run the recovery cascade until the board is playable again or the
    /// outcome is terminal. Returns every action taken, in order, so the
    /// caller can animate each step before reading the final state.
    ///
    /// Safe to call on any board: a playable board returns `Active` with no
    /// actions, an empty one returns `Won`.
    pub fn resolve(
        &self,
        board: &mut Board,
        shuffler: &mut ShuffleEngine,
    ) -> (Vec<RecoveryAction>, GameState) {
        let mut actions = Vec::new();
        let mut attempts = 0;
        loop {
            let filled = board.filled_cells();
            match filled.len() {
                0 => return (actions, GameState::Won),
                1 => {
                    let (pos, color) = filled[0];
                    board.set(pos, Cell::Empty);
                    actions.push(RecoveryAction::AutoClear { pos, color });
                    return (actions, GameState::Won);
                }
                _ => {}
            }
            if self.oracle.has_any_move(board) {
                return (actions, GameState::Active);
            }
            let positions: Vec<Position> = filled.iter().map(|&(pos, _)| pos).collect();
            if is_degenerate_line(&positions) {
                return (actions, GameState::Failed(FailReason::DegenerateLine));
            }
            if attempts >= self.config.max_retries {
                return (actions, GameState::Failed(FailReason::RetriesExhausted));
            }
            attempts += 1;
            if positions.len() <= self.config.collapse_max {
                actions.push(self.collapse(board, &positions, shuffler));
            } else {
                actions.push(self.redistribute(board, &filled, shuffler));
            }
        }
    }

    /// Repaint every surviving block with one randomly chosen color, drawn
    /// from the colors the board already uses. Any trigger that can see two
    /// of them will match afterward.
    fn collapse(
        &self,
        board: &mut Board,
        cells: &[Position],
        shuffler: &mut ShuffleEngine,
    ) -> RecoveryAction {
        let palette = board.palette();
        let color = *shuffler.choose(&palette);
        for &pos in cells {
            board.set(pos, Cell::Filled(color));
        }
        RecoveryAction::Collapse {
            cells: cells.to_vec(),
            color,
        }
    }

    /// Reshuffle, half-palette when exhaustive search proves no arrangement
    /// of the current colors can ever match.
    fn redistribute(
        &self,
        board: &mut Board,
        filled: &[(Position, Color)],
        shuffler: &mut ShuffleEngine,
    ) -> RecoveryAction {
        let positions: Vec<Position> = filled.iter().map(|&(pos, _)| pos).collect();
        let colors: Vec<Color> = filled.iter().map(|&(_, color)| color).collect();

        if colors.len() <= self.config.exhaustive_max {
            let provable = permutations(&colors)
                .into_iter()
                .any(|candidate| self.oracle.is_solvable_with(board, &candidate));
            if !provable {
                return self.half_palette(board, &positions, shuffler);
            }
        }

        // Commit one fresh random permutation, not necessarily a proven one;
        // the outer loop re-checks and retries.
        let mut assignment = colors;
        shuffler.shuffle(&mut assignment);
        apply_assignment(board, &positions, &assignment);
        RecoveryAction::Reshuffle { assignment }
    }

    /// Cut the palette to `floor(count / 2)` colors and deal them round-robin
    /// so every chosen color appears at least twice, then shuffle.
    fn half_palette(
        &self,
        board: &mut Board,
        positions: &[Position],
        shuffler: &mut ShuffleEngine,
    ) -> RecoveryAction {
        let mut pool = board.palette();
        if pool.len() < positions.len() / 2 {
            pool = Color::ALL.to_vec();
        }
        let want = (positions.len() / 2).min(pool.len()).max(1);
        shuffler.shuffle(&mut pool);
        pool.truncate(want);

        let mut assignment: Vec<Color> = (0..positions.len()).map(|i| pool[i % want]).collect();
        shuffler.shuffle(&mut assignment);
        apply_assignment(board, positions, &assignment);
        RecoveryAction::HalfPalette {
            palette: pool,
            assignment,
        }
    }
}

fn apply_assignment(board: &mut Board, positions: &[Position], assignment: &[Color]) {
    assert_eq!(
        positions.len(),
        assignment.len(),
        "assignment must cover every filled cell"
    );
    for (&pos, &color) in positions.iter().zip(assignment) {
        board.set(pos, Cell::Filled(color));
    }
}

/// True when the cells form one contiguous straight line along a row or a
/// column. From any trigger, at most one cell of such a residue is the
/// nearest block in any direction, so no recoloring can ever match it.
fn is_degenerate_line(cells: &[Position]) -> bool {
    if cells.len() < 2 {
        return false;
    }
    let same_row = cells.iter().all(|c| c.y == cells[0].y);
    let same_col = cells.iter().all(|c| c.x == cells[0].x);
    if !same_row && !same_col {
        return false;
    }
    let mut line: Vec<usize> = cells
        .iter()
        .map(|c| if same_row { c.x } else { c.y })
        .collect();
    line.sort_unstable();
    line.windows(2).all(|pair| pair[1] == pair[0] + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> DeadlockResolver {
        DeadlockResolver::new(ResolverConfig::default(), SolvabilityOracle::default())
    }

    #[test]
    fn test_degenerate_line_is_contiguous_only() {
        let contiguous = [Position::new(0, 0), Position::new(1, 0), Position::new(2, 0)];
        assert!(is_degenerate_line(&contiguous));

        let gapped = [Position::new(0, 0), Position::new(2, 0), Position::new(4, 0)];
        assert!(!is_degenerate_line(&gapped));

        let column = [Position::new(3, 1), Position::new(3, 2), Position::new(3, 3)];
        assert!(is_degenerate_line(&column));

        let bent = [Position::new(0, 0), Position::new(1, 0), Position::new(1, 1)];
        assert!(!is_degenerate_line(&bent));
    }

    #[test]
    fn test_empty_board_is_won() {
        let mut board = Board::empty(4, 4).unwrap();
        let mut shuffler = ShuffleEngine::with_seed(1);
        let (actions, state) = resolver().resolve(&mut board, &mut shuffler);
        assert!(actions.is_empty());
        assert_eq!(state, GameState::Won);
    }

    #[test]
    fn test_single_block_is_auto_cleared() {
        let mut board = Board::from_rows(&["...", ".Y.", "..."]).unwrap();
        let mut shuffler = ShuffleEngine::with_seed(1);
        let (actions, state) = resolver().resolve(&mut board, &mut shuffler);
        assert_eq!(
            actions,
            vec![RecoveryAction::AutoClear {
                pos: Position::new(1, 1),
                color: Color::Yellow,
            }]
        );
        assert_eq!(state, GameState::Won);
        assert_eq!(board.filled_count(), 0);
    }

    #[test]
    fn test_playable_board_is_left_alone() {
        let mut board = Board::from_rows(&["R.R"]).unwrap();
        let snapshot = board.clone();
        let mut shuffler = ShuffleEngine::with_seed(1);
        let (actions, state) = resolver().resolve(&mut board, &mut shuffler);
        assert!(actions.is_empty());
        assert_eq!(state, GameState::Active);
        assert_eq!(board, snapshot);
    }

    #[test]
    fn test_degenerate_line_fails_terminally() {
        let mut board = Board::from_rows(&[
            "RRR..",
            ".....",
            ".....",
            ".....",
            ".....",
        ])
        .unwrap();
        let mut shuffler = ShuffleEngine::with_seed(1);
        let (actions, state) = resolver().resolve(&mut board, &mut shuffler);
        assert!(actions.is_empty());
        assert_eq!(state, GameState::Failed(FailReason::DegenerateLine));
    }

    #[test]
    fn test_gapped_line_is_not_degenerate() {
        // Same three cells spread out: the middle trigger can see two of
        // them, so the board is already playable.
        let mut board = Board::from_rows(&[
            "R.R.R",
            ".....",
            ".....",
            ".....",
            ".....",
        ])
        .unwrap();
        let mut shuffler = ShuffleEngine::with_seed(1);
        let (actions, state) = resolver().resolve(&mut board, &mut shuffler);
        assert!(actions.is_empty());
        assert_eq!(state, GameState::Active);
    }

    #[test]
    fn test_collapse_guarantees_progress() {
        // Two stuck blocks of different colors, not on one line.
        let mut board = Board::from_rows(&[
            ".....",
            ".R...",
            ".....",
            "...B.",
            ".....",
        ])
        .unwrap();
        let mut shuffler = ShuffleEngine::with_seed(11);
        let oracle = SolvabilityOracle::default();
        assert!(!oracle.has_any_move(&board));

        let (actions, state) = resolver().resolve(&mut board, &mut shuffler);
        assert_eq!(state, GameState::Active);
        assert!(oracle.has_any_move(&board));
        match &actions[0] {
            RecoveryAction::Collapse { cells, color } => {
                assert_eq!(cells, &[Position::new(1, 1), Position::new(3, 3)]);
                for &pos in cells {
                    assert_eq!(board.cell(pos), Cell::Filled(*color));
                }
            }
            other => panic!("expected a collapse, got {other:?}"),
        }
    }

    #[test]
    fn test_collapse_progress_for_three_blocks() {
        for seed in 0..8 {
            let mut board = Board::from_rows(&[
                "R....",
                ".....",
                "..B..",
                ".....",
                "....Y",
            ])
            .unwrap();
            let mut shuffler = ShuffleEngine::with_seed(seed);
            let oracle = SolvabilityOracle::default();
            assert!(!oracle.has_any_move(&board));

            let (actions, state) = resolver().resolve(&mut board, &mut shuffler);
            assert_eq!(state, GameState::Active, "seed {seed}");
            assert!(oracle.has_any_move(&board), "seed {seed}");
            assert!(matches!(actions[0], RecoveryAction::Collapse { .. }));
        }
    }

    #[test]
    fn test_provable_reshuffle_is_chosen_over_half_palette() {
        // Duplicated colors arranged so no move exists, but swapping two
        // cells would pair the reds across the (1, 0) trigger.
        let mut board = Board::from_rows(&[
            "R.B..",
            ".....",
            "B.R..",
            ".....",
            ".....",
        ])
        .unwrap();
        let mut shuffler = ShuffleEngine::with_seed(3);
        let oracle = SolvabilityOracle::default();
        assert!(!oracle.has_any_move(&board));

        let positions_before = board.filled_positions();
        let (actions, state) = resolver().resolve(&mut board, &mut shuffler);
        assert!(matches!(actions[0], RecoveryAction::Reshuffle { .. }));
        assert_eq!(board.filled_positions(), positions_before);
        assert!(matches!(
            state,
            GameState::Active | GameState::Failed(FailReason::RetriesExhausted)
        ));
        if state == GameState::Active {
            assert!(oracle.has_any_move(&board));
        }
    }

    #[test]
    fn test_all_distinct_colors_force_half_palette() {
        // Four blocks of four distinct colors: every permutation keeps all
        // colors distinct, so the exhaustive proof must fail and the
        // resolver must cut the palette to two colors.
        let mut board = Board::from_rows(&[
            "R.B..",
            ".....",
            "Y.G..",
            ".....",
            ".....",
        ])
        .unwrap();
        let mut shuffler = ShuffleEngine::with_seed(5);
        let oracle = SolvabilityOracle::default();
        assert!(!oracle.has_any_move(&board));

        let positions_before = board.filled_positions();
        let (actions, state) = resolver().resolve(&mut board, &mut shuffler);
        match &actions[0] {
            RecoveryAction::HalfPalette { palette, assignment } => {
                assert_eq!(palette.len(), 2);
                assert_eq!(assignment.len(), 4);
                for color in palette {
                    let uses = assignment.iter().filter(|&c| c == color).count();
                    assert!(uses >= 2, "{color} used {uses} times");
                }
            }
            other => panic!("expected a half-palette, got {other:?}"),
        }
        assert_eq!(board.filled_positions(), positions_before);
        assert!(matches!(
            state,
            GameState::Active | GameState::Failed(FailReason::RetriesExhausted)
        ));
    }

    #[test]
    fn test_unrecoverable_square_exhausts_retries() {
        // A 2x2 block in the corner shields itself: no trigger can ever see
        // two of its cells, so every recovery attempt fails and the retry
        // cap must end the cascade.
        let mut board = Board::from_rows(&[
            "RB...",
            "YG...",
            ".....",
            ".....",
            ".....",
        ])
        .unwrap();
        let mut shuffler = ShuffleEngine::with_seed(8);
        let oracle = SolvabilityOracle::default();
        assert!(!oracle.has_any_move(&board));

        let (actions, state) = resolver().resolve(&mut board, &mut shuffler);
        assert_eq!(state, GameState::Failed(FailReason::RetriesExhausted));
        assert_eq!(actions.len(), ResolverConfig::default().max_retries);
        for action in &actions {
            assert!(matches!(action, RecoveryAction::HalfPalette { .. }));
        }
        assert_eq!(board.filled_count(), 4);
    }

    #[test]
    fn test_resolution_is_deterministic_per_seed() {
        let rows = ["R.B..", ".....", "Y.G..", ".....", "....."];
        let mut first = Board::from_rows(&rows).unwrap();
        let mut second = Board::from_rows(&rows).unwrap();
        let mut rng_a = ShuffleEngine::with_seed(21);
        let mut rng_b = ShuffleEngine::with_seed(21);

        let outcome_a = resolver().resolve(&mut first, &mut rng_a);
        let outcome_b = resolver().resolve(&mut second, &mut rng_b);
        assert_eq!(outcome_a, outcome_b);
        assert_eq!(first, second);
    }
}

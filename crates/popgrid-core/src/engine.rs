//! The full resolution cycle: tap, match, destroy, score, then the win and
//! deadlock checks with recovery when the board is stuck.

use crate::board::{Board, Cell, Color, LoadError, Position};
use crate::matcher::MatchFinder;
use crate::oracle::{MoveHint, SolvabilityOracle};
use crate::resolver::{DeadlockResolver, GameState, RecoveryAction, ResolverConfig};
use crate::score::{ScoreCalculator, ScoreConfig};
use crate::shuffle::ShuffleEngine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Engine-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Smallest qualifying color group.
    pub min_match_size: usize,
    pub score: ScoreConfig,
    pub resolver: ResolverConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_match_size: 2,
            score: ScoreConfig::default(),
            resolver: ResolverConfig::default(),
        }
    }
}

/// Caller misuse at the tap boundary. The board is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TapError {
    #[error("{0} is outside the board")]
    OutOfBounds(Position),
    #[error("{0} is not an empty trigger cell")]
    NotATrigger(Position),
    #[error("the session already ended")]
    Finished,
}

/// What a single tap produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapOutcome {
    /// Destroyed cells with their colors, for goal tallies and display.
    pub destroyed: Vec<(Position, Color)>,
    /// Points awarded for this tap.
    pub points: u32,
    /// Recovery steps taken after the tap, in animation order.
    pub recovery: Vec<RecoveryAction>,
    /// Session state once the cycle completed.
    pub state: GameState,
}

impl TapOutcome {
    /// True when the tap found no qualifying group and changed nothing.
    pub fn is_no_match(&self) -> bool {
        self.destroyed.is_empty()
    }
}

/// One engine instance exclusively owns one board for the session's
/// lifetime. Both stage and free-play modes compose this same type; there
/// is no global instance.
pub struct MatchingEngine {
    board: Board,
    config: EngineConfig,
    finder: MatchFinder,
    oracle: SolvabilityOracle,
    scorer: ScoreCalculator,
    resolver: DeadlockResolver,
    shuffler: ShuffleEngine,
    score: u32,
    state: GameState,
}

impl MatchingEngine {
    /// Take ownership of a prepared board.
    pub fn from_board(config: EngineConfig, board: Board) -> Self {
        let state = if board.filled_count() == 0 {
            GameState::Won
        } else {
            GameState::Active
        };
        let oracle = SolvabilityOracle::new(config.min_match_size);
        Self {
            finder: MatchFinder::new(config.min_match_size),
            scorer: ScoreCalculator::new(config.score.clone()),
            resolver: DeadlockResolver::new(config.resolver.clone(), oracle.clone()),
            oracle,
            shuffler: ShuffleEngine::new(),
            score: 0,
            state,
            config,
            board,
        }
    }

    /// Load a stage from a level pattern (see [`Board::from_pattern`]).
    pub fn from_pattern(
        config: EngineConfig,
        width: usize,
        height: usize,
        pattern: &[u8],
    ) -> Result<Self, LoadError> {
        Ok(Self::from_board(config, Board::from_pattern(width, height, pattern)?))
    }

    /// Start a free-play session on a randomly filled board.
    pub fn random(
        config: EngineConfig,
        width: usize,
        height: usize,
        palette: &[Color],
        fill_ratio: f32,
    ) -> Result<Self, LoadError> {
        let mut shuffler = ShuffleEngine::new();
        let board = Board::random(width, height, palette, fill_ratio, &mut shuffler)?;
        let mut engine = Self::from_board(config, board);
        engine.shuffler = shuffler;
        Ok(engine)
    }

    /// Reseed the recovery randomness, for reproducible sessions.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.shuffler = ShuffleEngine::with_seed(seed);
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Points accumulated over the session.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// A playable move on the current board, if the session is still live.
    pub fn hint(&self) -> Option<MoveHint> {
        if self.state == GameState::Active {
            self.oracle.find_move(&self.board)
        } else {
            None
        }
    }

    /// Run the stuck evaluation against the current board. A freshly loaded
    /// level may already be deadlocked, or even already cleared.
    pub fn ensure_playable(&mut self) -> (Vec<RecoveryAction>, GameState) {
        let (actions, state) = self.resolver.resolve(&mut self.board, &mut self.shuffler);
        self.state = state;
        (actions, state)
    }

    /// One full resolution cycle for a tapped trigger cell.
    ///
    /// Runs synchronously to a terminal sub-state: no match (silent no-op),
    /// or destruction plus scoring followed by the win/stuck evaluation and
    /// any recovery cascade. The next tap must not be accepted until the
    /// caller has finished animating this outcome.
    pub fn tap(&mut self, pos: Position) -> Result<TapOutcome, TapError> {
        if self.state != GameState::Active {
            return Err(TapError::Finished);
        }
        if !self.board.in_bounds(pos) {
            return Err(TapError::OutOfBounds(pos));
        }
        if !self.board.cell(pos).is_empty() {
            return Err(TapError::NotATrigger(pos));
        }

        let matched = self.finder.find_matches(&self.board, pos);
        if matched.is_empty() {
            return Ok(TapOutcome {
                destroyed: Vec::new(),
                points: 0,
                recovery: Vec::new(),
                state: self.state,
            });
        }

        let destroyed: Vec<(Position, Color)> = matched
            .iter()
            .map(|&cell| {
                let color = self.board.cell(cell).color().expect("matched cell is filled");
                (cell, color)
            })
            .collect();
        for &(cell, _) in &destroyed {
            self.board.set(cell, Cell::Empty);
        }

        let points = self.scorer.score(destroyed.len());
        self.score += points;

        let (recovery, state) = self.resolver.resolve(&mut self.board, &mut self.shuffler);
        self.state = state;

        Ok(TapOutcome {
            destroyed,
            points,
            recovery,
            state,
        })
    }
}

//! Core engine for a trigger-grid tile-matching puzzle.
//!
//! A board holds colored blocks and empty trigger slots. Selecting a trigger
//! probes outward in the four cardinal directions and removes color-matching
//! groups of blocks. This crate is the authoritative game core: match
//! detection, a global solvability oracle, scoring, and a deadlock-recovery
//! policy that repaints or reshuffles the surviving blocks when no move
//! remains.
//!
//! Rendering, input and persistence live in frontends. They consume board
//! snapshots plus the action descriptors returned from
//! [`MatchingEngine::tap`], and never mutate the board themselves.

mod board;
mod engine;
mod matcher;
mod oracle;
mod resolver;
mod score;
mod shuffle;

pub use board::{Board, Cell, Color, LoadError, Position};
pub use engine::{EngineConfig, MatchingEngine, TapError, TapOutcome};
pub use matcher::{Direction, MatchFinder, MatchGroup};
pub use oracle::{MoveHint, SolvabilityOracle};
pub use resolver::{DeadlockResolver, FailReason, GameState, RecoveryAction, ResolverConfig};
pub use score::{ScoreCalculator, ScoreConfig};
pub use shuffle::{permutations, ShuffleEngine, SimpleRng};

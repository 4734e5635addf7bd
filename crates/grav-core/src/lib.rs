//! Core toolchain for the Grav puzzle game.
//!
//! Levels are fixed-capacity 16x16 boards of walls, crates and colored gems
//! under a global gravity the player tilts one direction at a time. This
//! crate holds everything the offline tooling and the game runtime share:
//! the board model and its binary codec, the gravity-cascade simulator, a
//! breadth-first optimal solver, the random level generator, the difficulty
//! scorer and the bundle assembler.

pub mod bundle;
pub mod difficulty;
pub mod generator;
pub mod level;
pub mod rng;
pub mod sim;
pub mod solver;

pub use bundle::{sort_pool, Bundle, BundleTier, PuzzleEntry, BUNDLE_SIZE};
pub use difficulty::DifficultyWeights;
pub use generator::{GenParams, Generator};
pub use level::{
    Direction, GemColor, Level, LevelError, LevelResult, Pos, ELEMENTS_MAX, LEVEL_FILE_SIZE,
    MAP_MAX_CELLS,
};
pub use rng::Rng;
pub use sim::SimState;
pub use solver::{
    state_hash, SolveResult, Solver, SOLVER_DEFAULT_DEPTH, SOLVER_DEFAULT_MAX_STATES,
    SOLVER_MAX_MOVES,
};

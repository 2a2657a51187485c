//! SAT-based solver and generator for 9x9 Sudoku variants.
//!
//! Puzzles (standard, killer with cage sums, inequality, and mixed) are
//! reduced to CNF over 729 primary variables, one per cell/value pair, and
//! handed to a CDCL engine. Uniqueness is decided incrementally by blocking
//! the first model and solving again. The generator carves cages,
//! inequalities, and givens out of a random complete grid, repairs the
//! puzzle until it solves uniquely, then greedily removes constraints while
//! the uniqueness oracle still holds.
//!
//! ```
//! use sudoku_sat_core::{Solver, Uniqueness};
//!
//! let solver = Solver::new();
//! let solution = solver
//!     .solve_str(
//!         "530070000600195000098000060800060003400803001700020006060000280000419005000080079",
//!         true,
//!     )
//!     .unwrap();
//! assert!(solution.solved);
//! assert_eq!(solution.uniqueness, Uniqueness::Unique);
//! ```

mod error;
mod format;
mod generator;
mod puzzle;
mod solver;
mod verify;

pub use error::Error;
pub use format::{
    parse_file, parse_str, to_custom_format, to_custom_format_with_solution, to_pretty_grid,
};
pub use generator::{Generated, Generator, GeneratorConfig};
pub use puzzle::{
    Cage, Cell, Grid, IneqKind, Inequality, Puzzle, PuzzleKind, Solution, Uniqueness, BOX_SIZE,
    EMPTY_CELL, GRID_SIZE, MAX_VALUE, MIN_VALUE,
};
pub use solver::{SolveReport, Solver};
pub use verify::verify;

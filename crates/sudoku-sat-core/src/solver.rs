//! Encoder/solver driver: build the formula, run the SAT engine, decode the
//! model, and optionally re-solve under a blocking clause to decide
//! uniqueness.

mod encode;
mod varmap;

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;
use crate::format;
use crate::puzzle::{Grid, Puzzle, Solution, Uniqueness, GRID_SIZE};
use crate::verify::verify;
use encode::Encoder;

/// Stateless solver front door; every call owns its SAT state.
pub struct Solver;

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    pub fn new() -> Self {
        Self
    }

    /// Solve without a uniqueness check.
    pub fn solve(&self, puzzle: &Puzzle) -> Solution {
        self.solve_checked(puzzle, false)
    }

    /// Solve, then optionally probe for a second model.
    ///
    /// The uniqueness probe appends a blocking clause ruling out the first
    /// model and re-runs the same engine instance; UNSAT there means the
    /// solution is unique. The reported grid is always the first model.
    pub fn solve_checked(&self, puzzle: &Puzzle, check_uniqueness: bool) -> Solution {
        let mut encoder = Encoder::new();
        encoder.encode(puzzle);
        debug!(
            variables = encoder.num_variables(),
            clauses = encoder.num_clauses(),
            kind = %puzzle.kind(),
            "formula encoded"
        );

        let started = Instant::now();
        let sat = match encoder.solve() {
            Ok(sat) => sat,
            Err(err) => return failed(&encoder, err.to_string(), ms_since(started)),
        };
        let mut solve_time_ms = ms_since(started);

        if !sat {
            return failed(
                &encoder,
                "no solution exists for the given puzzle".to_owned(),
                solve_time_ms,
            );
        }

        let grid = encoder.decode_grid();
        // Last line of defense: a decoded model that fails the constraint
        // check means the encoding emitted wrong clauses.
        assert!(
            verify(puzzle, &grid),
            "decoded model violates the puzzle constraints; the encoding is broken"
        );

        let mut uniqueness = Uniqueness::NotChecked;
        if check_uniqueness {
            encoder.block_model(&grid);
            let second = Instant::now();
            match encoder.solve() {
                Ok(true) => uniqueness = Uniqueness::NotUnique,
                Ok(false) => uniqueness = Uniqueness::Unique,
                Err(err) => {
                    return failed(&encoder, err.to_string(), solve_time_ms + ms_since(second))
                }
            }
            solve_time_ms += ms_since(second);
        }

        Solution {
            grid,
            solved: true,
            uniqueness,
            solve_time_ms,
            message: None,
            variables: encoder.num_variables(),
            clauses: encoder.num_clauses(),
        }
    }

    /// Parse and solve in one step.
    pub fn solve_str(&self, input: &str, check_uniqueness: bool) -> Result<Solution, Error> {
        let puzzle = format::parse_str(input)?;
        Ok(self.solve_checked(&puzzle, check_uniqueness))
    }

    /// Read, parse, and solve a puzzle file.
    pub fn solve_file(
        &self,
        path: impl AsRef<Path>,
        check_uniqueness: bool,
    ) -> Result<Solution, Error> {
        let puzzle = format::parse_file(path)?;
        Ok(self.solve_checked(&puzzle, check_uniqueness))
    }
}

fn ms_since(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1_000.0
}

fn failed(encoder: &Encoder<'_>, message: String, solve_time_ms: f64) -> Solution {
    Solution {
        grid: Grid::new(),
        solved: false,
        uniqueness: Uniqueness::NotChecked,
        solve_time_ms,
        message: Some(message),
        variables: encoder.num_variables(),
        clauses: encoder.num_clauses(),
    }
}

/// Wire payload for embedding hosts (web bridge, automation), camelCase keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveReport {
    pub solved: bool,
    pub solve_time_ms: f64,
    pub variables: usize,
    pub clauses: usize,
    /// Present only when a uniqueness check was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uniqueness: Option<Uniqueness>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<[[u8; GRID_SIZE]; GRID_SIZE]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SolveReport {
    pub fn from_solution(solution: &Solution) -> Self {
        let grid = solution.solved.then(|| {
            let mut rows = [[0u8; GRID_SIZE]; GRID_SIZE];
            for (row, out) in rows.iter_mut().enumerate() {
                for (col, slot) in out.iter_mut().enumerate() {
                    *slot = solution.grid.get(row, col);
                }
            }
            rows
        });
        SolveReport {
            solved: solution.solved,
            solve_time_ms: solution.solve_time_ms,
            variables: solution.variables,
            clauses: solution.clauses,
            uniqueness: match solution.uniqueness {
                Uniqueness::NotChecked => None,
                u => Some(u),
            },
            grid,
            error: solution.message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{Cage, Cell};

    const EASY: &str =
        "530070000600195000098000060800060003400803001700020006060000280000419005000080079";

    #[test]
    fn solves_a_simple_puzzle() {
        let solver = Solver::new();
        let solution = solver.solve_str(EASY, false).unwrap();
        assert!(solution.solved);
        assert_eq!(solution.uniqueness, Uniqueness::NotChecked);
        assert_eq!(solution.variables, 729);
        assert!(solution.clauses > 0);
    }

    #[test]
    fn reports_statistics_for_unsolvable_puzzles() {
        let mut puzzle = Puzzle::new();
        puzzle.set_given(0, 0, 5);
        puzzle.set_given(0, 1, 5);
        let solution = Solver::new().solve(&puzzle);
        assert!(!solution.solved);
        assert!(solution.message.is_some());
        assert_eq!(solution.uniqueness, Uniqueness::NotChecked);
    }

    #[test]
    fn aux_variables_show_up_in_statistics() {
        let mut puzzle = Puzzle::new();
        // Sum 7 over two cells has three combinations, so three aux vars.
        puzzle.add_cage(Cage::new(vec![Cell::new(0, 0), Cell::new(0, 1)], 7));
        let solution = Solver::new().solve(&puzzle);
        assert!(solution.solved);
        assert_eq!(solution.variables, 729 + 3);
    }

    #[test]
    fn report_omits_grid_and_uniqueness_when_absent() {
        let mut puzzle = Puzzle::new();
        puzzle.set_given(0, 0, 5);
        puzzle.set_given(0, 1, 5);
        let solution = Solver::new().solve(&puzzle);
        let report = SolveReport::from_solution(&solution);
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("\"grid\""));
        assert!(!json.contains("\"uniqueness\""));
        assert!(json.contains("\"solved\":false"));
        assert!(json.contains("\"solveTimeMs\""));
        assert!(json.contains("\"error\""));
    }

    #[test]
    fn report_serializes_uniqueness_labels() {
        let solver = Solver::new();
        let solution = solver.solve_str(EASY, true).unwrap();
        assert!(solution.is_unique());
        let report = SolveReport::from_solution(&solution);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"uniqueness\":\"unique\""));
        assert!(json.contains("\"grid\":[["));
    }
}

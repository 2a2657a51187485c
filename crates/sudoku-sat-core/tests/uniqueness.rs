//! The blocking-clause uniqueness probe.

use sudoku_sat_core::{parse_str, verify, Puzzle, Solver, Uniqueness};

const EASY: &str =
    "530070000600195000098000060800060003400803001700020006060000280000419005000080079";

#[test]
fn empty_grid_is_not_unique() {
    let puzzle = Puzzle::new();
    let solution = Solver::new().solve_checked(&puzzle, true);
    assert!(solution.solved);
    assert_eq!(solution.uniqueness, Uniqueness::NotUnique);
    // The reported grid stays the first model and must still be valid.
    assert!(verify(&puzzle, &solution.grid));
}

#[test]
fn proper_puzzle_is_unique() {
    let puzzle = parse_str(EASY).unwrap();
    let solution = Solver::new().solve_checked(&puzzle, true);
    assert!(solution.solved);
    assert_eq!(solution.uniqueness, Uniqueness::Unique);
}

#[test]
fn fully_given_grid_is_unique() {
    let puzzle = parse_str(EASY).unwrap();
    let first = Solver::new().solve(&puzzle);
    assert!(first.solved);

    let mut full = Puzzle::new();
    for row in 0..9 {
        for col in 0..9 {
            full.set_given(row, col, first.grid.get(row, col));
        }
    }
    let solution = Solver::new().solve_checked(&full, true);
    assert!(solution.solved);
    assert_eq!(solution.uniqueness, Uniqueness::Unique);
}

#[test]
fn uniqueness_skipped_when_not_requested() {
    let puzzle = parse_str(EASY).unwrap();
    let solution = Solver::new().solve_checked(&puzzle, false);
    assert!(solution.solved);
    assert_eq!(solution.uniqueness, Uniqueness::NotChecked);
}

#[test]
fn unsat_puzzle_reports_not_checked() {
    let mut puzzle = Puzzle::new();
    puzzle.set_given(0, 0, 5);
    puzzle.set_given(0, 1, 5);
    let solution = Solver::new().solve_checked(&puzzle, true);
    assert!(!solution.solved);
    assert_eq!(solution.uniqueness, Uniqueness::NotChecked);
}

#[test]
fn removing_a_given_can_break_uniqueness() {
    // Dropping enough givens from a proper puzzle eventually admits a second
    // solution; an empty grid is the extreme case, checked above. Here a
    // nearly-empty puzzle derived from EASY's first row only.
    let mut puzzle = Puzzle::new();
    let full = parse_str(EASY).unwrap();
    for col in 0..9 {
        let v = full.grid.get(0, col);
        if v != 0 {
            puzzle.set_given(0, col, v);
        }
    }
    let solution = Solver::new().solve_checked(&puzzle, true);
    assert!(solution.solved);
    assert_eq!(solution.uniqueness, Uniqueness::NotUnique);
}

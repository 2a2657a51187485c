//! Killer Sudoku (cage) solving.

use sudoku_sat_core::{verify, Cage, Cell, Puzzle, PuzzleKind, Solver};

fn cage(cells: &[(usize, usize)], sum: u32) -> Cage {
    Cage::new(
        cells.iter().map(|&(r, c)| Cell::new(r, c)).collect(),
        sum,
    )
}

#[test]
fn row_locking_cages_solve_and_sum() {
    // Five cages tiling row 0; their targets force the row to sum to 45.
    let mut puzzle = Puzzle::new();
    puzzle.add_cage(cage(&[(0, 0), (0, 1)], 3));
    puzzle.add_cage(cage(&[(0, 2), (0, 3)], 7));
    puzzle.add_cage(cage(&[(0, 4), (0, 5)], 11));
    puzzle.add_cage(cage(&[(0, 6), (0, 7)], 15));
    puzzle.add_cage(cage(&[(0, 8)], 9));
    assert_eq!(puzzle.kind(), PuzzleKind::Killer);

    let solution = Solver::new().solve(&puzzle);
    assert!(solution.solved);
    assert!(verify(&puzzle, &solution.grid));

    let row_sum: u32 = (0..9).map(|c| u32::from(solution.grid.get(0, c))).sum();
    assert_eq!(row_sum, 45);
    assert_eq!(solution.grid.get(0, 8), 9);
}

#[test]
fn single_combination_cage_forces_its_values() {
    // Sum 3 over two cells only splits as {1, 2}.
    let mut puzzle = Puzzle::new();
    puzzle.add_cage(cage(&[(4, 4), (4, 5)], 3));
    let solution = Solver::new().solve(&puzzle);
    assert!(solution.solved);

    let mut values = [solution.grid.get(4, 4), solution.grid.get(4, 5)];
    values.sort_unstable();
    assert_eq!(values, [1, 2]);
}

#[test]
fn given_conflicting_with_cage_is_unsat() {
    // 9 at (0,0) cannot sit in a cage summing to 3.
    let mut puzzle = Puzzle::new();
    puzzle.set_given(0, 0, 9);
    puzzle.add_cage(cage(&[(0, 0), (0, 1)], 3));
    let solution = Solver::new().solve(&puzzle);
    assert!(!solution.solved);
}

#[test]
fn out_of_window_cage_sum_is_unsat() {
    let mut puzzle = Puzzle::new();
    puzzle.add_cage(cage(&[(0, 0), (0, 1)], 2)); // below the 2-cell minimum of 3
    assert!(!Solver::new().solve(&puzzle).solved);

    let mut puzzle = Puzzle::new();
    puzzle.add_cage(cage(&[(0, 0), (0, 1)], 18)); // above the 2-cell maximum of 17
    assert!(!Solver::new().solve(&puzzle).solved);
}

#[test]
fn empty_cage_is_unsat() {
    let mut puzzle = Puzzle::new();
    puzzle.add_cage(Cage::new(vec![], 5));
    assert!(!Solver::new().solve(&puzzle).solved);
}

#[test]
fn full_box_cage_solves() {
    // A 9-cell cage over the top-left box; 45 is its only value set.
    let cells: Vec<(usize, usize)> = (0..3)
        .flat_map(|r| (0..3).map(move |c| (r, c)))
        .collect();
    let mut puzzle = Puzzle::new();
    puzzle.add_cage(cage(&cells, 45));
    let solution = Solver::new().solve(&puzzle);
    assert!(solution.solved);
    assert!(verify(&puzzle, &solution.grid));
}

#[test]
fn cage_values_are_distinct_even_across_houses() {
    // An L-shaped cage spanning two boxes; row/column rules alone would
    // allow a duplicate at the corner pair.
    let mut puzzle = Puzzle::new();
    puzzle.add_cage(cage(&[(2, 2), (2, 3), (3, 3)], 12));
    let solution = Solver::new().solve(&puzzle);
    assert!(solution.solved);

    let values = [
        solution.grid.get(2, 2),
        solution.grid.get(2, 3),
        solution.grid.get(3, 3),
    ];
    assert_ne!(values[0], values[1]);
    assert_ne!(values[0], values[2]);
    assert_ne!(values[1], values[2]);
    assert_eq!(values.iter().map(|&v| u32::from(v)).sum::<u32>(), 12);
}

#[test]
fn overlapping_cage_and_givens_solve_together() {
    let mut puzzle = Puzzle::new();
    puzzle.set_given(0, 0, 1);
    puzzle.add_cage(cage(&[(0, 0), (1, 0), (1, 1)], 8));
    let solution = Solver::new().solve(&puzzle);
    assert!(solution.solved);
    assert!(verify(&puzzle, &solution.grid));
    assert_eq!(solution.grid.get(0, 0), 1);
}

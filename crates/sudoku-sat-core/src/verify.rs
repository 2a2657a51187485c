//! Constraint checking without the SAT engine.

use crate::puzzle::{Cage, Grid, IneqKind, Inequality, Puzzle, BOX_SIZE, GRID_SIZE, MAX_VALUE, MIN_VALUE};

/// True iff `candidate` is a valid completion of `puzzle`: every cell in
/// 1..=9, rows/columns/boxes are permutations, givens preserved, cages
/// distinct and on target, inequalities ordered.
pub fn verify(puzzle: &Puzzle, candidate: &Grid) -> bool {
    cells_in_range(candidate)
        && houses_are_permutations(candidate)
        && givens_preserved(puzzle, candidate)
        && cages_satisfied(&puzzle.cages, candidate)
        && inequalities_satisfied(&puzzle.inequalities, candidate)
}

fn cells_in_range(grid: &Grid) -> bool {
    (0..GRID_SIZE).all(|row| {
        (0..GRID_SIZE).all(|col| (MIN_VALUE..=MAX_VALUE).contains(&grid.get(row, col)))
    })
}

fn houses_are_permutations(grid: &Grid) -> bool {
    for row in 0..GRID_SIZE {
        let mut seen = [false; 10];
        for col in 0..GRID_SIZE {
            let v = grid.get(row, col) as usize;
            if seen[v] {
                return false;
            }
            seen[v] = true;
        }
    }
    for col in 0..GRID_SIZE {
        let mut seen = [false; 10];
        for row in 0..GRID_SIZE {
            let v = grid.get(row, col) as usize;
            if seen[v] {
                return false;
            }
            seen[v] = true;
        }
    }
    for box_row in 0..BOX_SIZE {
        for box_col in 0..BOX_SIZE {
            let mut seen = [false; 10];
            for r in 0..BOX_SIZE {
                for c in 0..BOX_SIZE {
                    let v = grid.get(box_row * BOX_SIZE + r, box_col * BOX_SIZE + c) as usize;
                    if seen[v] {
                        return false;
                    }
                    seen[v] = true;
                }
            }
        }
    }
    true
}

fn givens_preserved(puzzle: &Puzzle, candidate: &Grid) -> bool {
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let given = puzzle.grid.get(row, col);
            if (MIN_VALUE..=MAX_VALUE).contains(&given) && candidate.get(row, col) != given {
                return false;
            }
        }
    }
    true
}

fn cages_satisfied(cages: &[Cage], candidate: &Grid) -> bool {
    for cage in cages {
        let mut seen = [false; 10];
        let mut sum = 0u32;
        for cell in &cage.cells {
            let v = candidate.value(*cell);
            if seen[v as usize] {
                return false;
            }
            seen[v as usize] = true;
            sum += u32::from(v);
        }
        if sum != cage.target_sum {
            return false;
        }
    }
    true
}

fn inequalities_satisfied(inequalities: &[Inequality], candidate: &Grid) -> bool {
    inequalities.iter().all(|ineq| {
        let lhs = candidate.value(ineq.lhs);
        let rhs = candidate.value(ineq.rhs);
        match ineq.kind {
            IneqKind::GreaterThan => lhs > rhs,
            IneqKind::LessThan => lhs < rhs,
        }
    })
}

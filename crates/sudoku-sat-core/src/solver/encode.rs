//! CNF construction for all puzzle variants.
//!
//! Clauses go straight into the owned SAT engine; nothing is buffered. The
//! at-most-one primitive uses the pairwise encoding throughout: every literal
//! set here has at most nine members, where pairwise beats ladder or
//! commander encodings on solver time.

use varisat::{ExtendFormula, Lit, Solver};

use super::varmap::VarMap;
use crate::error::Error;
use crate::puzzle::{
    Cage, Grid, IneqKind, Inequality, Puzzle, BOX_SIZE, GRID_SIZE, MAX_VALUE, MIN_VALUE,
};

/// One formula plus the SAT engine that owns it. Built fresh for every solve
/// call; the uniqueness re-solve appends a blocking clause to the same
/// instance.
pub(crate) struct Encoder<'s> {
    solver: Solver<'s>,
    vars: VarMap,
    clauses: usize,
}

impl<'s> Encoder<'s> {
    pub(crate) fn new() -> Self {
        let mut solver = Solver::new();
        let vars = VarMap::new(&mut solver);
        Encoder {
            solver,
            vars,
            clauses: 0,
        }
    }

    /// Emit every clause the puzzle needs: the basic Sudoku block always,
    /// cage and inequality blocks only when those collections are populated.
    pub(crate) fn encode(&mut self, puzzle: &Puzzle) {
        self.encode_cells();
        self.encode_rows();
        self.encode_columns();
        self.encode_boxes();
        self.encode_givens(puzzle);
        if puzzle.has_cages() {
            self.encode_cages(&puzzle.cages);
        }
        if puzzle.has_inequalities() {
            self.encode_inequalities(&puzzle.inequalities);
        }
    }

    pub(crate) fn solve(&mut self) -> Result<bool, Error> {
        self.solver
            .solve()
            .map_err(|e| Error::Engine(e.to_string()))
    }

    /// Read the model back into a grid.
    ///
    /// Panics when a cell has anything but exactly one true value literal;
    /// the exactly-one block makes that impossible unless the encoding
    /// itself is broken.
    pub(crate) fn decode_grid(&self) -> Grid {
        let model = self
            .solver
            .model()
            .expect("model requested without a satisfying assignment");

        let mut assigned = vec![false; self.vars.total_count()];
        for lit in &model {
            let idx = lit.var().index();
            if idx < assigned.len() {
                assigned[idx] = lit.is_positive();
            }
        }

        let mut grid = Grid::new();
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                let mut found = None;
                for value in MIN_VALUE..=MAX_VALUE {
                    if assigned[self.vars.var(row, col, value).index()] {
                        if found.is_some() {
                            panic!(
                                "model assigns two values to cell ({row}, {col}); \
                                 the encoding is broken"
                            );
                        }
                        found = Some(value);
                    }
                }
                let value = found.unwrap_or_else(|| {
                    panic!(
                        "model assigns no value to cell ({row}, {col}); \
                         the encoding is broken"
                    )
                });
                grid.set(row, col, value);
            }
        }
        grid
    }

    /// Forbid the given complete assignment: any further model must differ
    /// from it in at least one cell.
    pub(crate) fn block_model(&mut self, grid: &Grid) {
        let mut lits = Vec::with_capacity(GRID_SIZE * GRID_SIZE);
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                lits.push(self.vars.lit(row, col, grid.get(row, col), false));
            }
        }
        self.add_clause(&lits);
    }

    pub(crate) fn num_variables(&self) -> usize {
        self.vars.total_count()
    }

    pub(crate) fn num_clauses(&self) -> usize {
        self.clauses
    }

    // ==================== primitives ====================

    fn add_clause(&mut self, lits: &[Lit]) {
        self.solver.add_clause(lits);
        self.clauses += 1;
    }

    /// Pairwise at-most-one: one binary clause per unordered literal pair.
    fn at_most_one(&mut self, lits: &[Lit]) {
        for i in 0..lits.len() {
            for j in i + 1..lits.len() {
                self.add_clause(&[!lits[i], !lits[j]]);
            }
        }
    }

    fn exactly_one(&mut self, lits: &[Lit]) {
        self.add_clause(lits);
        self.at_most_one(lits);
    }

    // ==================== basic Sudoku ====================

    fn encode_cells(&mut self) {
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                let lits: Vec<Lit> = (MIN_VALUE..=MAX_VALUE)
                    .map(|v| self.vars.lit(row, col, v, true))
                    .collect();
                self.exactly_one(&lits);
            }
        }
    }

    fn encode_rows(&mut self) {
        for row in 0..GRID_SIZE {
            for value in MIN_VALUE..=MAX_VALUE {
                let lits: Vec<Lit> = (0..GRID_SIZE)
                    .map(|col| self.vars.lit(row, col, value, true))
                    .collect();
                self.exactly_one(&lits);
            }
        }
    }

    fn encode_columns(&mut self) {
        for col in 0..GRID_SIZE {
            for value in MIN_VALUE..=MAX_VALUE {
                let lits: Vec<Lit> = (0..GRID_SIZE)
                    .map(|row| self.vars.lit(row, col, value, true))
                    .collect();
                self.exactly_one(&lits);
            }
        }
    }

    fn encode_boxes(&mut self) {
        for box_row in 0..BOX_SIZE {
            for box_col in 0..BOX_SIZE {
                for value in MIN_VALUE..=MAX_VALUE {
                    let mut lits = Vec::with_capacity(GRID_SIZE);
                    for r in 0..BOX_SIZE {
                        for c in 0..BOX_SIZE {
                            let row = box_row * BOX_SIZE + r;
                            let col = box_col * BOX_SIZE + c;
                            lits.push(self.vars.lit(row, col, value, true));
                        }
                    }
                    self.exactly_one(&lits);
                }
            }
        }
    }

    fn encode_givens(&mut self, puzzle: &Puzzle) {
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                let value = puzzle.grid.get(row, col);
                if (MIN_VALUE..=MAX_VALUE).contains(&value) {
                    let lit = self.vars.lit(row, col, value, true);
                    self.add_clause(&[lit]);
                }
            }
        }
    }

    // ==================== cages ====================

    fn encode_cages(&mut self, cages: &[Cage]) {
        for cage in cages {
            if !cage.is_valid() {
                // Structurally impossible cage: the empty clause forces UNSAT.
                self.add_clause(&[]);
                continue;
            }
            self.encode_cage_sum(cage);
            self.encode_cage_uniqueness(cage);
        }
    }

    /// Per value, at most one cage cell may hold it.
    fn encode_cage_uniqueness(&mut self, cage: &Cage) {
        for value in MIN_VALUE..=MAX_VALUE {
            let lits: Vec<Lit> = cage
                .cells
                .iter()
                .map(|cell| self.vars.lit(cell.row, cell.col, value, true))
                .collect();
            self.at_most_one(&lits);
        }
    }

    /// Encode the sum over the value combinations that can reach it.
    ///
    /// With a single surviving combination the value set is forced directly.
    /// With several, one fresh "combination chosen" variable per combination
    /// selects which value set the cage holds, and channeling clauses make
    /// those variables functionally determined by the cell assignment, so no
    /// spurious models arise. Combined with cage uniqueness this pins the
    /// cage to exactly the chosen multiset without enumerating the n!
    /// cell-value permutations.
    fn encode_cage_sum(&mut self, cage: &Cage) {
        let combos = sum_combinations(cage.cells.len(), cage.target_sum);
        if combos.is_empty() {
            self.add_clause(&[]);
            return;
        }

        if let [combo] = combos.as_slice() {
            for value in MIN_VALUE..=MAX_VALUE {
                if combo.contains(&value) {
                    // The value must land somewhere in the cage.
                    let lits: Vec<Lit> = cage
                        .cells
                        .iter()
                        .map(|cell| self.vars.lit(cell.row, cell.col, value, true))
                        .collect();
                    self.add_clause(&lits);
                } else {
                    for cell in &cage.cells {
                        let lit = self.vars.lit(cell.row, cell.col, value, false);
                        self.add_clause(&[lit]);
                    }
                }
            }
            return;
        }

        let choice: Vec<Lit> = combos
            .iter()
            .map(|_| self.vars.fresh_aux(&mut self.solver))
            .collect();
        self.exactly_one(&choice);

        for (i, combo) in combos.iter().enumerate() {
            for value in MIN_VALUE..=MAX_VALUE {
                if combo.contains(&value) {
                    // chosen -> the value appears in some cage cell
                    let mut lits = vec![!choice[i]];
                    lits.extend(
                        cage.cells
                            .iter()
                            .map(|cell| self.vars.lit(cell.row, cell.col, value, true)),
                    );
                    self.add_clause(&lits);
                } else {
                    // chosen -> no cage cell holds the value
                    for cell in &cage.cells {
                        let lit = self.vars.lit(cell.row, cell.col, value, false);
                        self.add_clause(&[!choice[i], lit]);
                    }
                }
            }
        }

        // Channeling: a cell holding a value implies some combination
        // containing that value was chosen. Values no combination contains
        // are forbidden outright.
        for cell in &cage.cells {
            for value in MIN_VALUE..=MAX_VALUE {
                let mut lits = vec![self.vars.lit(cell.row, cell.col, value, false)];
                lits.extend(
                    combos
                        .iter()
                        .enumerate()
                        .filter(|(_, combo)| combo.contains(&value))
                        .map(|(i, _)| choice[i]),
                );
                self.add_clause(&lits);
            }
        }
    }

    // ==================== inequalities ====================

    fn encode_inequalities(&mut self, inequalities: &[Inequality]) {
        for ineq in inequalities {
            if !ineq.is_valid() {
                self.add_clause(&[]);
                continue;
            }
            self.encode_inequality(ineq);
        }
    }

    /// Forbid every value pair that violates the ordering, O(81) binary
    /// clauses per constraint.
    fn encode_inequality(&mut self, ineq: &Inequality) {
        let (hi, lo) = match ineq.kind {
            IneqKind::GreaterThan => (ineq.lhs, ineq.rhs),
            IneqKind::LessThan => (ineq.rhs, ineq.lhs),
        };
        // value(hi) > value(lo): rule out every (v_hi, v_lo) with v_hi <= v_lo
        for v_hi in MIN_VALUE..=MAX_VALUE {
            for v_lo in v_hi..=MAX_VALUE {
                let a = self.vars.lit(hi.row, hi.col, v_hi, false);
                let b = self.vars.lit(lo.row, lo.col, v_lo, false);
                self.add_clause(&[a, b]);
            }
        }
    }
}

/// Every strictly increasing tuple of values in 1..=9 summing to `target`.
///
/// Backtracking with two prunes at each step: the residual target must stay
/// between the smallest and largest sums the remaining cells can reach.
pub(crate) fn sum_combinations(cells: usize, target: u32) -> Vec<Vec<u8>> {
    let mut result = Vec::new();
    let mut current = Vec::with_capacity(cells);
    extend_combination(cells, i64::from(target), MIN_VALUE, &mut current, &mut result);
    result
}

fn extend_combination(
    remaining: usize,
    target: i64,
    min_value: u8,
    current: &mut Vec<u8>,
    result: &mut Vec<Vec<u8>>,
) {
    if remaining == 0 {
        if target == 0 {
            result.push(current.clone());
        }
        return;
    }

    for value in min_value..=MAX_VALUE {
        let v = i64::from(value);
        if v > target {
            break;
        }
        let rest = (remaining - 1) as i64;
        // Smallest sum of `rest` further strictly increasing values.
        let min_rest = rest * v + rest * (rest + 1) / 2;
        // Largest sum of `rest` distinct values capped at 9.
        let max_rest = rest * i64::from(MAX_VALUE) - rest * (rest - 1) / 2;
        let residual = target - v;
        if min_rest > residual || max_rest < residual {
            continue;
        }

        current.push(value);
        extend_combination(remaining - 1, residual, value + 1, current, result);
        current.pop();
    }
}

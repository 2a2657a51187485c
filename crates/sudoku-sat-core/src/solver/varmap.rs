//! Mapping between `(row, col, value)` triples and SAT variables.

use varisat::{ExtendFormula, Lit, Solver, Var};

use crate::puzzle::GRID_SIZE;

/// Number of primary variables: one per `(row, col, value)` triple.
pub(crate) const PRIMARY_VARS: usize = GRID_SIZE * GRID_SIZE * GRID_SIZE;

/// Owns the primary variable block and any auxiliary variables allocated by
/// the cage encoder. Auxiliary variables live strictly after the primaries so
/// the model decoder never has to look at them.
pub(crate) struct VarMap {
    primary: Vec<Var>,
    aux_count: usize,
}

impl VarMap {
    /// Allocate the 729 primary variables, in `(row, col, value)` order.
    pub(crate) fn new(solver: &mut Solver<'_>) -> Self {
        let primary = (0..PRIMARY_VARS).map(|_| solver.new_var()).collect();
        Self {
            primary,
            aux_count: 0,
        }
    }

    /// The variable asserting "cell `(row, col)` holds `value`".
    pub(crate) fn var(&self, row: usize, col: usize, value: u8) -> Var {
        debug_assert!((1..=9).contains(&value));
        self.primary[row * GRID_SIZE * GRID_SIZE + col * GRID_SIZE + (value as usize - 1)]
    }

    /// Literal over [`VarMap::var`]; `positive` selects the polarity.
    pub(crate) fn lit(&self, row: usize, col: usize, value: u8, positive: bool) -> Lit {
        Lit::from_var(self.var(row, col, value), positive)
    }

    /// Allocate one fresh auxiliary variable.
    pub(crate) fn fresh_aux(&mut self, solver: &mut Solver<'_>) -> Lit {
        self.aux_count += 1;
        Lit::from_var(solver.new_var(), true)
    }

    pub(crate) fn primary_count(&self) -> usize {
        self.primary.len()
    }

    pub(crate) fn total_count(&self) -> usize {
        self.primary.len() + self.aux_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_indices_are_dense_and_row_major() {
        let mut solver = Solver::new();
        let map = VarMap::new(&mut solver);
        assert_eq!(map.primary_count(), 729);

        let mut expected = 0usize;
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                for value in 1..=9u8 {
                    assert_eq!(map.var(row, col, value).index(), expected);
                    expected += 1;
                }
            }
        }
    }

    #[test]
    fn aux_variables_come_after_primaries() {
        let mut solver = Solver::new();
        let mut map = VarMap::new(&mut solver);
        let aux = map.fresh_aux(&mut solver);
        assert!(aux.var().index() >= PRIMARY_VARS);
        assert_eq!(map.total_count(), PRIMARY_VARS + 1);
    }

    #[test]
    fn lit_polarity() {
        let mut solver = Solver::new();
        let map = VarMap::new(&mut solver);
        assert!(map.lit(4, 4, 5, true).is_positive());
        assert!(!map.lit(4, 4, 5, false).is_positive());
        assert_eq!(map.lit(4, 4, 5, true).var(), map.var(4, 4, 5));
    }
}

//! Puzzle generation: carve constraints out of a random complete grid, force
//! uniqueness, then greedily strip constraints back out while the uniqueness
//! oracle still holds.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::puzzle::{
    Cage, Cell, Grid, IneqKind, Inequality, Puzzle, PuzzleKind, Uniqueness, EMPTY_CELL, GRID_SIZE,
    MAX_VALUE, MIN_VALUE,
};
use crate::solver::Solver;

/// How many random locally-consistent placements are pre-seeded into the
/// empty grid before asking the SAT engine for a complete solution. The
/// engine is deterministic; without the pre-seeds every run would converge on
/// the same grid. A tuning constant: any small count that diversifies the
/// output works.
const COMPLETE_GRID_PRESEEDS: usize = 11;

/// Rounds of batched constraint additions tried before falling back to
/// one-given-at-a-time repair.
const REPAIR_CONSTRAINT_ATTEMPTS: usize = 10;
/// Inequalities added per repair round on variants that carry them.
const REPAIR_INEQUALITY_BATCH: usize = 5;
/// Givens added per repair round on the other variants.
const REPAIR_GIVEN_BATCH: usize = 3;

/// Cap on growth steps for a single cage.
const CAGE_GROWTH_ATTEMPTS: usize = 100;

/// Generation knobs; the defaults produce a mixed-variant puzzle with a
/// unique solution and no givens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Which variant to build.
    pub kind: PuzzleKind,
    /// Cage count range, sampled uniformly.
    pub min_cages: usize,
    pub max_cages: usize,
    /// Target size range for each cage.
    pub min_cage_size: usize,
    pub max_cage_size: usize,
    /// Inequality count range, sampled uniformly.
    pub min_inequalities: usize,
    pub max_inequalities: usize,
    /// Given (hint) count range, sampled uniformly.
    pub min_givens: usize,
    pub max_givens: usize,
    /// RNG seed; 0 draws a seed from entropy.
    pub seed: u64,
    /// Repair and minimize until the puzzle has exactly one solution.
    pub ensure_unique_solution: bool,
    /// Cages must cover every cell (killer/mixed only).
    pub fill_all_cells: bool,
    /// 0..=100; bounds the fraction of constraints the minimizer attempts to
    /// remove per category.
    pub difficulty: u8,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            kind: PuzzleKind::Mixed,
            min_cages: 15,
            max_cages: 25,
            min_cage_size: 2,
            max_cage_size: 5,
            min_inequalities: 20,
            max_inequalities: 40,
            min_givens: 0,
            max_givens: 0,
            seed: 0,
            ensure_unique_solution: true,
            fill_all_cells: false,
            difficulty: 50,
        }
    }
}

/// A generated puzzle together with the complete grid it was carved from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generated {
    pub puzzle: Puzzle,
    pub solution: Grid,
}

/// Seeded puzzle generator. Deterministic for a fixed non-zero seed.
pub struct Generator {
    config: GeneratorConfig,
    rng: ChaCha8Rng,
    solver: Solver,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        let seed = if config.seed == 0 {
            rand::thread_rng().gen()
        } else {
            config.seed
        };
        debug!(seed, kind = %config.kind, "generator seeded");
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            solver: Solver::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_config(GeneratorConfig {
            seed,
            ..GeneratorConfig::default()
        })
    }

    /// Run the full pipeline: complete grid, constraint carving, givens,
    /// uniqueness repair, minimization.
    pub fn generate(&mut self) -> Generated {
        let solution = self.random_complete_grid();
        let mut puzzle = Puzzle::new();

        if matches!(self.config.kind, PuzzleKind::Killer | PuzzleKind::Mixed) {
            if self.config.fill_all_cells {
                self.carve_cages_filling_all(&mut puzzle, &solution);
            } else {
                let count = self
                    .rng
                    .gen_range(self.config.min_cages..=self.config.max_cages);
                self.carve_cages(&mut puzzle, &solution, count);
            }
            debug!(cages = puzzle.cages.len(), "cages carved");
        }

        if matches!(self.config.kind, PuzzleKind::Inequality | PuzzleKind::Mixed) {
            let count = self
                .rng
                .gen_range(self.config.min_inequalities..=self.config.max_inequalities);
            self.carve_inequalities(&mut puzzle, &solution, count);
            debug!(inequalities = puzzle.inequalities.len(), "inequalities carved");
        }

        if self.config.max_givens > 0 {
            let count = self
                .rng
                .gen_range(self.config.min_givens..=self.config.max_givens);
            self.add_givens(&mut puzzle, &solution, count);
        }

        if self.config.ensure_unique_solution {
            self.repair_uniqueness(&mut puzzle, &solution);
            self.minimize(&mut puzzle);
        }

        Generated { puzzle, solution }
    }

    // ==================== complete grid ====================

    /// Solve the empty puzzle after planting a few random givens that are
    /// consistent within their row, column, and box, so different seeds steer
    /// the engine towards different complete grids.
    fn random_complete_grid(&mut self) -> Grid {
        let mut seeded = Puzzle::new();

        let mut candidates = Vec::with_capacity(GRID_SIZE * GRID_SIZE * GRID_SIZE);
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                for value in MIN_VALUE..=MAX_VALUE {
                    candidates.push((Cell::new(row, col), value));
                }
            }
        }
        candidates.shuffle(&mut self.rng);

        let mut placed = 0;
        for (cell, value) in candidates {
            if placed >= COMPLETE_GRID_PRESEEDS {
                break;
            }
            if seeded.grid.value(cell) != EMPTY_CELL
                || !placement_fits(&seeded.grid, cell, value)
            {
                continue;
            }
            seeded.grid.set(cell.row, cell.col, value);
            placed += 1;
        }

        let result = self.solver.solve(&seeded);
        if result.solved {
            return result.grid;
        }

        // Locally consistent pre-seeds can still clash globally; the empty
        // grid always solves.
        let fallback = self.solver.solve(&Puzzle::new());
        assert!(fallback.solved, "empty grid must be satisfiable");
        fallback.grid
    }

    // ==================== cages ====================

    fn carve_cages(&mut self, puzzle: &mut Puzzle, solution: &Grid, count: usize) {
        let mut used = HashSet::new();
        for _ in 0..count {
            let target_size = self
                .rng
                .gen_range(self.config.min_cage_size..=self.config.max_cage_size);
            let cells = self.grow_cage(solution, &mut used, target_size);
            if cells.len() >= 2 {
                let sum = cage_sum(&cells, solution);
                puzzle.add_cage(Cage::new(cells, sum));
            }
        }
    }

    fn carve_cages_filling_all(&mut self, puzzle: &mut Puzzle, solution: &Grid) {
        let mut used = HashSet::new();
        while used.len() < GRID_SIZE * GRID_SIZE {
            let remaining = GRID_SIZE * GRID_SIZE - used.len();
            let mut target_size = self
                .rng
                .gen_range(self.config.min_cage_size..=self.config.max_cage_size);
            target_size = target_size.min(remaining);

            let cells = self.grow_cage(solution, &mut used, target_size);
            match cells.len() {
                0 => break,
                // Lone leftovers become single-cell cages so coverage is total.
                _ => {
                    let sum = cage_sum(&cells, solution);
                    puzzle.add_cage(Cage::new(cells, sum));
                }
            }
        }
    }

    /// Grow a 4-connected cage from a random unused seed cell. Each step
    /// picks uniformly among frontier cells whose solution value does not
    /// already occur in the cage, keeping intra-cage uniqueness carvable.
    fn grow_cage(
        &mut self,
        solution: &Grid,
        used: &mut HashSet<Cell>,
        target_size: usize,
    ) -> Vec<Cell> {
        let available: Vec<Cell> = (0..GRID_SIZE)
            .flat_map(|row| (0..GRID_SIZE).map(move |col| Cell::new(row, col)))
            .filter(|cell| !used.contains(cell))
            .collect();
        if available.is_empty() {
            return Vec::new();
        }

        let start = available[self.rng.gen_range(0..available.len())];
        let mut cage = vec![start];
        used.insert(start);

        let mut attempts = 0;
        while cage.len() < target_size && attempts < CAGE_GROWTH_ATTEMPTS {
            attempts += 1;

            let mut frontier: Vec<Cell> = Vec::new();
            for cell in &cage {
                for adj in neighbors4(*cell) {
                    if used.contains(&adj) || frontier.contains(&adj) {
                        continue;
                    }
                    let value = solution.value(adj);
                    if cage.iter().any(|c| solution.value(*c) == value) {
                        continue;
                    }
                    frontier.push(adj);
                }
            }
            if frontier.is_empty() {
                break;
            }

            let next = frontier[self.rng.gen_range(0..frontier.len())];
            cage.push(next);
            used.insert(next);
        }
        cage
    }

    // ==================== inequalities ====================

    /// Pick up to `count` shuffled adjacent pairs and record the ordering the
    /// complete grid induces on them.
    fn carve_inequalities(&mut self, puzzle: &mut Puzzle, solution: &Grid, count: usize) {
        let mut pairs: Vec<(Cell, Cell)> = Vec::new();
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                if col + 1 < GRID_SIZE {
                    pairs.push((Cell::new(row, col), Cell::new(row, col + 1)));
                }
                if row + 1 < GRID_SIZE {
                    pairs.push((Cell::new(row, col), Cell::new(row + 1, col)));
                }
            }
        }
        pairs.shuffle(&mut self.rng);

        let mut added = 0;
        for (lhs, rhs) in pairs {
            if added >= count {
                break;
            }
            let lv = solution.value(lhs);
            let rv = solution.value(rhs);
            if lv == rv {
                continue;
            }
            let kind = if lv > rv {
                IneqKind::GreaterThan
            } else {
                IneqKind::LessThan
            };
            puzzle.add_inequality(Inequality::new(lhs, rhs, kind));
            added += 1;
        }
    }

    // ==================== givens ====================

    fn add_givens(&mut self, puzzle: &mut Puzzle, solution: &Grid, count: usize) {
        let mut empty = puzzle.grid.empty_cells();
        empty.shuffle(&mut self.rng);
        for cell in empty.into_iter().take(count) {
            puzzle.set_given(cell.row, cell.col, solution.value(cell));
        }
    }

    // ==================== uniqueness ====================

    /// Add constraints until the puzzle solves uniquely. Batched additions
    /// first; once those rounds are spent, one given at a time. Termination:
    /// with all 81 cells given the puzzle is trivially unique.
    fn repair_uniqueness(&mut self, puzzle: &mut Puzzle, solution: &Grid) {
        let mut result = self.solver.solve_checked(puzzle, true);

        let mut attempts = 0;
        while result.solved
            && result.uniqueness == Uniqueness::NotUnique
            && attempts < REPAIR_CONSTRAINT_ATTEMPTS
        {
            if matches!(self.config.kind, PuzzleKind::Inequality | PuzzleKind::Mixed) {
                self.carve_inequalities(puzzle, solution, REPAIR_INEQUALITY_BATCH);
            } else {
                self.add_givens(puzzle, solution, REPAIR_GIVEN_BATCH);
            }
            result = self.solver.solve_checked(puzzle, true);
            attempts += 1;
        }

        let mut givens_added = 0;
        while result.solved && result.uniqueness == Uniqueness::NotUnique {
            assert!(
                givens_added < GRID_SIZE * GRID_SIZE,
                "uniqueness repair exhausted all 81 givens; the encoding is broken"
            );
            self.add_givens(puzzle, solution, 1);
            result = self.solver.solve_checked(puzzle, true);
            givens_added += 1;
        }
        debug!(
            givens = puzzle.given_count(),
            inequalities = puzzle.inequalities.len(),
            "uniqueness established"
        );
    }

    // ==================== minimization ====================

    /// Greedy constraint removal under the uniqueness oracle. Inequalities
    /// first (they carry the least information), then cages, then givens.
    /// The difficulty knob bounds the fraction of candidates probed per
    /// category; 100 probes everything.
    fn minimize(&mut self, puzzle: &mut Puzzle) {
        let fraction = f64::from(self.config.difficulty.min(100)) / 100.0;

        let mut candidates = puzzle.inequalities.clone();
        candidates.shuffle(&mut self.rng);
        candidates.truncate(attempt_budget(fraction, candidates.len()));
        let mut removed = 0;
        for ineq in candidates {
            let Some(pos) = puzzle.inequalities.iter().position(|i| *i == ineq) else {
                continue;
            };
            let taken = puzzle.inequalities.remove(pos);
            if self.still_unique(puzzle) {
                removed += 1;
            } else {
                puzzle.inequalities.push(taken);
            }
        }
        debug!(removed, "inequality minimization pass done");

        let mut candidates = puzzle.cages.clone();
        candidates.shuffle(&mut self.rng);
        candidates.truncate(attempt_budget(fraction, candidates.len()));
        let mut removed = 0;
        for cage in candidates {
            let Some(pos) = puzzle.cages.iter().position(|c| *c == cage) else {
                continue;
            };
            let taken = puzzle.cages.remove(pos);
            if self.still_unique(puzzle) {
                removed += 1;
            } else {
                puzzle.cages.push(taken);
            }
        }
        debug!(removed, "cage minimization pass done");

        let mut candidates: Vec<Cell> = (0..GRID_SIZE)
            .flat_map(|row| (0..GRID_SIZE).map(move |col| Cell::new(row, col)))
            .filter(|cell| puzzle.grid.value(*cell) != EMPTY_CELL)
            .collect();
        candidates.shuffle(&mut self.rng);
        candidates.truncate(attempt_budget(fraction, candidates.len()));
        let mut removed = 0;
        for cell in candidates {
            let value = puzzle.grid.value(cell);
            puzzle.grid.set(cell.row, cell.col, EMPTY_CELL);
            if self.still_unique(puzzle) {
                removed += 1;
            } else {
                puzzle.grid.set(cell.row, cell.col, value);
            }
        }
        debug!(removed, "given minimization pass done");
    }

    fn still_unique(&self, puzzle: &Puzzle) -> bool {
        let result = self.solver.solve_checked(puzzle, true);
        result.solved && result.uniqueness == Uniqueness::Unique
    }
}

fn attempt_budget(fraction: f64, candidates: usize) -> usize {
    (fraction * candidates as f64).ceil() as usize
}

/// Whether placing `value` at `cell` keeps its row, column, and box
/// duplicate-free.
fn placement_fits(grid: &Grid, cell: Cell, value: u8) -> bool {
    for i in 0..GRID_SIZE {
        if grid.get(cell.row, i) == value || grid.get(i, cell.col) == value {
            return false;
        }
    }
    let box_row = cell.row / 3 * 3;
    let box_col = cell.col / 3 * 3;
    for r in box_row..box_row + 3 {
        for c in box_col..box_col + 3 {
            if grid.get(r, c) == value {
                return false;
            }
        }
    }
    true
}

fn neighbors4(cell: Cell) -> Vec<Cell> {
    let mut out = Vec::with_capacity(4);
    if cell.row > 0 {
        out.push(Cell::new(cell.row - 1, cell.col));
    }
    if cell.row + 1 < GRID_SIZE {
        out.push(Cell::new(cell.row + 1, cell.col));
    }
    if cell.col > 0 {
        out.push(Cell::new(cell.row, cell.col - 1));
    }
    if cell.col + 1 < GRID_SIZE {
        out.push(Cell::new(cell.row, cell.col + 1));
    }
    out
}

fn cage_sum(cells: &[Cell], solution: &Grid) -> u32 {
    cells.iter().map(|cell| u32::from(solution.value(*cell))).sum()
}

//! Command-line front-end: solve puzzle files or strings, or generate new
//! puzzles. Progress and statistics go to stderr; the puzzle or solved grid
//! goes to stdout (or `--output`).

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use sudoku_sat_core::{
    parse_file, parse_str, to_custom_format, to_custom_format_with_solution, to_pretty_grid,
    Generated, Generator, GeneratorConfig, Puzzle, PuzzleKind, Solver, Uniqueness,
};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum KindArg {
    Standard,
    Killer,
    Inequality,
    #[default]
    Mixed,
}

impl From<KindArg> for PuzzleKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Standard => PuzzleKind::Standard,
            KindArg::Killer => PuzzleKind::Killer,
            KindArg::Inequality => PuzzleKind::Inequality,
            KindArg::Mixed => PuzzleKind::Mixed,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "sudoku-sat",
    version,
    about = "SAT-based solver and generator for Sudoku variants",
    long_about = "Solves and generates standard, killer, inequality, and mixed Sudoku \
                  puzzles by reduction to SAT.\n\n\
                  Solve:    sudoku-sat puzzle.txt [--unique]\n\
                  Solve:    sudoku-sat --string \"<81 chars>\"\n\
                  Generate: sudoku-sat --generate --type killer --seed 7"
)]
struct Cli {
    /// Puzzle file to solve.
    file: Option<PathBuf>,

    /// Solve this puzzle string (81-char grid or the custom text format).
    #[arg(long, short = 's', value_name = "GRID", conflicts_with = "generate")]
    string: Option<String>,

    /// Also check that the solution is unique.
    #[arg(long, short = 'u')]
    unique: bool,

    /// Generate a puzzle instead of solving one.
    #[arg(long)]
    generate: bool,

    /// Variant to generate.
    #[arg(long = "type", value_enum, default_value_t = KindArg::Mixed, value_name = "TYPE")]
    kind: KindArg,

    /// Cage count range.
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    cages: Option<Vec<usize>>,

    /// Inequality count range.
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    ineq: Option<Vec<usize>>,

    /// Given (hint) count range.
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    givens: Option<Vec<usize>>,

    /// RNG seed; 0 draws one from entropy.
    #[arg(long, default_value_t = 0, value_name = "N")]
    seed: u64,

    /// Write generated output to a file instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    /// Append a SOLUTION section to generated output.
    #[arg(long)]
    with_solution: bool,

    /// Generated cages must cover every cell.
    #[arg(long)]
    fill_all: bool,

    /// Skip the unique-solution guarantee when generating.
    #[arg(long)]
    no_unique: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    if cli.generate {
        run_generate(cli)
    } else {
        run_solve(cli)
    }
}

fn run_solve(cli: Cli) -> Result<ExitCode> {
    let puzzle = match (&cli.string, &cli.file) {
        (Some(text), _) => parse_str(text)?,
        (None, Some(path)) => parse_file(path)?,
        (None, None) => bail!("a puzzle file or --string is required (see --help)"),
    };

    print_puzzle_info(&puzzle);
    eprintln!("Solving...");

    let solver = Solver::new();
    let solution = solver.solve_checked(&puzzle, cli.unique);

    if !solution.solved {
        eprintln!("No solution found.");
        if let Some(message) = &solution.message {
            eprintln!("  {message}");
        }
        return Ok(ExitCode::FAILURE);
    }

    println!("{}", to_pretty_grid(&solution.grid));

    match solution.uniqueness {
        Uniqueness::Unique => eprintln!("Solution is unique."),
        Uniqueness::NotUnique => eprintln!("Solution is not unique."),
        Uniqueness::NotChecked => {}
    }

    eprintln!("Statistics:");
    eprintln!("  Variables:  {}", solution.variables);
    eprintln!("  Clauses:    {}", solution.clauses);
    eprintln!("  Solve time: {:.2} ms", solution.solve_time_ms);

    Ok(ExitCode::SUCCESS)
}

fn run_generate(cli: Cli) -> Result<ExitCode> {
    let mut config = GeneratorConfig {
        kind: cli.kind.into(),
        seed: cli.seed,
        ensure_unique_solution: !cli.no_unique,
        fill_all_cells: cli.fill_all,
        ..GeneratorConfig::default()
    };
    if let Some(range) = &cli.cages {
        (config.min_cages, config.max_cages) = parse_range(range, "--cages")?;
    }
    if let Some(range) = &cli.ineq {
        (config.min_inequalities, config.max_inequalities) = parse_range(range, "--ineq")?;
    }
    if let Some(range) = &cli.givens {
        (config.min_givens, config.max_givens) = parse_range(range, "--givens")?;
    }

    info!(kind = %config.kind, seed = config.seed, "generating puzzle");
    let Generated { puzzle, solution } = Generator::with_config(config).generate();

    eprintln!("Generated {}:", puzzle.kind());
    eprintln!("  Cages:        {}", puzzle.cages.len());
    eprintln!("  Inequalities: {}", puzzle.inequalities.len());
    eprintln!("  Givens:       {}", puzzle.given_count());

    let text = if cli.with_solution {
        to_custom_format_with_solution(&puzzle, &solution)
    } else {
        to_custom_format(&puzzle)
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, &text).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{text}"),
    }

    Ok(ExitCode::SUCCESS)
}

fn parse_range(range: &[usize], flag: &str) -> Result<(usize, usize)> {
    match *range {
        [min, max] if min <= max => Ok((min, max)),
        [min, max] => bail!("{flag}: MIN {min} exceeds MAX {max}"),
        _ => bail!("{flag} takes exactly MIN MAX"),
    }
}

fn print_puzzle_info(puzzle: &Puzzle) {
    eprintln!("Puzzle type: {}", puzzle.kind());
    if puzzle.has_cages() {
        eprintln!("Cages: {}", puzzle.cages.len());
    }
    if puzzle.has_inequalities() {
        eprintln!("Inequalities: {}", puzzle.inequalities.len());
    }
    eprintln!("\nInput grid:");
    eprintln!("{}", to_pretty_grid(&puzzle.grid));
}

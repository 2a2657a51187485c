//! The line-oriented puzzle text format, plus pretty printing.
//!
//! Sections are case-insensitive `GRID` / `CAGES` / `INEQUALITIES` /
//! `SOLUTION` headers; a bare 81-character grid string is auto-detected.
//! `SOLUTION` is written on request and skipped on read.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::Error;
use crate::puzzle::{
    Cage, Cell, Grid, IneqKind, Inequality, Puzzle, Solution, BOX_SIZE, EMPTY_CELL, GRID_SIZE,
    MAX_VALUE, MIN_VALUE,
};

/// Parse a puzzle from text, auto-detecting the format.
pub fn parse_str(input: &str) -> Result<Puzzle, Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::parse(1, "empty input"));
    }

    let upper = trimmed.to_ascii_uppercase();
    if upper.contains("GRID") || upper.contains("CAGES") || upper.contains("INEQUALITIES") {
        return parse_custom(input);
    }

    if trimmed.chars().filter(|c| is_grid_char(*c)).count() >= GRID_SIZE * GRID_SIZE {
        return parse_simple_grid(trimmed);
    }

    parse_custom(input)
}

/// Read and parse a puzzle file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Puzzle, Error> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_str(&text)
}

/// A single-line grid: the first 81 grid characters, anything else skipped.
fn parse_simple_grid(input: &str) -> Result<Puzzle, Error> {
    let cells: Vec<u8> = input
        .chars()
        .filter(|c| is_grid_char(*c))
        .take(GRID_SIZE * GRID_SIZE)
        .map(grid_char_value)
        .collect();
    if cells.len() < GRID_SIZE * GRID_SIZE {
        return Err(Error::parse(
            1,
            format!("grid needs 81 cells, found {}", cells.len()),
        ));
    }

    let mut puzzle = Puzzle::new();
    for (i, value) in cells.into_iter().enumerate() {
        puzzle.grid.set(i / GRID_SIZE, i % GRID_SIZE, value);
    }
    Ok(puzzle)
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    Grid,
    Cages,
    Inequalities,
    Solution,
}

fn parse_custom(input: &str) -> Result<Puzzle, Error> {
    let mut puzzle = Puzzle::new();
    let mut section = Section::None;
    let mut grid_row = 0;

    for (idx, raw) in input.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        match line.to_ascii_uppercase().as_str() {
            "GRID" => {
                section = Section::Grid;
                grid_row = 0;
                continue;
            }
            "CAGES" => {
                section = Section::Cages;
                continue;
            }
            "INEQUALITIES" => {
                section = Section::Inequalities;
                continue;
            }
            "SOLUTION" => {
                section = Section::Solution;
                continue;
            }
            _ => {}
        }

        match section {
            Section::Grid => {
                if grid_row < GRID_SIZE {
                    parse_grid_line(line, lineno, grid_row, &mut puzzle.grid)?;
                    grid_row += 1;
                }
            }
            Section::Cages => parse_cage_line(line, lineno, &mut puzzle)?,
            Section::Inequalities => parse_inequality_line(line, lineno, &mut puzzle)?,
            // Ignored on read; the solver recomputes solutions.
            Section::Solution => {}
            Section::None => {
                // Headerless input may open directly with grid rows.
                if looks_like_grid_line(line) && grid_row < GRID_SIZE {
                    section = Section::Grid;
                    parse_grid_line(line, lineno, grid_row, &mut puzzle.grid)?;
                    grid_row += 1;
                } else {
                    return Err(Error::parse(lineno, format!("unrecognized line `{line}`")));
                }
            }
        }
    }

    Ok(puzzle)
}

fn is_grid_char(c: char) -> bool {
    matches!(c, '.' | '0' | '_' | '*' | '1'..='9')
}

fn grid_char_value(c: char) -> u8 {
    match c {
        '1'..='9' => c as u8 - b'0',
        _ => EMPTY_CELL,
    }
}

fn looks_like_grid_line(line: &str) -> bool {
    line.chars().filter(|c| is_grid_char(*c)).count() >= GRID_SIZE
}

fn parse_grid_line(line: &str, lineno: usize, row: usize, grid: &mut Grid) -> Result<(), Error> {
    let mut col = 0;
    for c in line.chars() {
        if col >= GRID_SIZE {
            break;
        }
        if c.is_whitespace() {
            continue;
        }
        if !is_grid_char(c) {
            return Err(Error::parse(lineno, format!("unexpected character `{c}`")));
        }
        grid.set(row, col, grid_char_value(c));
        col += 1;
    }
    if col < GRID_SIZE {
        return Err(Error::parse(
            lineno,
            format!("grid row has {col} cells, expected {GRID_SIZE}"),
        ));
    }
    Ok(())
}

/// `sum r c [r c]...`
fn parse_cage_line(line: &str, lineno: usize, puzzle: &mut Puzzle) -> Result<(), Error> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 || (tokens.len() - 1) % 2 != 0 {
        return Err(Error::parse(
            lineno,
            "cage line must be `sum r c [r c]...`",
        ));
    }

    let target_sum: u32 = tokens[0]
        .parse()
        .map_err(|_| Error::parse(lineno, format!("bad cage sum `{}`", tokens[0])))?;

    let mut cells = Vec::with_capacity((tokens.len() - 1) / 2);
    for pair in tokens[1..].chunks(2) {
        let cell = parse_cell(pair[0], pair[1], lineno)?;
        cells.push(cell);
    }
    puzzle.add_cage(Cage::new(cells, target_sum));
    Ok(())
}

/// `r1 c1 OP r2 c2` with OP one of `>` `<` `gt` `lt`.
fn parse_inequality_line(line: &str, lineno: usize, puzzle: &mut Puzzle) -> Result<(), Error> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 5 {
        return Err(Error::parse(
            lineno,
            "inequality line must be `r1 c1 OP r2 c2`",
        ));
    }

    let lhs = parse_cell(tokens[0], tokens[1], lineno)?;
    let rhs = parse_cell(tokens[3], tokens[4], lineno)?;
    let kind = match tokens[2].to_ascii_lowercase().as_str() {
        ">" | "gt" => IneqKind::GreaterThan,
        "<" | "lt" => IneqKind::LessThan,
        op => return Err(Error::parse(lineno, format!("bad operator `{op}`"))),
    };
    puzzle.add_inequality(Inequality::new(lhs, rhs, kind));
    Ok(())
}

fn parse_cell(row: &str, col: &str, lineno: usize) -> Result<Cell, Error> {
    let row: usize = row
        .parse()
        .map_err(|_| Error::parse(lineno, format!("bad coordinate `{row}`")))?;
    let col: usize = col
        .parse()
        .map_err(|_| Error::parse(lineno, format!("bad coordinate `{col}`")))?;
    let cell = Cell::new(row, col);
    if !cell.is_valid() {
        return Err(Error::parse(
            lineno,
            format!("coordinate ({row}, {col}) outside the grid"),
        ));
    }
    Ok(cell)
}

/// Serialize a puzzle into the custom format.
pub fn to_custom_format(puzzle: &Puzzle) -> String {
    let mut out = String::from("GRID\n");
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            if col > 0 {
                out.push(' ');
            }
            out.push((b'0' + puzzle.grid.get(row, col)) as char);
        }
        out.push('\n');
    }

    if puzzle.has_cages() {
        out.push_str("\nCAGES\n");
        for cage in &puzzle.cages {
            out.push_str(&cage.target_sum.to_string());
            for cell in &cage.cells {
                out.push_str(&format!(" {} {}", cell.row, cell.col));
            }
            out.push('\n');
        }
    }

    if puzzle.has_inequalities() {
        out.push_str("\nINEQUALITIES\n");
        for ineq in &puzzle.inequalities {
            let op = match ineq.kind {
                IneqKind::GreaterThan => '>',
                IneqKind::LessThan => '<',
            };
            out.push_str(&format!(
                "{} {} {} {} {}\n",
                ineq.lhs.row, ineq.lhs.col, op, ineq.rhs.row, ineq.rhs.col
            ));
        }
    }

    out
}

/// Serialize a puzzle with a trailing `SOLUTION` section.
pub fn to_custom_format_with_solution(puzzle: &Puzzle, solution: &Grid) -> String {
    let mut out = to_custom_format(puzzle);
    out.push_str("\nSOLUTION\n");
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            if col > 0 {
                out.push(' ');
            }
            out.push((b'0' + solution.get(row, col)) as char);
        }
        out.push('\n');
    }
    out
}

/// Boxed ASCII rendering of a grid; empty cells print as `.`.
pub fn to_pretty_grid(grid: &Grid) -> String {
    let mut out = String::new();
    out.push_str("+-------+-------+-------+\n");
    for row in 0..GRID_SIZE {
        if row > 0 && row % BOX_SIZE == 0 {
            out.push_str("+-------+-------+-------+\n");
        }
        out.push('|');
        for col in 0..GRID_SIZE {
            if col > 0 && col % BOX_SIZE == 0 {
                out.push_str(" |");
            }
            let value = grid.get(row, col);
            if (MIN_VALUE..=MAX_VALUE).contains(&value) {
                out.push(' ');
                out.push((b'0' + value) as char);
            } else {
                out.push_str(" .");
            }
        }
        out.push_str(" |\n");
    }
    out.push_str("+-------+-------+-------+\n");
    out
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Type: {}", self.kind())?;
        writeln!(f)?;
        write!(f, "{}", to_pretty_grid(&self.grid))?;

        if self.has_cages() {
            writeln!(f, "\nCages ({}):", self.cages.len())?;
            for (i, cage) in self.cages.iter().enumerate() {
                write!(f, "  Cage {}: sum={}, cells=[", i + 1, cage.target_sum)?;
                for (j, cell) in cage.cells.iter().enumerate() {
                    if j > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "({},{})", cell.row, cell.col)?;
                }
                writeln!(f, "]")?;
            }
        }

        if self.has_inequalities() {
            writeln!(f, "\nInequalities ({}):", self.inequalities.len())?;
            for ineq in &self.inequalities {
                let op = match ineq.kind {
                    IneqKind::GreaterThan => '>',
                    IneqKind::LessThan => '<',
                };
                writeln!(
                    f,
                    "  ({},{}) {} ({},{})",
                    ineq.lhs.row, ineq.lhs.col, op, ineq.rhs.row, ineq.rhs.col
                )?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.solved {
            writeln!(f, "Solution found in {:.2} ms:", self.solve_time_ms)?;
            writeln!(f)?;
            write!(f, "{}", to_pretty_grid(&self.grid))
        } else {
            writeln!(f, "No solution found.")?;
            if let Some(message) = &self.message {
                writeln!(f, "Error: {message}")?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EASY: &str =
        "530070000600195000098000060800060003400803001700020006060000280000419005000080079";

    #[test]
    fn parses_81_char_string() {
        let puzzle = parse_str(EASY).unwrap();
        assert_eq!(puzzle.grid.get(0, 0), 5);
        assert_eq!(puzzle.grid.get(0, 2), EMPTY_CELL);
        assert_eq!(puzzle.grid.get(8, 8), 9);
        assert_eq!(puzzle.given_count(), 30);
    }

    #[test]
    fn accepts_dots_and_underscores_for_empty() {
        let input = EASY.replace('0', ".");
        let a = parse_str(EASY).unwrap();
        let b = parse_str(&input).unwrap();
        assert_eq!(a, b);
        let input = EASY.replace('0', "_");
        assert_eq!(a, parse_str(&input).unwrap());
    }

    #[test]
    fn parses_custom_format_with_all_sections() {
        let input = "\
GRID
5 3 0 0 7 0 0 0 0
6 0 0 1 9 5 0 0 0
0 9 8 0 0 0 0 6 0
8 0 0 0 6 0 0 0 3
4 0 0 8 0 3 0 0 1
7 0 0 0 2 0 0 0 6
0 6 0 0 0 0 2 8 0
0 0 0 4 1 9 0 0 5
0 0 0 0 8 0 0 7 9

cages
10 0 2 0 3
17 8 0 8 1

inequalities
0 2 < 0 3
4 4 gt 4 5
";
        let puzzle = parse_str(input).unwrap();
        assert_eq!(puzzle.grid.get(0, 0), 5);
        assert_eq!(puzzle.cages.len(), 2);
        assert_eq!(puzzle.cages[0].target_sum, 10);
        assert_eq!(puzzle.cages[0].cells, vec![Cell::new(0, 2), Cell::new(0, 3)]);
        assert_eq!(puzzle.inequalities.len(), 2);
        assert_eq!(puzzle.inequalities[1].kind, IneqKind::GreaterThan);
    }

    #[test]
    fn solution_section_is_skipped_on_read() {
        let mut puzzle = Puzzle::new();
        puzzle.set_given(0, 0, 5);
        let mut solution = Grid::new();
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                solution.set(row, col, ((row * 3 + row / 3 + col) % 9 + 1) as u8);
            }
        }
        let text = to_custom_format_with_solution(&puzzle, &solution);
        let reparsed = parse_str(&text).unwrap();
        assert_eq!(reparsed, puzzle);
    }

    #[test]
    fn round_trips_through_custom_format() {
        let mut puzzle = parse_str(EASY).unwrap();
        puzzle.add_cage(Cage::new(vec![Cell::new(3, 3), Cell::new(3, 4)], 9));
        puzzle.add_inequality(Inequality::new(
            Cell::new(6, 0),
            Cell::new(6, 1),
            IneqKind::LessThan,
        ));
        let text = to_custom_format(&puzzle);
        let reparsed = parse_str(&text).unwrap();
        assert_eq!(reparsed, puzzle);
    }

    #[test]
    fn rejects_malformed_cage_line() {
        let input = "CAGES\n10 0\n";
        let err = parse_str(input).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let input = "INEQUALITIES\n0 0 > 0 9\n";
        assert!(parse_str(input).is_err());
    }

    #[test]
    fn rejects_bad_operator() {
        let input = "INEQUALITIES\n0 0 >= 0 1\n";
        assert!(parse_str(input).is_err());
    }

    #[test]
    fn rejects_short_input() {
        assert!(parse_str("12345").is_err());
        assert!(parse_str("").is_err());
    }

    #[test]
    fn pretty_grid_marks_boxes_and_blanks() {
        let puzzle = parse_str(EASY).unwrap();
        let pretty = to_pretty_grid(&puzzle.grid);
        assert!(pretty.starts_with("+-------+-------+-------+\n| 5 3 . | . 7 . | . . . |"));
        assert_eq!(pretty.matches("+-------+-------+-------+").count(), 4);
    }
}

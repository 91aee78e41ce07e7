// vim: set ai et ts=4 sw=4 sts=4:
mod loader;
pub mod search;
pub mod solver;

use std::fmt;
use log::{info, warn};

use super::config::SolverConfig;
use super::grid::{self, Color, Grid, Palette, SquareStatus};
use super::row::{Row, Run, Clue, InvalidClue};
use super::util::{Direction, Direction::*};

pub use self::loader::{LoadError, load_document};
pub use self::search::{CancelToken, SearchOutcome};
pub use self::solver::{Solver, Propagation, Contradiction, LineCache};

#[derive(Debug, Clone)]
pub struct Puzzle {
    pub rows: Vec<Row>,
    pub cols: Vec<Row>,
    pub palette: Palette,
    seed_grid: Grid,
}

impl Puzzle {
    /// Builds a puzzle from one clue per row (top to bottom) and one per column
    /// (left to right). Every clue is checked against its line length before
    /// anything else happens.
    pub fn new(row_clues: Vec<Clue>, col_clues: Vec<Clue>) -> Result<Self, InvalidClue>
    {
        let width = col_clues.len();
        let height = row_clues.len();
        let rows = row_clues.into_iter()
                            .enumerate()
                            .map(|(y, clue)| Row::new(Horizontal, y, width, clue))
                            .collect::<Result<Vec<_>, _>>()?;
        let cols = col_clues.into_iter()
                            .enumerate()
                            .map(|(x, clue)| Row::new(Vertical, x, height, clue))
                            .collect::<Result<Vec<_>, _>>()?;
        Ok(Puzzle {
            rows,
            cols,
            palette: Palette::default(),
            seed_grid: Grid::new(width, height),
        })
    }
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn width(&self) -> usize { self.cols.len() }
    pub fn height(&self) -> usize { self.rows.len() }

    pub fn row(&self, direction: Direction, index: usize) -> &Row {
        match direction {
            Horizontal => &self.rows[index],
            Vertical   => &self.cols[index],
        }
    }

    /// Records a square that is known before solving starts.
    pub fn seed(&mut self, x: usize, y: usize, status: SquareStatus) -> Result<(), grid::Error> {
        self.seed_grid.set_status(x, y, status).map(|_| ())
    }

    /// All-unknown grid with the seeded squares filled in.
    pub fn initial_grid(&self) -> Grid {
        self.seed_grid.clone()
    }

    /// Whether every line of `grid` matches its clue exactly.
    pub fn is_solution(&self, grid: &Grid) -> bool {
        self.rows.iter()
                 .chain(self.cols.iter())
                 .all(|row| runs_of(&grid.line(row.direction, row.index)).as_deref() == Some(row.clue.runs()))
    }

    pub fn solve(&self, config: &SolverConfig) -> SolveReport {
        self.solve_with_cancel(config, &CancelToken::new())
    }

    /// Propagates line logic to a fixpoint and, if that stalls and search is
    /// enabled, hands over to the backtracking search. `cancel` stops a
    /// running search early.
    pub fn solve_with_cancel(&self, config: &SolverConfig, cancel: &CancelToken) -> SolveReport {
        info!("Solving {}x{} puzzle", self.width(), self.height());
        let mut stats = SolveStats::default();

        let mut solver = Solver::new(self, self.initial_grid(), config);
        let propagation = solver.run();
        stats.line_solves = solver.iterations;
        stats.cache_hits = solver.cache_hits();
        let (grid, _) = solver.into_parts();

        let (grid, status, unique) = match propagation {
            Propagation::Solved => {
                info!("Solved by line logic after {} line solves", stats.line_solves);
                (grid, SolveStatus::Solved, Some(true))
            }
            Propagation::Contradiction(c) => {
                info!("Puzzle is inconsistent: {}", c);
                (grid, SolveStatus::Contradiction { direction: c.direction, index: c.index }, None)
            }
            Propagation::LimitReached => {
                warn!("Line solve budget of {} exhausted before reaching a fixpoint", config.max_line_solves);
                (grid, SolveStatus::Stalled, None)
            }
            Propagation::Stalled if !config.search.enabled => {
                info!("Line logic stalled with {} unknown squares", grid.unknown_count());
                (grid, SolveStatus::Stalled, None)
            }
            Propagation::Stalled => {
                info!("Line logic stalled with {} unknown squares; starting search", grid.unknown_count());
                let (outcome, search_stats) = search::search(self, &grid, config, cancel);
                stats.line_solves += search_stats.line_solves;
                stats.cache_hits += search_stats.cache_hits;
                stats.search_nodes = search_stats.nodes;
                stats.solutions_found = search_stats.solutions_found;
                stats.max_depth_reached = search_stats.max_depth_reached;
                match outcome {
                    SearchOutcome::Solved { grid, unique } => (grid, SolveStatus::Solved, unique),
                    SearchOutcome::MultipleSolutions { grid } => (grid, SolveStatus::MultipleSolutions, Some(false)),
                    SearchOutcome::Exhausted => (grid, SolveStatus::SearchExhausted, None),
                    SearchOutcome::LimitExceeded => (grid, SolveStatus::SearchLimitExceeded, None),
                }
            }
        };
        SolveReport { grid, status, unique, stats }
    }
}

/// The runs actually present in a fully known line, or `None` while any
/// square is unknown.
fn runs_of(line: &[SquareStatus]) -> Option<Vec<Run>> {
    let mut runs = Vec::<Run>::new();
    let mut previous: Option<Color> = None;
    for status in line {
        match *status {
            SquareStatus::Unknown     => return None,
            SquareStatus::CrossedOut  => previous = None,
            SquareStatus::FilledIn(c) => {
                match runs.last_mut() {
                    Some(run) if previous == Some(c) => run.length += 1,
                    _                                => runs.push(Run::new(c, 1)),
                }
                previous = Some(c);
            }
        }
    }
    Some(runs)
}

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum SolveStatus {
    Solved,
    Contradiction { direction: Direction, index: usize },
    Stalled,
    SearchExhausted,
    MultipleSolutions,
    SearchLimitExceeded,
}
impl SolveStatus {
    pub fn is_solved(&self) -> bool {
        *self == SolveStatus::Solved
    }
}
impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SolveStatus::Solved                         => write!(f, "solved"),
            SolveStatus::Contradiction { direction, index }
                => write!(f, "contradiction in {} {}", direction.line_name(), index),
            SolveStatus::Stalled                        => write!(f, "stalled: line logic is insufficient"),
            SolveStatus::SearchExhausted                => write!(f, "no solution: search space exhausted"),
            SolveStatus::MultipleSolutions              => write!(f, "multiple solutions"),
            SolveStatus::SearchLimitExceeded            => write!(f, "search limit exceeded"),
        }
    }
}

#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub struct SolveStats {
    pub line_solves: usize,
    pub cache_hits: usize,
    pub search_nodes: usize,
    pub solutions_found: usize,
    pub max_depth_reached: usize,
}
impl fmt::Display for SolveStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} line solves ({} cached), {} search nodes, {} solution(s), max depth {}",
            self.line_solves, self.cache_hits, self.search_nodes, self.solutions_found, self.max_depth_reached)
    }
}

/// Outcome of [`Puzzle::solve`]. For `MultipleSolutions` the grid is one of
/// the solutions found; for the other unsolved statuses it holds whatever
/// line logic settled.
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub grid: Grid,
    pub status: SolveStatus,
    /// Whether the solution is known to be the only one; `None` if that was
    /// not established.
    pub unique: Option<bool>,
    pub stats: SolveStats,
}

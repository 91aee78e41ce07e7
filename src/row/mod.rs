// vim: set ai et ts=4 sw=4 sts=4:
mod solver;

use std::fmt;
use thiserror::Error;

use super::util::Direction;
use super::grid::{Color, SquareStatus};

pub use self::solver::{solve_line, run_bounds, RunBounds, LineContradiction};

/// One contiguous block of squares of a single colour required by a clue.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub struct Run {
    pub color: Color,
    pub length: usize,
}
impl Run {
    pub fn new(color: Color, length: usize) -> Self {
        Run { color, length }
    }
    /// Whether a square with the given status may be covered by this run.
    pub fn accepts(&self, status: SquareStatus) -> bool {
        match status {
            SquareStatus::Unknown     => true,
            SquareStatus::FilledIn(c) => c == self.color,
            SquareStatus::CrossedOut  => false,
        }
    }
}
impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.length.to_string())
    }
}

/// The ordered runs required for a single row or column.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Default)]
pub struct Clue {
    runs: Vec<Run>,
}
impl Clue {
    pub fn new(runs: Vec<Run>) -> Self {
        Clue { runs }
    }
    /// Shorthand for a clue whose runs all share one colour.
    pub fn uniform(color: Color, lengths: &[usize]) -> Self {
        Clue::new(lengths.iter().map(|&len| Run::new(color, len)).collect())
    }

    pub fn runs(&self) -> &[Run] { &self.runs }
    pub fn len(&self) -> usize { self.runs.len() }
    pub fn is_empty(&self) -> bool { self.runs.is_empty() }

    /// Number of mandatory crossed-out squares following run `i`: adjacent runs
    /// of the same colour must be separated, differently coloured ones may touch.
    pub fn gap_after(&self, i: usize) -> usize {
        match self.runs.get(i+1) {
            Some(next) if next.color == self.runs[i].color => 1,
            _                                               => 0,
        }
    }

    /// Saturates at `usize::MAX` when the run lengths don't fit in a `usize`.
    pub fn min_length(&self) -> usize {
        (0..self.runs.len()).try_fold(0usize, |acc, i| {
                                acc.checked_add(self.runs[i].length)?
                                   .checked_add(self.gap_after(i))
                            })
                            .unwrap_or(usize::MAX)
    }

    /// Checks that the runs fit in a line of the given length; on failure,
    /// returns the minimum length they need.
    pub fn check_fits(&self, line_length: usize) -> Result<(), usize> {
        let min_length = self.min_length();
        match min_length <= line_length {
            true  => Ok(()),
            false => Err(min_length),
        }
    }

    pub fn has_color(&self, color: Color) -> bool {
        self.runs.iter().any(|run| run.color == color)
    }
    /// Distinct colours used by this clue, in ascending order.
    pub fn colors(&self) -> Vec<Color> {
        let mut colors = self.runs.iter().map(|run| run.color).collect::<Vec<_>>();
        colors.sort();
        colors.dedup();
        colors
    }
}
impl fmt::Display for Clue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parts = self.runs.iter().map(|run| run.to_string()).collect::<Vec<_>>();
        write!(f, "[{}]", parts.join(" "))
    }
}

#[derive(Error, PartialEq, Debug)]
pub enum InvalidClue {
    #[error("invalid clue {clue} for {} {index}: needs at least {min_length} squares, line has {line_length}",
            .direction.line_name())]
    TooLong {
        direction: Direction,
        index: usize,
        clue: Clue,
        min_length: usize,
        line_length: usize,
    },
    #[error("invalid clue {clue} for {} {index}: run {run} has length 0", .direction.line_name())]
    EmptyRun {
        direction: Direction,
        index: usize,
        clue: Clue,
        run: usize,
    },
}
impl InvalidClue {
    pub fn direction(&self) -> Direction {
        match self {
            InvalidClue::TooLong { direction, .. } | InvalidClue::EmptyRun { direction, .. } => *direction,
        }
    }
    pub fn index(&self) -> usize {
        match self {
            InvalidClue::TooLong { index, .. } | InvalidClue::EmptyRun { index, .. } => *index,
        }
    }
}

/// A row or column of the puzzle together with its clue.
#[derive(Debug, Clone)]
pub struct Row {
    pub direction:  Direction,
    pub index:      usize,
    pub length:     usize,
    pub clue:       Clue,
}

impl Row {
    pub fn new(direction: Direction,
               index: usize,
               length: usize,
               clue: Clue) -> Result<Self, InvalidClue>
    {
        if let Some(run) = clue.runs().iter().position(|run| run.length == 0) {
            return Err(InvalidClue::EmptyRun { direction, index, clue, run });
        }
        if let Err(min_length) = clue.check_fits(length) {
            return Err(InvalidClue::TooLong { direction, index, clue, min_length, line_length: length });
        }
        Ok(Row {
            direction,
            index,
            length,
            clue,
        })
    }

    pub fn solve(&self, line: &[SquareStatus]) -> Result<Vec<SquareStatus>, LineContradiction> {
        debug_assert_eq!(line.len(), self.length);
        solve_line(&self.clue, line)
    }
}
impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.direction.line_name(), self.index, self.clue)
    }
}

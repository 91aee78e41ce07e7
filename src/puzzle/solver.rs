// vim: set ai et ts=4 sts=4 sw=4:
use std::collections::{HashMap, HashSet, VecDeque};
use log::{debug, trace};
use thiserror::Error;

use super::Puzzle;
use super::super::config::SolverConfig;
use super::super::grid::{Grid, Changes, SquareStatus};
use super::super::row::{Row, LineContradiction};
use super::super::util::Direction::{self, *};

/// A line whose clue cannot be reconciled with the squares known so far.
#[derive(Error, PartialEq, Eq, Copy, Clone, Debug)]
#[error("contradiction in {} {index}: {cause}", .direction.line_name())]
pub struct Contradiction {
    pub direction: Direction,
    pub index: usize,
    pub cause: LineContradiction,
}

/// Terminal state of one propagation run.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Propagation {
    /// Every square is known and every line agrees with its clue.
    Solved,
    Contradiction(Contradiction),
    /// Fixpoint reached with unknown squares left.
    Stalled,
    /// The line-solve budget ran out before a fixpoint was reached.
    LimitReached,
}

type LineKey = (Direction, usize, Vec<SquareStatus>);

/// Memoized line solves, keyed by line identity and line state. Owned by a
/// single solve call; never shared between puzzles.
#[derive(Debug, Default)]
pub struct LineCache {
    entries: HashMap<LineKey, Result<Vec<SquareStatus>, LineContradiction>>,
    capacity: usize,
    hits: usize,
}
impl LineCache {
    pub fn with_capacity(capacity: usize) -> Self {
        LineCache {
            entries: HashMap::new(),
            capacity,
            hits: 0,
        }
    }
    pub fn hits(&self) -> usize { self.hits }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn solve(&mut self, row: &Row, line: Vec<SquareStatus>)
        -> Result<Vec<SquareStatus>, LineContradiction>
    {
        if self.capacity == 0 {
            return row.solve(&line);
        }
        let key = (row.direction, row.index, line);
        if let Some(result) = self.entries.get(&key) {
            trace!("cache hit for {}", row);
            self.hits += 1;
            return result.clone();
        }
        let result = row.solve(&key.2);
        if self.entries.len() >= self.capacity {
            self.entries.clear();
        }
        self.entries.insert(key, result.clone());
        result
    }
}

/// Grid propagation loop: repeatedly solves dirty lines until a fixpoint.
///
/// Iterating yields one line solve at a time, as `(direction, index, changes)`;
/// a contradiction is yielded once and ends the iteration.
pub struct Solver<'p> {
    puzzle: &'p Puzzle,
    pub grid: Grid,
    queue: VecDeque<(Direction, usize)>,
    queued: HashSet<(Direction, usize)>,
    cache: LineCache,
    max_line_solves: usize,
    pub iterations: usize,
    halted: bool,
    contradiction: Option<Contradiction>,
}

impl<'p> Solver<'p> {
    /// Starts propagation on `grid` with every row and column dirty.
    pub fn new(puzzle: &'p Puzzle, grid: Grid, config: &SolverConfig) -> Self {
        let cache = LineCache::with_capacity(config.line_cache_capacity);
        let mut solver = Self::resume(puzzle, grid, config, cache);
        for y in 0..puzzle.height() {
            solver.mark_dirty(Horizontal, y);
        }
        for x in 0..puzzle.width() {
            solver.mark_dirty(Vertical, x);
        }
        solver
    }

    /// Continues from a grid already at a fixpoint; only lines marked dirty
    /// afterwards are solved.
    pub fn resume(puzzle: &'p Puzzle, grid: Grid, config: &SolverConfig, cache: LineCache) -> Self {
        Solver {
            puzzle,
            grid,
            queue: VecDeque::new(),
            queued: HashSet::new(),
            cache,
            max_line_solves: config.max_line_solves,
            iterations: 0,
            halted: false,
            contradiction: None,
        }
    }

    pub fn mark_dirty(&mut self, direction: Direction, index: usize) {
        if self.queued.insert((direction, index)) {
            self.queue.push_back((direction, index));
        }
    }

    /// Fixes a single unknown square and marks the row and column through it dirty.
    pub fn guess(&mut self, x: usize, y: usize, status: SquareStatus) -> Result<(), Contradiction> {
        if self.grid.get_square_mut(x, y).set_status(status).is_err() {
            // only unknown squares are guessed; a known one can't take another value
            return Err(self.halt(Horizontal, y, LineContradiction::Unsatisfiable));
        }
        self.mark_dirty(Horizontal, y);
        self.mark_dirty(Vertical, x);
        Ok(())
    }

    pub fn cache_hits(&self) -> usize { self.cache.hits() }

    pub fn into_parts(self) -> (Grid, LineCache) {
        (self.grid, self.cache)
    }

    fn halt(&mut self, direction: Direction, index: usize, cause: LineContradiction) -> Contradiction {
        let contradiction = Contradiction { direction, index, cause };
        self.halted = true;
        self.contradiction = Some(contradiction);
        contradiction
    }

    fn solve_row(&mut self, direction: Direction, index: usize)
        -> Result<Changes, LineContradiction>
    {
        let puzzle = self.puzzle;
        let row = puzzle.row(direction, index);
        let line = self.grid.line(direction, index);
        let solved = self.cache.solve(row, line)?;
        // the line solver never changes a known square, so this can only fail
        // if the grid and the line disagree
        self.grid.apply_line(direction, index, &solved)
                 .map_err(|_| LineContradiction::Unsatisfiable)
    }

    /// Runs to completion and reports how propagation ended.
    pub fn run(&mut self) -> Propagation {
        while self.next().is_some() {}

        if let Some(contradiction) = self.contradiction {
            return Propagation::Contradiction(contradiction);
        }
        if !self.queue.is_empty() {
            return Propagation::LimitReached;
        }
        match self.grid.is_complete() {
            true  => Propagation::Solved,
            false => Propagation::Stalled,
        }
    }
}

impl<'p> Iterator for Solver<'p> {
    type Item = Result<(Direction, usize, Changes), Contradiction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted || self.iterations >= self.max_line_solves {
            return None;
        }
        let (direction, index) = self.queue.pop_front()?;
        self.queued.remove(&(direction, index));
        self.iterations += 1;

        match self.solve_row(direction, index) {
            Err(cause) => {
                debug!("{} {}: {}", direction.line_name(), index, cause);
                Some(Err(self.halt(direction, index, cause)))
            }
            Ok(changes) => {
                if !changes.is_empty() {
                    debug!("{} {}: {} square(s) settled", direction.line_name(), index, changes.len());
                }
                for change in &changes {
                    trace!("{}", change);
                    let crossing = match direction {
                        Horizontal => change.col,
                        Vertical   => change.row,
                    };
                    self.mark_dirty(direction.perpendicular(), crossing);
                }
                Some(Ok((direction, index, changes)))
            }
        }
    }
}

// vim: set ai et ts=4 sts=4 sw=4:
//! Backtracking search over puzzles that line logic alone cannot finish.
//!
//! Every branch owns its own grid copy; a guess never touches the parent's
//! grid. Pending branches live on a shared LIFO worklist, so a single worker
//! explores them depth-first in candidate order.
use std::mem;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use log::{debug, info, trace, warn};

use super::Puzzle;
use super::solver::{LineCache, Propagation, Solver};
use super::super::config::{SearchMode, SolverConfig};
use super::super::grid::{Grid, SquareStatus};
use super::super::util::Direction::*;

/// Shared flag that asks a running search to stop at the next branch boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(PartialEq, Clone, Debug)]
pub enum SearchOutcome {
    /// `unique` is `Some(true)` only when the whole search space was explored.
    Solved { grid: Grid, unique: Option<bool> },
    /// Carries the first solution found.
    MultipleSolutions { grid: Grid },
    /// No branch leads to a solution.
    Exhausted,
    /// A node or depth limit was hit, or the search was cancelled, before any
    /// solution turned up.
    LimitExceeded,
}

#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub struct SearchStats {
    pub nodes: usize,
    pub line_solves: usize,
    pub cache_hits: usize,
    pub solutions_found: usize,
    pub max_depth_reached: usize,
}

/// Values worth trying for the square at (x, y): every colour both its row
/// and its column clue use, in ascending order, then crossed out.
pub fn candidates(puzzle: &Puzzle, x: usize, y: usize) -> Vec<SquareStatus> {
    let col_clue = &puzzle.row(Vertical, x).clue;
    puzzle.row(Horizontal, y).clue
          .colors()
          .into_iter()
          .filter(|&c| col_clue.has_color(c))
          .map(SquareStatus::FilledIn)
          .chain(Some(SquareStatus::CrossedOut))
          .collect()
}

/// The unknown square with the fewest candidates; ties go to the first one in
/// row-major order.
fn choose_square(puzzle: &Puzzle, grid: &Grid) -> Option<(usize, usize, Vec<SquareStatus>)> {
    (0..grid.height())
        .flat_map(|y| (0..grid.width()).map(move |x| (x, y)))
        .filter(|&(x, y)| grid.status(x, y) == SquareStatus::Unknown)
        .map(|(x, y)| (x, y, candidates(puzzle, x, y)))
        .min_by_key(|(_, _, cands)| cands.len())
}

struct BranchTask {
    grid: Grid,
    guess: (usize, usize, SquareStatus),
    depth: usize,
}

struct Worklist {
    tasks: Vec<BranchTask>,
    in_flight: usize,
}

struct Search<'p> {
    puzzle: &'p Puzzle,
    config: &'p SolverConfig,
    cancel: &'p CancelToken,
    worklist: Mutex<Worklist>,
    wakeup: Condvar,
    stopped: AtomicBool,
    limit_hit: AtomicBool,
    nodes: AtomicUsize,
    line_solves: AtomicUsize,
    cache_hits: AtomicUsize,
    max_depth_reached: AtomicUsize,
    solutions: Mutex<Vec<Grid>>,
}

impl<'p> Search<'p> {
    fn lock_worklist(&self) -> MutexGuard<Worklist> {
        self.worklist.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst) || self.cancel.is_cancelled()
    }

    fn stop(&self) {
        let _list = self.lock_worklist();
        self.stopped.store(true, Ordering::SeqCst);
        self.wakeup.notify_all();
    }

    fn hit_limit(&self) {
        self.limit_hit.store(true, Ordering::SeqCst);
    }

    fn solution_limit(&self) -> usize {
        match self.config.search.mode {
            SearchMode::FirstSolution => 1,
            SearchMode::VerifyUnique  => 2,
        }
    }

    /// Child branches of a stalled grid, one per candidate of the chosen square.
    fn expand(&self, grid: Grid, depth: usize) -> Vec<BranchTask> {
        if depth >= self.config.search.max_depth {
            debug!("Depth limit {} reached, not branching further", self.config.search.max_depth);
            self.hit_limit();
            return vec![];
        }
        let (x, y, cands) = match choose_square(self.puzzle, &grid) {
            Some(choice) => choice,
            None         => return vec![],
        };
        trace!("Branching on (col={}, row={}) with {} candidate(s)", x, y, cands.len());
        cands.into_iter()
             .map(|status| BranchTask { grid: grid.clone(), guess: (x, y, status), depth: depth + 1 })
             .collect()
    }

    fn record_solution(&self, grid: Grid) {
        let mut solutions = self.solutions.lock().unwrap_or_else(PoisonError::into_inner);
        if solutions.len() >= self.solution_limit() {
            return;
        }
        solutions.push(grid);
        info!("Found solution #{}", solutions.len());
        if solutions.len() >= self.solution_limit() {
            drop(solutions);
            self.stop();
        }
    }

    /// Applies a branch's guess, propagates, and returns the branches below it.
    fn explore(&self, task: BranchTask, cache: &mut LineCache) -> Vec<BranchTask> {
        if self.nodes.fetch_add(1, Ordering::SeqCst) >= self.config.search.max_nodes {
            debug!("Node limit {} reached", self.config.search.max_nodes);
            self.hit_limit();
            self.stop();
            return vec![];
        }
        self.max_depth_reached.fetch_max(task.depth, Ordering::SeqCst);

        let (x, y, status) = task.guess;
        debug!("Depth {}: guessing {} at (col={}, row={})", task.depth, status, x, y);
        let mut solver = Solver::resume(self.puzzle, task.grid, self.config, mem::take(cache));
        let propagation = match solver.guess(x, y, status) {
            Err(contradiction) => Propagation::Contradiction(contradiction),
            Ok(())             => solver.run(),
        };
        self.line_solves.fetch_add(solver.iterations, Ordering::SeqCst);
        let (grid, used_cache) = solver.into_parts();
        *cache = used_cache;

        match propagation {
            Propagation::Contradiction(c) => {
                trace!("Pruned: {}", c);
                vec![]
            }
            Propagation::LimitReached => {
                self.hit_limit();
                vec![]
            }
            Propagation::Solved  => {
                self.record_solution(grid);
                vec![]
            }
            Propagation::Stalled => self.expand(grid, task.depth),
        }
    }

    fn work(&self, worker: usize) {
        let mut cache = LineCache::with_capacity(self.config.line_cache_capacity);
        loop {
            let task = {
                let mut list = self.lock_worklist();
                loop {
                    if self.is_stopped() {
                        break None;
                    }
                    if let Some(task) = list.tasks.pop() {
                        list.in_flight += 1;
                        break Some(task);
                    }
                    if list.in_flight == 0 {
                        break None;
                    }
                    list = self.wakeup.wait(list).unwrap_or_else(PoisonError::into_inner);
                }
            };
            let task = match task {
                Some(task) => task,
                None       => break,
            };
            let children = self.explore(task, &mut cache);
            {
                let mut list = self.lock_worklist();
                list.tasks.extend(children.into_iter().rev());
                list.in_flight -= 1;
            }
            self.wakeup.notify_all();
        }
        trace!("Search worker {} done", worker);
        self.cache_hits.fetch_add(cache.hits(), Ordering::SeqCst);
    }
}

/// Searches for solutions below `grid`, which must be a stalled propagation
/// fixpoint. `grid` itself is left untouched.
pub fn search(puzzle: &Puzzle, grid: &Grid, config: &SolverConfig, cancel: &CancelToken)
    -> (SearchOutcome, SearchStats)
{
    let threads = config.search.threads.max(1);
    info!("Searching in {} mode with {} thread(s)", config.search.mode, threads);

    let search = Search {
        puzzle,
        config,
        cancel,
        worklist: Mutex::new(Worklist { tasks: vec![], in_flight: 0 }),
        wakeup: Condvar::new(),
        stopped: AtomicBool::new(false),
        limit_hit: AtomicBool::new(false),
        nodes: AtomicUsize::new(0),
        line_solves: AtomicUsize::new(0),
        cache_hits: AtomicUsize::new(0),
        max_depth_reached: AtomicUsize::new(0),
        solutions: Mutex::new(vec![]),
    };
    let roots = search.expand(grid.clone(), 0);
    search.lock_worklist().tasks.extend(roots.into_iter().rev());

    thread::scope(|scope| {
        let search = &search;
        for worker in 1..threads {
            scope.spawn(move || search.work(worker));
        }
        search.work(0);
    });

    let complete = !search.limit_hit.load(Ordering::SeqCst) && !cancel.is_cancelled();
    let mut solutions = search.solutions.into_inner().unwrap_or_else(PoisonError::into_inner);
    let stats = SearchStats {
        nodes: search.nodes.load(Ordering::SeqCst).min(config.search.max_nodes),
        line_solves: search.line_solves.load(Ordering::SeqCst),
        cache_hits: search.cache_hits.load(Ordering::SeqCst),
        solutions_found: solutions.len(),
        max_depth_reached: search.max_depth_reached.load(Ordering::SeqCst),
    };
    debug!("Search finished after {} node(s)", stats.nodes);

    let outcome = match (solutions.len(), config.search.mode) {
        (0, _) => match complete {
            true  => SearchOutcome::Exhausted,
            false => SearchOutcome::LimitExceeded,
        },
        (1, SearchMode::VerifyUnique) => {
            let unique = match complete {
                true  => Some(true),
                false => {
                    warn!("Search stopped early; the solution found may not be unique");
                    None
                }
            };
            SearchOutcome::Solved { grid: solutions.remove(0), unique }
        }
        (_, SearchMode::FirstSolution) => SearchOutcome::Solved { grid: solutions.remove(0), unique: None },
        (_, SearchMode::VerifyUnique)  => SearchOutcome::MultipleSolutions { grid: solutions.remove(0) },
    };
    (outcome, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::super::grid::Color;
    use super::super::super::row::{Clue, Run};

    const B: Color = Color(0);
    const R: Color = Color(1);

    fn config(mode: SearchMode) -> SolverConfig {
        let mut config = SolverConfig::default();
        config.search.enabled = true;
        config.search.mode = mode;
        config
    }

    fn stalled_grid(puzzle: &Puzzle) -> Grid {
        let mut solver = Solver::new(puzzle, puzzle.initial_grid(), &SolverConfig::default());
        assert_eq!(solver.run(), Propagation::Stalled);
        solver.into_parts().0
    }

    fn uniform(rows: &[&[usize]], cols: &[&[usize]]) -> Puzzle {
        Puzzle::new(rows.iter().map(|r| Clue::uniform(B, r)).collect(),
                    cols.iter().map(|c| Clue::uniform(B, c)).collect()).unwrap()
    }

    /// ...
    /// ..r
    /// rb.
    fn two_color_puzzle() -> Puzzle {
        let r1 = || Run::new(R, 1);
        let b1 = || Run::new(B, 1);
        Puzzle::new(vec![Clue::default(), Clue::new(vec![r1()]), Clue::new(vec![r1(), b1()])],
                    vec![Clue::new(vec![r1()]), Clue::new(vec![b1()]), Clue::new(vec![r1()])]).unwrap()
    }

    #[test]
    fn candidates_are_shared_colors_then_crossed_out() {
        let puzzle = two_color_puzzle();
        assert_eq!(candidates(&puzzle, 1, 1), vec![SquareStatus::CrossedOut]);
        assert_eq!(candidates(&puzzle, 0, 2), vec![SquareStatus::FilledIn(R), SquareStatus::CrossedOut]);
    }

    #[test]
    fn unique_solution_is_verified() {
        let puzzle = two_color_puzzle();
        let root = stalled_grid(&puzzle);
        let unknown_before = root.unknown_count();

        let (outcome, stats) = search(&puzzle, &root, &config(SearchMode::VerifyUnique), &CancelToken::new());
        match outcome {
            SearchOutcome::Solved { grid, unique } => {
                assert_eq!(unique, Some(true));
                assert_eq!(grid.status(2, 1), SquareStatus::FilledIn(R));
                assert_eq!(grid.status(0, 2), SquareStatus::FilledIn(R));
                assert_eq!(grid.status(1, 2), SquareStatus::FilledIn(B));
                assert_eq!(grid.status(2, 2), SquareStatus::CrossedOut);
                assert!(puzzle.is_solution(&grid));
            }
            other => panic!("expected a solution, got {:?}", other),
        }
        assert_eq!(stats.solutions_found, 1);
        assert!(stats.nodes >= 2);
        assert!(stats.max_depth_reached >= 1);
        // the caller's grid is never modified
        assert_eq!(root.unknown_count(), unknown_before);
    }

    #[test]
    fn second_solution_is_reported() {
        let puzzle = uniform(&[&[1], &[1]], &[&[1], &[1]]);
        let root = stalled_grid(&puzzle);
        let (outcome, stats) = search(&puzzle, &root, &config(SearchMode::VerifyUnique), &CancelToken::new());
        match outcome {
            SearchOutcome::MultipleSolutions { grid } => assert!(puzzle.is_solution(&grid)),
            other => panic!("expected multiple solutions, got {:?}", other),
        }
        assert_eq!(stats.solutions_found, 2);
    }

    #[test]
    fn first_solution_follows_candidate_order() {
        let puzzle = uniform(&[&[1], &[1]], &[&[1], &[1]]);
        let root = stalled_grid(&puzzle);
        for _ in 0..3 {
            let (outcome, stats) = search(&puzzle, &root, &config(SearchMode::FirstSolution), &CancelToken::new());
            match outcome {
                SearchOutcome::Solved { grid, unique } => {
                    assert_eq!(unique, None);
                    assert_eq!(grid.status(0, 0), SquareStatus::FilledIn(B));
                    assert_eq!(grid.status(1, 1), SquareStatus::FilledIn(B));
                }
                other => panic!("expected a solution, got {:?}", other),
            }
            assert_eq!(stats.nodes, 1);
        }
    }

    #[test]
    fn unsatisfiable_puzzle_is_exhausted() {
        // three columns need a square each, but only two rows have one
        let puzzle = uniform(&[&[1], &[1], &[]], &[&[1], &[1], &[1]]);
        let root = stalled_grid(&puzzle);
        let (outcome, stats) = search(&puzzle, &root, &config(SearchMode::FirstSolution), &CancelToken::new());
        assert_eq!(outcome, SearchOutcome::Exhausted);
        assert_eq!(stats.solutions_found, 0);
    }

    #[test]
    fn node_and_depth_limits_are_reported() {
        let puzzle = uniform(&[&[1], &[1]], &[&[1], &[1]]);
        let root = stalled_grid(&puzzle);

        let mut no_nodes = config(SearchMode::FirstSolution);
        no_nodes.search.max_nodes = 0;
        let (outcome, stats) = search(&puzzle, &root, &no_nodes, &CancelToken::new());
        assert_eq!(outcome, SearchOutcome::LimitExceeded);
        assert_eq!(stats.nodes, 0);

        let mut no_depth = config(SearchMode::FirstSolution);
        no_depth.search.max_depth = 0;
        let (outcome, _) = search(&puzzle, &root, &no_depth, &CancelToken::new());
        assert_eq!(outcome, SearchOutcome::LimitExceeded);
    }

    #[test]
    fn cancelled_search_stops_without_exploring() {
        let puzzle = uniform(&[&[1], &[1]], &[&[1], &[1]]);
        let root = stalled_grid(&puzzle);
        let cancel = CancelToken::new();
        cancel.cancel();
        let (outcome, stats) = search(&puzzle, &root, &config(SearchMode::FirstSolution), &cancel);
        assert_eq!(outcome, SearchOutcome::LimitExceeded);
        assert_eq!(stats.nodes, 0);
    }

    #[test]
    fn several_workers_agree_with_one() {
        let puzzle = two_color_puzzle();
        let root = stalled_grid(&puzzle);
        let mut config = config(SearchMode::VerifyUnique);
        config.search.threads = 4;
        let (outcome, _) = search(&puzzle, &root, &config, &CancelToken::new());
        match outcome {
            SearchOutcome::Solved { grid, unique } => {
                assert_eq!(unique, Some(true));
                assert!(puzzle.is_solution(&grid));
            }
            other => panic!("expected a solution, got {:?}", other),
        }

        let puzzle = uniform(&[&[1], &[1]], &[&[1], &[1]]);
        let root = stalled_grid(&puzzle);
        let (outcome, _) = search(&puzzle, &root, &config, &CancelToken::new());
        assert!(matches!(outcome, SearchOutcome::MultipleSolutions { .. }));
    }
}

// vim: set ai et ts=4 sts=4 sw=4:
use thiserror::Error;

use super::{Clue, Run};
use super::super::grid::SquareStatus::{self, CrossedOut, FilledIn, Unknown};

#[derive(Error, PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum LineContradiction {
    #[error("no placement of the runs is consistent with the known squares")]
    Unsatisfiable,
    #[error("run #{} has no position consistent with the known squares", .run + 1)]
    RunUnplaceable { run: usize },
}

/// Range of feasible start positions of a single run: every placement of the
/// clue that agrees with the known squares starts this run within
/// `min_start..=max_start`.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct RunBounds {
    pub min_start: usize,
    pub max_start: usize,
}

/// Reachability tables for one clue against one line.
///
/// `reachable[i][p]`: runs `0..i` can be placed left of `p` such that run `i`
/// may start at `p` (every filled square before `p` is covered, required gaps
/// are respected).
/// `completable[i][p]`: runs `i..` can be placed within `p..n` leaving no
/// filled square uncovered.
/// `fits[i][s]`: run `i` may cover `s..s+len` and, if the next run has the same
/// colour, the square right after it can be crossed out.
struct Placements<'a> {
    clue: &'a Clue,
    fits: Vec<Vec<bool>>,
    reachable: Vec<Vec<bool>>,
    completable: Vec<Vec<bool>>,
}

impl<'a> Placements<'a> {
    fn new(clue: &'a Clue, line: &[SquareStatus]) -> Self {
        let fits = clue.runs()
                       .iter()
                       .enumerate()
                       .map(|(i, run)| Self::_fits_at(run, clue.gap_after(i), line))
                       .collect::<Vec<_>>();
        let mut placements = Placements {
            clue,
            fits,
            reachable: Vec::new(),
            completable: Vec::new(),
        };
        placements.forward_pass(line);
        placements.backward_pass(line);
        placements
    }

    fn _fits_at(run: &Run, gap: usize, line: &[SquareStatus]) -> Vec<bool> {
        let n = line.len();
        // accepting[p]: number of consecutive squares from p onward that this run may cover
        let mut accepting = vec![0usize; n+1];
        for p in (0..n).rev() {
            if run.accepts(line[p]) {
                accepting[p] = accepting[p+1] + 1;
            }
        }
        (0..=n).map(|s| {
                    match s.checked_add(run.length) {
                        Some(end) if end < n || (end == n && gap == 0) => {
                            accepting[s] >= run.length
                                && (gap == 0 || !line[end].is_filled())
                        }
                        _ => false,
                    }
                })
               .collect()
    }

    fn step(&self, i: usize) -> usize {
        self.clue.runs()[i].length.saturating_add(self.clue.gap_after(i))
    }

    fn forward_pass(&mut self, line: &[SquareStatus]) {
        let n = line.len();
        let k = self.clue.len();
        let mut reachable = vec![vec![false; n+1]; k+1];

        // before the first run, only crossed-out or unknown squares may be skipped
        reachable[0][0] = true;
        for p in 1..=n {
            reachable[0][p] = reachable[0][p-1] && !line[p-1].is_filled();
        }
        for i in 0..k {
            let step = self.step(i);
            for p in 0..=n {
                let placed = p >= step && reachable[i][p-step] && self.fits[i][p-step];
                let skipped = p >= 1 && reachable[i+1][p-1] && !line[p-1].is_filled();
                reachable[i+1][p] = placed || skipped;
            }
        }
        self.reachable = reachable;
    }

    fn backward_pass(&mut self, line: &[SquareStatus]) {
        let n = line.len();
        let k = self.clue.len();
        let mut completable = vec![vec![false; n+1]; k+1];

        completable[k][n] = true;
        for p in (0..n).rev() {
            completable[k][p] = completable[k][p+1] && !line[p].is_filled();
        }
        for i in (0..k).rev() {
            let step = self.step(i);
            for p in (0..=n).rev() {
                // fits[i][p] guarantees p + step <= n
                let placed = self.fits[i][p] && completable[i+1][p+step];
                let skipped = p < n && !line[p].is_filled() && completable[i][p+1];
                completable[i][p] = placed || skipped;
            }
        }
        self.completable = completable;
    }

    fn is_satisfiable(&self) -> bool {
        self.completable[0][0]
    }

    fn can_start_at(&self, i: usize, s: usize) -> bool {
        self.reachable[i][s] && self.fits[i][s] && self.completable[i+1][s + self.step(i)]
    }

    fn bounds(&self, i: usize, n: usize) -> Option<RunBounds> {
        let min_start = (0..n).find(|&s| self.can_start_at(i, s))?;
        let max_start = (min_start..n).rev().find(|&s| self.can_start_at(i, s))?;
        Some(RunBounds { min_start, max_start })
    }
}

/// Computes the feasible start range of every run in the clue, given the
/// known squares of the line.
pub fn run_bounds(clue: &Clue, line: &[SquareStatus]) -> Result<Vec<RunBounds>, LineContradiction> {
    let placements = Placements::new(clue, line);
    if !placements.is_satisfiable() {
        return Err(LineContradiction::Unsatisfiable);
    }
    (0..clue.len()).map(|i| placements.bounds(i, line.len())
                                      .ok_or(LineContradiction::RunUnplaceable { run: i }))
                   .collect()
}

/// Derives every square the overlap technique can settle for one line.
///
/// Squares covered by all placements of a run within its bounds are filled in
/// with the run's colour; squares no run can reach are crossed out. Known
/// squares are never changed, and solving the output again yields the same
/// output.
pub fn solve_line(clue: &Clue, line: &[SquareStatus]) -> Result<Vec<SquareStatus>, LineContradiction> {
    let bounds = run_bounds(clue, line)?;
    let mut result = line.to_vec();
    let mut reachable = vec![false; line.len()];

    for (run, b) in clue.runs().iter().zip(bounds.iter()) {
        if b.max_start < b.min_start {
            return Err(LineContradiction::Unsatisfiable);
        }
        for flag in &mut reachable[b.min_start..b.max_start + run.length] {
            *flag = true;
        }
        // squares covered whether the run starts at min_start or at max_start
        let overlap_end = b.min_start + run.length;
        if b.max_start < overlap_end {
            for square in &mut result[b.max_start..overlap_end] {
                if *square == Unknown {
                    *square = FilledIn(run.color);
                }
            }
        }
    }
    for (square, &reached) in result.iter_mut().zip(reachable.iter()) {
        if !reached && *square == Unknown {
            *square = CrossedOut;
        }
    }
    Ok(result)
}

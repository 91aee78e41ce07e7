// vim: set ai et ts=4 sts=4 sw=4:
//! Solver for multi-colour nonograms ("griddlers").
//!
//! A [`puzzle::Puzzle`] holds one [`row::Clue`] per row and column. Solving
//! propagates per-line deductions to a fixpoint and, when enabled, falls back
//! to a backtracking search.
pub mod util;
pub mod grid;
pub mod row;
pub mod config;
pub mod puzzle;
pub mod ui;

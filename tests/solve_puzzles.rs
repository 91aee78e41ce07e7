// vim: set ai et ts=4 sts=4 sw=4:
use std::path::PathBuf;

use griddlers::config::{SearchMode, SolverConfig};
use griddlers::grid::{Color, Grid, SquareStatus};
use griddlers::puzzle::{LoadError, Puzzle, SolveStatus, load_document};
use griddlers::row::{solve_line, Clue, InvalidClue};
use griddlers::ui::Rendering;
use griddlers::util::Direction;

fn puzzle_path(name: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "puzzles", name].iter().collect()
}

/// One string per row, `#` filled (or the palette glyph), `.` crossed out.
fn picture(puzzle: &Puzzle, grid: &Grid) -> Vec<String> {
    grid.squares.iter()
        .map(|row| row.iter()
                      .map(|sq| match sq.get_status() {
                          SquareStatus::FilledIn(c) => puzzle.palette.glyph(c),
                          SquareStatus::CrossedOut  => '.',
                          SquareStatus::Unknown     => '?',
                      })
                      .collect())
        .collect()
}

fn search_config(mode: SearchMode) -> SolverConfig {
    let mut config = SolverConfig::default();
    config.search.enabled = true;
    config.search.mode = mode;
    config
}

#[test]
fn overlap_fills_both_runs_of_a_13_square_line() {
    let solved = solve_line(&Clue::uniform(Color(0), &[6, 6]), &[SquareStatus::Unknown; 13]).unwrap();
    let rendered = solved.iter()
                         .map(|s| match s {
                             SquareStatus::FilledIn(_) => '#',
                             SquareStatus::CrossedOut  => ' ',
                             SquareStatus::Unknown     => '.',
                         })
                         .collect::<String>();
    assert_eq!(rendered, "###### ######");
}

#[test]
fn clue_longer_than_its_line_fails_at_load() {
    match Puzzle::from_yaml_str("rows: [4, 1, 1]\ncols: [1, 1, 1]") {
        Err(LoadError::InvalidClue(InvalidClue::TooLong { direction, index, min_length, line_length, .. })) => {
            assert_eq!((direction, index), (Direction::Horizontal, 0));
            assert_eq!((min_length, line_length), (4, 3));
        }
        other => panic!("expected an invalid clue, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn large_puzzle_converges_without_search() {
    let puzzle = Puzzle::from_file(puzzle_path("mosaic13x15.yaml")).unwrap();
    assert_eq!((puzzle.width(), puzzle.height()), (15, 13));

    // search is enabled but must never be needed
    let report = puzzle.solve(&search_config(SearchMode::VerifyUnique));
    assert_eq!(report.status, SolveStatus::Solved);
    assert_eq!(report.unique, Some(true));
    assert_eq!(report.stats.search_nodes, 0);
    assert!(report.stats.line_solves >= 28);
    assert_eq!(picture(&puzzle, &report.grid), vec![
        "##.##########.#",
        "#..##.#.####.##",
        ".#####.#####..#",
        "##..#.##.###..#",
        ".#.###..#.#....",
        "##.#####.###.##",
        "#...###..######",
        "#####..##.#....",
        "###.###########",
        ".######..######",
        ".##.#####...###",
        ".#.##......####",
        "###..#...#####.",
    ]);
}

#[test]
fn sample_puzzle_is_solved_by_line_logic() {
    let puzzle = Puzzle::from_file(puzzle_path("sample10x10.yaml")).unwrap();
    let report = puzzle.solve(&SolverConfig::default());
    assert_eq!(report.status, SolveStatus::Solved);
    assert!(puzzle.is_solution(&report.grid));
    assert_eq!(picture(&puzzle, &report.grid), vec![
        ".#####....",
        "#....####.",
        "#.....#..#",
        "#.#...#..#",
        "#...#.#..#",
        "#.#.###..#",
        "#.#......#",
        "#.#......#",
        "###.####.#",
        "..###..###",
    ]);
}

#[test]
fn two_color_puzzle_needs_search() {
    let doc = load_document(puzzle_path("two_color3x3.yaml")).unwrap();
    let puzzle = Puzzle::from_yaml(&doc).unwrap();

    let report = puzzle.solve(&SolverConfig::default());
    assert_eq!(report.status, SolveStatus::Stalled);
    assert!(!report.grid.is_complete());

    let config = SolverConfig::default().merge_yaml(&doc["solver"]).unwrap();
    assert_eq!(config.search.mode, SearchMode::VerifyUnique);
    let report = puzzle.solve(&config);
    assert_eq!(report.status, SolveStatus::Solved);
    assert_eq!(report.unique, Some(true));
    assert_eq!(report.stats.solutions_found, 1);
    assert!(report.stats.search_nodes > 0);
    assert_eq!(picture(&puzzle, &report.grid), vec!["...", "..%", "%#."]);
}

#[test]
fn ambiguous_puzzle_reports_multiple_solutions() {
    let puzzle = Puzzle::from_file(puzzle_path("ambiguous2x2.yaml")).unwrap();
    let report = puzzle.solve(&search_config(SearchMode::VerifyUnique));
    assert_eq!(report.status, SolveStatus::MultipleSolutions);
    assert_eq!(report.unique, Some(false));
    assert!(puzzle.is_solution(&report.grid));

    let report = puzzle.solve(&search_config(SearchMode::FirstSolution));
    assert_eq!(report.status, SolveStatus::Solved);
    assert_eq!(picture(&puzzle, &report.grid), vec!["#.", ".#"]);
}

#[test]
fn unsolvable_and_bounded_searches_are_distinguished() {
    let puzzle = Puzzle::from_yaml_str("rows: [1, 1, 0]\ncols: [1, 1, 1]").unwrap();
    let report = puzzle.solve(&search_config(SearchMode::FirstSolution));
    assert_eq!(report.status, SolveStatus::SearchExhausted);

    let puzzle = Puzzle::from_file(puzzle_path("ambiguous2x2.yaml")).unwrap();
    let mut config = search_config(SearchMode::FirstSolution);
    config.search.max_nodes = 0;
    let report = puzzle.solve(&config);
    assert_eq!(report.status, SolveStatus::SearchLimitExceeded);
    assert_eq!(report.grid.unknown_count(), 4);
}

#[test]
fn inconsistent_clues_yield_a_contradiction() {
    let puzzle = Puzzle::from_yaml_str("rows: [3, ~]\ncols: [1, 1, ~]").unwrap();
    let report = puzzle.solve(&SolverConfig::default());
    assert_eq!(report.status, SolveStatus::Contradiction { direction: Direction::Vertical, index: 2 });
    assert_eq!(report.status.to_string(), "contradiction in col 2");
}

#[test]
fn solved_grid_renders_with_clues() {
    let puzzle = Puzzle::from_file(puzzle_path("sample10x10.yaml")).unwrap();
    let report = puzzle.solve(&SolverConfig::default());
    let text = Rendering::new(&puzzle, &report.grid).to_string();
    let lines = text.lines().collect::<Vec<_>>();
    // three header lines, two borders, ten rows and one subdivision line
    assert_eq!(lines.len(), 16);
    assert_eq!(lines[4], "      5 \u{2551}    #  #  #  # \u{2502} #             \u{2551}");
    assert!(!text.contains(" . "));
}

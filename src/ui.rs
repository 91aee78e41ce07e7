// vim: set ai et ts=4 sts=4 sw=4:
//! Text rendering of a puzzle and a (possibly partial) grid.
use std::fmt;
use ansi_term::{ANSIString, Colour, Style};

use super::grid::{Color, Grid, SquareStatus};
use super::puzzle::Puzzle;
use super::row::Run;
use super::util::{ralign, lalign_colored, maybe_color, ralign_joined_coloreds, visual_len};

/// Clues stacked above and to the left of a box-drawn grid.
pub struct Rendering<'a> {
    puzzle: &'a Puzzle,
    grid: &'a Grid,
    subdivision: Option<usize>, // draw a separator every N rows/cols
    emit_color: bool,
}

impl<'a> Rendering<'a> {
    pub fn new(puzzle: &'a Puzzle, grid: &'a Grid) -> Self {
        Rendering {
            puzzle,
            grid,
            subdivision: Some(5),
            emit_color: false,
        }
    }
    pub fn with_subdivision(mut self, subdivision: Option<usize>) -> Self {
        self.subdivision = subdivision.filter(|&n| n > 0);
        self
    }
    pub fn with_color(mut self, emit_color: bool) -> Self {
        self.emit_color = emit_color;
        self
    }

    fn style(&self, color: Color) -> Style {
        match self.puzzle.palette.swatch(color).and_then(|s| s.terminal) {
            Some(idx) => Colour::Fixed(idx).bold(),
            None      => Style::new(),
        }
    }

    fn run_token(&self, run: &Run) -> ANSIString<'static> {
        let text = match self.puzzle.palette.is_multicolor() {
            true  => format!("{}{}", run.length, self.puzzle.palette.glyph(run.color)),
            false => run.length.to_string(),
        };
        self.style(run.color).paint(text)
    }

    fn square_part(&self, status: SquareStatus) -> String {
        match status {
            SquareStatus::FilledIn(c) => {
                let glyph = self.style(c).paint(self.puzzle.palette.glyph(c).to_string());
                format!(" {} ", maybe_color(&glyph, self.emit_color))
            }
            SquareStatus::CrossedOut => String::from("   "),
            SquareStatus::Unknown    => String::from(" . "),
        }
    }

    fn _fmt_line(&self,
                 f: &mut fmt::Formatter,
                 prefix: &str,
                 left_delim: &str,
                 right_delim: &str,
                 columnwise_separator: &str,
                 content_parts: &[String]) -> fmt::Result
    {
        write!(f, "{} {}", prefix, left_delim)?;
        for (idx, s) in content_parts.iter().enumerate() {
            write!(f, "{}", s)?;
            if let Some(subdiv) = self.subdivision {
                if ((idx+1) % subdiv == 0) && (idx+1 < content_parts.len()) {
                    write!(f, "{}", columnwise_separator)?;
                }
            }
        }
        writeln!(f, "{}", right_delim)
    }

    fn _fmt_header(&self, f: &mut fmt::Formatter, line_idx: usize, prefix_len: usize) -> fmt::Result {
        let content_parts = self.puzzle.cols.iter()
            .map(|col| {
                let runs = col.clue.runs();
                match line_idx < runs.len() {
                    true  => format!(" {}", lalign_colored(&self.run_token(&runs[runs.len()-1-line_idx]), 2, self.emit_color)),
                    false => String::from("   "),
                }
            })
            .collect::<Vec<_>>();
        self._fmt_line(f, &ralign("", prefix_len), " ", " ", " ", &content_parts)
    }

    fn _fmt_border(&self, f: &mut fmt::Formatter, prefix_len: usize, fill: &str, delims: [&str; 3]) -> fmt::Result {
        let parts = (0..self.grid.width()).map(|_| fill.repeat(3))
                                          .collect::<Vec<_>>();
        self._fmt_line(f, &ralign("", prefix_len), delims[0], delims[1], delims[2], &parts)
    }
}

impl<'a> fmt::Display for Rendering<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let row_prefixes: Vec<Vec<ANSIString>> =
            self.puzzle.rows.iter()
                            .map(|row| row.clue.runs().iter()
                                                      .map(|run| self.run_token(run))
                                                      .collect())
                            .collect();
        let prefix_len = row_prefixes.iter()
                                     .map(|parts| parts.iter().map(visual_len).sum::<usize>()
                                                  + parts.len().saturating_sub(1))
                                     .max()
                                     .unwrap_or(0);
        let max_col_runs = self.puzzle.cols.iter()
                                           .map(|col| col.clue.len())
                                           .max()
                                           .unwrap_or(0);

        for i in (0..max_col_runs).rev() {
            self._fmt_header(f, i, prefix_len)?;
        }
        self._fmt_border(f, prefix_len, "\u{2550}", ["\u{2554}", "\u{2557}", "\u{2564}"])?;

        let height = self.grid.height();
        for y in 0..height {
            let parts = self.grid.squares[y].iter()
                                            .map(|sq| self.square_part(sq.get_status()))
                                            .collect::<Vec<_>>();
            self._fmt_line(f,
                           &ralign_joined_coloreds(&row_prefixes[y], prefix_len, self.emit_color),
                           "\u{2551}",
                           "\u{2551}",
                           "\u{2502}",
                           &parts)?;

            if let Some(subdiv) = self.subdivision {
                if (y+1) % subdiv == 0 && y+1 < height {
                    self._fmt_border(f, prefix_len, "\u{2500}", ["\u{255F}", "\u{2562}", "\u{253C}"])?;
                }
            }
        }
        self._fmt_border(f, prefix_len, "\u{2550}", ["\u{255A}", "\u{255D}", "\u{2567}"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::grid::{Palette, Swatch};
    use super::super::row::Clue;

    const B: Color = Color(0);

    fn diagonal() -> (Puzzle, Grid) {
        let puzzle = Puzzle::new(vec![Clue::uniform(B, &[1]); 2], vec![Clue::uniform(B, &[1]); 2]).unwrap();
        let mut grid = puzzle.initial_grid();
        grid.set_status(0, 0, SquareStatus::FilledIn(B)).unwrap();
        grid.set_status(1, 0, SquareStatus::CrossedOut).unwrap();
        grid.set_status(1, 1, SquareStatus::FilledIn(B)).unwrap();
        (puzzle, grid)
    }

    #[test]
    fn renders_clues_border_and_squares() {
        let (puzzle, grid) = diagonal();
        let text = Rendering::new(&puzzle, &grid).with_subdivision(None).to_string();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines, vec![
            "    1  1  ",
            "  \u{2554}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2557}",
            "1 \u{2551} #    \u{2551}",
            "1 \u{2551} .  # \u{2551}",
            "  \u{255A}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{255D}",
        ]);
    }

    #[test]
    fn subdivision_inserts_separators() {
        let (puzzle, grid) = diagonal();
        let text = Rendering::new(&puzzle, &grid).with_subdivision(Some(1)).to_string();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[2], "1 \u{2551} # \u{2502}   \u{2551}");
        assert_eq!(lines[3], "  \u{255F}\u{2500}\u{2500}\u{2500}\u{253C}\u{2500}\u{2500}\u{2500}\u{2562}");
    }

    #[test]
    fn multicolor_clues_show_glyphs_and_colors() {
        let palette = Palette::new(vec![
            Swatch { glyph: '#', terminal: None },
            Swatch { glyph: '%', terminal: Some(9) },
        ]);
        let puzzle = Puzzle::new(vec![Clue::new(vec![Run::new(Color(1), 2)])],
                                 vec![Clue::new(vec![Run::new(Color(1), 1)]); 2]).unwrap()
                                .with_palette(palette);
        let grid = puzzle.initial_grid();

        let plain = Rendering::new(&puzzle, &grid).to_string();
        assert!(plain.starts_with("     1% 1% \n"));
        assert!(plain.contains("2% \u{2551} .  . \u{2551}"));
        assert!(!plain.contains('\u{1b}'));

        let colored = Rendering::new(&puzzle, &grid).with_color(true).to_string();
        assert!(colored.contains(&Colour::Fixed(9).bold().paint("2%").to_string()));
    }
}

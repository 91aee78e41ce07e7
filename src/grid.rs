// vim: set ai et ts=4 sts=4:
use std::fmt;
use thiserror::Error;
use super::util::Direction;

pub trait HasGridLocation {
    fn get_row(&self) -> usize;
    fn get_col(&self) -> usize;
    fn fmt_location(&self) -> String {
        format!("(col={:-2}, row={:-2})", self.get_col(), self.get_row())
    }
}

/// Colour identity of a filled square. Display attributes live in the
/// puzzle's [`Palette`] and play no part in solving.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Debug)]
pub struct Color(pub u8);

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "color {}", self.0)
    }
}

#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum SquareStatus {
    FilledIn(Color),
    CrossedOut,
    Unknown,
}
impl SquareStatus {
    pub fn is_known(&self) -> bool {
        *self != SquareStatus::Unknown
    }
    pub fn is_filled(&self) -> bool {
        matches!(self, SquareStatus::FilledIn(_))
    }
}
impl fmt::Display for SquareStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SquareStatus::FilledIn(c) => write!(f, "FilledIn({})", c.0),
            SquareStatus::CrossedOut  => write!(f, "CrossedOut"),
            SquareStatus::Unknown     => write!(f, "Unknown"),
        }
    }
}

// ------------------------------------------------

#[derive(PartialEq, Debug, Clone)]
pub struct StatusChange {
    pub row: usize,
    pub col: usize,
    pub old: SquareStatus,
    pub new: SquareStatus,
}
impl StatusChange {
    pub fn new(row: usize, col: usize, old: SquareStatus, new: SquareStatus) -> Self {
        Self { row, col, old, new }
    }
}
impl HasGridLocation for StatusChange {
    fn get_row(&self) -> usize { self.row }
    fn get_col(&self) -> usize { self.col }
}
impl fmt::Display for StatusChange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Change: in square {}, status was changed from {} to {}",
            self.fmt_location(),
            self.old,
            self.new)
    }
}
pub type Changes = Vec<StatusChange>;

// ------------------------------------------------

#[derive(Error, PartialEq, Debug)]
pub enum StatusError {
    // new status conflicts with existing (non-unknown) status
    #[error("in {}, attempt to change status from {} to {} was rejected: {}",
            .0.fmt_location(), .0.old, .0.new, .1)]
    ChangeRejected(StatusChange, String),
}

pub type StatusResult = Result<Option<StatusChange>, StatusError>; // if it worked: the change, if any; if it didn't, the change that was rejected

#[derive(Error, PartialEq, Debug)]
pub enum Error {
    #[error(transparent)]
    Status(#[from] StatusError),
    #[error("square (col={x}, row={y}) lies outside the {width}x{height} grid")]
    OutOfBounds { x: usize, y: usize, width: usize, height: usize },
}

// ------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Square {
    row: usize,
    col: usize,
    status: SquareStatus,
}
impl Square {
    pub fn new(x: usize, y: usize) -> Square {
        Square {
            row: y,
            col: x,
            status: SquareStatus::Unknown,
        }
    }

    pub fn get_status(&self) -> SquareStatus { self.status }

    pub fn set_status(&mut self, new_status: SquareStatus) -> StatusResult {
        let cand_change = StatusChange::new(self.row, self.col, self.status, new_status);
        self.apply_status_change(cand_change)
    }

    pub fn apply_status_change(&mut self, cand_change: StatusChange)
        -> StatusResult
    {
        // a known square can't be changed anymore, and can never revert to unknown
        if self.status.is_known() && self.status != cand_change.new {
            return Err(StatusError::ChangeRejected(cand_change, "conflicting information".to_string()));
        }
        if self.status != cand_change.new {
            self.status = cand_change.new;
            return Ok(Some(cand_change));
        }
        Ok(None)
    }
}
impl HasGridLocation for Square {
    fn get_row(&self) -> usize { self.row }
    fn get_col(&self) -> usize { self.col }
}

// ------------------------------------------------

#[derive(Clone, PartialEq)]
pub struct Grid {
    width: usize,
    pub squares: Vec<Vec<Square>>,
}
impl Grid {
    pub fn new(width: usize, height: usize)
        -> Self
    {
        Grid {
            width,
            squares: (0..height).map(|y| (0..width).map(|x| Square::new(x, y))
                                                   .collect::<Vec<_>>())
                                .collect(),
        }
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.squares.len() }
    pub fn get_square_mut(&mut self, x: usize, y: usize) -> &mut Square {
        &mut self.squares[y][x]
    }
    pub fn status(&self, x: usize, y: usize) -> SquareStatus {
        self.squares[y][x].get_status()
    }

    /// Sets a single square, checking bounds first.
    pub fn set_status(&mut self, x: usize, y: usize, status: SquareStatus)
        -> Result<Option<StatusChange>, Error>
    {
        if x >= self.width() || y >= self.height() {
            return Err(Error::OutOfBounds { x, y, width: self.width(), height: self.height() });
        }
        Ok(self.get_square_mut(x, y).set_status(status)?)
    }

    pub fn line_length(&self, direction: Direction) -> usize {
        match direction {
            Direction::Horizontal => self.width(),
            Direction::Vertical   => self.height(),
        }
    }

    /// Snapshot of the statuses along one row or column.
    pub fn line(&self, direction: Direction, index: usize) -> Vec<SquareStatus> {
        (0..self.line_length(direction))
            .map(|at| {
                let (x, y) = direction.square_index(index, at);
                self.status(x, y)
            })
            .collect()
    }

    /// Writes a refined line back into the grid, returning the squares that changed.
    pub fn apply_line(&mut self, direction: Direction, index: usize, line: &[SquareStatus])
        -> Result<Changes, StatusError>
    {
        let mut changes = Changes::new();
        for (at, &status) in line.iter().enumerate() {
            if status == SquareStatus::Unknown {
                continue;
            }
            let (x, y) = direction.square_index(index, at);
            if let Some(change) = self.get_square_mut(x, y).set_status(status)? {
                changes.push(change);
            }
        }
        Ok(changes)
    }

    pub fn unknown_count(&self) -> usize {
        self.squares.iter()
                    .flat_map(|row| row.iter())
                    .filter(|sq| !sq.get_status().is_known())
                    .count()
    }
    pub fn is_complete(&self) -> bool {
        self.squares.iter()
                    .flat_map(|row| row.iter())
                    .all(|sq| sq.get_status().is_known())
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid(w={}, h={}, unknown={})", self.width(), self.height(), self.unknown_count())
    }
}

// ------------------------------------------------

/// Display attributes of one colour: the glyph used in puzzle files and
/// renderings, and an optional 256-colour terminal index.
#[derive(Clone, Debug, PartialEq)]
pub struct Swatch {
    pub glyph: char,
    pub terminal: Option<u8>,
}

/// Maps colour identities to their display attributes. `Color(i)` is the
/// i-th swatch; the first swatch is the default colour for unmarked runs.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    swatches: Vec<Swatch>,
}
impl Palette {
    pub fn new(swatches: Vec<Swatch>) -> Self {
        Palette { swatches }
    }
    pub fn len(&self) -> usize { self.swatches.len() }
    pub fn is_empty(&self) -> bool { self.swatches.is_empty() }
    pub fn is_multicolor(&self) -> bool { self.swatches.len() > 1 }
    pub fn default_color(&self) -> Color { Color(0) }

    pub fn swatch(&self, color: Color) -> Option<&Swatch> {
        self.swatches.get(color.0 as usize)
    }
    pub fn glyph(&self, color: Color) -> char {
        self.swatch(color).map(|s| s.glyph).unwrap_or('?')
    }
    pub fn color_for_glyph(&self, glyph: char) -> Option<Color> {
        self.swatches.iter()
                     .position(|s| s.glyph == glyph)
                     .map(|i| Color(i as u8))
    }
}
impl Default for Palette {
    fn default() -> Self {
        Palette::new(vec![Swatch { glyph: '#', terminal: None }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::SquareStatus::*;

    #[test]
    fn known_square_rejects_conflicting_status() {
        let mut square = Square::new(1, 2);
        let change = square.set_status(FilledIn(Color(0))).unwrap();
        assert_eq!(change, Some(StatusChange::new(2, 1, Unknown, FilledIn(Color(0)))));
        assert_eq!(square.set_status(FilledIn(Color(0))), Ok(None));
        assert!(square.set_status(FilledIn(Color(1))).is_err());
        assert!(square.set_status(CrossedOut).is_err());
        assert!(square.set_status(Unknown).is_err());
        assert_eq!(square.get_status(), FilledIn(Color(0)));
    }

    #[test]
    fn lines_read_and_write_along_direction() {
        let mut grid = Grid::new(3, 2);
        let col = vec![CrossedOut, FilledIn(Color(1))];
        let changes = grid.apply_line(Direction::Vertical, 2, &col).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1].get_row(), 1);
        assert_eq!(changes[1].get_col(), 2);
        assert_eq!(grid.line(Direction::Horizontal, 1), vec![Unknown, Unknown, FilledIn(Color(1))]);
        assert_eq!(grid.line(Direction::Vertical, 2), col);
        assert_eq!(grid.unknown_count(), 4);

        // unknown entries never overwrite anything
        let changes = grid.apply_line(Direction::Horizontal, 0, &[Unknown, Unknown, Unknown]).unwrap();
        assert!(changes.is_empty());
        assert_eq!(grid.status(2, 0), CrossedOut);
    }

    #[test]
    fn set_status_checks_bounds() {
        let mut grid = Grid::new(2, 2);
        assert_eq!(grid.set_status(2, 0, CrossedOut),
                   Err(Error::OutOfBounds { x: 2, y: 0, width: 2, height: 2 }));
        assert!(grid.set_status(1, 1, CrossedOut).unwrap().is_some());
        assert!(grid.set_status(1, 1, FilledIn(Color(0))).is_err());
    }

    #[test]
    fn palette_looks_up_glyphs() {
        let palette = Palette::new(vec![
            Swatch { glyph: '#', terminal: Some(15) },
            Swatch { glyph: '%', terminal: Some(9) },
        ]);
        assert_eq!(palette.color_for_glyph('%'), Some(Color(1)));
        assert_eq!(palette.color_for_glyph('x'), None);
        assert_eq!(palette.glyph(Color(0)), '#');
        assert!(palette.is_multicolor());
        assert!(!Palette::default().is_multicolor());
    }
}

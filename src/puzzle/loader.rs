// vim: set ai et ts=4 sw=4 sts=4:
use std::convert::TryFrom;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use yaml_rust::{Yaml, YamlLoader, ScanError};

use super::Puzzle;
use super::super::config::ConfigError;
use super::super::grid::{self, Color, Palette, SquareStatus, Swatch};
use super::super::row::{Clue, InvalidClue, Run};

/// Glyphs with a fixed meaning in puzzle files and renderings.
const RESERVED_GLYPHS: &[char] = &['x', '.', ' '];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io { path: String, #[source] source: io::Error },
    #[error("YAML syntax error: {0}")]
    Yaml(#[from] ScanError),
    #[error("puzzle document is empty")]
    Empty,
    #[error("malformed puzzle: {0}")]
    Malformed(String),
    #[error(transparent)]
    InvalidClue(#[from] InvalidClue),
    #[error("bad seed: {0}")]
    Seed(#[from] grid::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn malformed<S: Into<String>>(msg: S) -> LoadError {
    LoadError::Malformed(msg.into())
}

/// Parses the first YAML document in a string.
pub fn parse_document(s: &str) -> Result<Yaml, LoadError> {
    YamlLoader::load_from_str(s)?
        .into_iter()
        .next()
        .ok_or(LoadError::Empty)
}

/// Reads and parses the first YAML document in a file.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Yaml, LoadError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|source| LoadError::Io { path: path.display().to_string(), source })?;
    parse_document(&contents)
}

impl Puzzle {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Puzzle, LoadError> {
        Self::from_yaml(&load_document(path)?)
    }

    pub fn from_yaml_str(s: &str) -> Result<Puzzle, LoadError> {
        Self::from_yaml(&parse_document(s)?)
    }

    /// Builds a puzzle from a document with `rows`, `cols` and optional
    /// `colors` and `seeds` entries. Column clues are listed top to bottom.
    pub fn from_yaml(doc: &Yaml) -> Result<Puzzle, LoadError> {
        if doc.as_hash().is_none() {
            return Err(malformed("top level must be a mapping"));
        }
        let palette = Self::_parse_colors(&doc["colors"])?;
        let row_clues = Self::_parse_row(&doc["rows"], "rows", &palette)?;
        let col_clues = Self::_parse_row(&doc["cols"], "cols", &palette)?;

        let mut puzzle = Puzzle::new(row_clues, col_clues)?.with_palette(palette);
        Self::_apply_seeds(&mut puzzle, &doc["seeds"])?;
        Ok(puzzle)
    }

    fn _parse_colors(input: &Yaml) -> Result<Palette, LoadError> {
        let hash = match input {
            Yaml::BadValue   => return Ok(Palette::default()),
            Yaml::Hash(hash) => hash,
            _                => return Err(malformed("'colors' must map glyphs to terminal colours")),
        };
        if hash.len() > 256 {
            return Err(malformed("at most 256 colours are supported"));
        }
        let mut swatches = Vec::<Swatch>::new();
        for (key, value) in hash {
            let glyph = match key {
                Yaml::String(s) => {
                    let mut chars = s.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => c,
                        _ => return Err(malformed(format!("colour glyph must be a single character, got '{}'", s))),
                    }
                }
                _ => return Err(malformed(format!("colour glyph must be a single character, got {:?}", key))),
            };
            if RESERVED_GLYPHS.contains(&glyph) || glyph.is_ascii_digit() {
                return Err(malformed(format!("'{}' is reserved and cannot be a colour glyph", glyph)));
            }
            if swatches.iter().any(|s| s.glyph == glyph) {
                return Err(malformed(format!("colour glyph '{}' is defined twice", glyph)));
            }
            let terminal = match value {
                Yaml::Null       => None,
                Yaml::Integer(i) => Some(u8::try_from(*i).map_err(|_| {
                    malformed(format!("terminal colour for '{}' must be 0-255, got {}", glyph, i))
                })?),
                _ => return Err(malformed(format!("terminal colour for '{}' must be an integer", glyph))),
            };
            swatches.push(Swatch { glyph, terminal });
        }
        if swatches.is_empty() {
            return Ok(Palette::default());
        }
        Ok(Palette::new(swatches))
    }

    fn _parse_row(input: &Yaml, name: &str, palette: &Palette) -> Result<Vec<Clue>, LoadError> {
        let list = input.as_vec()
                        .ok_or_else(|| malformed(format!("'{}' must be a list", name)))?;
        list.iter()
            .enumerate()
            .map(|(i, yaml_val)| {
                Self::_parse_row_runs(yaml_val, palette)
                    .map_err(|msg| malformed(format!("{} entry {}: {}", name, i, msg)))
            })
            .collect()
    }

    fn _parse_row_runs(input: &Yaml, palette: &Palette) -> Result<Clue, String> {
        let default_color = palette.default_color();
        match input {
            Yaml::Null       => Ok(Clue::default()),
            Yaml::Integer(0) => Ok(Clue::default()),
            Yaml::Integer(i) => {
                let length = usize::try_from(*i).map_err(|_| format!("negative run length {}", i))?;
                Ok(Clue::new(vec![Run::new(default_color, length)]))
            }
            Yaml::String(s) => {
                if s.trim().is_empty() || s.trim() == "0" {
                    return Ok(Clue::default());
                }
                s.split_whitespace()
                 .map(|token| Self::_parse_run(token, palette))
                 .collect::<Result<Vec<_>, _>>()
                 .map(Clue::new)
            }
            _ => Err(format!("unexpected data type: {:?}", input)),
        }
    }

    /// Parses a run token: a length, optionally followed by a colour glyph.
    fn _parse_run(token: &str, palette: &Palette) -> Result<Run, String> {
        let digits_end = token.find(|c: char| !c.is_ascii_digit()).unwrap_or_else(|| token.len());
        let (digits, glyph) = token.split_at(digits_end);
        let length: usize = digits.parse()
                                  .map_err(|_| format!("bad run '{}': expected a length", token))?;
        if length == 0 {
            return Err(format!("bad run '{}': length must be positive", token));
        }
        let mut glyphs = glyph.chars();
        let color = match (glyphs.next(), glyphs.next()) {
            (None, _)        => palette.default_color(),
            (Some(g), None)  => Self::_lookup_glyph(palette, g)?,
            (Some(_), Some(_)) => return Err(format!("bad run '{}': expected a single colour glyph", token)),
        };
        Ok(Run::new(color, length))
    }

    fn _lookup_glyph(palette: &Palette, glyph: char) -> Result<Color, String> {
        palette.color_for_glyph(glyph)
               .ok_or_else(|| format!("unknown colour glyph '{}'", glyph))
    }

    fn _apply_seeds(puzzle: &mut Puzzle, input: &Yaml) -> Result<(), LoadError> {
        let list = match input {
            Yaml::BadValue | Yaml::Null => return Ok(()),
            Yaml::Array(list)           => list,
            _                           => return Err(malformed("'seeds' must be a list")),
        };
        for (i, entry) in list.iter().enumerate() {
            let text = entry.as_str()
                            .ok_or_else(|| malformed(format!("seed {} must be a string \"row col glyph\"", i)))?;
            let parts = text.split_whitespace().collect::<Vec<_>>();
            let (row, col, glyph) = match parts.as_slice() {
                [row, col, glyph] => (row, col, glyph),
                _ => return Err(malformed(format!("seed {} must be \"row col glyph\", got '{}'", i, text))),
            };
            let y: usize = row.parse().map_err(|_| malformed(format!("seed {}: bad row '{}'", i, row)))?;
            let x: usize = col.parse().map_err(|_| malformed(format!("seed {}: bad column '{}'", i, col)))?;
            let status = match *glyph {
                "x" => SquareStatus::CrossedOut,
                g   => {
                    let mut chars = g.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => SquareStatus::FilledIn(
                            Self::_lookup_glyph(&puzzle.palette, c).map_err(|msg| malformed(format!("seed {}: {}", i, msg)))?
                        ),
                        _ => return Err(malformed(format!("seed {}: bad glyph '{}'", i, g))),
                    }
                }
            };
            puzzle.seed(x, y, status)?;
        }
        Ok(())
    }
}

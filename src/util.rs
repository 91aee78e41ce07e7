// vim: set ai et ts=4 sw=4 sts=4:
use std::fmt;
use std::os::unix::io::AsRawFd;
use ansi_term::ANSIString;

pub fn maybe_color(s: &ANSIString, emit_color: bool) -> String {
    match emit_color {
        true  => s.to_string(),
        false => (**s).to_string(), // deref once to get ANSIString, once more to get underlying str
    }
}

/// Number of terminal columns taken up by `s`, not counting escape sequences.
pub fn visual_len(s: &ANSIString) -> usize {
    (**s).chars().count()
}

pub fn ralign(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        return String::from(s);
    }
    format!("{}{}", " ".repeat(width-len), s)
}
pub fn lalign_colored(s: &ANSIString, width: usize, emit_color: bool)
    -> String
{
    let len = visual_len(s);
    if len >= width {
        return maybe_color(s, emit_color);
    }
    format!("{}{}", maybe_color(s, emit_color), " ".repeat(width-len))
}
pub fn ralign_joined_coloreds(strs: &[ANSIString], width: usize, emit_color: bool)
    -> String
{
    let mut len: usize = strs.iter().map(visual_len).sum();
    len += strs.len().saturating_sub(1); // count the spaces that .join(" ") will add

    let joined_colored = strs.iter()
                             .map(|astr| maybe_color(astr, emit_color))
                             .collect::<Vec<_>>()
                             .join(" ");
    if len >= width {
        return joined_colored;
    }
    format!("{}{}", " ".repeat(width-len), joined_colored)
}

#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum Direction {
    Horizontal,
    Vertical,
}
impl Direction {
    pub fn perpendicular(self) -> Direction {
        match self {
            Direction::Horizontal => Direction::Vertical,
            Direction::Vertical   => Direction::Horizontal,
        }
    }
    /// (x, y) coordinates of the square at position `at` along line `line_index`.
    pub fn square_index(self, line_index: usize, at: usize) -> (usize, usize) {
        match self {
            Direction::Horizontal => (at, line_index),
            Direction::Vertical   => (line_index, at),
        }
    }
    pub fn line_name(self) -> &'static str {
        match self {
            Direction::Horizontal => "row",
            Direction::Vertical   => "col",
        }
    }
}
impl fmt::Display for Direction {
    fn fmt(&self,
           f: &mut fmt::Formatter) -> fmt::Result
    {
        write!(f, "{}", match self {
            Direction::Horizontal => "Horizontal",
            Direction::Vertical   => "Vertical",
        })
    }
}

pub fn is_a_tty<T: AsRawFd>(handle: &T) -> bool {
    let fd = handle.as_raw_fd();
    unsafe { libc::isatty(fd) != 0 }
}

use std::fmt;

use crate::geom::{Point, Range};

/// Errors raised by grid access and construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A coordinate outside the grid bounds.
    OutOfRange { pos: Point, bounds: Range },
    /// Rows of an ASCII map have different widths.
    InconsistentSize { line: usize, expected: usize, found: usize },
    /// An ASCII map contains a character with no tile category.
    InvalidGlyph { ch: char, pos: Point },
    /// An ASCII map smaller than the minimum grid side.
    TooSmall { rows: i32, cols: i32 },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { pos, bounds } => {
                write!(f, "position {pos} is outside grid bounds {bounds}")
            }
            Self::InconsistentSize {
                line,
                expected,
                found,
            } => write!(f, "map line {line} has width {found}, expected {expected}"),
            Self::InvalidGlyph { ch, pos } => {
                write!(f, "map contains invalid glyph \u{201c}{ch}\u{201d} at {pos}")
            }
            Self::TooSmall { rows, cols } => {
                write!(f, "map of {rows}x{cols} is below the minimum grid size")
            }
        }
    }
}

impl std::error::Error for GridError {}

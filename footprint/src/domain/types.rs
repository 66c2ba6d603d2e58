//! Arena indices and source positions
//!
//! Newtypes so a frame index or a column is never mixed up with a counter.

use std::fmt;

/// Index of a frame inside its file's arena
///
/// The root (package) frame is always `FrameId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub usize);

impl FrameId {
    pub const ROOT: FrameId = FrameId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame#{}", self.0)
    }
}

/// A byte position in the original source
///
/// `line` is 1-based, `column` is the 0-based byte offset inside that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Anchor {
    pub line: usize,
    pub column: usize,
}

impl Anchor {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_id_display() {
        assert_eq!(FrameId(3).to_string(), "Frame#3");
        assert_eq!(FrameId::ROOT.index(), 0);
    }

    #[test]
    fn test_anchor_ordering() {
        assert!(Anchor::new(2, 0) > Anchor::new(1, 40));
        assert!(Anchor::new(2, 5) > Anchor::new(2, 4));
        assert_eq!(Anchor::new(7, 3).to_string(), "7:3");
    }
}

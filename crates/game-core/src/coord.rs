use serde::{Deserialize, Serialize};

const FILES: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];
const RANKS: [char; 8] = ['1', '2', '3', '4', '5', '6', '7', '8'];

/// A board square as zero-based file/rank indices ("e4" is x=4, y=3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Render as algebraic notation. Never fails; out-of-range indices
    /// clamp to 'a' / '1'.
    pub fn to_algebraic(self) -> String {
        let file = usize::try_from(self.x)
            .ok()
            .and_then(|i| FILES.get(i).copied())
            .unwrap_or('a');
        let rank = usize::try_from(self.y)
            .ok()
            .and_then(|i| RANKS.get(i).copied())
            .unwrap_or('1');
        format!("{file}{rank}")
    }

    /// Parse algebraic notation. Requires exactly two characters drawn from
    /// a-h and 1-8; anything else is None.
    pub fn from_algebraic(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        let x = FILES.iter().position(|&f| f == file)?;
        let y = RANKS.iter().position(|&r| r == rank)?;
        Some(Self {
            x: x as i32,
            y: y as i32,
        })
    }
}

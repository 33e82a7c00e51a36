//! Player side representation.

use serde::Serialize;
use shakmaty::Color;

/// One of the two players in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// Both sides in the order superlatives are scanned.
    pub const BOTH: [Side; 2] = [Side::White, Side::Black];

    /// Returns the side that moves on the given 0-based ply index.
    #[inline]
    pub const fn of_ply(ply_index: usize) -> Self {
        if ply_index % 2 == 0 {
            Side::White
        } else {
            Side::Black
        }
    }

    /// Returns +1 for White and -1 for Black.
    #[inline]
    pub const fn sign(self) -> i32 {
        match self {
            Side::White => 1,
            Side::Black => -1,
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::White => write!(f, "white"),
            Side::Black => write!(f, "black"),
        }
    }
}

//! Read-only board queries used by the tactical trackers.

use shakmaty::{Bitboard, Board, Chess, Color, Piece, Position, Square};

/// Snapshot of a position that can answer occupancy and attack questions.
///
/// Implemented for [`shakmaty::Board`] and [`shakmaty::Chess`]; tests can
/// provide scripted boards.
pub trait BoardView {
    /// The piece standing on `square`, if any.
    fn piece_at(&self, square: Square) -> Option<Piece>;

    /// Squares holding pieces of `side` that attack `square`.
    fn attackers_of(&self, square: Square, side: Color) -> Bitboard;

    /// Squares attacked by the piece on `square` (empty if unoccupied).
    fn attacks_from(&self, square: Square) -> Bitboard;

    /// Whether any piece of `side` attacks `square`.
    fn is_attacked_by(&self, square: Square, side: Color) -> bool {
        self.attackers_of(square, side).any()
    }
}

impl BoardView for Board {
    fn piece_at(&self, square: Square) -> Option<Piece> {
        Board::piece_at(self, square)
    }

    fn attackers_of(&self, square: Square, side: Color) -> Bitboard {
        self.attacks_to(square, side, self.occupied())
    }

    fn attacks_from(&self, square: Square) -> Bitboard {
        Board::attacks_from(self, square)
    }
}

impl BoardView for Chess {
    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board().piece_at(square)
    }

    fn attackers_of(&self, square: Square, side: Color) -> Bitboard {
        BoardView::attackers_of(self.board(), square, side)
    }

    fn attacks_from(&self, square: Square) -> Bitboard {
        self.board().attacks_from(square)
    }
}

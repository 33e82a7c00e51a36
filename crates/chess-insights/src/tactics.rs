//! Per-ply tactical statistics: territory invasion, most attacked square
//! and mutual-attack tension.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;
use shakmaty::{Color, Rank, Role, Square};

use crate::best::Best;
use crate::board::BoardView;
use crate::Side;

/// Invasion statistics for both sides of one game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerritoryStats {
    /// Distinct White piece kinds that reached ranks 5-8
    pub white_pieces_in_enemy: u32,
    /// Distinct Black piece kinds that reached ranks 1-4
    pub black_pieces_in_enemy: u32,
    /// Ply of White's first invasion
    pub white_first_invasion: Option<u32>,
    /// Ply of Black's first invasion
    pub black_first_invasion: Option<u32>,
}

impl TerritoryStats {
    pub fn pieces_in_enemy(&self, side: Side) -> u32 {
        match side {
            Side::White => self.white_pieces_in_enemy,
            Side::Black => self.black_pieces_in_enemy,
        }
    }

    pub fn first_invasion(&self, side: Side) -> Option<u32> {
        match side {
            Side::White => self.white_first_invasion,
            Side::Black => self.black_first_invasion,
        }
    }
}

/// The square with the most attackers seen in a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MostAttackedSquare {
    pub square: String,
    pub attackers: u32,
    pub white_attackers: u32,
    pub black_attackers: u32,
    pub ply: u32,
    /// SAN of the move that produced the position
    #[serde(rename = "move")]
    pub san: String,
}

/// Longest uninterrupted mutual attack between two opposing pieces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TensionRecord {
    pub square_a: String,
    pub square_b: String,
    /// Duration in plies
    pub plies: u32,
    pub start_ply: u32,
    pub end_ply: u32,
}

/// Everything the tactical tracker produces for a finished game.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TacticalSummary {
    pub enemy_territory: TerritoryStats,
    pub most_attacked_square: Option<MostAttackedSquare>,
    pub longest_tension: Option<TensionRecord>,
}

type SquarePair = (Square, Square);

/// Tracks tactical patterns from the board after every ply.
#[derive(Debug, Default)]
pub struct TacticalTracker {
    invaders: [HashSet<Role>; 2],
    first_invasion: [Option<u32>; 2],
    most_attacked: Best<MostAttackedSquare>,
    open_tensions: BTreeMap<SquarePair, u32>,
    longest_tension: Best<TensionRecord>,
}

impl TacticalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the position reached after the move on `ply_index` (0-based).
    pub fn observe(&mut self, ply_index: usize, san: &str, board: &impl BoardView) {
        let ply = ply_index as u32 + 1;
        self.track_territory(ply, board);
        self.track_most_attacked(ply, san, board);
        self.track_tension(ply, board);
    }

    pub fn finish(self) -> TacticalSummary {
        let [white, black] = &self.invaders;
        TacticalSummary {
            enemy_territory: TerritoryStats {
                white_pieces_in_enemy: white.len() as u32,
                black_pieces_in_enemy: black.len() as u32,
                white_first_invasion: self.first_invasion[0],
                black_first_invasion: self.first_invasion[1],
            },
            most_attacked_square: self.most_attacked.into_inner(),
            longest_tension: self.longest_tension.into_inner(),
        }
    }

    fn track_territory(&mut self, ply: u32, board: &impl BoardView) {
        for square in Square::ALL {
            let Some(piece) = board.piece_at(square) else {
                continue;
            };
            let invading = match piece.color {
                Color::White => square.rank() >= Rank::Fifth,
                Color::Black => square.rank() <= Rank::Fourth,
            };
            if !invading {
                continue;
            }
            let slot = side_index(piece.color);
            if self.invaders[slot].insert(piece.role) && self.first_invasion[slot].is_none() {
                self.first_invasion[slot] = Some(ply);
            }
        }
    }

    fn track_most_attacked(&mut self, ply: u32, san: &str, board: &impl BoardView) {
        for square in Square::ALL {
            let white = board.attackers_of(square, Color::White).count() as u32;
            let black = board.attackers_of(square, Color::Black).count() as u32;
            let total = white + black;
            if total == 0 {
                continue;
            }
            self.most_attacked.offer(
                f64::from(total),
                MostAttackedSquare {
                    square: square.to_string(),
                    attackers: total,
                    white_attackers: white,
                    black_attackers: black,
                    ply,
                    san: san.to_string(),
                },
            );
        }
    }

    fn track_tension(&mut self, ply: u32, board: &impl BoardView) {
        let current = mutual_attacks(board);

        let ended: Vec<(SquarePair, u32)> = self
            .open_tensions
            .iter()
            .filter(|(pair, _)| !current.contains(*pair))
            .map(|(pair, start)| (*pair, *start))
            .collect();
        for ((a, b), start) in ended {
            self.longest_tension.offer(
                f64::from(ply - start),
                TensionRecord {
                    square_a: a.to_string(),
                    square_b: b.to_string(),
                    plies: ply - start,
                    start_ply: start,
                    end_ply: ply,
                },
            );
        }

        self.open_tensions = current
            .into_iter()
            .map(|pair| {
                let start = self.open_tensions.get(&pair).copied().unwrap_or(ply);
                (pair, start)
            })
            .collect();
    }
}

/// Unordered pairs of opposing pieces that attack each other.
fn mutual_attacks(board: &impl BoardView) -> BTreeSet<SquarePair> {
    let mut pairs = BTreeSet::new();
    for square in Square::ALL {
        let Some(piece) = board.piece_at(square) else {
            continue;
        };
        for target in board.attacks_from(square) {
            let Some(victim) = board.piece_at(target) else {
                continue;
            };
            if victim.color == piece.color || !board.attacks_from(target).contains(square) {
                continue;
            }
            pairs.insert(ordered(square, target));
        }
    }
    pairs
}

/// Orders a pair by square name so `(d5, e4)` and `(e4, d5)` coincide.
fn ordered(a: Square, b: Square) -> SquarePair {
    if (a.file(), a.rank()) <= (b.file(), b.rank()) {
        (a, b)
    } else {
        (b, a)
    }
}

fn side_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::san::San;
    use shakmaty::{Bitboard, Chess, Piece, Position};
    use std::collections::HashMap;

    /// Board with hand-placed pieces and attack sets.
    #[derive(Default)]
    struct FixtureBoard {
        pieces: HashMap<Square, Piece>,
        attacks: HashMap<Square, Bitboard>,
    }

    impl FixtureBoard {
        fn with(mut self, square: Square, piece: Piece, attacks: &[Square]) -> Self {
            self.pieces.insert(square, piece);
            self.attacks
                .insert(square, attacks.iter().copied().collect::<Bitboard>());
            self
        }
    }

    impl BoardView for FixtureBoard {
        fn piece_at(&self, square: Square) -> Option<Piece> {
            self.pieces.get(&square).copied()
        }

        fn attackers_of(&self, square: Square, side: Color) -> Bitboard {
            self.pieces
                .iter()
                .filter(|(from, piece)| {
                    piece.color == side && self.attacks_from(**from).contains(square)
                })
                .map(|(from, _)| *from)
                .collect()
        }

        fn attacks_from(&self, square: Square) -> Bitboard {
            self.attacks.get(&square).copied().unwrap_or_default()
        }
    }

    fn knight(color: Color) -> Piece {
        Piece {
            color,
            role: Role::Knight,
        }
    }

    fn quiet_board() -> FixtureBoard {
        FixtureBoard::default()
            .with(Square::B1, knight(Color::White), &[])
            .with(Square::B8, knight(Color::Black), &[])
    }

    fn tense_board() -> FixtureBoard {
        FixtureBoard::default()
            .with(Square::E4, knight(Color::White), &[Square::D6])
            .with(Square::D6, knight(Color::Black), &[Square::E4])
    }

    fn play(pos: &mut Chess, san: &str) {
        let m = san
            .parse::<San>()
            .expect("valid san")
            .to_move(pos)
            .expect("legal move");
        pos.play_unchecked(&m);
    }

    #[test]
    fn test_tension_span_ends_when_pair_breaks() {
        let mut tracker = TacticalTracker::new();
        // plies are 1-based: the pair exists on plies 12..=18 and is gone on 19
        for ply in 1..=20u32 {
            let board = if (12..19).contains(&ply) {
                tense_board()
            } else {
                quiet_board()
            };
            tracker.observe(ply as usize - 1, "Nx", &board);
        }
        let tension = tracker.finish().longest_tension.expect("tension recorded");
        assert_eq!(tension.plies, 7);
        assert_eq!(tension.start_ply, 12);
        assert_eq!(tension.end_ply, 19);
        assert_eq!(tension.square_a, "d6");
        assert_eq!(tension.square_b, "e4");
    }

    #[test]
    fn test_tension_spans_do_not_merge() {
        let mut tracker = TacticalTracker::new();
        for ply in 1..=30u32 {
            let tense = (12..19).contains(&ply) || ply >= 25;
            let board = if tense { tense_board() } else { quiet_board() };
            tracker.observe(ply as usize - 1, "Nx", &board);
        }
        let tension = tracker.finish().longest_tension.expect("tension recorded");
        assert_eq!(tension.plies, 7);
        assert_eq!(tension.start_ply, 12);
    }

    #[test]
    fn test_one_sided_attack_is_not_tension() {
        let board = FixtureBoard::default()
            .with(Square::E4, knight(Color::White), &[Square::D6])
            .with(Square::D6, knight(Color::Black), &[]);
        assert!(mutual_attacks(&board).is_empty());
    }

    #[test]
    fn test_same_color_mutual_cover_is_not_tension() {
        let board = FixtureBoard::default()
            .with(Square::E4, knight(Color::White), &[Square::D6])
            .with(Square::D6, knight(Color::White), &[Square::E4]);
        assert!(mutual_attacks(&board).is_empty());
    }

    #[test]
    fn test_real_position_tension() {
        let mut pos = Chess::default();
        play(&mut pos, "e4");
        play(&mut pos, "d5");
        let pairs = mutual_attacks(&pos);
        assert!(pairs.contains(&(Square::D5, Square::E4)));
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_territory_invasion() {
        let mut tracker = TacticalTracker::new();
        let mut pos = Chess::default();
        for (ply_index, san) in ["e4", "d5", "exd5", "Qxd5", "Nc3", "Qe4"].iter().enumerate() {
            play(&mut pos, san);
            tracker.observe(ply_index, san, &pos);
        }
        let territory = tracker.finish().enemy_territory;
        assert_eq!(territory.white_first_invasion, Some(3));
        assert_eq!(territory.white_pieces_in_enemy, 1);
        assert_eq!(territory.black_first_invasion, Some(6));
        assert_eq!(territory.black_pieces_in_enemy, 1);
        assert_eq!(territory.pieces_in_enemy(Side::Black), 1);
        assert_eq!(territory.first_invasion(Side::White), Some(3));
    }

    #[test]
    fn test_first_invasion_is_never_overwritten() {
        let mut tracker = TacticalTracker::new();
        let far = FixtureBoard::default().with(Square::E6, knight(Color::White), &[]);
        let home = FixtureBoard::default().with(Square::E2, knight(Color::White), &[]);
        tracker.observe(4, "Ne6", &far);
        tracker.observe(5, "Ne2", &home);
        tracker.observe(6, "Ne6", &far);
        let territory = tracker.finish().enemy_territory;
        assert_eq!(territory.white_first_invasion, Some(5));
        assert_eq!(territory.white_pieces_in_enemy, 1);
        assert_eq!(territory.black_first_invasion, None);
    }

    #[test]
    fn test_most_attacked_square_keeps_first_maximum() {
        let mut tracker = TacticalTracker::new();
        let crowded = FixtureBoard::default()
            .with(Square::C3, knight(Color::White), &[Square::D5])
            .with(Square::E3, knight(Color::White), &[Square::D5])
            .with(Square::F6, knight(Color::Black), &[Square::D5]);
        tracker.observe(0, "Nc3", &quiet_board());
        tracker.observe(1, "Nf6", &crowded);
        tracker.observe(2, "Ne3", &crowded);
        let most = tracker
            .finish()
            .most_attacked_square
            .expect("square recorded");
        assert_eq!(most.square, "d5");
        assert_eq!(most.attackers, 3);
        assert_eq!(most.white_attackers, 2);
        assert_eq!(most.black_attackers, 1);
        assert_eq!(most.ply, 2);
        assert_eq!(most.san, "Nf6");
    }

    #[test]
    fn test_no_attacks_means_no_square() {
        let mut tracker = TacticalTracker::new();
        tracker.observe(0, "Nc3", &quiet_board());
        assert!(tracker.finish().most_attacked_square.is_none());
    }
}

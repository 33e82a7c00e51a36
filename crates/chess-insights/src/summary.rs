//! Batch-wide superlatives.
//!
//! Every superlative is a linear scan over the games in index order (White
//! before Black within a game) using [`select`], so ties go to the first
//! candidate seen. Highlights borrow from the [`GameRecord`]s they point at
//! and carry the game identity for cross-checking.

use serde::Serialize;

use crate::best::{select, Prefer};
use crate::game::{round_one_decimal, BlunderRecord, GameIdentity, GameRecord};
use crate::swing::{ComebackRecord, LuckyEscapeRecord};
use crate::tactics::{MostAttackedSquare, TensionRecord};
use crate::Side;

/// A per-game record lifted into the summary together with its game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Highlight<'a, T> {
    #[serde(flatten)]
    pub game: &'a GameIdentity,
    #[serde(flatten)]
    pub record: &'a T,
}

/// One player's accuracy and ACPL in one game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerHighlight<'a> {
    #[serde(flatten)]
    pub game: &'a GameIdentity,
    pub player: Side,
    #[serde(serialize_with = "round_one_decimal")]
    pub accuracy: f64,
    #[serde(serialize_with = "round_one_decimal")]
    pub acpl: f64,
}

impl<'a> PlayerHighlight<'a> {
    fn of(game: &'a GameRecord, player: Side) -> Self {
        Self {
            game: &game.identity,
            player,
            accuracy: game.accuracy(player),
            acpl: game.acpl(player),
        }
    }
}

/// Both players' ACPL in one game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CombinedAcplHighlight<'a> {
    #[serde(flatten)]
    pub game: &'a GameIdentity,
    #[serde(rename = "combinedACPL", serialize_with = "round_one_decimal")]
    pub combined_acpl: f64,
    #[serde(rename = "whiteACPL", serialize_with = "round_one_decimal")]
    pub white_acpl: f64,
    #[serde(rename = "blackACPL", serialize_with = "round_one_decimal")]
    pub black_acpl: f64,
}

impl<'a> CombinedAcplHighlight<'a> {
    fn of(game: &'a GameRecord) -> Self {
        Self {
            game: &game.identity,
            combined_acpl: game.combined_acpl(),
            white_acpl: game.white_acpl,
            black_acpl: game.black_acpl,
        }
    }
}

/// The player with the fewest distinct piece kinds in enemy territory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomebodyHighlight<'a> {
    #[serde(flatten)]
    pub game: &'a GameIdentity,
    pub player: Side,
    pub pieces_in_enemy: u32,
}

/// A player's first invasion of enemy territory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvasionHighlight<'a> {
    #[serde(flatten)]
    pub game: &'a GameIdentity,
    pub player: Side,
    pub ply: u32,
}

/// Superlatives across a batch of games.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary<'a> {
    pub accuracy_king: Option<PlayerHighlight<'a>>,
    pub biggest_blunder: Option<Highlight<'a, BlunderRecord>>,
    pub comeback_king: Option<Highlight<'a, ComebackRecord>>,
    pub lucky_escape: Option<Highlight<'a, LuckyEscapeRecord>>,
    #[serde(rename = "lowestACPL")]
    pub lowest_acpl: Option<PlayerHighlight<'a>>,
    #[serde(rename = "highestACPL")]
    pub highest_acpl: Option<PlayerHighlight<'a>>,
    #[serde(rename = "lowestCombinedACPL")]
    pub lowest_combined_acpl: Option<CombinedAcplHighlight<'a>>,
    #[serde(rename = "highestCombinedACPL")]
    pub highest_combined_acpl: Option<CombinedAcplHighlight<'a>>,
    pub homebody: Option<HomebodyHighlight<'a>>,
    pub late_bloomer: Option<InvasionHighlight<'a>>,
    pub quick_draw: Option<InvasionHighlight<'a>>,
    pub longest_tension: Option<Highlight<'a, TensionRecord>>,
    pub most_attacked_square: Option<Highlight<'a, MostAttackedSquare>>,
    pub total_games: usize,
}

impl<'a> Summary<'a> {
    /// Builds the summary. `games` must be in game-index order.
    pub fn from_games(games: &'a [GameRecord]) -> Self {
        let players = move || {
            games
                .iter()
                .flat_map(|game| Side::BOTH.into_iter().map(move |side| (game, side)))
        };
        let player_scan = |prefer, key: fn(&GameRecord, Side) -> f64| {
            select(
                prefer,
                players().map(|(game, side)| (key(game, side), PlayerHighlight::of(game, side))),
            )
        };
        let combined_scan = |prefer| {
            select(
                prefer,
                games
                    .iter()
                    .map(|game| (game.combined_acpl(), CombinedAcplHighlight::of(game))),
            )
        };
        let invasion_scan = |prefer| {
            select(
                prefer,
                players().filter_map(|(game, side)| {
                    let ply = game.tactics.enemy_territory.first_invasion(side)?;
                    Some((
                        f64::from(ply),
                        InvasionHighlight {
                            game: &game.identity,
                            player: side,
                            ply,
                        },
                    ))
                }),
            )
        };

        Self {
            accuracy_king: player_scan(Prefer::Highest, GameRecord::accuracy),
            biggest_blunder: highlight(games, Prefer::Highest, |g| g.biggest_blunder.as_ref(), |b| {
                b.severity
            }),
            comeback_king: highlight(games, Prefer::Highest, |g| g.biggest_comeback.as_ref(), |c| {
                f64::from(c.swing)
            }),
            lucky_escape: highlight(games, Prefer::Highest, |g| g.lucky_escape.as_ref(), |e| {
                f64::from(e.escape_amount)
            }),
            lowest_acpl: player_scan(Prefer::Lowest, GameRecord::acpl),
            highest_acpl: player_scan(Prefer::Highest, GameRecord::acpl),
            lowest_combined_acpl: combined_scan(Prefer::Lowest),
            highest_combined_acpl: combined_scan(Prefer::Highest),
            homebody: select(
                Prefer::Lowest,
                players()
                    .filter(|(game, _)| {
                        let territory = &game.tactics.enemy_territory;
                        territory.white_pieces_in_enemy > 0 || territory.black_pieces_in_enemy > 0
                    })
                    .map(|(game, side)| {
                        let pieces = game.tactics.enemy_territory.pieces_in_enemy(side);
                        (
                            f64::from(pieces),
                            HomebodyHighlight {
                                game: &game.identity,
                                player: side,
                                pieces_in_enemy: pieces,
                            },
                        )
                    }),
            ),
            late_bloomer: invasion_scan(Prefer::Highest),
            quick_draw: invasion_scan(Prefer::Lowest),
            longest_tension: highlight(
                games,
                Prefer::Highest,
                |g| g.tactics.longest_tension.as_ref(),
                |t| f64::from(t.plies),
            ),
            most_attacked_square: highlight(
                games,
                Prefer::Highest,
                |g| g.tactics.most_attacked_square.as_ref(),
                |s| f64::from(s.attackers),
            ),
            total_games: games.len(),
        }
    }
}

/// Picks the best optional per-game record across `games`.
fn highlight<'a, T>(
    games: &'a [GameRecord],
    prefer: Prefer,
    pick: impl Fn(&'a GameRecord) -> Option<&'a T>,
    key: impl Fn(&T) -> f64,
) -> Option<Highlight<'a, T>> {
    select(
        prefer,
        games.iter().filter_map(|game| {
            let record = pick(game)?;
            Some((
                key(record),
                Highlight {
                    game: &game.identity,
                    record,
                },
            ))
        }),
    )
}

//! Per-game aggregation of move quality, accuracy and swing statistics.
//!
//! [`GameTracker`] is fed one evaluated move at a time (and one board per
//! ply for the tactical trackers) and is consumed by [`GameTracker::finish`],
//! which produces the immutable [`GameRecord`].

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::best::Best;
use crate::board::BoardView;
use crate::quality::{accuracy, average_cp_loss, MoveRecord, QualityCounts};
use crate::severity::blunder_severity;
use crate::swing::{ComebackRecord, LuckyEscapeRecord, SwingTracker};
use crate::tactics::{TacticalSummary, TacticalTracker};
use crate::{Evaluation, MoveQuality, Side};

/// Identity of a game within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameIdentity {
    /// Position of the game in the input, counting skipped games
    pub game_index: usize,
    pub game_id: Option<String>,
    pub white: String,
    pub black: String,
}

impl GameIdentity {
    /// Name of the player on `side`.
    pub fn player(&self, side: Side) -> &str {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }
}

/// The most severe blunder of a game.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlunderRecord {
    pub ply: u32,
    pub move_number: u32,
    pub player: Side,
    /// 0 when a mate score was involved
    pub cp_loss: i32,
    pub win_loss: f64,
    pub severity: f64,
    #[serde(rename = "move")]
    pub san: String,
    /// Comparable score before the move, White's perspective
    pub eval_before: i32,
    /// Comparable score after the move, White's perspective
    pub eval_after: i32,
}

/// Finalized statistics for one game.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    #[serde(flatten)]
    pub identity: GameIdentity,
    #[serde(serialize_with = "round_one_decimal")]
    pub white_accuracy: f64,
    #[serde(serialize_with = "round_one_decimal")]
    pub black_accuracy: f64,
    #[serde(rename = "whiteACPL", serialize_with = "round_one_decimal")]
    pub white_acpl: f64,
    #[serde(rename = "blackACPL", serialize_with = "round_one_decimal")]
    pub black_acpl: f64,
    pub white_move_quality: QualityCounts,
    pub black_move_quality: QualityCounts,
    pub biggest_blunder: Option<BlunderRecord>,
    pub biggest_comeback: Option<ComebackRecord>,
    pub lucky_escape: Option<LuckyEscapeRecord>,
    #[serde(flatten)]
    pub tactics: TacticalSummary,
    pub moves: Vec<MoveRecord>,
}

impl GameRecord {
    pub fn accuracy(&self, side: Side) -> f64 {
        match side {
            Side::White => self.white_accuracy,
            Side::Black => self.black_accuracy,
        }
    }

    pub fn acpl(&self, side: Side) -> f64 {
        match side {
            Side::White => self.white_acpl,
            Side::Black => self.black_acpl,
        }
    }

    pub fn combined_acpl(&self) -> f64 {
        self.white_acpl + self.black_acpl
    }

    pub fn move_quality(&self, side: Side) -> &QualityCounts {
        match side {
            Side::White => &self.white_move_quality,
            Side::Black => &self.black_move_quality,
        }
    }
}

/// Lifecycle of a [`GameTracker`]. Finalization consumes the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    NotStarted,
    InProgress,
}

/// Accumulates one game's statistics ply by ply.
#[derive(Debug)]
pub struct GameTracker {
    phase: GamePhase,
    moves: Vec<MoveRecord>,
    quality: [QualityCounts; 2],
    win_losses: [Vec<f64>; 2],
    cp_losses: [Vec<i32>; 2],
    biggest_blunder: Best<BlunderRecord>,
    swings: SwingTracker,
    tactics: TacticalTracker,
}

impl Default for GameTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl GameTracker {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::NotStarted,
            moves: Vec::new(),
            quality: Default::default(),
            win_losses: Default::default(),
            cp_losses: Default::default(),
            biggest_blunder: Best::highest(),
            swings: SwingTracker::new(),
            tactics: TacticalTracker::new(),
        }
    }

    /// Records a sampled move given the evaluations around it.
    ///
    /// `ply_index` is 0-based; even plies are White's. Both evaluations are
    /// from White's perspective.
    pub fn record_move(
        &mut self,
        ply_index: usize,
        san: &str,
        before: Evaluation,
        after: Evaluation,
    ) -> &MoveRecord {
        self.phase = GamePhase::InProgress;
        let side = Side::of_ply(ply_index);
        let slot = side_slot(side);
        let ply = ply_index as u32 + 1;

        let (quality, win_loss) =
            MoveQuality::classify(before.win_probability(), after.win_probability(), side);

        let cp_loss = match (before.centipawns(), after.centipawns()) {
            (Some(b), Some(a)) => {
                let loss = (i64::from(b) - i64::from(a)) * i64::from(side.sign());
                Some(loss.clamp(0, i64::from(i32::MAX)) as i32)
            }
            _ => None,
        };

        self.quality[slot].record(quality);
        self.win_losses[slot].push(win_loss);
        if let Some(loss) = cp_loss {
            self.cp_losses[slot].push(loss);
        }

        if quality == MoveQuality::Blunder {
            let severity = blunder_severity(before.for_side(side), after.for_side(side), win_loss);
            self.biggest_blunder.offer(
                severity,
                BlunderRecord {
                    ply,
                    move_number: (ply_index / 2) as u32 + 1,
                    player: side,
                    cp_loss: cp_loss.unwrap_or(0),
                    win_loss,
                    severity,
                    san: san.to_string(),
                    eval_before: before.to_comparable(),
                    eval_after: after.to_comparable(),
                },
            );
        }

        self.swings.observe(ply_index, after);

        debug!(ply, %side, san, %before, %after, ?quality, win_loss, "move classified");

        self.moves.push(MoveRecord {
            ply,
            side,
            san: san.to_string(),
            eval_before: before,
            eval_after: after,
            quality,
            win_loss,
            cp_loss,
        });
        &self.moves[self.moves.len() - 1]
    }

    /// Feeds the board reached after the move on `ply_index`.
    pub fn record_position(&mut self, ply_index: usize, san: &str, board: &impl BoardView) {
        self.phase = GamePhase::InProgress;
        self.tactics.observe(ply_index, san, board);
    }

    /// Finalizes the game.
    pub fn finish(self, identity: GameIdentity) -> GameRecord {
        if self.phase == GamePhase::NotStarted {
            debug!(game = identity.game_index, "finalizing a game with no plies");
        }
        let (biggest_comeback, lucky_escape) = self.swings.finish();
        let [white_quality, black_quality] = self.quality;
        let [white_losses, black_losses] = &self.win_losses;
        let [white_cp, black_cp] = &self.cp_losses;

        GameRecord {
            identity,
            white_accuracy: accuracy(white_losses),
            black_accuracy: accuracy(black_losses),
            white_acpl: average_cp_loss(white_cp),
            black_acpl: average_cp_loss(black_cp),
            white_move_quality: white_quality,
            black_move_quality: black_quality,
            biggest_blunder: self.biggest_blunder.into_inner(),
            biggest_comeback,
            lucky_escape,
            tactics: self.tactics.finish(),
            moves: self.moves,
        }
    }
}

fn side_slot(side: Side) -> usize {
    match side {
        Side::White => 0,
        Side::Black => 1,
    }
}

pub(crate) fn round_one_decimal<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 10.0).round() / 10.0)
}

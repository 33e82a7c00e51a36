//! Move quality classification and per-side accuracy metrics.

use serde::Serialize;

use crate::{Evaluation, Side};

/// Win-probability loss below which a move is excellent.
pub const EXCELLENT_LIMIT: f64 = 2.0;
/// Win-probability loss below which a move is good.
pub const GOOD_LIMIT: f64 = 5.0;
/// Win-probability loss below which a move is an inaccuracy.
pub const INACCURACY_LIMIT: f64 = 10.0;
/// Win-probability loss below which a move is a mistake.
pub const MISTAKE_LIMIT: f64 = 20.0;

/// White win probability at or below which the position is already lost.
pub const DECIDED_LOW: f64 = 10.0;
/// White win probability at or above which the position is already won.
pub const DECIDED_HIGH: f64 = 90.0;

/// Per-move centipawn loss cap used for ACPL.
pub const MAX_CP_LOSS_FOR_ACPL: i32 = 150;

/// Classification of move quality based on win-probability loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveQuality {
    /// Loss below 2%
    Excellent,
    /// Loss below 5%
    Good,
    /// Loss below 10%
    Inaccuracy,
    /// Loss below 20%, or any larger loss in an already decided position
    Mistake,
    /// Loss of 20% or more in an open position
    Blunder,
}

impl MoveQuality {
    /// Classifies a move from White-relative win probabilities before and
    /// after it was played.
    ///
    /// Returns the bucket together with the win-probability loss from the
    /// mover's perspective, clamped at zero.
    pub fn classify(win_before: f64, win_after: f64, mover: Side) -> (Self, f64) {
        let win_loss = match mover {
            Side::White => win_before - win_after,
            Side::Black => (100.0 - win_before) - (100.0 - win_after),
        }
        .max(0.0);

        let quality = if win_loss < EXCELLENT_LIMIT {
            MoveQuality::Excellent
        } else if win_loss < GOOD_LIMIT {
            MoveQuality::Good
        } else if win_loss < INACCURACY_LIMIT {
            MoveQuality::Inaccuracy
        } else if win_loss < MISTAKE_LIMIT {
            MoveQuality::Mistake
        } else if win_before <= DECIDED_LOW || win_before >= DECIDED_HIGH {
            // a big swing in a position that was already won or lost
            MoveQuality::Mistake
        } else {
            MoveQuality::Blunder
        };

        (quality, win_loss)
    }
}

/// Number of moves per quality bucket for one side of one game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QualityCounts {
    pub excellent: u32,
    pub good: u32,
    pub inaccuracies: u32,
    pub mistakes: u32,
    pub blunders: u32,
}

impl QualityCounts {
    /// Counts one more move of the given quality.
    pub fn record(&mut self, quality: MoveQuality) {
        *self.slot(quality) += 1;
    }

    /// Total classified moves.
    pub fn total(&self) -> u32 {
        self.excellent + self.good + self.inaccuracies + self.mistakes + self.blunders
    }

    fn slot(&mut self, quality: MoveQuality) -> &mut u32 {
        match quality {
            MoveQuality::Excellent => &mut self.excellent,
            MoveQuality::Good => &mut self.good,
            MoveQuality::Inaccuracy => &mut self.inaccuracies,
            MoveQuality::Mistake => &mut self.mistakes,
            MoveQuality::Blunder => &mut self.blunders,
        }
    }
}

/// Analysis result for a single sampled move.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    /// 1-based ply number
    pub ply: u32,
    pub side: Side,
    /// The move in SAN
    pub san: String,
    pub eval_before: Evaluation,
    pub eval_after: Evaluation,
    pub quality: MoveQuality,
    pub win_loss: f64,
    /// Centipawn loss, only when both evaluations are centipawn scores
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cp_loss: Option<i32>,
}

/// Accuracy percentage (0-100) from a list of win-probability losses.
///
/// An empty list yields 100.
pub fn accuracy(win_losses: &[f64]) -> f64 {
    if win_losses.is_empty() {
        return 100.0;
    }
    let mean = win_losses.iter().sum::<f64>() / win_losses.len() as f64;
    let accuracy = 103.1668 * (-0.04354 * mean).exp();
    if accuracy.is_nan() {
        return 0.0;
    }
    accuracy.clamp(0.0, 100.0)
}

/// Average centipawn loss with each loss capped at [`MAX_CP_LOSS_FOR_ACPL`].
///
/// An empty list yields 0.
pub fn average_cp_loss(cp_losses: &[i32]) -> f64 {
    if cp_losses.is_empty() {
        return 0.0;
    }
    let total: f64 = cp_losses
        .iter()
        .map(|&loss| f64::from(loss.min(MAX_CP_LOSS_FOR_ACPL)))
        .sum();
    total / cp_losses.len() as f64
}

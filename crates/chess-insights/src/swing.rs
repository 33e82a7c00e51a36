//! Comeback and lucky-escape detection over recent evaluations.

use std::collections::VecDeque;

use serde::Serialize;

use crate::best::Best;
use crate::{Evaluation, Side};

/// Number of recent post-move evaluations kept for comeback detection.
pub const WINDOW_SIZE: usize = 10;
/// Minimum number of evaluations in the window before comebacks are checked.
pub const MIN_WINDOW: usize = 5;
/// A side is "losing badly" / "winning" beyond this score.
pub const COMEBACK_THRESHOLD: i32 = 300;
/// Swings are capped so mate scores do not dominate.
pub const MAX_SWING: i32 = 2000;
/// Advantage that the opponent is expected to convert.
pub const ESCAPE_MARGIN: i32 = 200;
/// A score within this distance of zero counts as neutral.
pub const NEUTRAL_MARGIN: i32 = 50;

/// Largest swing from a losing to a winning position within the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComebackRecord {
    /// Side that came back
    pub player: Side,
    pub swing: i32,
    /// Worst evaluation in the window, `M{n}` for mates
    pub eval_from: String,
    /// Evaluation after the comeback move, `M{n}` for mates
    pub eval_to: String,
    pub eval_from_cp: i32,
    pub eval_to_cp: i32,
    pub ply: u32,
    pub move_number: u32,
}

/// An advantage the opponent failed to keep on the very next sampled move.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LuckyEscapeRecord {
    /// Side that escaped
    pub player: Side,
    pub escape_amount: i32,
    pub eval_before: i32,
    pub eval_after: i32,
    pub ply: u32,
    pub move_number: u32,
}

/// Sliding-window tracker fed with every sampled post-move evaluation.
#[derive(Debug, Default)]
pub struct SwingTracker {
    window: VecDeque<Evaluation>,
    previous: Option<i32>,
    comeback: Best<ComebackRecord>,
    escape: Best<LuckyEscapeRecord>,
}

impl SwingTracker {
    pub fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(WINDOW_SIZE + 1),
            ..Self::default()
        }
    }

    /// Feeds the evaluation reached after the move on `ply_index` (0-based).
    pub fn observe(&mut self, ply_index: usize, after: Evaluation) {
        let current = after.to_comparable();
        let ply = ply_index as u32 + 1;
        let move_number = (ply_index / 2) as u32 + 1;

        if let Some(previous) = self.previous {
            self.check_escape(previous, current, ply, move_number);
        }
        self.previous = Some(current);

        self.window.push_back(after);
        if self.window.len() > WINDOW_SIZE {
            self.window.pop_front();
        }

        if self.window.len() >= MIN_WINDOW {
            self.check_comeback(after, ply, move_number);
        }
    }

    pub fn finish(self) -> (Option<ComebackRecord>, Option<LuckyEscapeRecord>) {
        (self.comeback.into_inner(), self.escape.into_inner())
    }

    fn check_escape(&mut self, previous: i32, current: i32, ply: u32, move_number: u32) {
        let player = if previous < -ESCAPE_MARGIN && current > -NEUTRAL_MARGIN {
            Side::White
        } else if previous > ESCAPE_MARGIN && current < NEUTRAL_MARGIN {
            Side::Black
        } else {
            return;
        };

        let amount = i64::from(previous.unsigned_abs()) - i64::from(current.unsigned_abs());
        let escape_amount = amount.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        self.escape.offer(
            f64::from(escape_amount),
            LuckyEscapeRecord {
                player,
                escape_amount,
                eval_before: previous,
                eval_after: current,
                ply,
                move_number,
            },
        );
    }

    fn check_comeback(&mut self, after: Evaluation, ply: u32, move_number: u32) {
        let current = after.to_comparable();
        let (Some(lowest), Some(highest)) = (self.extreme(|a, b| a < b), self.extreme(|a, b| a > b))
        else {
            return;
        };

        let (player, extreme) = if lowest.to_comparable() < -COMEBACK_THRESHOLD
            && current > COMEBACK_THRESHOLD
        {
            (Side::White, lowest)
        } else if highest.to_comparable() > COMEBACK_THRESHOLD && current < -COMEBACK_THRESHOLD {
            (Side::Black, highest)
        } else {
            return;
        };

        let distance = (i64::from(current) - i64::from(extreme.to_comparable())).abs();
        let swing = distance.min(i64::from(MAX_SWING)) as i32;
        self.comeback.offer(
            f64::from(swing),
            ComebackRecord {
                player,
                swing,
                eval_from: extreme.to_string(),
                eval_to: after.to_string(),
                eval_from_cp: extreme.to_comparable(),
                eval_to_cp: current,
                ply,
                move_number,
            },
        );
    }

    /// First evaluation in the window that no later one beats under `better`.
    fn extreme(&self, better: impl Fn(i32, i32) -> bool) -> Option<Evaluation> {
        let mut found: Option<Evaluation> = None;
        for &eval in &self.window {
            match found {
                Some(current) if !better(eval.to_comparable(), current.to_comparable()) => {}
                _ => found = Some(eval),
            }
        }
        found
    }
}

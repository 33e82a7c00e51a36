//! Chess position evaluation types and the win-probability model.

use serde::Serialize;

use crate::Side;

/// Score assigned to a mate at distance zero.
pub const MATE_SCORE: i32 = 10_000;

/// Score reduction per ply of mate distance.
pub const MATE_STEP: i32 = 10;

/// Represents a chess position evaluation from White's perspective.
///
/// Evaluations can be either centipawn scores (for normal positions)
/// or mate scores (when a forced mate is found).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Evaluation {
    /// Centipawn evaluation (positive = white advantage)
    #[serde(rename = "cp")]
    Centipawns(i32),
    /// Mate in N plies (positive = white mates, negative = black mates)
    #[serde(rename = "mate")]
    Mate(i32),
}

impl Evaluation {
    /// Builds an evaluation from the two optional score fields of a UCI
    /// `info` line. A mate score takes precedence over a centipawn score.
    pub fn from_uci_score(cp: Option<i32>, mate: Option<i32>) -> Option<Self> {
        match (cp, mate) {
            (_, Some(m)) => Some(Evaluation::Mate(m)),
            (Some(c), None) => Some(Evaluation::Centipawns(c)),
            (None, None) => None,
        }
    }

    /// Returns the centipawn value, or `None` for mate scores.
    pub fn centipawns(&self) -> Option<i32> {
        match self {
            Evaluation::Centipawns(cp) => Some(*cp),
            Evaluation::Mate(_) => None,
        }
    }

    /// Negates the evaluation (switches the perspective).
    pub fn flip(self) -> Self {
        match self {
            Evaluation::Centipawns(cp) => Evaluation::Centipawns(cp.saturating_neg()),
            Evaluation::Mate(m) => Evaluation::Mate(m.saturating_neg()),
        }
    }

    /// Re-expresses a White-relative evaluation from `side`'s perspective.
    pub fn for_side(self, side: Side) -> Self {
        match side {
            Side::White => self,
            Side::Black => self.flip(),
        }
    }

    /// Maps the evaluation onto a single signed scale usable for ordering
    /// and arithmetic.
    ///
    /// Centipawns map to themselves. A mate in `n` plies maps to
    /// `±(10000 - 10·|n|)`, so shorter mates score further from zero than
    /// longer ones. The distance is capped where the magnitude would reach
    /// zero, which keeps absurd mate distances on the correct side.
    pub fn to_comparable(self) -> i32 {
        match self {
            Evaluation::Centipawns(cp) => cp,
            Evaluation::Mate(m) => {
                let distance = m.unsigned_abs().min((MATE_SCORE / MATE_STEP) as u32) as i32;
                let magnitude = MATE_SCORE - MATE_STEP * distance;
                if m < 0 {
                    -magnitude
                } else {
                    magnitude
                }
            }
        }
    }

    /// Win probability (0-100) for White in this position.
    pub fn win_probability(self) -> f64 {
        win_probability(self.to_comparable())
    }
}

impl std::fmt::Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Evaluation::Centipawns(cp) => write!(f, "{}", cp),
            Evaluation::Mate(m) => write!(f, "M{}", m),
        }
    }
}

/// Converts a comparable score into White's win probability in `[0, 100]`.
///
/// Uses the logistic curve `50 + 50·(2/(1+10^(-|s|/400)) - 1)·sign(s)`.
pub fn win_probability(score: i32) -> f64 {
    let magnitude = f64::from(score).abs();
    let swing = 2.0 / (1.0 + 10f64.powf(-magnitude / 400.0)) - 1.0;
    let signed = if score < 0 { -swing } else { swing };
    (50.0 + 50.0 * signed).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_centipawns_are_identity() {
        assert_eq!(Evaluation::Centipawns(-135).to_comparable(), -135);
        assert_eq!(Evaluation::Centipawns(0).to_comparable(), 0);
    }

    #[test]
    fn test_mate_scaling() {
        assert_eq!(Evaluation::Mate(1).to_comparable(), 9990);
        assert_eq!(Evaluation::Mate(3).to_comparable(), 9970);
        assert_eq!(Evaluation::Mate(-2).to_comparable(), -9980);
        assert!(Evaluation::Mate(2).to_comparable() > Evaluation::Mate(8).to_comparable());
        assert!(Evaluation::Mate(-2).to_comparable() < Evaluation::Mate(-8).to_comparable());
    }

    #[test]
    fn test_extreme_mate_distance_keeps_sign() {
        assert_eq!(Evaluation::Mate(i32::MAX).to_comparable(), 0);
        assert_eq!(Evaluation::Mate(i32::MIN).to_comparable(), 0);
        assert!(Evaluation::Mate(999).to_comparable() > 0);
        assert!(Evaluation::Mate(-999).to_comparable() < 0);
    }

    #[test]
    fn test_from_uci_score() {
        assert_eq!(
            Evaluation::from_uci_score(Some(35), None),
            Some(Evaluation::Centipawns(35))
        );
        assert_eq!(
            Evaluation::from_uci_score(None, Some(-4)),
            Some(Evaluation::Mate(-4))
        );
        assert_eq!(Evaluation::from_uci_score(None, None), None);
    }

    #[test]
    fn test_for_side_flips_black() {
        let eval = Evaluation::Centipawns(120);
        assert_eq!(eval.for_side(Side::White), eval);
        assert_eq!(eval.for_side(Side::Black), Evaluation::Centipawns(-120));
        assert_eq!(Evaluation::Mate(3).for_side(Side::Black), Evaluation::Mate(-3));
    }

    #[test]
    fn test_display() {
        assert_eq!(Evaluation::Centipawns(-42).to_string(), "-42");
        assert_eq!(Evaluation::Mate(5).to_string(), "M5");
        assert_eq!(Evaluation::Mate(-2).to_string(), "M-2");
    }

    #[test]
    fn test_serializes_tagged() {
        let json = serde_json::to_string(&Evaluation::Centipawns(25)).unwrap();
        assert_eq!(json, r#"{"type":"cp","value":25}"#);
        let json = serde_json::to_string(&Evaluation::Mate(-3)).unwrap();
        assert_eq!(json, r#"{"type":"mate","value":-3}"#);
    }

    #[test]
    fn test_win_probability_fixed_points() {
        assert_eq!(win_probability(0), 50.0);
        assert!((win_probability(200) - 75.97).abs() < 0.01);
        assert!(win_probability(10_000) <= 100.0);
        assert!(win_probability(-10_000) >= 0.0);
        assert!(win_probability(i32::MIN) >= 0.0);
    }

    proptest! {
        #[test]
        fn win_probability_is_strictly_increasing(score in -3000i32..3000) {
            prop_assert!(win_probability(score) < win_probability(score + 1));
        }

        #[test]
        fn win_probability_is_symmetric(score in -20_000i32..20_000) {
            let diff = win_probability(-score) - (100.0 - win_probability(score));
            prop_assert!(diff.abs() < 1e-9);
        }

        #[test]
        fn win_probability_stays_in_range(score in any::<i32>()) {
            let p = win_probability(score);
            prop_assert!((0.0..=100.0).contains(&p));
        }
    }
}

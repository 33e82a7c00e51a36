//! Blunder severity scoring.
//!
//! Severity ranks blunders against each other. It starts from the
//! win-probability loss and is raised when the blunder walks into a mate or
//! throws away a large advantage. It has no upper bound and is only ever
//! compared with `>`.

use crate::Evaluation;

/// Advantage (in centipawns) above which a lost lead amplifies severity.
pub const WINNING_MARGIN: i32 = 200;

/// Computes the severity of a blunder.
///
/// `before` and `after` must already be expressed from the mover's
/// perspective (see [`Evaluation::for_side`]).
pub fn blunder_severity(before: Evaluation, after: Evaluation, win_loss: f64) -> f64 {
    let mut severity = win_loss;

    if let Evaluation::Mate(plies) = after {
        if plies < 0 {
            // the move allows a forced mate; closer mates weigh more
            severity += 100.0 / (f64::from(plies.unsigned_abs()) + 1.0);
        }
    }

    match before {
        Evaluation::Centipawns(advantage) if advantage > WINNING_MARGIN => {
            let excess = f64::from(advantage - WINNING_MARGIN);
            severity *= 1.0 + (excess / 400.0).min(2.0);
        }
        Evaluation::Mate(plies) if plies > 0 => {
            severity *= 3.0;
        }
        _ => {}
    }

    severity
}

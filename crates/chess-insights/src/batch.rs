//! Sequential batch driver.

use serde::Serialize;
use tracing::{info, warn};

use crate::analyzer::{GameAnalyzer, GameInput};
use crate::engine::Evaluator;
use crate::game::GameRecord;
use crate::summary::Summary;

/// Outcome of analyzing a batch of games.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Finalized games in game-index order
    pub games: Vec<GameRecord>,
    /// Indices of games without moves
    pub skipped: Vec<usize>,
    /// Indices of games excluded after a rules or evaluator failure
    pub failed: Vec<usize>,
    /// Whether the batch stopped early on the cancel flag
    pub cancelled: bool,
}

/// The `{ games, summary }` document written by reporters.
#[derive(Debug, Serialize)]
pub struct ReportDocument<'a> {
    pub games: &'a [GameRecord],
    pub summary: Summary<'a>,
}

impl BatchReport {
    pub fn summary(&self) -> Summary<'_> {
        Summary::from_games(&self.games)
    }

    pub fn document(&self) -> ReportDocument<'_> {
        ReportDocument {
            games: &self.games,
            summary: self.summary(),
        }
    }
}

/// Analyzes `inputs` in order, one game at a time.
///
/// Games without moves are skipped and a failing game is logged and left
/// out; neither stops the batch. Cancellation stops it and returns what was
/// finalized so far. `on_record` sees every record as soon as it is
/// finalized.
pub fn analyze_batch<E: Evaluator>(
    analyzer: &mut GameAnalyzer<E>,
    inputs: &[GameInput],
    mut on_record: impl FnMut(&GameRecord),
) -> BatchReport {
    let total = inputs.len();
    let mut report = BatchReport::default();

    for (n, input) in inputs.iter().enumerate() {
        if analyzer.is_cancelled() {
            warn!(game = input.index, "batch cancelled");
            report.cancelled = true;
            break;
        }
        info!("[{}/{}] {} vs {}", n + 1, total, input.white, input.black);

        if input.moves.is_empty() {
            info!(game = input.index, "skipped: no moves");
            report.skipped.push(input.index);
            continue;
        }

        match analyzer.analyze_game(input) {
            Ok(record) => {
                on_record(&record);
                report.games.push(record);
            }
            // also covers an engine that died from the same interrupt
            Err(_) if analyzer.is_cancelled() => {
                warn!(game = input.index, "batch cancelled");
                report.cancelled = true;
                break;
            }
            Err(e) => {
                warn!(game = input.index, error = %e, "game excluded");
                report.failed.push(input.index);
            }
        }
    }

    info!(
        analyzed = report.games.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "batch complete"
    );
    report
}

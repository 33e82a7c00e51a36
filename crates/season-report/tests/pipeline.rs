//! PGN in, JSON report out, with a one-ply material evaluator in place of
//! Stockfish.

use chess_insights::{analyze_batch, AnalysisConfig, EngineError, Evaluation, Evaluator, GameAnalyzer};
use season_report::{json_output, pgn};
use shakmaty::{Chess, Position, Role, Square};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-ply search over material: the side to move takes its best immediate
/// gain, and a mate found in one is reported as such.
struct OnePly;

fn material(position: &Chess) -> Evaluation {
    if position.is_checkmate() {
        return if position.turn().is_white() {
            Evaluation::Mate(-1)
        } else {
            Evaluation::Mate(1)
        };
    }
    let board = position.board();
    let score: i32 = Square::ALL
        .into_iter()
        .filter_map(|square| board.piece_at(square))
        .map(|piece| {
            let value = match piece.role {
                Role::Pawn => 100,
                Role::Knight | Role::Bishop => 300,
                Role::Rook => 500,
                Role::Queen => 900,
                Role::King => 0,
            };
            if piece.color.is_white() {
                value
            } else {
                -value
            }
        })
        .sum();
    Evaluation::Centipawns(score)
}

impl Evaluator for OnePly {
    fn evaluate(&mut self, position: &Chess) -> Result<Evaluation, EngineError> {
        let sign = if position.turn().is_white() { 1 } else { -1 };
        let best = position
            .legal_moves()
            .iter()
            .map(|m| {
                let mut next = position.clone();
                next.play_unchecked(m);
                material(&next)
            })
            .max_by_key(|eval| sign * eval.to_comparable());
        Ok(best.unwrap_or_else(|| material(position)))
    }
}

/// Raises the shutdown flag once a fixed number of evaluations is spent,
/// the way a Ctrl+C would in the middle of a run.
struct Interrupting {
    remaining: usize,
    shutdown: Arc<AtomicBool>,
}

impl Evaluator for Interrupting {
    fn evaluate(&mut self, position: &Chess) -> Result<Evaluation, EngineError> {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.shutdown.store(true, Ordering::SeqCst);
        }
        OnePly.evaluate(position)
    }
}

const SEASON: &str = r#"[Site "https://lichess.org/game0001"]
[White "alice"]
[Black "bob"]
[Result "1-0"]

1. e4 e5 2. Nf3 Nc6 3. Bc4 Nd4 4. Nxe5 Qg5 5. Nxf7 Qxg2 6. Rf1 Qxe4+ 7. Be2 Nf3# 0-1

[Site "https://lichess.org/forfeit1"]
[White "carol"]
[Black "dave"]
[Result "1-0"]

1-0

[Site "https://lichess.org/game0003"]
[White "erin"]
[Black "frank"]
[Result "*"]

1. d4 d5 2. c4 e6 *
"#;

#[test]
fn test_season_pipeline() {
    let games = pgn::read_games(SEASON.as_bytes()).expect("PGN parsed");
    assert_eq!(games.len(), 3);

    let mut analyzer = GameAnalyzer::new(OnePly, &AnalysisConfig::default());
    let report = analyze_batch(&mut analyzer, &games, |_| {});
    assert_eq!(report.skipped, vec![1]);
    assert!(report.failed.is_empty());
    assert_eq!(report.games.len(), 2);

    let mut buffer = Vec::new();
    json_output::write_report(&mut buffer, &report).expect("report written");
    let json: serde_json::Value = serde_json::from_slice(&buffer).expect("valid JSON");

    let games = json["games"].as_array().expect("games array");
    assert_eq!(games[0]["gameId"], "game0001");
    assert_eq!(games[1]["gameIndex"], 2);
    assert_eq!(games[1]["moves"].as_array().map(Vec::len), Some(4));
    assert_eq!(games[0]["moves"][13]["san"], "Nf3#");

    // 7. Be2?? allows Nf3# and is the most severe blunder of the season
    let blunder = &json["summary"]["biggestBlunder"];
    assert_eq!(blunder["gameIndex"], 0);
    assert_eq!(blunder["player"], "white");
    assert_eq!(blunder["move"], "Be2");
    assert_eq!(json["summary"]["totalGames"], 2);
}

#[test]
fn test_interrupted_season_writes_partial_report() {
    let games = pgn::read_games(SEASON.as_bytes()).expect("PGN parsed");
    let shutdown = Arc::new(AtomicBool::new(false));
    // game 0 has 14 plies, two evaluations each
    let evaluator = Interrupting {
        remaining: 28,
        shutdown: Arc::clone(&shutdown),
    };
    let mut analyzer = GameAnalyzer::new(evaluator, &AnalysisConfig::default())
        .with_cancel_flag(Arc::clone(&shutdown));

    let report = analyze_batch(&mut analyzer, &games, |_| {});
    assert!(report.cancelled);
    assert!(report.skipped.is_empty());
    assert_eq!(report.games.len(), 1);

    let mut buffer = Vec::new();
    json_output::write_report(&mut buffer, &report).expect("report written");
    let json: serde_json::Value = serde_json::from_slice(&buffer).expect("valid JSON");
    assert_eq!(json["games"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["summary"]["totalGames"], 1);
    assert_eq!(json["summary"]["biggestBlunder"]["move"], "Be2");
}

#[test]
fn test_shutdown_before_start_writes_empty_report() {
    let games = pgn::read_games(SEASON.as_bytes()).expect("PGN parsed");
    let mut analyzer = GameAnalyzer::new(OnePly, &AnalysisConfig::default())
        .with_cancel_flag(Arc::new(AtomicBool::new(true)));

    let report = analyze_batch(&mut analyzer, &games, |_| {});
    assert!(report.cancelled);
    assert!(report.games.is_empty());

    let mut buffer = Vec::new();
    json_output::write_report(&mut buffer, &report).expect("report written");
    let json: serde_json::Value = serde_json::from_slice(&buffer).expect("valid JSON");
    assert_eq!(json["summary"]["totalGames"], 0);
    assert!(json["summary"]["biggestBlunder"].is_null());
}

//! Game metrics for batches of chess games.
//!
//! This crate turns engine evaluations into per-game statistics and
//! batch-wide superlatives.
//!
//! # Overview
//!
//! - [`Evaluation`] - Position evaluation (centipawn or mate score) and the
//!   win probability transform
//! - [`MoveQuality`] - Classification of a move by win-probability loss
//! - [`GameTracker`] - Per-game aggregation: accuracy, ACPL, blunders, swings
//!   and tactical patterns
//! - [`Evaluator`] / [`UciEvaluator`] - The evaluation capability and its
//!   UCI engine implementation
//! - [`GameAnalyzer`] - Replays a game and drives the tracker
//! - [`analyze_batch`] / [`Summary`] - Batch processing and superlatives
//!
//! # Example
//!
//! ```ignore
//! use chess_insights::{analyze_batch, AnalysisConfig, GameAnalyzer};
//!
//! let config = AnalysisConfig::default();
//! let mut analyzer = GameAnalyzer::with_stockfish("stockfish", &config)?;
//! let report = analyze_batch(&mut analyzer, &games, |_| {});
//! println!("{}", serde_json::to_string_pretty(&report.document())?);
//! ```

pub mod analyzer;
pub mod batch;
pub mod best;
pub mod board;
pub mod engine;
pub mod evaluation;
pub mod game;
pub mod quality;
pub mod severity;
pub mod side;
pub mod summary;
pub mod swing;
pub mod tactics;

pub use analyzer::{AnalysisConfig, AnalyzerError, EveryNth, GameAnalyzer, GameInput, SamplingPolicy};
pub use batch::{analyze_batch, BatchReport, ReportDocument};
pub use board::BoardView;
pub use engine::{EngineError, Evaluator, UciEvaluator};
pub use evaluation::{win_probability, Evaluation};
pub use game::{BlunderRecord, GameIdentity, GameRecord, GameTracker};
pub use quality::{accuracy, average_cp_loss, MoveQuality, MoveRecord, QualityCounts};
pub use severity::blunder_severity;
pub use side::Side;
pub use summary::Summary;
pub use swing::{ComebackRecord, LuckyEscapeRecord, SwingTracker};
pub use tactics::{MostAttackedSquare, TacticalSummary, TacticalTracker, TensionRecord, TerritoryStats};

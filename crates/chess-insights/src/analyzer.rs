//! Game analysis driver.
//!
//! [`GameAnalyzer`] replays a game on a [`shakmaty::Chess`] position,
//! asks its [`Evaluator`] for the score before and after every sampled
//! ply and feeds a [`GameTracker`].

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{CastlingMode, Chess, Color, Position};
use thiserror::Error;
use tracing::{debug, info};

use crate::engine::{EngineError, Evaluator, UciEvaluator};
use crate::game::{GameIdentity, GameRecord, GameTracker};
use crate::Side;

/// Errors that can occur during game analysis.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Error from the evaluator.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
    /// A move could not be parsed or is not legal in the current position.
    #[error("Illegal move {san} at ply {ply}: {reason}")]
    IllegalMove { ply: u32, san: String, reason: String },
    /// The starting position could not be set up.
    #[error("Invalid position: {0}")]
    InvalidPosition(String),
    /// The cancel flag was raised while the game was being analyzed.
    #[error("Analysis cancelled")]
    Cancelled,
}

/// Configuration for game analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Search depth for every evaluated position.
    pub depth: u32,
    /// Evaluate every n-th move of each player.
    pub sample_rate: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            depth: 15,
            sample_rate: 1,
        }
    }
}

/// Decides which plies are sent to the evaluator.
pub trait SamplingPolicy {
    fn should_evaluate(&self, ply_index: usize, side: Side) -> bool;
}

impl<F> SamplingPolicy for F
where
    F: Fn(usize, Side) -> bool,
{
    fn should_evaluate(&self, ply_index: usize, side: Side) -> bool {
        self(ply_index, side)
    }
}

/// Samples every n-th move of each player, starting with the first.
///
/// A rate of 0 behaves like 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EveryNth(pub u32);

impl SamplingPolicy for EveryNth {
    fn should_evaluate(&self, ply_index: usize, _side: Side) -> bool {
        let n = self.0.max(1) as usize;
        (ply_index / 2) % n == 0
    }
}

/// One game as read from the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameInput {
    /// Position in the input, 0-based
    pub index: usize,
    pub game_id: Option<String>,
    pub white: String,
    pub black: String,
    /// Starting position; the standard one when absent
    pub start_fen: Option<String>,
    /// Mainline moves in SAN
    pub moves: Vec<String>,
}

impl GameInput {
    pub fn identity(&self) -> GameIdentity {
        GameIdentity {
            game_index: self.index,
            game_id: self.game_id.clone(),
            white: self.white.clone(),
            black: self.black.clone(),
        }
    }

    /// Parses the starting position.
    pub fn start_position(&self) -> Result<Chess, AnalyzerError> {
        let Some(fen) = &self.start_fen else {
            return Ok(Chess::default());
        };
        let fen: Fen = fen
            .parse()
            .map_err(|e| AnalyzerError::InvalidPosition(format!("{fen}: {e}")))?;
        fen.into_position(CastlingMode::Standard)
            .map_err(|e| AnalyzerError::InvalidPosition(e.to_string()))
    }
}

/// Analyzes games one at a time with an injected evaluator.
pub struct GameAnalyzer<E> {
    evaluator: E,
    sampler: Box<dyn SamplingPolicy + Send>,
    cancel: Option<Arc<AtomicBool>>,
}

impl GameAnalyzer<UciEvaluator> {
    /// Creates an analyzer backed by a UCI engine at `stockfish_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be initialized.
    pub fn with_stockfish(
        stockfish_path: impl AsRef<Path>,
        config: &AnalysisConfig,
    ) -> Result<Self, AnalyzerError> {
        let engine = UciEvaluator::new(stockfish_path, config.depth)?;
        Ok(Self::new(engine, config))
    }
}

impl<E: Evaluator> GameAnalyzer<E> {
    pub fn new(evaluator: E, config: &AnalysisConfig) -> Self {
        Self {
            evaluator,
            sampler: Box::new(EveryNth(config.sample_rate)),
            cancel: None,
        }
    }

    /// Replaces the sampling policy.
    pub fn with_sampler(mut self, sampler: impl SamplingPolicy + Send + 'static) -> Self {
        self.sampler = Box::new(sampler);
        self
    }

    /// Aborts analysis as soon as `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Analyzes a complete game.
    ///
    /// Every ply advances the board and the tactical trackers; sampled
    /// plies additionally cost two evaluator calls (before and after the
    /// move).
    ///
    /// # Errors
    ///
    /// Returns an error on an invalid start position, an illegal move, an
    /// evaluator failure or cancellation. The partial game is dropped.
    pub fn analyze_game(&mut self, game: &GameInput) -> Result<GameRecord, AnalyzerError> {
        let mut position = game.start_position()?;
        // Games set up with Black to move start on an odd ply.
        let first_ply = usize::from(position.turn() == Color::Black);

        self.evaluator.new_game()?;
        let mut tracker = GameTracker::new();

        for (offset, text) in game.moves.iter().enumerate() {
            if self.is_cancelled() {
                return Err(AnalyzerError::Cancelled);
            }

            let ply_index = first_ply + offset;
            let illegal = |reason: String| AnalyzerError::IllegalMove {
                ply: ply_index as u32 + 1,
                san: text.clone(),
                reason,
            };
            let san: SanPlus = text.parse().map_err(|e| illegal(format!("{e}")))?;
            let m = san
                .san
                .to_move(&position)
                .map_err(|e| illegal(format!("{e}")))?;
            let side = Side::from(position.turn());

            let sampled = self.sampler.should_evaluate(ply_index, side);
            let before = if sampled {
                Some(self.evaluator.evaluate(&position)?)
            } else {
                None
            };

            let played = SanPlus::from_move_and_play_unchecked(&mut position, &m).to_string();

            if let Some(before) = before {
                let after = self.evaluator.evaluate(&position)?;
                tracker.record_move(ply_index, &played, before, after);
            } else {
                debug!(ply = ply_index + 1, san = %played, "ply not sampled");
            }
            tracker.record_position(ply_index, &played, &position);
        }

        let record = tracker.finish(game.identity());
        info!(
            game = game.index,
            white = %game.white,
            black = %game.black,
            white_accuracy = record.white_accuracy,
            black_accuracy = record.black_accuracy,
            "game analyzed"
        );
        Ok(record)
    }
}

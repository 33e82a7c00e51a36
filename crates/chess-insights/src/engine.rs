//! Position evaluators: the [`Evaluator`] capability and a UCI engine
//! implementation of it.

use crate::Evaluation;
use shakmaty::fen::Fen;
use shakmaty::{Chess, Color, EnPassantMode, Position};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use thiserror::Error;

/// Maximum number of lines to read before giving up on a UCI response.
pub const MAX_UCI_LINES: usize = 1000;

/// Errors that can occur when working with chess engines.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to spawn the engine process.
    #[error("Failed to spawn engine: {0}")]
    SpawnError(#[from] std::io::Error),
    /// Engine executable was not found at the specified path.
    #[error("Engine not found at path: {0}")]
    NotFound(String),
    /// Engine failed to initialize properly (UCI handshake failed).
    #[error("Engine initialization failed")]
    InitFailed,
    /// Engine returned an invalid or unexpected response.
    #[error("Invalid engine response: {0}")]
    InvalidResponse(String),
}

/// Something that can score a position.
///
/// Implementations must return evaluations from White's perspective and
/// be deterministic for a given position within one run.
pub trait Evaluator {
    /// Evaluates `position`.
    fn evaluate(&mut self, position: &Chess) -> Result<Evaluation, EngineError>;

    /// Called before each game so implementations can reset caches.
    fn new_game(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

impl<E: Evaluator + ?Sized> Evaluator for &mut E {
    fn evaluate(&mut self, position: &Chess) -> Result<Evaluation, EngineError> {
        (**self).evaluate(position)
    }

    fn new_game(&mut self) -> Result<(), EngineError> {
        (**self).new_game()
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&mut self, position: &Chess) -> Result<Evaluation, EngineError> {
        (**self).evaluate(position)
    }

    fn new_game(&mut self) -> Result<(), EngineError> {
        (**self).new_game()
    }
}

/// Evaluator backed by a UCI engine process such as Stockfish.
///
/// Each position is searched to a fixed depth; the last score reported
/// before `bestmove` is used.
pub struct UciEvaluator {
    /// The engine process handle.
    process: Child,
    /// Writer for sending commands to the engine.
    stdin: ChildStdin,
    /// Reader for receiving responses from the engine.
    stdout: BufReader<ChildStdout>,
    /// The engine's name (reported via UCI id).
    name: String,
    /// Search depth for every evaluation.
    depth: u32,
}

impl UciEvaluator {
    /// Spawns the engine and performs the UCI handshake.
    ///
    /// # Errors
    ///
    /// - `EngineError::NotFound` if the engine path doesn't exist
    /// - `EngineError::SpawnError` if the engine process fails to start
    /// - `EngineError::InitFailed` if UCI initialization fails
    pub fn new(engine_path: impl AsRef<Path>, depth: u32) -> Result<Self, EngineError> {
        let engine_path = engine_path.as_ref();
        // Bare names are resolved through PATH by the OS.
        if engine_path.components().count() > 1 && !engine_path.exists() {
            return Err(EngineError::NotFound(engine_path.display().to_string()));
        }

        let mut process = Command::new(engine_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    EngineError::NotFound(engine_path.display().to_string())
                }
                _ => EngineError::SpawnError(e),
            })?;

        let stdin = process.stdin.take().ok_or(EngineError::InitFailed)?;
        let stdout = process.stdout.take().ok_or(EngineError::InitFailed)?;

        let mut engine = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            name: String::new(),
            depth,
        };
        engine.init_uci()?;

        tracing::info!(engine = %engine.name, depth, "engine ready");
        Ok(engine)
    }

    fn init_uci(&mut self) -> Result<(), EngineError> {
        self.send_command("uci")?;

        let mut name = String::new();
        let mut lines_read = 0;
        loop {
            if lines_read > MAX_UCI_LINES {
                return Err(EngineError::InitFailed);
            }
            lines_read += 1;
            let line = self.read_line()?;
            if let Some(id) = line.strip_prefix("id name ") {
                name = id.to_string();
            } else if line == "uciok" {
                break;
            }
        }

        self.name = if name.is_empty() {
            "Unknown Engine".to_string()
        } else {
            name
        };

        self.wait_ready()
    }

    /// Returns the engine's name as reported via UCI protocol.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Search depth used for every evaluation.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Searches the position and returns the side-to-move relative score.
    fn search(&mut self, fen: &str) -> Result<Evaluation, EngineError> {
        self.send_command(&format!("position fen {}", fen))?;
        self.send_command(&format!("go depth {}", self.depth))?;

        let mut evaluation = None;
        let mut lines_read = 0;
        loop {
            if lines_read > MAX_UCI_LINES {
                return Err(EngineError::InvalidResponse(
                    "Too many lines without bestmove".to_string(),
                ));
            }
            lines_read += 1;
            let line = self.read_line()?;

            if line.starts_with("info ") {
                if let Some(score) = Self::parse_score(&line) {
                    evaluation = Some(score);
                }
            } else if line.starts_with("bestmove") {
                break;
            }
        }

        evaluation.ok_or_else(|| {
            EngineError::InvalidResponse("No score before bestmove".to_string())
        })
    }

    /// Extracts the score from a UCI info line.
    ///
    /// Format: "info depth X ... score cp Y ..." or "info depth X ... score mate Y ...".
    /// Bound scores (`lowerbound`/`upperbound`) are ignored.
    fn parse_score(line: &str) -> Option<Evaluation> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.iter().any(|p| *p == "lowerbound" || *p == "upperbound") {
            return None;
        }

        let mut cp: Option<i32> = None;
        let mut mate: Option<i32> = None;
        let mut i = 0;
        while i < parts.len() {
            if parts[i] == "score" && i + 2 < parts.len() {
                match parts[i + 1] {
                    "cp" => cp = parts[i + 2].parse().ok(),
                    "mate" => mate = parts[i + 2].parse().ok(),
                    _ => {}
                }
                i += 2;
            } else if parts[i] == "pv" {
                break;
            }
            i += 1;
        }

        Evaluation::from_uci_score(cp, mate)
    }

    fn wait_ready(&mut self) -> Result<(), EngineError> {
        self.send_command("isready")?;
        let mut lines_read = 0;
        loop {
            if lines_read > MAX_UCI_LINES {
                return Err(EngineError::InitFailed);
            }
            lines_read += 1;
            if self.read_line()? == "readyok" {
                return Ok(());
            }
        }
    }

    /// Send a command to the engine.
    fn send_command(&mut self, command: &str) -> Result<(), EngineError> {
        writeln!(self.stdin, "{}", command)?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Read a line from the engine's output.
    fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        let bytes = self.stdout.read_line(&mut line)?;
        if bytes == 0 {
            return Err(EngineError::InvalidResponse(
                "Engine closed unexpectedly".to_string(),
            ));
        }
        Ok(line.trim().to_string())
    }
}

/// Converts a side-to-move relative score into White's perspective.
///
/// `mate 0` means the side to move is already mated; it becomes a mate at
/// distance 1 against that side so the sign survives.
fn to_white_perspective(score: Evaluation, turn: Color) -> Evaluation {
    let score = match score {
        Evaluation::Mate(0) => Evaluation::Mate(-1),
        other => other,
    };
    match turn {
        Color::White => score,
        Color::Black => score.flip(),
    }
}

impl Evaluator for UciEvaluator {
    fn evaluate(&mut self, position: &Chess) -> Result<Evaluation, EngineError> {
        let fen = Fen::from_position(position.clone(), EnPassantMode::Legal).to_string();
        let relative = self.search(&fen)?;
        Ok(to_white_perspective(relative, position.turn()))
    }

    fn new_game(&mut self) -> Result<(), EngineError> {
        self.send_command("ucinewgame")?;
        self.wait_ready()
    }
}

impl Drop for UciEvaluator {
    fn drop(&mut self) {
        let _ = self.send_command("quit");
        let _ = self.process.wait();
    }
}

//! PGN ingestion.
//!
//! Reads every game of a PGN collection into a [`GameInput`]: player names,
//! an identifier, an optional `FEN` start position and the mainline moves in
//! SAN. Variations and comments are skipped; move legality is checked later
//! by the analyzer.

use chess_insights::GameInput;
use pgn_reader::{BufferedReader, RawHeader, SanPlus, Skip, Visitor};
use std::io::Read;
use thiserror::Error;

/// Errors that can occur while reading PGN input.
#[derive(Error, Debug)]
pub enum PgnError {
    /// The input could not be read.
    #[error("Failed to read PGN: {0}")]
    Io(#[from] std::io::Error),
}

/// Collects the headers and mainline of one game.
#[derive(Debug, Default)]
struct GameCollector {
    white: Option<String>,
    black: Option<String>,
    game_id: Option<String>,
    site: Option<String>,
    fen: Option<String>,
    moves: Vec<String>,
}

impl Visitor for GameCollector {
    type Result = GameInput;

    fn begin_game(&mut self) {
        *self = Self::default();
    }

    fn header(&mut self, key: &[u8], value: RawHeader<'_>) {
        let value = value.decode_utf8_lossy().trim().to_string();
        if value.is_empty() {
            return;
        }
        match key {
            b"White" => self.white = Some(value),
            b"Black" => self.black = Some(value),
            b"GameId" => self.game_id = Some(value),
            b"Site" => self.site = Some(value),
            b"FEN" => self.fen = Some(value),
            _ => {}
        }
    }

    fn san(&mut self, san_plus: SanPlus) {
        self.moves.push(san_plus.san.to_string());
    }

    fn begin_variation(&mut self) -> Skip {
        Skip(true)
    }

    fn end_game(&mut self) -> Self::Result {
        let game = std::mem::take(self);
        GameInput {
            index: 0,
            game_id: game
                .game_id
                .or_else(|| game.site.as_deref().and_then(site_identifier)),
            white: game.white.unwrap_or_else(|| "Unknown".to_string()),
            black: game.black.unwrap_or_else(|| "Unknown".to_string()),
            start_fen: game.fen,
            moves: game.moves,
        }
    }
}

/// Last path segment of a `Site` URL, e.g. the game id of a lichess link.
fn site_identifier(site: &str) -> Option<String> {
    if !site.contains('/') {
        return None;
    }
    site.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Reads all games from `reader`, numbering them from 0 in input order.
///
/// # Errors
///
/// Returns [`PgnError::Io`] if the input cannot be read.
pub fn read_games<R: Read>(reader: R) -> Result<Vec<GameInput>, PgnError> {
    let mut pgn = BufferedReader::new(reader);
    let mut collector = GameCollector::default();
    let mut games = Vec::new();

    while let Some(mut game) = pgn.read_game(&mut collector)? {
        game.index = games.len();
        games.push(game);
    }

    tracing::debug!(games = games.len(), "read PGN");
    Ok(games)
}

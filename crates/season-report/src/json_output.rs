//! JSON output of a finished batch.
//!
//! The document has two keys: `games`, one record per analyzed game in
//! game-index order, and `summary`, the batch superlatives.
//!
//! ```json
//! {
//!   "games": [
//!     {
//!       "gameIndex": 0,
//!       "gameId": "AbCd1234",
//!       "white": "alice",
//!       "black": "bob",
//!       "whiteAccuracy": 91.4,
//!       "whiteACPL": 18.2,
//!       "biggestBlunder": { "ply": 11, "player": "black", "move": "Nf6", ... },
//!       ...
//!     }
//!   ],
//!   "summary": { "accuracyKing": { ... }, "totalGames": 1, ... }
//! }
//! ```

use chess_insights::BatchReport;
use std::io::Write;
use std::path::Path;

/// Writes the report as pretty-printed JSON followed by a newline.
pub fn write_report<W: Write>(mut writer: W, report: &BatchReport) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, &report.document())?;
    writeln!(writer)?;
    writer.flush()
}

/// Writes the report to a file at `path`.
pub fn write_report_file<P: AsRef<Path>>(path: P, report: &BatchReport) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    write_report(std::io::BufWriter::new(file), report)
}

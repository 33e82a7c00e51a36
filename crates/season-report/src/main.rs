//! Season Report - analyze a PGN collection with Stockfish.
//!
//! Reads games from a PGN file (or stdin), evaluates them and writes the
//! per-game statistics and batch awards as JSON to stdout or `--output`.
//! Progress is logged to stderr. Ctrl+C stops the batch and the games
//! finished so far are still written.

use anyhow::Context;
use chess_insights::{analyze_batch, GameAnalyzer};
use clap::Parser;
use season_report::config::ReportConfig;
use season_report::{json_output, pgn};
use std::fs::File;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(name = "season-report")]
#[command(about = "Per-game statistics and awards for a PGN collection")]
struct Cli {
    /// PGN file to analyze (reads stdin when omitted)
    pgn: Option<PathBuf>,

    /// Config file (defaults to season-report.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Search depth per evaluated position
    #[arg(short, long)]
    depth: Option<u32>,

    /// Evaluate every n-th move of each player
    #[arg(short, long)]
    sample: Option<u32>,

    /// Path to the Stockfish binary
    #[arg(long)]
    stockfish_path: Option<PathBuf>,

    /// Write the JSON report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log every evaluated ply
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Applies command line overrides on top of the file configuration.
    fn apply(&self, mut config: ReportConfig) -> ReportConfig {
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        if let Some(sample) = self.sample {
            config.sample_rate = sample;
        }
        if let Some(path) = &self.stockfish_path {
            config.stockfish_path = Some(path.clone());
        }
        config
    }

    fn load_config(&self) -> anyhow::Result<ReportConfig> {
        let config = match &self.config {
            Some(path) => ReportConfig::load_from(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ReportConfig::load()?,
        };
        let config = self.apply(config);
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let config = cli.load_config()?;

    let games = match &cli.pgn {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            pgn::read_games(file)?
        }
        None => pgn::read_games(std::io::stdin().lock())?,
    };
    let total = games.len();
    info!("Loaded {} games", total);

    // Shutdown flag
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = Arc::clone(&shutdown);

    // Spawn signal handler
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                warn!("Shutdown signal received, stopping after the current move");
                shutdown_clone.store(true, Ordering::SeqCst);
            }
            Err(e) => warn!("Failed to listen for ctrl+c: {}", e),
        }
    });

    let stockfish = config.stockfish();
    let mut analyzer = GameAnalyzer::with_stockfish(&stockfish, &config.analysis_config())
        .with_context(|| format!("starting {}", stockfish.display()))?
        .with_cancel_flag(Arc::clone(&shutdown));
    info!(
        "Engine: {} at {} (depth {})",
        analyzer.evaluator().name(),
        stockfish.display(),
        analyzer.evaluator().depth()
    );

    let report = tokio::task::spawn_blocking(move || {
        analyze_batch(&mut analyzer, &games, |record| {
            info!(
                "  {} moves evaluated",
                record.white_move_quality.total() + record.black_move_quality.total()
            );
            if let Some(blunder) = &record.biggest_blunder {
                info!(
                    "  biggest blunder: {} by {} on move {}",
                    blunder.san,
                    record.identity.player(blunder.player),
                    blunder.move_number
                );
            }
        })
    })
    .await?;

    if report.cancelled {
        warn!(
            "Analysis interrupted, writing partial report for {} of {} games",
            report.games.len(),
            total
        );
    } else {
        info!(
            "Analysis complete! Processed {} of {} games",
            report.games.len(),
            total
        );
    }

    match &cli.output {
        Some(path) => json_output::write_report_file(path, &report)
            .with_context(|| format!("writing {}", path.display()))?,
        None => json_output::write_report(std::io::stdout().lock(), &report)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["season-report"]).unwrap();
        assert!(cli.pgn.is_none());
        assert!(cli.output.is_none());
        assert!(!cli.verbose);
        assert_eq!(cli.apply(ReportConfig::default()), ReportConfig::default());
    }

    #[test]
    fn test_cli_overrides_file_config() {
        let cli = Cli::try_parse_from([
            "season-report",
            "round1.pgn",
            "--depth",
            "12",
            "--sample",
            "3",
            "--stockfish-path",
            "/opt/sf",
            "-o",
            "out.json",
        ])
        .unwrap();
        assert_eq!(cli.pgn, Some(PathBuf::from("round1.pgn")));
        assert_eq!(cli.output, Some(PathBuf::from("out.json")));

        let file_config = ReportConfig {
            stockfish_path: Some(PathBuf::from("/usr/bin/stockfish")),
            depth: 20,
            sample_rate: 1,
        };
        let config = cli.apply(file_config);
        assert_eq!(config.depth, 12);
        assert_eq!(config.sample_rate, 3);
        assert_eq!(config.stockfish_path, Some(PathBuf::from("/opt/sf")));
    }

    #[test]
    fn test_partial_overrides_keep_file_values() {
        let cli = Cli::try_parse_from(["season-report", "-s", "2"]).unwrap();
        let file_config = ReportConfig {
            depth: 18,
            ..ReportConfig::default()
        };
        let config = cli.apply(file_config);
        assert_eq!(config.depth, 18);
        assert_eq!(config.sample_rate, 2);
    }

    #[test]
    fn test_zero_sample_rejected_from_cli() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("season-report.toml");
        std::fs::write(&config_path, "depth = 10\n").unwrap();

        let cli = Cli::try_parse_from([
            "season-report",
            "--config",
            config_path.to_str().unwrap(),
            "--sample",
            "0",
        ])
        .unwrap();
        assert!(cli.load_config().is_err());
    }

    #[test]
    fn test_cli_help_mentions_options() {
        let mut cmd = Cli::command();
        let help = cmd.render_help().to_string();
        assert!(help.contains("--stockfish-path"));
        assert!(help.contains("--sample"));
    }
}

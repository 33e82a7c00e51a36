//! Season Report - per-game statistics and awards for a PGN collection.
//!
//! This crate reads a PGN collection, runs every game through
//! [`chess_insights`] with a Stockfish evaluator and writes the results as
//! JSON.
//!
//! # Modules
//!
//! - [`config`] - `season-report.toml` loading and Stockfish discovery
//! - [`pgn`] - PGN ingestion into analyzer inputs
//! - [`json_output`] - JSON report generation

pub mod config;
pub mod json_output;
pub mod pgn;

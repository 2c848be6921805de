//! Bot Arena - engine-vs-engine play for the in-process search engines.
//!
//! This crate runs games and matches between configured engines, feeds the
//! results into a rating leaderboard, benchmarks single engines on fixed
//! positions, and exports everything as JSON.
//!
//! # Modules
//!
//! - [`config`] - `arena.toml` loading: engines, presets and rating settings
//! - [`game_runner`] - Single game execution
//! - [`match_runner`] - Multi-game matches reported to the leaderboard
//! - [`bench`] - Benchmark suite over named test positions
//! - [`json_output`] - JSON file generation

pub mod bench;
pub mod config;
pub mod game_runner;
pub mod json_output;
pub mod match_runner;

use anyhow::{bail, Context};
use bot_arena::bench::{run_benchmark, BenchOptions};
use bot_arena::config::{ArenaConfig, PresetConfig, RatingConfig};
use bot_arena::game_runner::{GameRunner, DEFAULT_MAX_PLIES};
use bot_arena::json_output;
use bot_arena::match_runner::run_match;
use chess_core::{Board, Position};
use chess_rating::Leaderboard;
use chess_search::{eval, Evaluator, SearchEngine, SearchLimits};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_RATINGS: &str = "data/ratings.json";

#[derive(Parser)]
#[command(name = "bot-arena")]
#[command(about = "Chess engine comparison tool")]
struct Cli {
    /// Configuration file (defaults to ./arena.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured engines
    List,
    /// Evaluate a position
    Eval {
        /// Position in FEN (defaults to the starting position)
        #[arg(long)]
        fen: Option<String>,
        #[arg(long, default_value = "heuristic", value_parser = parse_evaluator)]
        evaluator: Evaluator,
    },
    /// Play a single game between two engines
    Play {
        /// White engine name
        white: String,
        /// Black engine name
        black: String,
        /// Starting position in FEN
        #[arg(long)]
        fen: Option<String>,
        /// Draw the game after this many plies
        #[arg(long, default_value_t = DEFAULT_MAX_PLIES)]
        max_plies: u32,
        /// Per-move time budget in milliseconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        movetime_ms: Option<u64>,
        /// Directory to write the game JSON into
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run a match between two engines
    Match {
        /// First engine name (white in the first game)
        a: String,
        /// Second engine name
        b: String,
        /// Number of games to play
        #[arg(short, long, default_value = "10")]
        games: u32,
        /// Preset configuration to use
        #[arg(short, long)]
        preset: Option<String>,
        /// Leaderboard file, created if missing
        #[arg(long, default_value = DEFAULT_RATINGS)]
        ratings: PathBuf,
        /// Directory to write game JSON files into
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show the leaderboard
    Standings {
        #[arg(long, default_value = DEFAULT_RATINGS)]
        ratings: PathBuf,
    },
    /// Benchmark an engine on the standard test positions
    Bench {
        /// Engine name
        engine: String,
        /// Search depth for every position instead of the recommended one
        #[arg(long)]
        depth: Option<u8>,
        /// Seconds spent on each speed position instead of its own limit
        #[arg(long)]
        speed_secs: Option<f64>,
        #[arg(long, default_value = "heuristic", value_parser = parse_evaluator)]
        evaluator: Evaluator,
        /// File to write the report to
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn parse_evaluator(s: &str) -> Result<Evaluator, String> {
    match s {
        "heuristic" => Ok(Evaluator::Heuristic),
        "material" => Ok(Evaluator::Material),
        other => Err(format!(
            "unknown evaluator '{}' (expected heuristic or material)",
            other
        )),
    }
}

/// Match settings from a named preset, or from the command line.
fn resolve_preset(
    config: &ArenaConfig,
    preset: Option<&str>,
    games: u32,
) -> anyhow::Result<PresetConfig> {
    match preset {
        Some(name) => Ok(config.get_preset(name)?.clone()),
        None => Ok(PresetConfig {
            games,
            ..Default::default()
        }),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ArenaConfig> {
    match path {
        Some(path) => ArenaConfig::load_from(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => ArenaConfig::load().context("loading arena.toml"),
    }
}

fn load_leaderboard(path: &Path, rating: &RatingConfig) -> anyhow::Result<Leaderboard> {
    if !path.exists() {
        return Ok(rating.leaderboard());
    }
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn save_leaderboard(path: &Path, leaderboard: &Leaderboard) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    json_output::write_json(path, leaderboard)
        .with_context(|| format!("writing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_standings(leaderboard: &Leaderboard) {
    println!(
        "{:<24} {:>8} {:>6} {:>6} {:>8} {:>4} {:>4} {:>4}",
        "engine", "rating", "rd", "vol", "elo", "W", "D", "L"
    );
    for s in leaderboard.standings() {
        println!(
            "{:<24} {:>8.1} {:>6.1} {:>6.4} {:>8.1} {:>4} {:>4} {:>4}",
            s.name, s.rating.rating, s.rating.rd, s.rating.vol, s.elo, s.wins, s.draws, s.losses
        );
    }
}

#[derive(Serialize)]
struct EngineEntry<'a> {
    name: &'a str,
    kind: &'a str,
}

#[derive(Serialize)]
struct EvalReport {
    fen: String,
    score: f64,
    relative: f64,
    endgame: bool,
    outcome: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::List => {
            if cli.json {
                let entries: Vec<EngineEntry> = config
                    .engines
                    .iter()
                    .map(|(name, engine)| EngineEntry {
                        name,
                        kind: engine.kind(),
                    })
                    .collect();
                print_json(&entries)?;
            } else {
                for (name, engine) in &config.engines {
                    println!("{:<24} {}", name, engine.kind());
                }
            }
        }
        Commands::Eval { fen, evaluator } => {
            let board = match fen {
                Some(fen) => Board::from_fen(&fen)?,
                None => Board::new(),
            };
            let report = EvalReport {
                fen: board.fen(),
                score: evaluator.evaluate(&board)?,
                relative: evaluator.relative(&board)?,
                endgame: eval::is_endgame(&board),
                outcome: board.outcome().map(|o| o.termination.to_string()),
            };
            if cli.json {
                print_json(&report)?;
            } else {
                println!("{}", report.fen);
                println!("score (white): {:.2}", report.score);
                println!("score (to move): {:.2}", report.relative);
                println!("endgame: {}", report.endgame);
                if let Some(outcome) = &report.outcome {
                    println!("game over: {}", outcome);
                }
            }
        }
        Commands::Play {
            white,
            black,
            fen,
            max_plies,
            movetime_ms,
            out,
        } => {
            let mut white_engine = config.build_engine(&white)?;
            let mut black_engine = config.build_engine(&black)?;
            let start = match fen {
                Some(fen) => Board::from_fen(&fen)?,
                None => Board::new(),
            };
            let limits = SearchLimits {
                depth: None,
                movetime: movetime_ms.map(Duration::from_millis),
            };

            let record = GameRunner::new(&white, &mut white_engine, &black, &mut black_engine)
                .with_limits(limits)
                .with_max_plies(max_plies)
                .play_game(&start);
            let game_id = uuid::Uuid::new_v4().to_string();

            if let Some(dir) = out {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
                let path = dir.join(format!("{}.json", game_id));
                json_output::write_game_json(&path, &game_id, &record)
                    .with_context(|| format!("writing {}", path.display()))?;
            }

            if cli.json {
                println!("{}", json_output::render_game_json(&game_id, &record)?);
            } else {
                let moves: Vec<&str> = record.moves.iter().map(|m| m.uci.as_str()).collect();
                println!("{}", moves.join(" "));
                println!(
                    "{} vs {}: {} ({}, {} plies)",
                    white,
                    black,
                    record.result.as_str(),
                    record.termination,
                    record.moves.len()
                );
            }
        }
        Commands::Match {
            a,
            b,
            games,
            preset,
            ratings,
            out,
        } => {
            let preset = resolve_preset(&config, preset.as_deref(), games)?;
            let mut leaderboard = load_leaderboard(&ratings, &config.rating)?;
            if let Some(dir) = &out {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
            }

            if !cli.json {
                println!("Running {} games: {} vs {}", preset.games, a, b);
            }
            let summary = run_match(&config, &a, &b, &preset, &mut leaderboard, |index, game| {
                if let Some(dir) = &out {
                    let game_id = uuid::Uuid::new_v4().to_string();
                    let path = dir.join(format!("{}.json", game_id));
                    if let Err(e) = json_output::write_game_json(&path, &game_id, game) {
                        tracing::warn!("Failed to write {}: {}", path.display(), e);
                    }
                }
                if !cli.json {
                    println!(
                        "Game {}: {} vs {}: {} ({}, {} plies)",
                        index + 1,
                        game.white_name,
                        game.black_name,
                        game.result.as_str(),
                        game.termination,
                        game.moves.len()
                    );
                }
            })?;
            save_leaderboard(&ratings, &leaderboard)?;

            if cli.json {
                print_json(&summary)?;
            } else {
                println!(
                    "\nSession Results ({}): W:{} D:{} L:{}",
                    a, summary.wins_a, summary.draws, summary.wins_b
                );
                println!();
                print_standings(&leaderboard);
            }
        }
        Commands::Standings { ratings } => {
            let leaderboard = load_leaderboard(&ratings, &config.rating)?;
            if cli.json {
                print_json(&leaderboard.standings())?;
            } else if leaderboard.is_empty() {
                println!("No rated games yet.");
            } else {
                print_standings(&leaderboard);
            }
        }
        Commands::Bench {
            engine,
            depth,
            speed_secs,
            evaluator,
            output,
        } => {
            let speed_budget = match speed_secs {
                Some(secs) if !(secs.is_finite() && secs > 0.0) => {
                    bail!("--speed-secs must be a positive number of seconds")
                }
                Some(secs) => Some(Duration::from_secs_f64(secs)),
                None => None,
            };
            let mut instance = config.build_engine(&engine)?;
            let options = BenchOptions {
                depth,
                speed_budget,
                evaluator,
            };
            tracing::info!("Benchmarking {} ({})", engine, instance.name());
            let report = run_benchmark(&mut instance, &options)?;

            if let Some(path) = &output {
                json_output::write_json(path, &report)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
            if cli.json {
                print_json(&report)?;
            } else {
                for p in &report.standard_positions {
                    println!(
                        "{:<20} move {:<6} score {:>9.2} nodes {:>9} depth {:>2} {:>6}ms",
                        p.position,
                        p.best_move.as_deref().unwrap_or("-"),
                        p.score,
                        p.metrics.nodes_searched,
                        p.metrics.depth_reached,
                        p.metrics.time_taken.as_millis()
                    );
                }
                println!(
                    "\nevaluation: mean error {:.2}, max error {:.2}",
                    report.evaluation.mean_error, report.evaluation.max_error
                );
                for s in &report.speed {
                    println!(
                        "{:<20} {:.1} searches/s ({} in {}ms)",
                        s.position, s.searches_per_second, s.searches, s.time_ms
                    );
                }
            }
        }
    }

    Ok(())
}

//! Benchmark suite for a single engine.
//!
//! Three parts, reported together:
//! - a fixed-depth search on a handful of named positions
//! - the evaluator's score on positions with a known material balance
//! - how many searches fit into a time budget on busy middlegames

use chess_core::{to_uci, Board, FenError, OracleError};
use chess_search::{EngineMetrics, Evaluator, SearchEngine, SearchError, SearchLimits};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Invalid benchmark position {name}: {source}")]
    Position {
        name: &'static str,
        #[source]
        source: FenError,
    },
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

pub struct BenchPosition {
    pub name: &'static str,
    pub fen: &'static str,
    /// Recommended search depth.
    pub depth: u8,
    pub description: &'static str,
}

pub struct EvalPosition {
    pub name: &'static str,
    pub fen: &'static str,
    /// Expected white-positive score in centipawns.
    pub expected: f64,
    pub description: &'static str,
}

pub struct TimedPosition {
    pub name: &'static str,
    pub fen: &'static str,
    pub time_limit: Duration,
    pub description: &'static str,
}

pub const STANDARD_POSITIONS: &[BenchPosition] = &[
    BenchPosition {
        name: "Starting Position",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        depth: 4,
        description: "Standard starting position",
    },
    BenchPosition {
        name: "Sicilian Dragon",
        fen: "rnbqkb1r/pp2pp1p/3p1np1/8/3NP3/2N5/PPP2PPP/R1BQKB1R w KQkq - 0 7",
        depth: 4,
        description: "Complex tactical position from Sicilian Dragon",
    },
    BenchPosition {
        name: "Mate in 2",
        fen: "r2qkb1r/pp2nppp/3p4/2pNN1B1/2BnP3/3P4/PPP2PPP/R2bK2R w KQkq - 0 1",
        depth: 4,
        description: "Tactical position with forced mate in 2",
    },
    BenchPosition {
        name: "Endgame",
        fen: "8/3k4/8/8/8/8/3K1P2/8 w - - 0 1",
        depth: 5,
        description: "Simple king and pawn endgame",
    },
    BenchPosition {
        name: "Material Imbalance",
        fen: "r1b2rk1/2q1b1pp/p2ppn2/1p6/3QP3/1B6/PPP2PPP/R3K2R w KQ - 0 1",
        depth: 4,
        description: "Position with material imbalance",
    },
];

pub const EVALUATION_POSITIONS: &[EvalPosition] = &[
    EvalPosition {
        name: "Equal Material",
        fen: "r1bqkb1r/pppp1ppp/2n2n2/4p3/4P3/2N2N2/PPPP1PPP/R1BQKB1R w KQkq - 4 4",
        expected: 0.0,
        description: "Symmetrical Four Knights position",
    },
    EvalPosition {
        name: "White Material Up",
        fen: "rnb1kbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 3",
        expected: 900.0,
        description: "White is up a queen",
    },
    EvalPosition {
        name: "Black Material Up",
        fen: "rnbqkbnr/pppp1ppp/8/4p3/8/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
        expected: -100.0,
        description: "Black is up a pawn",
    },
];

pub const SPEED_POSITIONS: &[TimedPosition] = &[
    TimedPosition {
        name: "Complex Middlegame",
        fen: "r1bq1rk1/pp2ppbp/2np1np1/8/3NP3/2N1B3/PPPQ1PPP/R3KB1R w KQ - 0 1",
        time_limit: Duration::from_millis(1000),
        description: "Complex position to test engine speed",
    },
    TimedPosition {
        name: "Tactical Position",
        fen: "r1bqk2r/pppp1ppp/2n2n2/4p3/1bB1P3/2N2N2/PPPP1PPP/R1BQK2R w KQkq - 4 4",
        time_limit: Duration::from_millis(500),
        description: "Tactical position to test move generation speed",
    },
];

/// Knobs for a benchmark run.
#[derive(Debug, Clone, Default)]
pub struct BenchOptions {
    /// Search depth for every position instead of the recommended one.
    pub depth: Option<u8>,
    /// Time spent on each speed position instead of its own limit.
    pub speed_budget: Option<Duration>,
    /// Evaluator scored against the evaluation positions.
    pub evaluator: Evaluator,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionResult {
    pub position: &'static str,
    pub description: &'static str,
    #[serde(rename = "move")]
    pub best_move: Option<String>,
    pub score: f64,
    #[serde(flatten)]
    pub metrics: EngineMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub position: &'static str,
    pub actual_eval: f64,
    pub expected_eval: f64,
    pub error: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub positions: Vec<EvaluationResult>,
    pub mean_error: f64,
    pub max_error: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeedResult {
    pub position: &'static str,
    pub searches: u32,
    pub searches_per_second: f64,
    pub time_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub engine: String,
    pub timestamp: DateTime<Utc>,
    pub standard_positions: Vec<PositionResult>,
    pub evaluation: EvaluationReport,
    pub speed: Vec<SpeedResult>,
}

fn board(name: &'static str, fen: &str) -> Result<Board, BenchError> {
    Board::from_fen(fen).map_err(|source| BenchError::Position { name, source })
}

/// Runs the full suite against `engine`.
///
/// # Errors
///
/// Search failures are propagated as they happen; no partial report is
/// returned.
pub fn run_benchmark<E: SearchEngine>(
    engine: &mut E,
    options: &BenchOptions,
) -> Result<BenchReport, BenchError> {
    let mut standard_positions = Vec::with_capacity(STANDARD_POSITIONS.len());
    for pos in STANDARD_POSITIONS {
        let board = board(pos.name, pos.fen)?;
        let limits = SearchLimits::depth(options.depth.unwrap_or(pos.depth));
        let result = engine.search(&board, &limits)?;
        debug!(position = pos.name, nodes = result.metrics.nodes_searched, "benchmarked position");
        standard_positions.push(PositionResult {
            position: pos.name,
            description: pos.description,
            best_move: result.best_move.as_ref().map(to_uci),
            score: result.score,
            metrics: result.metrics,
        });
    }

    let evaluation = benchmark_evaluation(options.evaluator)?;

    let mut speed = Vec::with_capacity(SPEED_POSITIONS.len());
    for pos in SPEED_POSITIONS {
        let board = board(pos.name, pos.fen)?;
        let budget = options.speed_budget.unwrap_or(pos.time_limit);
        let limits = SearchLimits {
            depth: options.depth,
            movetime: None,
        };
        let start = Instant::now();
        let mut searches = 0u32;
        while searches == 0 || start.elapsed() < budget {
            engine.search(&board, &limits)?;
            searches += 1;
        }
        let elapsed = start.elapsed();
        speed.push(SpeedResult {
            position: pos.name,
            searches,
            searches_per_second: f64::from(searches) / elapsed.as_secs_f64().max(f64::EPSILON),
            time_ms: elapsed.as_millis() as u64,
        });
    }

    Ok(BenchReport {
        engine: engine.name().to_string(),
        timestamp: Utc::now(),
        standard_positions,
        evaluation,
        speed,
    })
}

/// Scores the evaluation positions and compares them to their expected
/// material balance.
pub fn benchmark_evaluation(evaluator: Evaluator) -> Result<EvaluationReport, BenchError> {
    let mut positions = Vec::with_capacity(EVALUATION_POSITIONS.len());
    for pos in EVALUATION_POSITIONS {
        let board = board(pos.name, pos.fen)?;
        let actual = evaluator.evaluate(&board)?;
        positions.push(EvaluationResult {
            position: pos.name,
            actual_eval: actual,
            expected_eval: pos.expected,
            error: (actual - pos.expected).abs(),
        });
    }

    let mean_error = positions.iter().map(|p| p.error).sum::<f64>() / positions.len() as f64;
    let max_error = positions.iter().map(|p| p.error).fold(0.0, f64::max);
    Ok(EvaluationReport {
        positions,
        mean_error,
        max_error,
    })
}
